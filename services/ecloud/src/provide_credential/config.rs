use crate::{Config, Credential};
use async_trait::async_trait;
use cloudapi_core::{Context, ProvideCredential, Result};
use std::sync::Arc;

/// ConfigCredentialProvider loads credential from static config.
#[derive(Debug)]
pub struct ConfigCredentialProvider {
    config: Arc<Config>,
}

impl ConfigCredentialProvider {
    /// Create a new `ConfigCredentialProvider` instance.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ProvideCredential for ConfigCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, _ctx: &Context) -> Result<Option<Self::Credential>> {
        match (&self.config.access_key_id, &self.config.secret_access_key) {
            (Some(ak), Some(sk)) => Credential::new(ak, sk).map(Some),
            _ => Ok(None),
        }
    }
}
