use crate::{constants::*, Credential};
use async_trait::async_trait;
use cloudapi_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads CloudApi credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `CLOUDAPI_ACCESS_KEY_ID`: The access key ID
/// - `CLOUDAPI_SECRET_ACCESS_KEY`: The shared secret used to sign requests
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        let envs = ctx.env_vars();

        match (
            envs.get(CLOUDAPI_ACCESS_KEY_ID),
            envs.get(CLOUDAPI_SECRET_ACCESS_KEY),
        ) {
            (Some(ak), Some(sk)) => Credential::new(ak, sk).map(Some),
            _ => Ok(None),
        }
    }
}
