use std::sync::Arc;

use crate::provide_credential::{ConfigCredentialProvider, EnvCredentialProvider};
use crate::{Config, Credential};
use async_trait::async_trait;
use cloudapi_core::{Context, ProvideCredential, ProvideCredentialChain, Result};

/// DefaultCredentialProvider is a loader that will try to load credential via default chains.
///
/// Resolution order:
///
/// 1. Config (`access_key_id` and `secret_access_key`)
/// 2. Environment variables
#[derive(Debug)]
pub struct DefaultCredentialProvider {
    chain: ProvideCredentialChain<Credential>,
}

impl DefaultCredentialProvider {
    /// Create a new `DefaultCredentialProvider` instance.
    pub fn new(config: Arc<Config>) -> Self {
        let chain = ProvideCredentialChain::new()
            .push(ConfigCredentialProvider::new(config))
            .push(EnvCredentialProvider::new());

        Self { chain }
    }

    /// Create with a custom credential chain.
    pub fn with_chain(chain: ProvideCredentialChain<Credential>) -> Self {
        Self { chain }
    }

    /// Add a credential provider to the front of the default chain.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use cloudapi_ecloud::{Config, DefaultCredentialProvider, StaticCredentialProvider};
    ///
    /// # fn main() -> cloudapi_core::Result<()> {
    /// let provider = DefaultCredentialProvider::new(Arc::new(Config::new()))
    ///     .push_front(StaticCredentialProvider::new("access_key", "secret_key")?);
    /// # Ok(())
    /// # }
    /// ```
    pub fn push_front(
        mut self,
        provider: impl ProvideCredential<Credential = Credential> + 'static,
    ) -> Self {
        self.chain = self.chain.push_front(provider);
        self
    }
}

#[async_trait]
impl ProvideCredential for DefaultCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        self.chain.provide_credential(ctx).await
    }
}
