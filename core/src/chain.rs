use crate::{Context, ProvideCredential, Result};
use async_trait::async_trait;
use std::fmt::{self, Debug};

/// A chain of credential providers that will be tried in order.
pub struct ProvideCredentialChain<C: Send + Sync + Unpin + 'static> {
    providers: Vec<Box<dyn ProvideCredential<Credential = C>>>,
}

impl<C: Send + Sync + Unpin + 'static> ProvideCredentialChain<C> {
    /// Create a new empty credential provider chain.
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// Add a credential provider to the end of the chain.
    pub fn push(mut self, provider: impl ProvideCredential<Credential = C>) -> Self {
        self.providers.push(Box::new(provider));
        self
    }

    /// Add a credential provider to the front of the chain.
    pub fn push_front(mut self, provider: impl ProvideCredential<Credential = C>) -> Self {
        self.providers.insert(0, Box::new(provider));
        self
    }

    /// Number of providers in this chain.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Returns true if the chain has no providers.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl<C: Send + Sync + Unpin + 'static> Default for ProvideCredentialChain<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Send + Sync + Unpin + 'static> Debug for ProvideCredentialChain<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProvideCredentialChain")
            .field("providers", &self.providers)
            .finish()
    }
}

#[async_trait]
impl<C: Send + Sync + Unpin + 'static> ProvideCredential for ProvideCredentialChain<C> {
    type Credential = C;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        for provider in &self.providers {
            log::debug!("trying credential provider: {provider:?}");

            match provider.provide_credential(ctx).await {
                Ok(Some(cred)) => {
                    log::debug!("loaded credential from provider: {provider:?}");
                    return Ok(Some(cred));
                }
                Ok(None) => {
                    log::debug!("no credential found in provider: {provider:?}");
                    continue;
                }
                Err(e) => {
                    log::warn!("error loading credential from provider {provider:?}: {e:?}");
                    continue;
                }
            }
        }

        Ok(None)
    }
}
