use crate::{Context, Error, ProvideCredential, Result, SignRequest, SigningCredential};
use std::sync::{Arc, Mutex};

/// Signer is the main struct used to sign the request.
///
/// The first valid credential returned by the loader is cached and reused for the
/// lifetime of the signer.
#[derive(Clone, Debug)]
pub struct Signer<K: SigningCredential> {
    ctx: Context,
    loader: Arc<dyn ProvideCredential<Credential = K>>,
    builder: Arc<dyn SignRequest<Credential = K>>,
    credential: Arc<Mutex<Option<K>>>,
}

impl<K: SigningCredential> Signer<K> {
    /// Create a new signer.
    pub fn new(
        ctx: Context,
        loader: impl ProvideCredential<Credential = K>,
        builder: impl SignRequest<Credential = K>,
    ) -> Self {
        Self {
            ctx,

            loader: Arc::new(loader),
            builder: Arc::new(builder),
            credential: Arc::new(Mutex::new(None)),
        }
    }

    /// Get the context this signer was built with.
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Signing request.
    pub async fn sign(&self, req: &mut http::request::Parts) -> Result<()> {
        let credential = self.credential().await?;

        self.builder
            .sign_request(&self.ctx, req, Some(&credential))
            .await
    }

    /// Load the credential, from cache if possible.
    ///
    /// Returns [`crate::ErrorKind::CredentialInvalid`] if no provider has a valid credential.
    pub async fn credential(&self) -> Result<K> {
        let cached = self.lock().clone();
        if let Some(cred) = cached.filter(SigningCredential::is_valid) {
            return Ok(cred);
        }

        let loaded = self
            .loader
            .provide_credential(&self.ctx)
            .await?
            .filter(SigningCredential::is_valid)
            .ok_or_else(|| Error::credential_invalid("no valid credential found"))?;
        *self.lock() = Some(loaded.clone());
        Ok(loaded)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<K>> {
        // The guarded value is a plain cache, a poisoned lock still holds usable data.
        self.credential
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
