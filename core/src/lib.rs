//! Core components for signed CloudApi requests.
//!
//! This crate provides the foundational types and traits shared by the cloudapi crates.
//! It defines the abstractions that keep signing, credential loading and networking
//! independent from each other.
//!
//! ## Overview
//!
//! The crate is built around several key concepts:
//!
//! - **Context**: A container that holds implementations for the HTTP transport and environment access
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`) and request signing (`SignRequest`)
//! - **Signer**: The orchestrator that loads and caches credentials and signs requests
//!
//! ## Example
//!
//! ```no_run
//! use cloudapi_core::{Context, Result, Signer, ProvideCredential, SignRequest, SigningCredential};
//! use async_trait::async_trait;
//! use http::request::Parts;
//!
//! // Define your credential type
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//!     secret: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty() && !self.secret.is_empty()
//!     }
//! }
//!
//! // Implement credential loader
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             key: "my-access-key".to_string(),
//!             secret: "my-secret-key".to_string(),
//!         }))
//!     }
//! }
//!
//! // Implement request signer
//! #[derive(Debug)]
//! struct MySigner;
//!
//! #[async_trait]
//! impl SignRequest for MySigner {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         _req: &mut Parts,
//!         _cred: Option<&Self::Credential>,
//!     ) -> Result<()> {
//!         // Add your authorization headers here
//!         todo!()
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::default(), MyLoader, MySigner);
//!
//! let mut parts = http::Request::builder()
//!     .method("GET")
//!     .uri("https://example.com")
//!     .body(())?
//!     .into_parts()
//!     .0;
//!
//! signer.sign(&mut parts).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! - [`HttpTransport`] / [`HttpConnection`]: For opening connections and exchanging requests
//! - [`Env`]: For environment variable access
//! - [`ProvideCredential`]: For loading credentials from various sources
//! - [`SignRequest`]: For service-specific request signing
//! - [`SigningCredential`]: For validating credentials
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time formatting utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result};

mod context;
pub use context::{
    Context, Env, HttpConnection, HttpTransport, NoopEnv, NoopHttpTransport, OsEnv, ReasonPhrase,
    StaticEnv,
};

mod api;
pub use api::{ProvideCredential, SignRequest, SigningCredential};
mod chain;
pub use chain::ProvideCredentialChain;
mod request;
pub use request::SigningRequest;
mod signer;
pub use signer::Signer;
