//! CloudApi (eCloud) client core.
//!
//! This crate signs requests with the CloudApi HMAC-SHA256 scheme and drives them
//! against a CloudApi endpoint: redirects, root documents, paged collections and
//! job polling.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use cloudapi_core::{Context, OsEnv, Result, Signer};
//! use cloudapi_ecloud::{Client, Config, DefaultCredentialProvider, RequestSigner};
//! use cloudapi_http_transport_reqwest::ReqwestHttpTransport;
//! use http::HeaderMap;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_http_transport(ReqwestHttpTransport::try_new()?)
//!         .with_env(OsEnv);
//!     let config = Config::new()
//!         .with_endpoint("https://api.example.com")
//!         .from_env(&ctx);
//!
//!     let loader = DefaultCredentialProvider::new(Arc::new(config.clone()));
//!     let signer = Signer::new(ctx, loader, RequestSigner::new());
//!     let mut client = Client::new(config, signer)?;
//!
//!     // Find the virtual machines collection and list it.
//!     if let Some(href) = client.get_href("virtualMachines", None, None).await? {
//!         let vms: Vec<serde_json::Value> = client.get_array(&href, HeaderMap::new()).await?;
//!         println!("{} virtual machines", vms.len());
//!     }
//!
//!     // Wait for a job.
//!     let jobs = client
//!         .poll_jobs(
//!             ["/api/compute/jobs/1234"],
//!             Duration::from_secs(5),
//!             Duration::from_secs(300),
//!         )
//!         .await?;
//!     for (href, job) in jobs {
//!         println!("{href}: {}", job.status);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Credential Sources
//!
//! ```bash
//! export CLOUDAPI_ACCESS_KEY_ID=your-access-key-id
//! export CLOUDAPI_SECRET_ACCESS_KEY=your-secret-access-key
//! export CLOUDAPI_ENDPOINT=https://api.example.com
//! export CLOUDAPI_ACCOUNT=1000        # Optional, sent as x-tmrk-acct
//! export CLOUDAPI_CLOUDSPACE=cs-01    # Optional, sent as x-tmrk-cloudspace
//! ```

#![warn(missing_docs)]

mod constants;
pub use constants::MAX_REDIRECTS;

mod config;
pub use config::Config;

mod credential;
pub use credential::Credential;

mod sign_request;
pub use sign_request::{canonical_headers, canonical_resource, RequestSigner};

pub mod provide_credential;
pub use provide_credential::*;

mod client;
pub use client::Client;

mod navigate;
pub use navigate::RootDocument;

mod pager;
pub use pager::{Link, Page};

mod job;
pub use job::{Job, JobStatus};
