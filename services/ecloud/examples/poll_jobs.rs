//! Power on a virtual machine and wait for the job.
//!
//! ```shell
//! export CLOUDAPI_ENDPOINT=https://api.example.com
//! export CLOUDAPI_ACCESS_KEY_ID=...
//! export CLOUDAPI_SECRET_ACCESS_KEY=...
//! cargo run --example poll_jobs -- /api/compute/virtualMachines/1234
//! ```

use std::env;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, Result};
use cloudapi_core::{Context, OsEnv, Signer};
use cloudapi_ecloud::{Client, Config, DefaultCredentialProvider, RequestSigner};
use cloudapi_http_transport_reqwest::ReqwestHttpTransport;
use http::HeaderMap;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();
    let _ = dotenv::dotenv();

    let vm = env::args()
        .nth(1)
        .ok_or_else(|| anyhow!("usage: poll_jobs <virtual machine href>"))?;

    let ctx = Context::new()
        .with_http_transport(ReqwestHttpTransport::try_new()?)
        .with_env(OsEnv);
    let config = Config::new().from_env(&ctx);
    let loader = DefaultCredentialProvider::new(Arc::new(config.clone()));
    let signer = Signer::new(ctx, loader, RequestSigner::new());
    let mut client = Client::new(config, signer)?;

    let job = client
        .post(&format!("{vm}/action/powerOn"), None, HeaderMap::new())
        .await?;
    let href = job["href"]
        .as_str()
        .ok_or_else(|| anyhow!("job document has no href: {job}"))?;

    let jobs = client
        .poll_jobs([href], Duration::from_secs(5), Duration::from_secs(300))
        .await?;
    for (href, job) in jobs {
        println!(
            "{href}: {} ({}%)",
            job.status,
            job.progress.unwrap_or_default()
        );
    }

    client.close().await;
    Ok(())
}
