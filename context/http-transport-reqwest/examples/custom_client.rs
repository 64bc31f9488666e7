use std::time::Duration;

use anyhow::Result;
use bytes::Bytes;
use cloudapi_core::Context;
use cloudapi_http_transport_reqwest::ReqwestHttpTransport;
use http::uri::{Authority, Scheme};
use reqwest::redirect::Policy;
use reqwest::Client;

#[tokio::main]
async fn main() -> Result<()> {
    // The cloudapi client relies on the transport for timeouts.
    let client = Client::builder()
        .timeout(Duration::from_secs(30))
        .pool_max_idle_per_host(10)
        .redirect(Policy::none())
        .build()?;

    let ctx = Context::new().with_http_transport(ReqwestHttpTransport::with_client(client));

    let mut conn = ctx
        .http_open(&Scheme::HTTPS, &Authority::from_static("httpbin.org"))
        .await?;
    let req = http::Request::builder()
        .method("GET")
        .uri("/get")
        .header("X-Test-Header", "cloudapi-example")
        .body(Bytes::new())?;

    let resp = conn.http_send(req).await?;
    println!("Response status: {}", resp.status());
    println!("{}", String::from_utf8_lossy(resp.body()));

    conn.close().await;
    Ok(())
}
