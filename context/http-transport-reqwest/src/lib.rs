//! Reqwest based HTTP transport for cloudapi.
//!
//! ```no_run
//! use cloudapi_core::Context;
//! use cloudapi_http_transport_reqwest::ReqwestHttpTransport;
//!
//! # fn main() -> cloudapi_core::Result<()> {
//! let ctx = Context::new().with_http_transport(ReqwestHttpTransport::try_new()?);
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use cloudapi_core::{Error, HttpConnection, HttpTransport, ReasonPhrase, Result};
use http::uri::{Authority, Scheme};
use http::Uri;
use http_body_util::BodyExt;
use reqwest::redirect::Policy;
use reqwest::{Client, Request};

/// HttpTransport backed by a shared [`reqwest::Client`].
///
/// Redirects are handled by the cloudapi client itself, so the reqwest client
/// must not follow them.
#[derive(Debug, Clone)]
pub struct ReqwestHttpTransport {
    client: Client,
}

impl ReqwestHttpTransport {
    /// Create a transport with a default client that does not follow redirects.
    pub fn try_new() -> Result<Self> {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;

        Ok(Self { client })
    }

    /// Create a transport with a custom client.
    ///
    /// The client should be built with [`Policy::none`].
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl HttpTransport for ReqwestHttpTransport {
    async fn http_open(
        &self,
        scheme: &Scheme,
        authority: &Authority,
    ) -> Result<Box<dyn HttpConnection>> {
        Ok(Box::new(ReqwestConnection {
            client: Some(self.client.clone()),
            scheme: scheme.clone(),
            authority: authority.clone(),
        }))
    }
}

/// Connection to a single `scheme://authority`.
///
/// reqwest pools sockets internally, closing drops our handle to the pool.
#[derive(Debug)]
struct ReqwestConnection {
    client: Option<Client>,
    scheme: Scheme,
    authority: Authority,
}

#[async_trait]
impl HttpConnection for ReqwestConnection {
    async fn http_send(&mut self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let Some(client) = &self.client else {
            return Err(Error::transport("connection is closed"));
        };

        let (mut parts, body) = req.into_parts();
        parts.uri = {
            let mut uri = Uri::builder()
                .scheme(self.scheme.clone())
                .authority(self.authority.clone());
            if let Some(paq) = parts.uri.path_and_query() {
                uri = uri.path_and_query(paq.clone());
            } else {
                uri = uri.path_and_query("/");
            }
            uri.build()?
        };

        let req = Request::try_from(http::Request::from_parts(parts, body))
            .map_err(|e| Error::transport("failed to build request").with_source(e))?;
        let resp: http::Response<_> = client
            .execute(req)
            .await
            .map_err(|e| {
                Error::transport(format!("failed to send request to {}", self.authority))
                    .with_source(e)
            })?
            .into();

        let (mut parts, body) = resp.into_parts();
        if let Some(reason) = parts.extensions.remove::<hyper::ext::ReasonPhrase>() {
            parts.extensions.insert(ReasonPhrase(
                String::from_utf8_lossy(reason.as_bytes()).into_owned(),
            ));
        }
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport("failed to read response body").with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }

    async fn close(&mut self) {
        self.client = None;
    }
}
