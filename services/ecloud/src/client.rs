// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Signed request execution.

use std::collections::HashMap;

use bytes::Bytes;
use http::header::{ACCEPT, ACCEPT_LANGUAGE, CONTENT_TYPE, LOCATION, USER_AGENT};
use http::uri::{Authority, PathAndQuery, Scheme};
use http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use log::{debug, info, log_enabled, Level};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::constants::*;
use crate::navigate::RootDocument;
use crate::{Config, Credential};
use cloudapi_core::utils::Redact;
use cloudapi_core::{Error, HttpConnection, ReasonPhrase, Result, Signer};

/// Client for a CloudApi endpoint.
///
/// Every request goes through the same steps: merge the default headers with the
/// caller's, sign, send and classify the response. `301`, `302` and `303` are
/// followed up to [`MAX_REDIRECTS`] times in a row, with the already merged headers
/// and the same body.
///
/// A client holds one connection, the current scheme and host, a redirect counter
/// and the root documents it has seen. All of these are updated by requests, so all
/// operations take `&mut self`. Share a client between tasks by wrapping it in a
/// mutex, or build one client per task.
#[derive(Debug)]
pub struct Client {
    signer: Signer<Credential>,
    pub(crate) config: Config,
    scheme: Scheme,
    authority: Authority,
    conn: Option<Box<dyn HttpConnection>>,
    pub(crate) cache: HashMap<String, RootDocument>,
    redirect_attempt: usize,
}

impl Client {
    /// Create a new client for `config.endpoint`.
    ///
    /// The endpoint must be an absolute url like `https://api.example.com`.
    pub fn new(config: Config, signer: Signer<Credential>) -> Result<Self> {
        let endpoint = config
            .endpoint
            .as_deref()
            .ok_or_else(|| Error::config_invalid("endpoint is required"))?;
        let uri: Uri = endpoint.parse().map_err(|e| {
            Error::config_invalid(format!("endpoint {endpoint} is invalid")).with_source(e)
        })?;
        let (Some(scheme), Some(authority)) = (uri.scheme(), uri.authority()) else {
            return Err(Error::config_invalid(format!(
                "endpoint {endpoint} must contain scheme and host"
            )));
        };

        info!("create client for endpoint: {scheme}://{authority}");
        Ok(Self {
            scheme: scheme.clone(),
            authority: authority.clone(),
            signer,
            config,
            conn: None,
            cache: HashMap::new(),
            redirect_attempt: 0,
        })
    }

    /// The current `scheme://host[:port]`.
    ///
    /// Starts as the configured endpoint and follows absolute urls passed to (or
    /// redirected by) later requests.
    pub fn endpoint(&self) -> String {
        format!("{}://{}", self.scheme, self.authority)
    }

    /// Release the connection held by this client, if any.
    pub async fn close(&mut self) {
        if let Some(mut conn) = self.conn.take() {
            conn.close().await;
        }
    }

    /// Execute a request and return the parsed JSON response.
    ///
    /// `url` is either absolute or relative to the current endpoint. `headers` are
    /// laid over the default headers, a caller header replaces the default of the
    /// same name.
    ///
    /// Successful responses (`200`, `201`, `202`, `204`) give the JSON body, or an
    /// empty object for an empty body. Any other status gives a
    /// [`cloudapi_core::ErrorKind::Remote`] error with the status, reason phrase and raw body.
    pub async fn execute(
        &mut self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: Bytes,
    ) -> Result<Value> {
        let mut url = url.to_string();
        let mut headers = headers;

        loop {
            let (resp, sent) = self.send(&method, &url, &headers, body.clone()).await?;
            let status = resp.status();

            if matches!(
                status,
                StatusCode::MOVED_PERMANENTLY | StatusCode::FOUND | StatusCode::SEE_OTHER
            ) {
                self.redirect_attempt += 1;
                if self.redirect_attempt >= MAX_REDIRECTS {
                    return Err(Error::redirect_exhausted(MAX_REDIRECTS));
                }

                let location = resp
                    .headers()
                    .get(LOCATION)
                    .map(|v| v.to_str())
                    .transpose()?
                    .unwrap_or_default();
                url = resolve_location(&url, location);
                debug!("follow redirect {} to: {url}", self.redirect_attempt);
                headers = sent;
                continue;
            }

            self.redirect_attempt = 0;

            return match status {
                StatusCode::OK
                | StatusCode::CREATED
                | StatusCode::ACCEPTED
                | StatusCode::NO_CONTENT => parse_json(resp.into_body()),
                _ => {
                    let reason = ReasonPhrase::of(&resp).to_string();
                    Err(Error::remote(status, &reason, resp.into_body()))
                }
            };
        }
    }

    /// Send one signed request.
    ///
    /// Returns the response together with the headers that were sent.
    async fn send(
        &mut self,
        method: &Method,
        url: &str,
        extra: &HeaderMap,
        body: Bytes,
    ) -> Result<(http::Response<Bytes>, HeaderMap)> {
        info!("request: {method} {url}");

        if !is_supported_method(method) {
            return Err(Error::argument_invalid(format!(
                "HTTP method \"{method}\" is not implemented"
            )));
        }
        if url.is_empty() {
            return Err(Error::argument_invalid("missing URL for HTTP request"));
        }

        self.close().await;

        let path_and_query = self.resolve(url)?;
        if self.scheme != Scheme::HTTP && self.scheme != Scheme::HTTPS {
            return Err(Error::config_invalid(format!(
                "unsupported protocol: {}",
                self.scheme
            )));
        }

        let uri = Uri::builder()
            .scheme(self.scheme.clone())
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()?;

        let mut headers = self.default_headers()?;
        overlay_headers(&mut headers, extra);

        let (mut parts, _) = http::Request::builder()
            .method(method.clone())
            .uri(uri)
            .body(())?
            .into_parts();
        parts.headers = headers;
        self.signer.sign(&mut parts).await?;

        if log_enabled!(Level::Debug) {
            debug!("request headers:\n{}", headers_to_string(&parts.headers));
            debug!("request body:\n{}", String::from_utf8_lossy(&body));
        }

        let sent = parts.headers.clone();
        let req = http::Request::from_parts(parts, body);

        let conn = self
            .signer
            .context()
            .http_open(&self.scheme, &self.authority)
            .await
            .map_err(|e| Error::transport(format!("got transport error: {e}")).with_source(e))?;
        let conn = self.conn.insert(conn);
        let resp = conn
            .http_send(req)
            .await
            .map_err(|e| Error::transport(format!("got transport error: {e}")).with_source(e))?;

        let status = resp.status();
        info!("response: {} {}", status.as_u16(), ReasonPhrase::of(&resp));
        if log_enabled!(Level::Debug) {
            debug!("response headers:\n{}", headers_to_string(resp.headers()));
        }

        Ok((resp, sent))
    }

    /// Parse `url` and move the client to its scheme and host if it has them.
    fn resolve(&mut self, url: &str) -> Result<PathAndQuery> {
        let uri: Uri = if url.starts_with('/') || url.contains("://") {
            url.parse()?
        } else {
            format!("/{url}").parse()?
        };

        if let Some(scheme) = uri.scheme() {
            self.scheme = scheme.clone();
        }
        if let Some(authority) = uri.authority() {
            self.authority = authority.clone();
        }

        match uri.path_and_query() {
            Some(pq) if !pq.as_str().is_empty() => Ok(pq.clone()),
            _ => Ok(PathAndQuery::from_static("/")),
        }
    }

    fn default_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        if let Some(account) = &self.config.account {
            headers.insert(X_TMRK_ACCT, account.parse()?);
        }
        if let Some(cloudspace) = &self.config.cloudspace {
            headers.insert(X_TMRK_CLOUDSPACE, cloudspace.parse()?);
        }
        headers.insert(
            X_TMRK_DC,
            format!("{}://{}", self.scheme, self.authority.host()).parse()?,
        );
        headers.insert(X_TMRK_NONCE, uuid::Uuid::new_v4().to_string().parse()?);
        headers.insert(X_TMRK_VERSION, HeaderValue::from_static(API_VERSION));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static(DEFAULT_ACCEPT_LANGUAGE));
        headers.insert(USER_AGENT, HeaderValue::from_static(DEFAULT_USER_AGENT));

        Ok(headers)
    }

    /// GET `url`.
    pub async fn get(&mut self, url: &str, headers: HeaderMap) -> Result<Value> {
        self.execute(Method::GET, url, headers, Bytes::new()).await
    }

    /// OPTIONS `url`.
    pub async fn options(&mut self, url: &str, headers: HeaderMap) -> Result<Value> {
        self.execute(Method::OPTIONS, url, headers, Bytes::new())
            .await
    }

    /// DELETE `url`, expecting a job document back.
    pub async fn delete(&mut self, url: &str, headers: HeaderMap) -> Result<Value> {
        let mut merged = HeaderMap::new();
        merged.insert(ACCEPT, HeaderValue::from_static(JOB_MIME_TYPE));
        overlay_headers(&mut merged, &headers);

        self.execute(Method::DELETE, url, merged, Bytes::new())
            .await
    }

    /// POST `data` as JSON to `url`, expecting a job document back.
    ///
    /// The `type` field of `data`, if any, is sent as `Content-Type`.
    pub async fn post(
        &mut self,
        url: &str,
        data: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value> {
        let mut merged = HeaderMap::new();
        merged.insert(ACCEPT, HeaderValue::from_static(JOB_MIME_TYPE));
        merged.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_MIME_TYPE));
        if let Some(t) = data_type(data) {
            merged.insert(CONTENT_TYPE, t.parse()?);
        }
        overlay_headers(&mut merged, &headers);

        let body = encode_body(data)?;
        self.execute(Method::POST, url, merged, body).await
    }

    /// PATCH `url` with `data` as JSON.
    ///
    /// The `type` field of `data`, if any, is sent as both `Accept` and `Content-Type`.
    pub async fn patch(
        &mut self,
        url: &str,
        data: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value> {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static(FORM_MIME_TYPE));
        if let Some(t) = data_type(data) {
            let t: HeaderValue = t.parse()?;
            merged.insert(ACCEPT, t.clone());
            merged.insert(CONTENT_TYPE, t);
        }
        overlay_headers(&mut merged, &headers);

        let body = encode_body(data)?;
        self.execute(Method::PATCH, url, merged, body).await
    }

    /// PUT `data` as JSON to `url`.
    ///
    /// The `type` field of `data`, if any, is sent as `Content-Type`.
    pub async fn put(
        &mut self,
        url: &str,
        data: Option<&Value>,
        headers: HeaderMap,
    ) -> Result<Value> {
        let mut merged = HeaderMap::new();
        merged.insert(CONTENT_TYPE, HeaderValue::from_static(JOB_MIME_TYPE));
        merged.insert(ACCEPT, HeaderValue::from_static("*/*"));
        if let Some(t) = data_type(data) {
            merged.insert(CONTENT_TYPE, t.parse()?);
        }
        overlay_headers(&mut merged, &headers);

        let body = encode_body(data)?;
        self.execute(Method::PUT, url, merged, body).await
    }
}

/// Resolve a redirect target against the url that was requested.
///
/// Absolute and host-relative targets are kept. A path-relative target replaces
/// the last segment of the requested path, dot segments are removed.
fn resolve_location(current: &str, location: &str) -> String {
    if location.is_empty() || location.starts_with('/') || location.contains("://") {
        return location.to_string();
    }

    let current = match current.find("://") {
        Some(idx) => {
            let rest = &current[idx + 3..];
            rest.find('/').map_or("/", |p| &rest[p..])
        }
        None => current,
    };
    let path = current.split(['?', '#']).next().unwrap_or_default();
    let dir = path.rfind('/').map_or("", |idx| &path[..idx]);

    let (target, query) = match location.find(['?', '#']) {
        Some(idx) => location.split_at(idx),
        None => (location, ""),
    };

    let mut segments: Vec<&str> = Vec::new();
    let merged = format!("{dir}/{target}");
    let mut parts = merged.split('/').skip(1).peekable();
    while let Some(segment) = parts.next() {
        let last = parts.peek().is_none();
        match segment {
            "." => {
                if last {
                    segments.push("");
                }
            }
            ".." => {
                segments.pop();
                if last {
                    segments.push("");
                }
            }
            s => segments.push(s),
        }
    }

    format!("/{}{query}", segments.join("/"))
}

fn is_supported_method(method: &Method) -> bool {
    [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ]
    .contains(method)
}

/// Replace every header of `base` that `extra` carries, keeping all values of `extra`.
fn overlay_headers(base: &mut HeaderMap, extra: &HeaderMap) {
    for name in extra.keys() {
        base.remove(name);
    }
    for (name, value) in extra {
        base.append(name.clone(), value.clone());
    }
}

fn headers_to_string(headers: &HeaderMap) -> String {
    headers
        .iter()
        .map(|(k, v)| {
            if v.is_sensitive() || k.as_str() == X_TMRK_AUTHORIZATION {
                format!("{k}: {:?}", Redact::from(v))
            } else {
                format!("{k}: {}", v.to_str().unwrap_or("<opaque>"))
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn data_type(data: Option<&Value>) -> Option<&str> {
    data.and_then(|v| v.get("type"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
}

/// Serialize request data, `null` and `{}` send no body.
fn encode_body(data: Option<&Value>) -> Result<Bytes> {
    match data {
        None | Some(Value::Null) => Ok(Bytes::new()),
        Some(Value::Object(m)) if m.is_empty() => Ok(Bytes::new()),
        Some(v) => serde_json::to_vec(v).map(Bytes::from).map_err(|e| {
            Error::argument_invalid(format!("request data can't be serialized: {e}"))
                .with_source(e)
        }),
    }
}

fn parse_json(body: Bytes) -> Result<Value> {
    if body.is_empty() {
        return Ok(Value::Object(Map::new()));
    }

    serde_json::from_slice(&body).map_err(|e| {
        debug!("response body: {}", String::from_utf8_lossy(&body));
        Error::decode(format!("JSON response parse error: {e}"))
            .with_source(e)
            .with_body(body)
    })
}

/// Convert a JSON document into `T`.
pub(crate) fn from_document<T: DeserializeOwned>(value: Value, what: &str) -> Result<T> {
    serde_json::from_value(value).map_err(|e| {
        Error::decode(format!("unexpected {what} document: {e}")).with_source(e)
    })
}
