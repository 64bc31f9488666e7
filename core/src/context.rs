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

use crate::{Error, Result};
use bytes::Bytes;
use http::uri::{Authority, Scheme};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Context provides the environment the client runs in.
///
/// ## Important
///
/// cloudapi provides NO default implementations. Users MAY configure components they need.
/// Any unconfigured component will use a no-op implementation that returns errors or empty values when called.
///
/// ## Example
///
/// ```
/// use cloudapi_core::{Context, OsEnv};
///
/// // Create a context with explicit implementations
/// let ctx = Context::new()
///     .with_env(OsEnv);  // Optionally configure environment implementation
/// ```
#[derive(Clone)]
pub struct Context {
    http: Arc<dyn HttpTransport>,
    env: Arc<dyn Env>,
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("http", &self.http)
            .field("env", &self.env)
            .finish()
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Create a new Context with no-op implementations.
    ///
    /// Use the `with_*` methods to configure the components you need.
    pub fn new() -> Self {
        Self {
            http: Arc::new(NoopHttpTransport),
            env: Arc::new(NoopEnv),
        }
    }

    /// Replace the HTTP transport implementation.
    pub fn with_http_transport(mut self, http: impl HttpTransport) -> Self {
        self.http = Arc::new(http);
        self
    }

    /// Replace the environment implementation.
    pub fn with_env(mut self, env: impl Env) -> Self {
        self.env = Arc::new(env);
        self
    }

    /// Open a connection to `scheme://authority`.
    #[inline]
    pub async fn http_open(
        &self,
        scheme: &Scheme,
        authority: &Authority,
    ) -> Result<Box<dyn HttpConnection>> {
        self.http.http_open(scheme, authority).await
    }

    /// Get the environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    #[inline]
    pub fn env_var(&self, key: &str) -> Option<String> {
        self.env.var(key)
    }

    /// Returns an hashmap of (variable, value) pairs of strings, for all the
    /// environment variables of the current process.
    #[inline]
    pub fn env_vars(&self) -> HashMap<String, String> {
        self.env.vars()
    }
}

/// HttpTransport opens connections to a `scheme://host` pair.
///
/// This is the only networking capability the client needs. Plaintext or TLS is
/// chosen by the scheme, which is always `http` or `https` by the time it gets here.
#[async_trait::async_trait]
pub trait HttpTransport: Debug + Send + Sync + 'static {
    /// Open a connection.
    async fn http_open(
        &self,
        scheme: &Scheme,
        authority: &Authority,
    ) -> Result<Box<dyn HttpConnection>>;
}

/// HttpConnection is a connection returned by [`HttpTransport::http_open`].
#[async_trait::async_trait]
pub trait HttpConnection: Debug + Send + 'static {
    /// Send the request and read back the whole response.
    ///
    /// Redirects must not be followed here. Connection level failures should be
    /// reported as [`crate::ErrorKind::Transport`]. The reason phrase sent by the
    /// server, if known, goes into the response extensions as a [`ReasonPhrase`].
    async fn http_send(&mut self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>>;

    /// Release the connection. Closing twice is a no-op.
    async fn close(&mut self);
}

/// Reason phrase of a response status line as sent by the server.
///
/// Stored in [`http::Response::extensions`] by transports that can see it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReasonPhrase(pub String);

impl ReasonPhrase {
    /// Reason phrase of `resp`, falling back to the canonical one for its status.
    pub fn of<B>(resp: &http::Response<B>) -> &str {
        match resp.extensions().get::<ReasonPhrase>() {
            Some(ReasonPhrase(reason)) => reason,
            None => resp.status().canonical_reason().unwrap_or_default(),
        }
    }
}

/// Env gives access to environment variables.
pub trait Env: Debug + Send + Sync + 'static {
    /// Get an environment variable.
    ///
    /// - Returns `Some(v)` if the environment variable is found and is valid utf-8.
    /// - Returns `None` if the environment variable is not found or value is invalid.
    fn var(&self, key: &str) -> Option<String>;

    /// Returns an hashmap of (variable, value) pairs of strings, for all the
    /// environment variables of the current process.
    fn vars(&self) -> HashMap<String, String>;
}

/// Implements Env for the OS context.
#[derive(Debug, Copy, Clone)]
pub struct OsEnv;

impl Env for OsEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var_os(key)?.into_string().ok()
    }

    fn vars(&self) -> HashMap<String, String> {
        std::env::vars().collect()
    }
}

/// StaticEnv provides a static env environment.
///
/// This is useful for testing or for providing a fixed environment.
#[derive(Debug, Clone, Default)]
pub struct StaticEnv {
    /// The environment variables to use.
    pub envs: HashMap<String, String>,
}

impl Env for StaticEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.envs.get(key).cloned()
    }

    fn vars(&self) -> HashMap<String, String> {
        self.envs.clone()
    }
}

/// NoopHttpTransport is a no-op implementation that always returns an error.
///
/// This is used when no HTTP transport is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHttpTransport;

#[async_trait::async_trait]
impl HttpTransport for NoopHttpTransport {
    async fn http_open(
        &self,
        _scheme: &Scheme,
        _authority: &Authority,
    ) -> Result<Box<dyn HttpConnection>> {
        Err(Error::transport(
            "HTTP transport not supported: no HTTP transport configured",
        ))
    }
}

/// NoopEnv is a no-op implementation that always returns None/empty.
///
/// This is used when no environment is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopEnv;

impl Env for NoopEnv {
    fn var(&self, _key: &str) -> Option<String> {
        None
    }

    fn vars(&self) -> HashMap<String, String> {
        HashMap::new()
    }
}
