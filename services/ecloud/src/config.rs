use std::fmt::{Debug, Formatter};

use super::constants::*;
use cloudapi_core::{utils::Redact, Context};

/// Config carries all the configuration for the CloudApi client.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDAPI_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDAPI_SECRET_ACCESS_KEY`]
    pub secret_access_key: Option<String>,
    /// Base url of the api, like `https://api.example.com`.
    ///
    /// `endpoint` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDAPI_ENDPOINT`]
    pub endpoint: Option<String>,
    /// Account id sent as `x-tmrk-acct`.
    ///
    /// `account` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDAPI_ACCOUNT`]
    pub account: Option<String>,
    /// Cloudspace sent as `x-tmrk-cloudspace`.
    ///
    /// `cloudspace` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`CLOUDAPI_CLOUDSPACE`]
    pub cloudspace: Option<String>,
    /// Stop following `next` links after this many pages. Unbounded by default.
    pub max_pages: Option<usize>,
    /// Stop polling jobs after this many sweeps. Unbounded by default.
    pub max_poll_sweeps: Option<usize>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set access_key_id
    pub fn with_access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }

    /// Set secret_access_key
    pub fn with_secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Set endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Set account
    pub fn with_account(mut self, account: impl Into<String>) -> Self {
        self.account = Some(account.into());
        self
    }

    /// Set cloudspace
    pub fn with_cloudspace(mut self, cloudspace: impl Into<String>) -> Self {
        self.cloudspace = Some(cloudspace.into());
        self
    }

    /// Set max_pages
    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = Some(max_pages);
        self
    }

    /// Set max_poll_sweeps
    pub fn with_max_poll_sweeps(mut self, max_poll_sweeps: usize) -> Self {
        self.max_poll_sweeps = Some(max_poll_sweeps);
        self
    }

    /// Load config from env.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(CLOUDAPI_ACCESS_KEY_ID) {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDAPI_SECRET_ACCESS_KEY) {
            self.secret_access_key.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDAPI_ENDPOINT) {
            self.endpoint.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDAPI_ACCOUNT) {
            self.account.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(CLOUDAPI_CLOUDSPACE) {
            self.cloudspace.get_or_insert(v);
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &self.access_key_id.as_ref().map(Redact::from))
            .field(
                "secret_access_key",
                &self.secret_access_key.as_ref().map(Redact::from),
            )
            .field("endpoint", &self.endpoint)
            .field("account", &self.account)
            .field("cloudspace", &self.cloudspace)
            .field("max_pages", &self.max_pages)
            .field("max_poll_sweeps", &self.max_poll_sweeps)
            .finish()
    }
}
