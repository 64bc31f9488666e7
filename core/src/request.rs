use std::mem;

use http::header::HeaderName;
use http::uri::Authority;
use http::uri::Scheme;
use http::HeaderMap;
use http::Method;

use crate::{Error, Result};

/// Signing context for request.
///
/// Path and query are kept percent-decoded, since signatures are computed over the
/// decoded form of the url.
#[derive(Debug)]
pub struct SigningRequest {
    /// HTTP method.
    pub method: Method,
    /// HTTP scheme.
    pub scheme: Scheme,
    /// HTTP authority.
    pub authority: Authority,
    /// HTTP path, percent decoded.
    pub path: String,
    /// HTTP query parameters in the order they appear, percent decoded.
    pub query: Vec<(String, String)>,
    /// HTTP headers.
    pub headers: HeaderMap,
}

impl SigningRequest {
    /// Build a signing context from http::request::Parts.
    pub fn build(parts: &mut http::request::Parts) -> Result<Self> {
        let uri = &parts.uri;

        Ok(SigningRequest {
            method: parts.method.clone(),
            scheme: uri.scheme().cloned().unwrap_or(Scheme::HTTP),
            authority: uri.authority().cloned().ok_or_else(|| {
                Error::argument_invalid("request without authority is invalid for signing")
            })?,
            path: percent_decode(uri.path()),
            query: uri.query().map(Self::query_split).unwrap_or_default(),

            // Take the headers out of the request to avoid copy.
            // We will return it back when apply the context.
            headers: mem::take(&mut parts.headers),
        })
    }

    /// Apply the signing context back to http::request::Parts.
    pub fn apply(mut self, parts: &mut http::request::Parts) -> Result<()> {
        mem::swap(&mut parts.headers, &mut self.headers);
        Ok(())
    }

    /// Split a raw query string into `(name, value)` pairs.
    ///
    /// The query is percent decoded first and then split on every `&`, each pair on its
    /// first `=`. Empty segments are skipped, a segment without `=` has an empty value.
    ///
    /// ```
    /// use cloudapi_core::SigningRequest;
    ///
    /// assert_eq!(
    ///     SigningRequest::query_split("b=2&a=1&c"),
    ///     vec![
    ///         ("b".to_string(), "2".to_string()),
    ///         ("a".to_string(), "1".to_string()),
    ///         ("c".to_string(), "".to_string()),
    ///     ]
    /// );
    /// ```
    pub fn query_split(query: &str) -> Vec<(String, String)> {
        percent_decode(query)
            .split('&')
            .filter(|kv| !kv.is_empty())
            .map(|kv| match kv.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (kv.to_string(), String::new()),
            })
            .collect()
    }

    /// Get header value by name.
    ///
    /// Returns empty string if header not found.
    #[inline]
    pub fn header_get_or_default(&self, key: &HeaderName) -> Result<&str> {
        match self.headers.get(key) {
            Some(v) => Ok(v.to_str()?),
            None => Ok(""),
        }
    }

    /// Get lowercased `(name, value)` pairs of all headers accepted by filter.
    ///
    /// Every name appears once. If a header carries several values, the first one is used.
    pub fn header_to_vec_with_filter(
        &self,
        filter: impl Fn(&str) -> bool,
    ) -> Result<Vec<(String, String)>> {
        let mut h = Vec::new();
        for k in self.headers.keys().filter(|k| filter(k.as_str())) {
            if let Some(v) = self.headers.get(k) {
                h.push((k.as_str().to_lowercase(), v.to_str()?.to_string()));
            }
        }

        Ok(h)
    }

    /// Convert sorted headers to string.
    ///
    /// ```shell
    /// [(a, b), (c, d)] => "a:b\nc:d"
    /// ```
    pub fn header_to_string(mut headers: Vec<(String, String)>, sep: &str, join: &str) -> String {
        let mut s = String::with_capacity(16);

        // Sort via header name.
        headers.sort();

        for (idx, (k, v)) in headers.into_iter().enumerate() {
            if idx != 0 {
                s.push_str(join);
            }

            s.push_str(&k);
            s.push_str(sep);
            s.push_str(&v);
        }

        s
    }
}

fn percent_decode(s: &str) -> String {
    percent_encoding::percent_decode_str(s)
        .decode_utf8_lossy()
        .into_owned()
}
