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

//! CloudApi request signer
use std::fmt::Write;

use async_trait::async_trait;
use http::header::{CONTENT_LENGTH, CONTENT_TYPE, DATE};
use http::{HeaderMap, HeaderValue};
use log::debug;

use super::constants::*;
use super::credential::Credential;
use cloudapi_core::hash::base64_hmac_sha256;
use cloudapi_core::time::{format_http_date, now, DateTime};
use cloudapi_core::{Context, Error, Result, SignRequest, SigningRequest};

/// RequestSigner that implements CloudApi HMAC-SHA256 authorization.
///
/// Signing inserts a fresh `Date` header, which is part of the signed material,
/// and then the `x-tmrk-authorization` header:
///
/// ```text
/// CloudApi AccessKey="{access_key_id}" SignatureType="HmacSHA256" Signature="{signature}"
/// ```
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a signer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    #[cfg(test)]
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }
}

#[async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _ctx: &Context,
        parts: &mut http::request::Parts,
        credential: Option<&Self::Credential>,
    ) -> Result<()> {
        let k = credential.ok_or_else(|| Error::credential_invalid("missing credential"))?;
        let now = self.time.unwrap_or_else(now);

        let mut ctx = SigningRequest::build(parts)?;
        ctx.headers.insert(DATE, format_http_date(now).parse()?);

        let string_to_sign = string_to_sign(&ctx)?;
        let signature =
            base64_hmac_sha256(k.secret_access_key().as_bytes(), string_to_sign.as_bytes());

        ctx.headers.insert(X_TMRK_AUTHORIZATION, {
            let mut value: HeaderValue = format!(
                r#"CloudApi AccessKey="{}" SignatureType="{SIGNATURE_TYPE}" Signature="{}""#,
                k.access_key_id(),
                signature.trim()
            )
            .parse()?;
            value.set_sensitive(true);

            value
        });

        ctx.apply(parts)
    }
}

/// Construct string to sign
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-Length + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedHeaders + "\n" +
/// CanonicalizedResource + "\n"
/// ```
///
/// Missing `Content-Length` and `Content-Type` leave an empty line, so do empty
/// canonicalized headers.
fn string_to_sign(ctx: &SigningRequest) -> Result<String> {
    let mut s = String::new();
    writeln!(&mut s, "{}", ctx.method.as_str())?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&CONTENT_LENGTH)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&CONTENT_TYPE)?)?;
    writeln!(&mut s, "{}", ctx.header_get_or_default(&DATE)?)?;
    writeln!(&mut s, "{}", canonicalize_header(ctx)?)?;
    writeln!(&mut s, "{}", canonicalize_resource(&ctx.path, &ctx.query))?;

    debug!("string to sign: {}", &s);
    Ok(s)
}

/// Build the canonicalized headers of a header map.
///
/// All `x-tmrk-*` headers except `x-tmrk-authorization`, names lowercased, one per
/// name, sorted by name and joined as `name:value` lines. No trailing newline.
///
/// ```
/// use cloudapi_ecloud::canonical_headers;
/// use http::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("X-Tmrk-Version", "2015-05-01".parse().unwrap());
/// headers.insert("x-tmrk-acct", "1000".parse().unwrap());
/// headers.insert("accept", "*/*".parse().unwrap());
///
/// assert_eq!(
///     canonical_headers(&headers).unwrap(),
///     "x-tmrk-acct:1000\nx-tmrk-version:2015-05-01"
/// );
/// ```
pub fn canonical_headers(headers: &HeaderMap) -> Result<String> {
    let mut h = Vec::new();
    for k in headers.keys().filter(|k| is_signed_header(k.as_str())) {
        if let Some(v) = headers.get(k) {
            h.push((k.as_str().to_string(), v.to_str()?.to_string()));
        }
    }

    Ok(SigningRequest::header_to_string(h, ":", "\n"))
}

fn canonicalize_header(ctx: &SigningRequest) -> Result<String> {
    Ok(SigningRequest::header_to_string(
        ctx.header_to_vec_with_filter(is_signed_header)?,
        ":",
        "\n",
    ))
}

fn is_signed_header(name: &str) -> bool {
    // HeaderName is always lowercase.
    name.starts_with(X_TMRK_PREFIX) && !name.starts_with(X_TMRK_AUTHORIZATION)
}

/// Build the canonicalized resource of a (percent decoded) path and query.
///
/// Without query parameters this is the lowercased path. Otherwise the lowercased
/// path and every `name:value` pair (name lowercased, value untouched) are sorted
/// together as one list and joined by newlines.
///
/// ```
/// use cloudapi_core::SigningRequest;
/// use cloudapi_ecloud::canonical_resource;
///
/// let query = SigningRequest::query_split("b=2&a=1");
/// assert_eq!(canonical_resource("/Api/Thing", &query), "/api/thing\na:1\nb:2");
/// assert_eq!(canonical_resource("/Api/Thing", &[]), "/api/thing");
/// ```
pub fn canonical_resource(path: &str, query: &[(String, String)]) -> String {
    canonicalize_resource(path, query)
}

fn canonicalize_resource(path: &str, query: &[(String, String)]) -> String {
    let path = path.to_lowercase();
    if query.is_empty() {
        return path;
    }

    let mut lines = Vec::with_capacity(query.len() + 1);
    lines.push(path);
    lines.extend(
        query
            .iter()
            .map(|(k, v)| format!("{}:{}", k.to_lowercase(), v)),
    );
    lines.sort();

    lines.join("\n")
}
