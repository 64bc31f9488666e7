use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use cloudapi_core::hash::base64_hmac_sha256;
use cloudapi_core::{Context, ErrorKind, Result, Signer, SigningRequest, StaticEnv};
use cloudapi_ecloud::{
    canonical_headers, canonical_resource, Client, Config, DefaultCredentialProvider,
    RequestSigner, StaticCredentialProvider,
};
use http::header::{
    HeaderName, ACCEPT, ACCEPT_LANGUAGE, CONTENT_LENGTH, CONTENT_TYPE, DATE, USER_AGENT,
};
use http::{HeaderMap, HeaderValue, Method, Request, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::json;

use super::mock::*;

const JOB_MIME_TYPE: &str = "application/vnd.terremark.ecloud.job.v1+json";
const FORM_MIME_TYPE: &str = "application/x-www-form-urlencoded";

fn header<'a>(req: &'a Request<Bytes>, name: &str) -> &'a str {
    req.headers()
        .get(name)
        .unwrap_or_else(|| panic!("header {name} must be sent"))
        .to_str()
        .expect("header must be visible ascii")
}

/// Recompute the signature the way the service verifies it.
fn expected_authorization(req: &Request<Bytes>) -> String {
    let query = req
        .uri()
        .query()
        .map(SigningRequest::query_split)
        .unwrap_or_default();
    let get = |name: HeaderName| {
        req.headers()
            .get(name)
            .map(|v: &HeaderValue| v.to_str().expect("must be ascii"))
            .unwrap_or_default()
    };

    let string_to_sign = format!(
        "{}\n{}\n{}\n{}\n{}\n{}\n",
        req.method(),
        get(CONTENT_LENGTH),
        get(CONTENT_TYPE),
        get(DATE),
        canonical_headers(req.headers()).expect("headers must be valid"),
        canonical_resource(req.uri().path(), &query),
    );
    let signature = base64_hmac_sha256(b"secret_key", string_to_sign.as_bytes());
    format!(r#"CloudApi AccessKey="access_key" SignatureType="HmacSHA256" Signature="{signature}""#)
}

#[tokio::test]
async fn test_get_sends_signed_request() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute?Limit=10&offset=0", Reply::json(json!({"a": 1})));
    let mut client = client(&mock);

    let value = client
        .get("/api/compute?Limit=10&offset=0", no_headers())
        .await?;
    assert_eq!(value, json!({"a": 1}));

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.method(), Method::GET);
    assert_eq!(
        req.uri().to_string(),
        "https://api.example.com/api/compute?Limit=10&offset=0"
    );
    assert_eq!(mock.opens(), vec![ENDPOINT.to_string()]);

    assert_eq!(header(req, "x-tmrk-dc"), "https://api.example.com");
    assert_eq!(header(req, "x-tmrk-version"), "2015-05-01");
    assert_eq!(header(req, ACCEPT_LANGUAGE.as_str()), "en-US");
    assert!(header(req, USER_AGENT.as_str()).starts_with("cloudapi-ecloud/"));
    assert!(uuid::Uuid::parse_str(header(req, "x-tmrk-nonce")).is_ok());
    assert!(req.headers().get("x-tmrk-acct").is_none());
    assert!(req.headers().get("x-tmrk-cloudspace").is_none());
    assert!(header(req, DATE.as_str()).ends_with(" GMT"));

    assert_eq!(
        header(req, "x-tmrk-authorization"),
        expected_authorization(req)
    );
    Ok(())
}

#[tokio::test]
async fn test_nonce_is_unique_per_request() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute", Reply::json(json!({})));
    let mut client = client(&mock);

    client.get("/api/compute", no_headers()).await?;
    client.get("/api/compute", no_headers()).await?;

    let requests = mock.requests();
    assert_ne!(
        header(&requests[0], "x-tmrk-nonce"),
        header(&requests[1], "x-tmrk-nonce")
    );
    Ok(())
}

#[tokio::test]
async fn test_account_and_cloudspace_headers() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute", Reply::json(json!({})));
    let mut client = client_with(
        &mock,
        Config::new().with_account("1000").with_cloudspace("cs-01"),
    );

    client.get("/api/compute", no_headers()).await?;

    let req = &mock.requests()[0];
    assert_eq!(header(req, "x-tmrk-acct"), "1000");
    assert_eq!(header(req, "x-tmrk-cloudspace"), "cs-01");
    assert_eq!(
        header(req, "x-tmrk-authorization"),
        expected_authorization(req)
    );
    Ok(())
}

#[tokio::test]
async fn test_caller_headers_win() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute", Reply::json(json!({})));
    let mut client = client_with(&mock, Config::new().with_account("1000"));

    let mut headers = HeaderMap::new();
    headers.insert("x-tmrk-acct", HeaderValue::from_static("2000"));
    headers.insert("accept-language", HeaderValue::from_static("de-DE"));
    headers.insert("x-tmrk-request-id", HeaderValue::from_static("r-1"));
    client.get("/api/compute", headers).await?;

    let req = &mock.requests()[0];
    assert_eq!(header(req, "x-tmrk-acct"), "2000");
    assert_eq!(header(req, "accept-language"), "de-DE");
    assert_eq!(header(req, "x-tmrk-request-id"), "r-1");
    assert_eq!(
        header(req, "x-tmrk-authorization"),
        expected_authorization(req)
    );
    Ok(())
}

#[tokio::test]
async fn test_relative_url_without_slash() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute", Reply::json(json!({})));
    let mut client = client(&mock);

    client.get("api/compute", no_headers()).await?;
    assert_eq!(mock.paths(), vec!["/api/compute".to_string()]);
    Ok(())
}

#[tokio::test]
async fn test_empty_success_body() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute/vms/1", Reply::status(204, ""));
    mock.on("/api/compute/vms/2", Reply::status(202, ""));
    let mut client = client(&mock);

    assert_eq!(client.delete("/api/compute/vms/1", no_headers()).await?, json!({}));
    assert_eq!(client.delete("/api/compute/vms/2", no_headers()).await?, json!({}));
    Ok(())
}

#[tokio::test]
async fn test_remote_error() {
    let body = r#"{"message":"Conflict : vnet must have no vm's attached","statusCode":409}"#;
    let mock = MockTransport::new();
    mock.on("/api/compute/vnets/1", Reply::status(409, body));
    let mut client = client(&mock);

    let err = client
        .delete("/api/compute/vnets/1", no_headers())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    assert_eq!(err.to_string(), format!("409 Conflict\n{body}"));
    assert_eq!(err.body(), Some(&Bytes::from_static(body.as_bytes())));
}

#[tokio::test]
async fn test_xml_error_body_is_passed_through() {
    let body = r#"<Error message="Authentication is required." majorErrorCode="401" minorErrorCode="AuthenticationRequired"/>"#;
    let mock = MockTransport::new();
    mock.on("/api/", Reply::status(401, body));
    let mut client = client(&mock);

    let err = client.get("/api/", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.to_string(), format!("401 Unauthorized\n{body}"));
}

#[tokio::test]
async fn test_remote_error_keeps_server_reason() {
    let mock = MockTransport::new();
    mock.on(
        "/api/compute/vms/1",
        Reply::status_with_reason(599, "Network Connect Timeout", "oops"),
    );
    mock.on(
        "/api/compute/vms/2",
        Reply::status_with_reason(404, "No Such Virtual Machine", "gone"),
    );
    let mut client = client(&mock);

    let err = client
        .get("/api/compute/vms/1", no_headers())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.to_string(), "599 Network Connect Timeout\noops");

    let err = client
        .get("/api/compute/vms/2", no_headers())
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "404 No Such Virtual Machine\ngone");
}

#[tokio::test]
async fn test_unexpected_success_status_is_remote_error() {
    let mock = MockTransport::new();
    mock.on("/api/", Reply::status(206, "partial"));
    mock.on("/api/old", Reply::status(304, ""));
    let mut client = client(&mock);

    let err = client.get("/api/", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(StatusCode::PARTIAL_CONTENT));

    let err = client.get("/api/old", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
    assert_eq!(err.status(), Some(StatusCode::NOT_MODIFIED));
}

#[tokio::test]
async fn test_decode_error() {
    let mock = MockTransport::new();
    mock.on("/api/", Reply::status(200, "<Root/>"));
    let mut client = client(&mock);

    let err = client.get("/api/", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.to_string().starts_with("JSON response parse error"));
    assert!(!err.to_string().contains("<Root/>"));
    assert!(format!("{err:?}").contains("<Root/>"));
}

#[tokio::test]
async fn test_unsupported_method() {
    let mock = MockTransport::new();
    let mut client = client(&mock);

    let err = client
        .execute(Method::HEAD, "/api/", no_headers(), Bytes::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentInvalid);
    assert!(mock.requests().is_empty());
    assert!(mock.opens().is_empty());
}

#[tokio::test]
async fn test_empty_url() {
    let mock = MockTransport::new();
    let mut client = client(&mock);

    let err = client.get("", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentInvalid);
    assert!(mock.opens().is_empty());
}

#[tokio::test]
async fn test_unsupported_scheme() {
    let mock = MockTransport::new();
    let mut client = client(&mock);

    let err = client
        .get("ftp://files.example.com/api/", no_headers())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
    assert!(mock.opens().is_empty());
}

#[tokio::test]
async fn test_transport_error() {
    let mock = MockTransport::new();
    mock.on("/api/", Reply::Fail);
    let mut client = client(&mock);

    let err = client.get("/api/", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn test_previous_connection_is_closed() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/", Reply::json(json!({})));
    let mut client = client(&mock);

    client.get("/api/", no_headers()).await?;
    assert_eq!(mock.closes(), 0);
    client.get("/api/", no_headers()).await?;
    assert_eq!(mock.opens().len(), 2);
    assert_eq!(mock.closes(), 1);

    client.close().await;
    client.close().await;
    assert_eq!(mock.closes(), 2);
    Ok(())
}

#[tokio::test]
async fn test_redirect_is_followed() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/old", Reply::redirect(301, "/api/new"));
    mock.on("/api/new", Reply::json(json!({"ok": true})));
    let mut client = client(&mock);

    let mut headers = HeaderMap::new();
    headers.insert("x-tmrk-request-id", HeaderValue::from_static("r-1"));
    let value = client.get("/api/old", headers).await?;
    assert_eq!(value, json!({"ok": true}));
    assert_eq!(
        mock.paths(),
        vec!["/api/old".to_string(), "/api/new".to_string()]
    );

    let requests = mock.requests();
    // Headers of the first attempt are reused as they were sent.
    assert_eq!(
        header(&requests[0], "x-tmrk-nonce"),
        header(&requests[1], "x-tmrk-nonce")
    );
    assert_eq!(header(&requests[1], "x-tmrk-request-id"), "r-1");
    assert_eq!(
        header(&requests[1], "x-tmrk-authorization"),
        expected_authorization(&requests[1])
    );
    Ok(())
}

#[tokio::test]
async fn test_redirect_to_relative_path() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute/a", Reply::redirect(302, "b"));
    mock.on("/api/compute/b", Reply::redirect(302, "../tags?limit=5"));
    mock.on("/api/tags?limit=5", Reply::json(json!({"ok": true})));
    let mut client = client(&mock);

    let value = client.get("/api/compute/a", no_headers()).await?;
    assert_eq!(value, json!({"ok": true}));
    assert_eq!(
        mock.paths(),
        vec![
            "/api/compute/a".to_string(),
            "/api/compute/b".to_string(),
            "/api/tags?limit=5".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_redirect_keeps_method_and_body() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/vms", Reply::redirect(303, "/api/compute/vms"));
    mock.on("/api/compute/vms", Reply::json(json!({"id": "job-1"})));
    let mut client = client(&mock);

    let data = json!({"name": "web-01"});
    client.post("/api/vms", Some(&data), no_headers()).await?;

    let requests = mock.requests();
    assert_eq!(requests[1].method(), Method::POST);
    assert_eq!(requests[1].body(), requests[0].body());
    Ok(())
}

#[tokio::test]
async fn test_redirect_to_other_host() -> Result<()> {
    let mock = MockTransport::new();
    mock.on(
        "/api/compute",
        Reply::redirect(302, "https://dc2.example.com:8443/api/compute/dc2"),
    );
    mock.on("/api/compute/dc2", Reply::json(json!({})));
    mock.on("/api/vms", Reply::json(json!({})));
    let mut client = client(&mock);

    client.get("/api/compute", no_headers()).await?;
    assert_eq!(client.endpoint(), "https://dc2.example.com:8443");

    // Relative urls now go to the new host.
    client.get("/api/vms", no_headers()).await?;
    assert_eq!(
        mock.opens(),
        vec![
            ENDPOINT.to_string(),
            "https://dc2.example.com:8443".to_string(),
            "https://dc2.example.com:8443".to_string(),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn test_redirect_exhausted() {
    let mock = MockTransport::new();
    mock.on("/api/loop", Reply::redirect(302, "/api/loop"));
    let mut client = client(&mock);

    let err = client.get("/api/loop", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RedirectExhausted);
    assert_eq!(err.to_string(), "gave up after 3 redirects");
    assert_eq!(mock.requests().len(), 3);
}

#[tokio::test]
async fn test_redirect_counter_resets_after_success() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/a", Reply::redirect(302, "/b"));
    mock.on("/b", Reply::redirect(302, "/c"));
    mock.on("/c", Reply::json(json!({"at": "c"})));
    mock.on("/d", Reply::redirect(302, "/c"));
    let mut client = client(&mock);

    assert_eq!(client.get("/a", no_headers()).await?, json!({"at": "c"}));
    assert_eq!(client.get("/d", no_headers()).await?, json!({"at": "c"}));
    assert_eq!(mock.requests().len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_redirect_counter_resets_after_error() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/a", Reply::redirect(302, "/b"));
    mock.on("/b", Reply::redirect(302, "/gone"));
    mock.on("/gone", Reply::status(410, ""));
    mock.on("/d", Reply::redirect(302, "/ok"));
    mock.on("/ok", Reply::json(json!({})));
    let mut client = client(&mock);

    let err = client.get("/a", no_headers()).await.unwrap_err();
    assert_eq!(err.status(), Some(StatusCode::GONE));
    client.get("/d", no_headers()).await?;
    Ok(())
}

#[tokio::test]
async fn test_redirect_counter_survives_exhaustion() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/loop", Reply::redirect(302, "/loop"));
    mock.on("/d", Reply::redirect(302, "/ok"));
    mock.on("/ok", Reply::json(json!({})));
    let mut client = client(&mock);

    let err = client.get("/loop", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RedirectExhausted);

    // The chain did not end with a final response, so the next redirect is refused.
    let err = client.get("/d", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::RedirectExhausted);
    assert_eq!(mock.requests().len(), 4);

    // A final response resets the counter.
    client.get("/ok", no_headers()).await?;
    client.get("/d", no_headers()).await?;
    Ok(())
}

#[tokio::test]
async fn test_redirect_without_location() {
    let mock = MockTransport::new();
    mock.on("/api/", Reply::status(302, ""));
    let mut client = client(&mock);

    let err = client.get("/api/", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentInvalid);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn test_post_headers_and_body() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute/vms", Reply::json(json!({"status": "QUEUED"})));
    let mut client = client(&mock);

    let data = json!({"name": "web-01", "type": "application/vnd.terremark.ecloud.vm.v1+json"});
    client
        .post("/api/compute/vms", Some(&data), no_headers())
        .await?;
    client.post("/api/compute/vms", None, no_headers()).await?;

    let requests = mock.requests();
    assert_eq!(requests[0].method(), Method::POST);
    assert_eq!(header(&requests[0], ACCEPT.as_str()), JOB_MIME_TYPE);
    assert_eq!(
        header(&requests[0], CONTENT_TYPE.as_str()),
        "application/vnd.terremark.ecloud.vm.v1+json"
    );
    let sent: serde_json::Value = serde_json::from_slice(requests[0].body())
        .expect("body must be json");
    assert_eq!(sent, data);
    assert_eq!(
        header(&requests[0], "x-tmrk-authorization"),
        expected_authorization(&requests[0])
    );

    assert_eq!(header(&requests[1], CONTENT_TYPE.as_str()), FORM_MIME_TYPE);
    assert!(requests[1].body().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_patch_headers() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute/vms/1", Reply::json(json!({})));
    let mut client = client(&mock);

    let data = json!({"name": "web-02", "type": "application/vnd.terremark.ecloud.vm.v1+json"});
    client
        .patch("/api/compute/vms/1", Some(&data), no_headers())
        .await?;
    client
        .patch("/api/compute/vms/1", Some(&json!({"name": "web-03"})), no_headers())
        .await?;

    let requests = mock.requests();
    assert_eq!(requests[0].method(), Method::PATCH);
    assert_eq!(
        header(&requests[0], ACCEPT.as_str()),
        "application/vnd.terremark.ecloud.vm.v1+json"
    );
    assert_eq!(
        header(&requests[0], CONTENT_TYPE.as_str()),
        "application/vnd.terremark.ecloud.vm.v1+json"
    );
    assert!(requests[1].headers().get(ACCEPT).is_none());
    assert_eq!(header(&requests[1], CONTENT_TYPE.as_str()), FORM_MIME_TYPE);
    Ok(())
}

#[tokio::test]
async fn test_put_headers() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute/vms/1", Reply::json(json!({})));
    let mut client = client(&mock);

    client
        .put("/api/compute/vms/1", Some(&json!({"name": "web-01"})), no_headers())
        .await?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    client
        .put(
            "/api/compute/vms/1",
            Some(&json!({"type": "application/vnd.terremark.ecloud.vm.v1+json"})),
            headers,
        )
        .await?;

    let requests = mock.requests();
    assert_eq!(requests[0].method(), Method::PUT);
    assert_eq!(header(&requests[0], ACCEPT.as_str()), "*/*");
    assert_eq!(header(&requests[0], CONTENT_TYPE.as_str()), JOB_MIME_TYPE);
    // Caller headers win over the data type.
    assert_eq!(
        header(&requests[1], CONTENT_TYPE.as_str()),
        "application/json"
    );
    Ok(())
}

#[tokio::test]
async fn test_delete_and_options_headers() -> Result<()> {
    let mock = MockTransport::new();
    mock.on("/api/compute/vms/1", Reply::json(json!({})));
    let mut client = client(&mock);

    client.delete("/api/compute/vms/1", no_headers()).await?;
    client.options("/api/compute/vms/1", no_headers()).await?;

    let requests = mock.requests();
    assert_eq!(requests[0].method(), Method::DELETE);
    assert_eq!(header(&requests[0], ACCEPT.as_str()), JOB_MIME_TYPE);
    assert_eq!(requests[1].method(), Method::OPTIONS);
    assert!(requests[1].headers().get(ACCEPT).is_none());
    Ok(())
}

#[tokio::test]
async fn test_missing_credential_sends_nothing() {
    init_logger();
    let mock = MockTransport::new();
    let ctx = Context::new()
        .with_http_transport(mock.clone())
        .with_env(StaticEnv {
            envs: HashMap::new(),
        });
    let config = Config::new().with_endpoint(ENDPOINT);
    let loader = DefaultCredentialProvider::new(Arc::new(config.clone()));
    let mut client = Client::new(config, Signer::new(ctx, loader, RequestSigner::new()))
        .expect("client must be built");

    let err = client.get("/api/", no_headers()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert!(mock.opens().is_empty());
    assert!(mock.requests().is_empty());
}

#[tokio::test]
async fn test_empty_credential_is_rejected() {
    let err = StaticCredentialProvider::new("", "secret_key").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentInvalid);
    assert_eq!(err.to_string(), "no key ID provided");

    let err = StaticCredentialProvider::new("access_key", "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentInvalid);
    assert_eq!(err.to_string(), "no secret key provided");
}

#[test]
fn test_client_requires_endpoint() {
    let mock = MockTransport::new();

    let err = Client::new(Config::new(), signer(&mock)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);

    let err = Client::new(Config::new().with_endpoint("/api/"), signer(&mock)).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ConfigInvalid);
}
