use anyhow::Result;
use http::{Method, StatusCode};
use ks3_client::{ClientConfig, Executor, InitiateMultipartUploadResult, MetadataDecoder};
use ks3_core::{BytesDecoder, Context, ErrorKind, XmlDecoder};
use pretty_assertions::assert_eq;

use super::mock::MockHttpSend;
use super::{client_config, executor_without_credential, init_logger, signed_executor};

const ACCESS_DENIED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error>
  <Code>AccessDenied</Code>
  <Message>Access Denied</Message>
  <Resource>/b/k</Resource>
  <RequestId>4f9d3c2a</RequestId>
</Error>"#;

#[tokio::test]
async fn test_retry_transport_failure_then_succeed() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_timeout();
    mock.push_timeout();
    mock.push_response(StatusCode::OK, &[("ETag", "\"abc\"")], "hello");

    let executor = signed_executor(&mock, client_config());
    let req = executor.request("GetObject", Method::GET, Some("b"), Some("k"));
    let body = executor.execute(req, &BytesDecoder).await?;

    assert_eq!(body.as_ref(), b"hello");
    assert_eq!(mock.attempts(), 3);
    for req in mock.requests() {
        assert_eq!(req.method, Method::GET);
        assert_eq!(req.uri, "http://ks3-cn-beijing.ksyuncs.com/b/k");
        assert!(req
            .header("authorization")
            .is_some_and(|v| v.starts_with("KSS ak:")));
        assert!(req.header("date").is_some());
    }
    Ok(())
}

#[tokio::test]
async fn test_service_error_is_not_retried() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_response(StatusCode::FORBIDDEN, &[], ACCESS_DENIED);
    mock.push_response(StatusCode::OK, &[], "must not be reached");

    let executor = signed_executor(&mock, client_config());
    let req = executor.request("GetObject", Method::GET, Some("b"), Some("k"));
    let err = executor.execute(req, &BytesDecoder).await.unwrap_err();

    assert_eq!(mock.attempts(), 1);
    assert_eq!(err.kind(), ErrorKind::Service);
    assert!(!err.is_retryable());

    let service = err.service_error().expect("service error must be set");
    assert_eq!(service.status_code, 403);
    assert_eq!(service.error_code, "AccessDenied");
    assert_eq!(service.message, "Access Denied");
    assert_eq!(service.request_id, "4f9d3c2a");
    Ok(())
}

#[tokio::test]
async fn test_server_error_is_not_retried() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &[("x-kss-request-id", "req-500")],
        "",
    );

    let executor = signed_executor(&mock, client_config());
    let req = executor.request("HeadObject", Method::HEAD, Some("b"), Some("k"));
    let err = executor.execute(req, &MetadataDecoder).await.unwrap_err();

    assert_eq!(mock.attempts(), 1);
    let service = err.service_error().expect("service error must be set");
    assert_eq!(service.status_code, 500);
    assert_eq!(service.error_code, "InternalServerError");
    assert_eq!(service.request_id, "req-500");
    Ok(())
}

#[tokio::test]
async fn test_retry_bound() -> Result<()> {
    let mock = MockHttpSend::new();

    let executor = signed_executor(&mock, client_config());
    let req = executor.request("GetObject", Method::GET, Some("b"), Some("k"));
    let err = executor.execute(req, &BytesDecoder).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(mock.attempts(), 3);

    let mock = MockHttpSend::new();
    let executor = signed_executor(&mock, client_config().with_max_attempts(5));
    let req = executor.request("GetObject", Method::GET, Some("b"), Some("k"));
    let err = executor.execute(req, &BytesDecoder).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(mock.attempts(), 5);
    Ok(())
}

#[tokio::test]
async fn test_decode_failure_is_not_retried() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_response(StatusCode::OK, &[], "<html>gateway</html>");

    let executor = signed_executor(&mock, client_config());
    let mut req = executor.request(
        "InitiateMultipartUpload",
        Method::POST,
        Some("b"),
        Some("k"),
    );
    req.param_insert("uploads", None);
    let err = executor
        .execute(req, &XmlDecoder::<InitiateMultipartUploadResult>::new())
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Decode);
    assert!(err.service_error().is_none());
    assert_eq!(mock.attempts(), 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_credential_is_fatal() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_response(StatusCode::OK, &[], "");

    let executor = executor_without_credential(&mock);
    let req = executor.request("GetObject", Method::GET, Some("b"), Some("k"));
    let err = executor.execute(req, &BytesDecoder).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::CredentialInvalid);
    assert_eq!(mock.attempts(), 0);
    Ok(())
}

#[tokio::test]
async fn test_unsigned_request() -> Result<()> {
    init_logger();

    let mock = MockHttpSend::new();
    mock.push_response(StatusCode::OK, &[], "");

    let ctx = Context::new().with_http_send(mock.clone());
    let executor = Executor::new(
        ctx,
        ClientConfig::new()
            .with_endpoint("https://ks3-cn-beijing.ksyuncs.com")
            .with_user_agent("ks3-client-test"),
    )?;
    let mut req = executor.request("GetObjectAcl", Method::GET, Some("b"), Some("dir//k"));
    req.param_insert("acl", None);
    executor.execute(req, &BytesDecoder).await?;

    let sent = &mock.requests()[0];
    assert_eq!(sent.uri, "https://ks3-cn-beijing.ksyuncs.com/b/dir/%2Fk?acl");
    assert_eq!(sent.header("authorization"), None);
    assert_eq!(sent.header("user-agent"), Some("ks3-client-test"));
    assert_eq!(sent.header("content-type"), Some("application/octet-stream"));
    Ok(())
}

#[tokio::test]
async fn test_body_is_resent_on_retry() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_timeout();
    mock.push_response(StatusCode::OK, &[("ETag", "\"e\"")], "");

    let executor = signed_executor(&mock, client_config());
    let req = executor
        .request("PutObject", Method::PUT, Some("b"), Some("k"))
        .with_body("payload");
    let meta = executor.execute(req, &MetadataDecoder).await?;

    assert_eq!(meta.etag.as_deref(), Some("e"));
    let requests = mock.requests();
    assert_eq!(requests.len(), 2);
    for req in requests {
        assert_eq!(req.body.as_ref(), b"payload");
        assert_eq!(req.header("content-length"), Some("7"));
    }
    Ok(())
}
