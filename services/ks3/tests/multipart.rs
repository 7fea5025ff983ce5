use anyhow::Result;
use bytes::Bytes;
use http::{Method, StatusCode};
use ks3_client::{MultipartSession, MultipartUploader, ObjectMetadata, PartETag};
use ks3_core::hash::base64_md5;
use ks3_core::ErrorKind;
use pretty_assertions::assert_eq;

use super::mock::MockHttpSend;
use super::{client_config, signed_executor};

const INITIATE_RESULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<InitiateMultipartUploadResult>
  <Bucket>b</Bucket>
  <Key>k</Key>
  <UploadId>U1</UploadId>
</InitiateMultipartUploadResult>"#;

const COMPLETE_RESULT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CompleteMultipartUploadResult>
  <Location>http://b.ks3-cn-beijing.ksyuncs.com/k</Location>
  <Bucket>b</Bucket>
  <Key>k</Key>
  <ETag>"3858f62230ac3c915f300c664312c11f-2"</ETag>
</CompleteMultipartUploadResult>"#;

const LIST_PARTS_RESULT: &str = r#"<ListPartsResult>
  <Bucket>b</Bucket>
  <Key>k</Key>
  <UploadId>U1</UploadId>
  <IsTruncated>false</IsTruncated>
  <Part>
    <PartNumber>1</PartNumber>
    <LastModified>2019-01-01T00:00:00.000Z</LastModified>
    <ETag>"e1"</ETag>
    <Size>4</Size>
  </Part>
</ListPartsResult>"#;

fn uploader(mock: &MockHttpSend) -> MultipartUploader {
    MultipartUploader::new(signed_executor(mock, client_config()))
}

#[tokio::test]
async fn test_multipart_upload_out_of_order() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_response(StatusCode::OK, &[], INITIATE_RESULT);
    mock.push_response(StatusCode::OK, &[("ETag", "\"e2\"")], "");
    mock.push_response(StatusCode::OK, &[("ETag", "\"e1\"")], "");
    mock.push_response(StatusCode::OK, &[], COMPLETE_RESULT);

    let uploader = uploader(&mock);
    let mut session = uploader
        .initiate(
            "b",
            "k",
            &ObjectMetadata::default()
                .with_content_type("text/plain")
                .with_user_metadata("owner", "alice"),
        )
        .await?;
    assert_eq!(session.upload_id, "U1");

    let part = uploader
        .upload_part(&session, 2, Bytes::from_static(b"part two"), None)
        .await?;
    session.record(part);
    let part = uploader
        .upload_part(&session, 1, Bytes::from_static(b"part one"), None)
        .await?;
    session.record(part);

    let parts = session.parts();
    assert_eq!(parts, vec![PartETag::new(1, "e1"), PartETag::new(2, "e2")]);
    let result = uploader.complete(&session, &parts).await?;
    assert_eq!(result.etag, "\"3858f62230ac3c915f300c664312c11f-2\"");

    let requests = mock.requests();
    assert_eq!(requests.len(), 4);

    let initiate = &requests[0];
    assert_eq!(initiate.method, Method::POST);
    assert_eq!(initiate.uri, "http://ks3-cn-beijing.ksyuncs.com/b/k?uploads");
    assert_eq!(initiate.header("content-length"), Some("0"));
    assert_eq!(initiate.header("content-type"), Some("text/plain"));
    assert_eq!(initiate.header("x-kss-meta-owner"), Some("alice"));

    let part_two = &requests[1];
    assert_eq!(part_two.method, Method::PUT);
    assert_eq!(
        part_two.uri,
        "http://ks3-cn-beijing.ksyuncs.com/b/k?partNumber=2&uploadId=U1"
    );
    assert_eq!(part_two.header("content-md5"), Some(base64_md5(b"part two").as_str()));
    assert_eq!(part_two.body.as_ref(), b"part two");

    let complete = &requests[3];
    assert_eq!(complete.method, Method::POST);
    let body = String::from_utf8(complete.body.to_vec())?;
    let first = body.find("<PartNumber>1</PartNumber>").expect("part 1 must be listed");
    let second = body.find("<PartNumber>2</PartNumber>").expect("part 2 must be listed");
    assert!(first < second, "part 1 must come before part 2: {body}");

    for req in &requests[1..] {
        assert!(req.uri.contains("uploadId=U1"), "{} has no upload id", req.uri);
    }
    Ok(())
}

#[tokio::test]
async fn test_upload_part_keeps_given_md5() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_response(StatusCode::OK, &[("ETag", "\"e1\"")], "");

    let uploader = uploader(&mock);
    let session = MultipartSession::new("b", "k", "U1");
    uploader
        .upload_part(
            &session,
            1,
            Bytes::from_static(b"data"),
            Some("jXd/OF09/siBXSD3SWAm3A=="),
        )
        .await?;

    assert_eq!(
        mock.requests()[0].header("content-md5"),
        Some("jXd/OF09/siBXSD3SWAm3A==")
    );
    Ok(())
}

#[tokio::test]
async fn test_upload_part_rejects_invalid_part_number() -> Result<()> {
    let mock = MockHttpSend::new();

    let uploader = uploader(&mock);
    let session = MultipartSession::new("b", "k", "U1");
    for part_number in [0, 10001] {
        let err = uploader
            .upload_part(&session, part_number, Bytes::from_static(b"data"), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    assert_eq!(mock.attempts(), 0);
    Ok(())
}

#[tokio::test]
async fn test_failed_part_leaves_session_usable() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_timeout();
    mock.push_timeout();
    mock.push_timeout();
    mock.push_response(StatusCode::OK, &[("ETag", "\"e1\"")], "");
    mock.push_response(StatusCode::NO_CONTENT, &[], "");

    let uploader = uploader(&mock);
    let session = MultipartSession::new("b", "k", "U1");

    let err = uploader
        .upload_part(&session, 1, Bytes::from_static(b"data"), None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert_eq!(mock.attempts(), 3);

    // Same part number again.
    let part = uploader
        .upload_part(&session, 1, Bytes::from_static(b"data"), None)
        .await?;
    assert_eq!(part, PartETag::new(1, "e1"));

    uploader.abort(&session).await?;
    let requests = mock.requests();
    let abort = requests.last().expect("abort must be sent");
    assert_eq!(abort.method, Method::DELETE);
    assert_eq!(abort.uri, "http://ks3-cn-beijing.ksyuncs.com/b/k?uploadId=U1");
    Ok(())
}

#[tokio::test]
async fn test_list_parts() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_response(StatusCode::OK, &[], LIST_PARTS_RESULT);

    let uploader = uploader(&mock);
    let session = MultipartSession::new("b", "k", "U1");
    let result = uploader.list_parts(&session).await?;

    assert_eq!(result.upload_id, "U1");
    assert_eq!(result.parts.len(), 1);
    assert_eq!(result.parts[0].part_number, 1);
    assert_eq!(mock.requests()[0].method, Method::GET);
    assert_eq!(
        mock.requests()[0].uri,
        "http://ks3-cn-beijing.ksyuncs.com/b/k?uploadId=U1"
    );
    Ok(())
}

#[tokio::test]
async fn test_resume_from_listed_parts() -> Result<()> {
    let mock = MockHttpSend::new();
    mock.push_response(StatusCode::OK, &[], LIST_PARTS_RESULT);
    mock.push_response(StatusCode::OK, &[("ETag", "\"e2\"")], "");
    mock.push_response(StatusCode::OK, &[], COMPLETE_RESULT);

    let uploader = uploader(&mock);
    let mut session = MultipartSession::new("b", "k", "U1");
    for part in &uploader.list_parts(&session).await?.parts {
        session.record(part.into());
    }
    let part = uploader
        .upload_part(&session, 2, Bytes::from_static(b"part two"), None)
        .await?;
    session.record(part);

    let parts = session.parts();
    assert_eq!(parts, vec![PartETag::new(1, "e1"), PartETag::new(2, "e2")]);
    uploader.complete(&session, &parts).await?;

    let body = String::from_utf8(mock.requests()[2].body.to_vec())?;
    assert!(body.contains("<ETag>e1</ETag>"), "{body}");
    assert!(body.contains("<ETag>e2</ETag>"), "{body}");
    Ok(())
}

#[tokio::test]
async fn test_complete_without_parts() -> Result<()> {
    let mock = MockHttpSend::new();

    let uploader = uploader(&mock);
    let session = MultipartSession::new("b", "k", "U1");
    let err = uploader.complete(&session, &[]).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    assert_eq!(mock.attempts(), 0);
    Ok(())
}
