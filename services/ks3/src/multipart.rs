//! Multipart upload sessions.
//!
//! A session is created by [`MultipartUploader::initiate`] and carries the upload
//! id every later call of the same upload must send. Parts may be uploaded in any
//! order, even concurrently, the service joins them in the order given to
//! [`MultipartUploader::complete`].

use std::collections::BTreeMap;

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderValue;
use http::Method;
use log::debug;
use serde::Deserialize;
use serde::Serialize;

use crate::constants::*;
use crate::decode::{MetadataDecoder, ObjectMetadata};
use crate::Executor;
use ks3_core::hash::base64_md5;
use ks3_core::{EmptyDecoder, Error, Request, Result, XmlDecoder};

const PARAM_UPLOADS: &str = "uploads";
const PARAM_UPLOAD_ID: &str = "uploadId";
const PARAM_PART_NUMBER: &str = "partNumber";

/// Part numbers accepted by the service.
pub const MAX_PART_NUMBER: u32 = 10000;

/// An uploaded part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartETag {
    /// Part number, from 1 to [`MAX_PART_NUMBER`].
    pub part_number: u32,
    /// ETag returned by the service for this part.
    pub etag: String,
}

impl PartETag {
    /// Create a new part etag.
    pub fn new(part_number: u32, etag: impl Into<String>) -> Self {
        Self {
            part_number,
            etag: etag.into(),
        }
    }
}

/// State of one multipart upload, owned by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultipartSession {
    /// Bucket of the upload.
    pub bucket: String,
    /// Key of the upload.
    pub key: String,
    /// Upload id allocated by the service.
    pub upload_id: String,
    parts: BTreeMap<u32, String>,
}

impl MultipartSession {
    /// Resume a session from a known upload id.
    pub fn new(
        bucket: impl Into<String>,
        key: impl Into<String>,
        upload_id: impl Into<String>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
            upload_id: upload_id.into(),
            parts: BTreeMap::new(),
        }
    }

    /// Record an uploaded part, a part uploaded again replaces the previous one.
    pub fn record(&mut self, part: PartETag) {
        self.parts.insert(part.part_number, part.etag);
    }

    /// Recorded parts sorted by part number.
    pub fn parts(&self) -> Vec<PartETag> {
        self.parts
            .iter()
            .map(|(n, etag)| PartETag::new(*n, etag.as_str()))
            .collect()
    }
}

/// Result of `InitiateMultipartUpload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct InitiateMultipartUploadResult {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Upload id of the new session.
    pub upload_id: String,
}

/// Result of `ListParts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct ListPartsResult {
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// Upload id.
    pub upload_id: String,
    /// Marker to continue listing from.
    pub next_part_number_marker: Option<u32>,
    /// Max parts of one response.
    pub max_parts: Option<u32>,
    /// Whether more parts are left.
    pub is_truncated: bool,
    /// Parts accepted by the service.
    #[serde(rename = "Part")]
    pub parts: Vec<Part>,
}

/// A part listed by `ListParts`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Part {
    /// Part number.
    pub part_number: u32,
    /// ETag of the part.
    #[serde(rename = "ETag")]
    pub etag: String,
    /// Last modified time as sent by the service.
    pub last_modified: String,
    /// Size in bytes.
    pub size: u64,
}

impl From<&Part> for PartETag {
    /// Listed etags are quoted, uploaded ones are not.
    fn from(part: &Part) -> Self {
        PartETag::new(part.part_number, part.etag.trim_matches('"'))
    }
}

/// Result of `CompleteMultipartUpload`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct CompleteMultipartUploadResult {
    /// Location of the object.
    pub location: String,
    /// Bucket name.
    pub bucket: String,
    /// Object key.
    pub key: String,
    /// ETag of the whole object.
    #[serde(rename = "ETag")]
    pub etag: String,
}

#[derive(Serialize)]
#[serde(rename = "CompleteMultipartUpload")]
struct CompleteMultipartUpload<'a> {
    #[serde(rename = "Part")]
    parts: Vec<CompletedPart<'a>>,
}

#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct CompletedPart<'a> {
    part_number: u32,
    #[serde(rename = "ETag")]
    etag: &'a str,
}

/// Build the `CompleteMultipartUpload` body, parts are kept in the given order.
pub fn complete_body(parts: &[PartETag]) -> Result<String> {
    let body = CompleteMultipartUpload {
        parts: parts
            .iter()
            .map(|p| CompletedPart {
                part_number: p.part_number,
                etag: &p.etag,
            })
            .collect(),
    };

    quick_xml::se::to_string(&body)
        .map_err(|e| Error::unexpected(format!("failed to serialize complete body: {e}")))
}

/// MultipartUploader runs the calls of multipart uploads on an [`Executor`].
#[derive(Debug, Clone)]
pub struct MultipartUploader {
    executor: Executor,
}

impl MultipartUploader {
    /// Create a new uploader.
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }

    /// Start an upload, `metadata` provides the content type and user metadata
    /// of the final object.
    pub async fn initiate(
        &self,
        bucket: &str,
        key: &str,
        metadata: &ObjectMetadata,
    ) -> Result<MultipartSession> {
        let mut req = self
            .executor
            .request("InitiateMultipartUpload", Method::POST, Some(bucket), Some(key))
            .with_body(Bytes::new());
        req.param_insert(PARAM_UPLOADS, None);
        if let Some(content_type) = &metadata.content_type {
            req.headers
                .insert(CONTENT_TYPE, HeaderValue::from_str(content_type)?);
        }
        for (name, value) in &metadata.user_metadata {
            req.header_insert(&format!("{KS3_USER_METADATA_PREFIX}{name}"), value)?;
        }

        let result = self
            .executor
            .execute(req, &XmlDecoder::<InitiateMultipartUploadResult>::new())
            .await?;
        if result.upload_id.is_empty() {
            return Err(Error::decode(format!(
                "initiate multipart upload of {bucket}/{key} returned no upload id"
            )));
        }
        debug!("multipart upload of {bucket}/{key} initiated: {}", result.upload_id);

        Ok(MultipartSession::new(bucket, key, result.upload_id))
    }

    /// Upload one part. The checksum is computed if `content_md5` is absent.
    ///
    /// The returned part is not recorded, use [`MultipartSession::record`].
    pub async fn upload_part(
        &self,
        session: &MultipartSession,
        part_number: u32,
        data: Bytes,
        content_md5: Option<&str>,
    ) -> Result<PartETag> {
        if !(1..=MAX_PART_NUMBER).contains(&part_number) {
            return Err(Error::request_invalid(format!(
                "part number {part_number} is out of 1..={MAX_PART_NUMBER}"
            )));
        }

        let md5 = match content_md5 {
            Some(v) => v.to_string(),
            None => base64_md5(&data),
        };
        let mut req = self
            .session_request("UploadPart", Method::PUT, session)
            .with_body(data);
        req.param_insert(PARAM_PART_NUMBER, Some(part_number.to_string()));
        req.header_insert(CONTENT_MD5, &md5)?;

        let meta = self.executor.execute(req, &MetadataDecoder).await?;
        let etag = meta.etag.ok_or_else(|| {
            Error::decode(format!(
                "upload part {part_number} of {} returned no etag",
                session.upload_id
            ))
        })?;

        Ok(PartETag::new(part_number, etag))
    }

    /// List the parts the service accepted for this upload.
    pub async fn list_parts(&self, session: &MultipartSession) -> Result<ListPartsResult> {
        let req = self.session_request("ListParts", Method::GET, session);

        self.executor
            .execute(req, &XmlDecoder::<ListPartsResult>::new())
            .await
    }

    /// Complete the upload with `parts`, which must be sorted by part number.
    pub async fn complete(
        &self,
        session: &MultipartSession,
        parts: &[PartETag],
    ) -> Result<CompleteMultipartUploadResult> {
        if parts.is_empty() {
            return Err(Error::request_invalid(format!(
                "complete multipart upload {} without any part",
                session.upload_id
            )));
        }

        let body = complete_body(parts)?;
        let req = self
            .session_request("CompleteMultipartUpload", Method::POST, session)
            .with_body(body);

        self.executor
            .execute(req, &XmlDecoder::<CompleteMultipartUploadResult>::new())
            .await
    }

    /// Abort the upload and release the parts kept by the service.
    pub async fn abort(&self, session: &MultipartSession) -> Result<()> {
        let req = self.session_request("AbortMultipartUpload", Method::DELETE, session);

        self.executor.execute(req, &EmptyDecoder).await
    }

    fn session_request(
        &self,
        operation: &'static str,
        method: Method,
        session: &MultipartSession,
    ) -> Request {
        let mut req = self.executor.request(
            operation,
            method,
            Some(&session.bucket),
            Some(&session.key),
        );
        req.param_insert(PARAM_UPLOAD_ID, Some(session.upload_id.clone()));
        req
    }
}
