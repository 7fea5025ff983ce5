//! KS3 specific response decoders.

use std::collections::BTreeMap;

use bytes::Bytes;
use http::header::CONTENT_LENGTH;
use http::header::CONTENT_TYPE;
use http::header::ETAG;
use http::header::LAST_MODIFIED;
use http::HeaderMap;
use serde::Deserialize;

use crate::constants::*;
use ks3_core::time::parse_rfc2822;
use ks3_core::time::DateTime;
use ks3_core::{Decode, Error, Result, ServiceError};

/// Metadata of an object, read from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObjectMetadata {
    /// ETag without surrounding quotes.
    pub etag: Option<String>,
    /// Content length in bytes.
    pub content_length: Option<u64>,
    /// Content type.
    pub content_type: Option<String>,
    /// Last modified time.
    pub last_modified: Option<DateTime>,
    /// User metadata, the `x-kss-meta-` prefix is stripped from names.
    pub user_metadata: BTreeMap<String, String>,
}

impl ObjectMetadata {
    /// Set content type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Add a user metadata entry.
    pub fn with_user_metadata(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.user_metadata.insert(name.into(), value.into());
        self
    }

    /// Parse metadata from response headers.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self> {
        let mut meta = ObjectMetadata::default();

        for (name, value) in headers {
            let value = value
                .to_str()
                .map_err(|e| Error::decode(format!("header {name} is not valid utf-8")).with_source(e))?;

            match name {
                n if *n == ETAG => meta.etag = Some(value.trim_matches('"').to_string()),
                n if *n == CONTENT_LENGTH => {
                    meta.content_length = Some(value.parse().map_err(|e| {
                        Error::decode(format!("invalid content length {value}")).with_source(e)
                    })?)
                }
                n if *n == CONTENT_TYPE => meta.content_type = Some(value.to_string()),
                n if *n == LAST_MODIFIED => meta.last_modified = Some(parse_rfc2822(value)?),
                n => {
                    if let Some(key) = n.as_str().strip_prefix(KS3_USER_METADATA_PREFIX) {
                        meta.user_metadata.insert(key.to_string(), value.to_string());
                    }
                }
            }
        }

        Ok(meta)
    }
}

/// Object content with its metadata.
#[derive(Debug, Clone)]
pub struct Object {
    /// Metadata from response headers.
    pub metadata: ObjectMetadata,
    /// Object content.
    pub body: Bytes,
}

/// MetadataDecoder reads the response headers only, used by `HEAD` and `PUT` calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataDecoder;

impl Decode for MetadataDecoder {
    type Output = ObjectMetadata;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<Self::Output> {
        ObjectMetadata::from_headers(resp.headers())
    }
}

/// ObjectDecoder returns the object content with its metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectDecoder;

impl Decode for ObjectDecoder {
    type Output = Object;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<Self::Output> {
        let metadata = ObjectMetadata::from_headers(resp.headers())?;
        Ok(Object {
            metadata,
            body: resp.into_body(),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
struct ErrorResponse {
    code: String,
    message: String,
    request_id: String,
    resource: String,
}

/// ErrorDecoder turns a non-2xx response into a [`ServiceError`].
///
/// It never fails: a body that is empty or not an `<Error>` document falls back
/// to the status code, the raw body and the `x-kss-request-id` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorDecoder;

impl Decode for ErrorDecoder {
    type Output = ServiceError;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<Self::Output> {
        let status = resp.status();
        let (parts, body) = resp.into_parts();
        let raw = String::from_utf8_lossy(&body);

        let parsed = if raw.trim().is_empty() {
            ErrorResponse::default()
        } else {
            quick_xml::de::from_str::<ErrorResponse>(&raw).unwrap_or_default()
        };

        let error_code = if parsed.code.is_empty() {
            status
                .canonical_reason()
                .map(|v| v.replace(' ', ""))
                .unwrap_or_else(|| status.as_u16().to_string())
        } else {
            parsed.code
        };
        let message = match (parsed.message.is_empty(), raw.trim().is_empty()) {
            (false, _) => parsed.message,
            (true, false) => raw.trim().to_string(),
            (true, true) => status.canonical_reason().unwrap_or_default().to_string(),
        };
        let request_id = if parsed.request_id.is_empty() {
            parts
                .headers
                .get(KS3_REQUEST_ID)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_string()
        } else {
            parsed.request_id
        };

        Ok(ServiceError {
            status_code: status.as_u16(),
            error_code,
            message,
            request_id,
            resource: parsed.resource,
        })
    }
}
