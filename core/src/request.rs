use std::collections::BTreeMap;
use std::str::FromStr;

use bytes::Bytes;
use http::header::HeaderName;
use http::header::CONTENT_LENGTH;
use http::HeaderMap;
use http::HeaderValue;
use http::Method;
use http::Uri;

use crate::utils::percent_encode_path;
use crate::utils::percent_encode_query;
use crate::{Error, Result};

/// Request is the protocol agnostic envelope of one logical call.
///
/// It is built by the caller, signed in place and consumed by the executor.
/// A request is not meant to be shared: every logical call builds its own.
#[derive(Debug, Clone)]
pub struct Request {
    /// Name of the high level operation this request was built for, e.g. `UploadPart`.
    pub operation: &'static str,
    /// HTTP method.
    pub method: Method,
    /// Service endpoint, scheme and authority.
    pub endpoint: Uri,
    /// Percent encoded resource path, `/{bucket}/{key}`.
    pub path: String,
    /// HTTP headers, names are case insensitive.
    pub headers: HeaderMap,
    /// Query parameters. A `None` value is sent as a bare name like `?uploads`.
    pub params: BTreeMap<String, Option<String>>,
    /// Request payload. Kept as a shared buffer so that every attempt sends the same bytes.
    pub body: Option<Bytes>,
    /// Clock skew in seconds, positive if the local clock is ahead of the service.
    pub time_offset: i64,
}

impl Request {
    /// Create a new request without headers, parameters or body.
    pub fn new(operation: &'static str, method: Method, endpoint: Uri, path: impl Into<String>) -> Self {
        Self {
            operation,
            method,
            endpoint,
            path: path.into(),
            headers: HeaderMap::new(),
            params: BTreeMap::new(),
            body: None,
            time_offset: 0,
        }
    }

    /// Build the percent encoded resource path for bucket and key.
    ///
    /// ```
    /// use ks3_core::Request;
    ///
    /// assert_eq!(Request::resource_path(None, None), "/");
    /// assert_eq!(Request::resource_path(Some("b"), None), "/b/");
    /// assert_eq!(Request::resource_path(Some("b"), Some("dir/a b")), "/b/dir/a%20b");
    /// ```
    pub fn resource_path(bucket: Option<&str>, key: Option<&str>) -> String {
        let mut s = String::from("/");
        if let Some(bucket) = bucket {
            s.push_str(bucket);
            s.push('/');
        }
        if let Some(key) = key {
            s.push_str(key);
        }

        percent_encode_path(&s)
    }

    /// Normalize a resource path.
    ///
    /// - `%5C` is turned into `/`
    /// - `//` is turned into `/%2F`
    /// - exactly one trailing `%2F` is removed
    ///
    /// Applying it again on its own output changes nothing for paths produced by
    /// [`Request::resource_path`].
    pub fn normalize_path(path: &str) -> String {
        let path = path.replace("%5C", "/").replace("//", "/%2F");
        match path.strip_suffix("%2F") {
            Some(p) => p.to_string(),
            None => path,
        }
    }

    /// Normalize the resource path of this request in place.
    pub fn normalize_resource_path(&mut self) {
        self.path = Self::normalize_path(&self.path);
    }

    /// Set a header, replacing any previous value.
    pub fn header_insert(&mut self, name: &str, value: &str) -> Result<()> {
        self.headers
            .insert(HeaderName::from_str(name)?, HeaderValue::from_str(value)?);
        Ok(())
    }

    /// Get header value by name, case insensitive.
    pub fn header_get(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Set a query parameter, replacing any previous value.
    pub fn param_insert(&mut self, name: impl Into<String>, value: Option<String>) {
        self.params.insert(name.into(), value);
    }

    /// Attach the payload, and its `Content-Length`.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
        self.body = Some(body);
        self
    }

    /// Set the clock skew in seconds.
    pub fn with_time_offset(mut self, time_offset: i64) -> Self {
        self.time_offset = time_offset;
        self
    }

    /// Build the wire uri: endpoint, resource path and encoded query.
    pub fn uri(&self) -> Result<Uri> {
        let scheme = self.endpoint.scheme_str().unwrap_or("http");
        let authority = self
            .endpoint
            .authority()
            .ok_or_else(|| Error::request_invalid("request endpoint without authority is invalid"))?;

        let base = self.endpoint.path().trim_end_matches('/');
        let mut s = format!("{scheme}://{authority}{base}");
        if self.path.starts_with('/') {
            s.push_str(&self.path);
        } else {
            s.push('/');
            s.push_str(&self.path);
        }

        for (idx, (k, v)) in self.params.iter().enumerate() {
            s.push(if idx == 0 { '?' } else { '&' });
            s.push_str(&percent_encode_query(k));
            if let Some(v) = v {
                s.push('=');
                s.push_str(&percent_encode_query(v));
            }
        }

        Ok(Uri::from_str(&s)?)
    }

    /// Convert into the http request handed to [`crate::HttpSend`].
    pub fn to_http(&self) -> Result<http::Request<Bytes>> {
        let mut req = http::Request::builder()
            .method(self.method.clone())
            .uri(self.uri()?)
            .body(self.body.clone().unwrap_or_default())?;
        *req.headers_mut() = self.headers.clone();

        Ok(req)
    }
}
