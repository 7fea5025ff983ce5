//! Canonical string construction for the KS3 signature.

use std::collections::BTreeMap;
use std::collections::HashSet;

use http::header::CONTENT_TYPE;
use http::header::DATE;
use ks3_core::Request;
use once_cell::sync::Lazy;

use crate::constants::*;

/// Build the string to sign of a request.
///
/// ## Format
///
/// ```text
/// VERB + "\n" +
/// Content-MD5 + "\n" +
/// Content-Type + "\n" +
/// Date + "\n" +
/// CanonicalizedHeaders +
/// CanonicalizedResource;
/// ```
///
/// All lines of the header part are ordered by lower cased name, so
/// `x-kss-*` headers always come after `Date`.
///
/// - `x-kss-date` present: the `Date` line is left empty.
/// - `expires` present: it takes the `Date` line, winning over both headers.
/// - `x-kss-*` query parameters are signed as headers.
pub fn canonical_string(req: &Request, expires: Option<&str>) -> String {
    let mut s = String::with_capacity(128);
    s.push_str(req.method.as_str());
    s.push('\n');

    for (name, value) in canonicalize_header(req, expires) {
        if name.starts_with(KS3_PREFIX) {
            s.push_str(&name);
            s.push(':');
        }
        s.push_str(&value);
        s.push('\n');
    }

    s.push_str(&canonicalize_resource(req));
    s
}

fn canonicalize_header(req: &Request, expires: Option<&str>) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for (name, value) in req.headers.iter() {
        let name = name.as_str();
        if name == CONTENT_TYPE.as_str()
            || name == CONTENT_MD5
            || name == DATE.as_str()
            || name.starts_with(KS3_PREFIX)
        {
            headers.insert(
                name.to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            );
        }
    }

    if headers.contains_key(KS3_ALTERNATE_DATE) {
        headers.insert(DATE.to_string(), String::new());
    }
    if let Some(expires) = expires {
        headers.insert(DATE.to_string(), expires.to_string());
    }

    headers.entry(CONTENT_TYPE.to_string()).or_default();
    headers.entry(CONTENT_MD5.to_string()).or_default();

    for (name, value) in req.params.iter() {
        if name.starts_with(KS3_PREFIX) {
            headers.insert(name.clone(), value.clone().unwrap_or_default());
        }
    }

    headers
}

fn canonicalize_resource(req: &Request) -> String {
    let mut s = Request::normalize_path(&req.path);

    let signed = req
        .params
        .iter()
        .filter(|(k, _)| is_signed_parameter(k));
    for (idx, (k, v)) in signed.enumerate() {
        s.push(if idx == 0 { '?' } else { '&' });
        s.push_str(k);
        if let Some(v) = v {
            s.push('=');
            s.push_str(v);
        }
    }

    s
}

/// Whether the query parameter takes part in the signature.
pub fn is_signed_parameter(param: &str) -> bool {
    SIGNED_PARAMETERS.contains(param)
}

// Please attention: the parameters are case sensitive.
static SIGNED_PARAMETERS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    HashSet::from([
        "acl",
        "adp",
        "cors",
        "delete",
        "lifecycle",
        "location",
        "logging",
        "notification",
        "partNumber",
        "policy",
        "requestPayment",
        "response-cache-control",
        "response-content-disposition",
        "response-content-encoding",
        "response-content-language",
        "response-content-type",
        "response-expires",
        "restore",
        "tagging",
        "torrent",
        "uploadId",
        "uploads",
        "versionId",
        "versioning",
        "versions",
        "website",
    ])
});
