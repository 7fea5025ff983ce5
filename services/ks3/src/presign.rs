use http::Method;
use percent_encoding::utf8_percent_encode;
use percent_encoding::NON_ALPHANUMERIC;

use crate::constants::*;
use crate::{ClientConfig, Credential, RequestSigner};
use ks3_core::time::DateTime;
use ks3_core::utils::percent_encode_path;
use ks3_core::utils::percent_encode_query;
use ks3_core::{Request, Result};

/// Response headers the service overrides when a pre-signed url is fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResponseHeaderOverrides {
    /// `response-cache-control`
    pub cache_control: Option<String>,
    /// `response-content-type`
    pub content_type: Option<String>,
    /// `response-content-language`
    pub content_language: Option<String>,
    /// `response-expires`
    pub expires: Option<String>,
    /// `response-content-disposition`
    pub content_disposition: Option<String>,
    /// `response-content-encoding`
    pub content_encoding: Option<String>,
}

impl ResponseHeaderOverrides {
    /// Set `response-content-type`.
    pub fn with_content_type(mut self, v: impl Into<String>) -> Self {
        self.content_type = Some(v.into());
        self
    }

    /// Set `response-content-disposition`.
    pub fn with_content_disposition(mut self, v: impl Into<String>) -> Self {
        self.content_disposition = Some(v.into());
        self
    }

    /// Set `response-cache-control`.
    pub fn with_cache_control(mut self, v: impl Into<String>) -> Self {
        self.cache_control = Some(v.into());
        self
    }

    fn params(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("response-cache-control", &self.cache_control),
            ("response-content-type", &self.content_type),
            ("response-content-language", &self.content_language),
            ("response-expires", &self.expires),
            ("response-content-disposition", &self.content_disposition),
            ("response-content-encoding", &self.content_encoding),
        ]
        .into_iter()
        .filter_map(|(k, v)| v.as_deref().map(|v| (k, v)))
    }
}

/// Build a pre-signed `GET` url of an object, valid until `expires_at`.
///
/// The url is virtual-host style: `{protocol}://{bucket}.{host}/{key}`, followed by
/// `AccessKeyId`, `Expires`, `Signature` and the response header overrides. The
/// overrides are signed as well.
pub fn presign_url(
    cfg: &ClientConfig,
    cred: &Credential,
    bucket: &str,
    key: &str,
    expires_at: DateTime,
    overrides: &ResponseHeaderOverrides,
) -> Result<String> {
    let endpoint = cfg.endpoint_uri()?;
    // The url addresses the key without leading slashes, so must the signature.
    let key = key.trim_start_matches('/');

    let mut req = Request::new(
        "PresignUrl",
        Method::GET,
        endpoint.clone(),
        Request::resource_path(Some(bucket), Some(key)),
    );
    for (k, v) in overrides.params() {
        req.param_insert(k, Some(v.to_string()));
    }

    let expires = expires_at.timestamp().to_string();
    let signature = RequestSigner::new().get_signature(&req, cred, &expires);

    let scheme = endpoint.scheme_str().unwrap_or(cfg.protocol.as_str());
    // endpoint_uri guarantees the authority.
    let host = endpoint.authority().map(|v| v.as_str()).unwrap_or(KS3_HOSTNAME);
    let mut url = format!(
        "{scheme}://{bucket}.{host}/{}?{PARAM_ACCESS_KEY_ID}={}&{PARAM_EXPIRES}={expires}&{PARAM_SIGNATURE}={}",
        percent_encode_path(key),
        percent_encode_query(&cred.access_key_id),
        utf8_percent_encode(&signature, NON_ALPHANUMERIC),
    );
    for (k, v) in overrides.params() {
        url.push('&');
        url.push_str(k);
        url.push('=');
        url.push_str(&percent_encode_query(v));
    }

    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Protocol;
    use ks3_core::time::from_timestamp;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("k"; "plain key")]
    #[test_case("/k"; "leading slash")]
    #[test_case("//k"; "leading slashes")]
    fn test_presign_url(key: &str) -> Result<()> {
        let url = presign_url(
            &ClientConfig::new(),
            &Credential::new("ak", "secret"),
            "b",
            key,
            from_timestamp(1893456000)?,
            &ResponseHeaderOverrides::default(),
        )?;

        let signature = RequestSigner::new().get_signature(
            &Request::new(
                "GetObject",
                Method::GET,
                ClientConfig::new().endpoint_uri()?,
                "/b/k",
            ),
            &Credential::new("ak", "secret"),
            "1893456000",
        );
        assert_eq!(signature, "CH2GNk+we0ba1hNvDdq5Mefc7kQ=");
        assert_eq!(
            url,
            "http://b.kss.ksyun.com/k?AccessKeyId=ak&Expires=1893456000&Signature=CH2GNk%2Bwe0ba1hNvDdq5Mefc7kQ%3D"
        );
        Ok(())
    }

    #[test]
    fn test_presign_url_with_overrides() -> Result<()> {
        let cfg = ClientConfig::new()
            .with_endpoint("ks3-cn-beijing.ksyuncs.com")
            .with_protocol(Protocol::Https);
        let cred = Credential::new("ak", "secret");
        let overrides = ResponseHeaderOverrides::default()
            .with_content_type("text/plain")
            .with_content_disposition("attachment; filename=a.txt");

        let url = presign_url(
            &cfg,
            &cred,
            "b",
            "dir/a b.txt",
            from_timestamp(1893456000)?,
            &overrides,
        )?;

        let mut req = Request::new(
            "GetObject",
            Method::GET,
            cfg.endpoint_uri()?,
            "/b/dir/a%20b.txt",
        );
        req.param_insert("response-content-type", Some("text/plain".to_string()));
        req.param_insert(
            "response-content-disposition",
            Some("attachment; filename=a.txt".to_string()),
        );
        let signature = RequestSigner::new().get_signature(&req, &cred, "1893456000");
        let without_overrides = RequestSigner::new().get_signature(
            &Request::new("GetObject", Method::GET, cfg.endpoint_uri()?, "/b/dir/a%20b.txt"),
            &cred,
            "1893456000",
        );
        assert_ne!(signature, without_overrides);

        assert!(url.starts_with("https://b.ks3-cn-beijing.ksyuncs.com/dir/a%20b.txt?AccessKeyId=ak&Expires=1893456000&Signature="));
        assert!(url.contains(&format!(
            "Signature={}",
            utf8_percent_encode(&signature, NON_ALPHANUMERIC)
        )));
        assert!(url.ends_with(
            "&response-content-type=text%2Fplain&response-content-disposition=attachment%3B%20filename%3Da.txt"
        ));
        Ok(())
    }
}
