use std::fmt::{Debug, Formatter};
use std::str::FromStr;
use std::time::Duration;

use http::Uri;
use ks3_core::{utils::Redact, Context, Error, Result};

use crate::constants::*;

/// Config carries the credential configuration for ks3.
#[derive(Clone, Default)]
pub struct Config {
    /// `access_key_id` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`KS3_ACCESS_KEY_ID`]
    pub access_key_id: Option<String>,
    /// `secret_access_key` will be loaded from
    ///
    /// - this field if it's `is_some`
    /// - env value: [`KS3_SECRET_ACCESS_KEY`]
    pub secret_access_key: Option<String>,
}

impl Config {
    /// Create a new Config
    pub fn new() -> Self {
        Self::default()
    }

    /// Set access_key_id
    pub fn with_access_key_id(mut self, access_key_id: impl Into<String>) -> Self {
        self.access_key_id = Some(access_key_id.into());
        self
    }

    /// Set secret_access_key
    pub fn with_secret_access_key(mut self, secret_access_key: impl Into<String>) -> Self {
        self.secret_access_key = Some(secret_access_key.into());
        self
    }

    /// Load config from env, fields already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(KS3_ACCESS_KEY_ID) {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(KS3_SECRET_ACCESS_KEY) {
            self.secret_access_key.get_or_insert(v);
        }

        self
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .finish()
    }
}

/// Protocol used to reach the endpoint when it carries no scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Protocol {
    /// Plain http.
    #[default]
    Http,
    /// Http over tls.
    Https,
}

impl Protocol {
    /// Scheme string of this protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Http => "http",
            Protocol::Https => "https",
        }
    }
}

/// ClientConfig carries the settings of the executor.
///
/// It is built once and never changed after being handed to an [`crate::Executor`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Endpoint host, with or without scheme.
    pub endpoint: String,
    /// Protocol used when `endpoint` has no scheme.
    pub protocol: Protocol,
    /// `User-Agent` attached to every request.
    pub user_agent: Option<String>,
    /// Attempts of one call, including the first one.
    pub max_attempts: usize,
    /// Fixed delay between two attempts.
    pub retry_backoff: Duration,
    /// Clock skew in seconds applied to every request, positive if the local clock is fast.
    pub time_offset: i64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: KS3_HOSTNAME.to_string(),
            protocol: Protocol::default(),
            user_agent: None,
            max_attempts: RETRY_TIMES,
            retry_backoff: Duration::from_secs(1),
            time_offset: 0,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    /// Set protocol.
    pub fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    /// Set user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Set max attempts, at least one attempt is always made.
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Set retry backoff.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Set clock skew in seconds.
    pub fn with_time_offset(mut self, time_offset: i64) -> Self {
        self.time_offset = time_offset;
        self
    }

    /// Load endpoint from env [`KS3_ENDPOINT`] if present.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(KS3_ENDPOINT) {
            self.endpoint = v;
        }

        self
    }

    /// Endpoint as uri, the protocol is prefixed if endpoint has no scheme.
    pub fn endpoint_uri(&self) -> Result<Uri> {
        let endpoint = if self.endpoint.contains("://") {
            self.endpoint.clone()
        } else {
            format!("{}://{}", self.protocol.as_str(), self.endpoint)
        };

        let uri = Uri::from_str(&endpoint).map_err(|e| {
            Error::config_invalid(format!("invalid endpoint {endpoint}")).with_source(e)
        })?;
        if uri.authority().is_none() {
            return Err(Error::config_invalid(format!(
                "endpoint {endpoint} has no host"
            )));
        }

        Ok(uri)
    }
}
