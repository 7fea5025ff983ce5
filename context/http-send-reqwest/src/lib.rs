//! Reqwest based [`HttpSend`] for ks3.
//!
//! The client is built once from a [`TransportConfig`] and is read-only after that.

use std::fmt::{Debug, Formatter};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::BodyExt;
use ks3_core::utils::Redact;
use ks3_core::{Error, HttpSend, Result};
use reqwest::{Client, Proxy, Request};

/// TransportConfig carries the process wide transport settings.
#[derive(Clone, Default)]
pub struct TransportConfig {
    /// Max idle connections kept per host.
    pub max_connections: Option<usize>,
    /// Proxy host, proxy is only used if both host and port are set.
    pub proxy_host: Option<String>,
    /// Proxy port.
    pub proxy_port: Option<u16>,
    /// Proxy basic auth user, used together with `proxy_password`.
    pub proxy_username: Option<String>,
    /// Proxy basic auth password.
    pub proxy_password: Option<String>,
    /// Timeout for establishing a connection.
    pub connect_timeout: Option<Duration>,
    /// Timeout for the whole exchange, from send to end of body.
    pub timeout: Option<Duration>,
    /// Accept any server certificate.
    pub accept_invalid_certs: bool,
}

impl TransportConfig {
    /// Create a new TransportConfig
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max idle connections per host.
    pub fn with_max_connections(mut self, n: usize) -> Self {
        self.max_connections = Some(n);
        self
    }

    /// Set proxy host and port.
    pub fn with_proxy(mut self, host: impl Into<String>, port: u16) -> Self {
        self.proxy_host = Some(host.into());
        self.proxy_port = Some(port);
        self
    }

    /// Set proxy basic auth.
    pub fn with_proxy_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.proxy_username = Some(username.into());
        self.proxy_password = Some(password.into());
        self
    }

    /// Set connect timeout.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Set exchange timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Accept invalid certificates.
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    fn proxy(&self) -> Result<Option<Proxy>> {
        let (Some(host), Some(port)) = (&self.proxy_host, self.proxy_port) else {
            return Ok(None);
        };
        if port == 0 {
            return Ok(None);
        }

        let url = if host.contains("://") {
            format!("{host}:{port}")
        } else {
            format!("http://{host}:{port}")
        };
        let mut proxy = Proxy::all(&url).map_err(|e| {
            Error::config_invalid(format!("invalid proxy {url}")).with_source(e)
        })?;
        if let (Some(user), Some(password)) = (&self.proxy_username, &self.proxy_password) {
            proxy = proxy.basic_auth(user, password);
        }

        Ok(Some(proxy))
    }
}

impl Debug for TransportConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransportConfig")
            .field("max_connections", &self.max_connections)
            .field("proxy_host", &self.proxy_host)
            .field("proxy_port", &self.proxy_port)
            .field("proxy_username", &self.proxy_username)
            .field("proxy_password", &Redact::from(&self.proxy_password))
            .field("connect_timeout", &self.connect_timeout)
            .field("timeout", &self.timeout)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .finish()
    }
}

/// ReqwestHttpSend sends requests with a shared reqwest client.
#[derive(Debug, Default, Clone)]
pub struct ReqwestHttpSend {
    client: Client,
}

impl ReqwestHttpSend {
    /// Create a new ReqwestHttpSend with a reqwest::Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build the reqwest client from transport config.
    pub fn from_config(cfg: &TransportConfig) -> Result<Self> {
        let mut builder = Client::builder().danger_accept_invalid_certs(cfg.accept_invalid_certs);

        if let Some(n) = cfg.max_connections {
            builder = builder.pool_max_idle_per_host(n);
        }
        if let Some(timeout) = cfg.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(timeout) = cfg.timeout {
            builder = builder.timeout(timeout);
        }
        builder = match cfg.proxy()? {
            Some(proxy) => builder.proxy(proxy),
            None => builder.no_proxy(),
        };

        let client = builder
            .build()
            .map_err(|e| Error::config_invalid("failed to build http client").with_source(e))?;
        log::debug!("http client built from {cfg:?}");

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpSend for ReqwestHttpSend {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let req = Request::try_from(req)
            .map_err(|e| Error::request_invalid("failed to convert request").with_source(e))?;
        let resp: http::Response<_> = self
            .client
            .execute(req)
            .await
            .map_err(|e| Error::transport(format!("failed to send request: {e}")).with_source(e))?
            .into();

        let (parts, body) = resp.into_parts();
        let bs = BodyExt::collect(body)
            .await
            .map(|buf| buf.to_bytes())
            .map_err(|e| Error::transport(format!("failed to read response body: {e}")).with_source(e))?;
        Ok(http::Response::from_parts(parts, bs))
    }
}
