use std::sync::Arc;

use http::header::CONTENT_LENGTH;
use http::header::CONTENT_TYPE;
use http::header::USER_AGENT;
use http::HeaderValue;
use http::Method;
use http::Uri;
use log::{debug, warn};

use crate::constants::*;
use crate::decode::ErrorDecoder;
use crate::presign::{presign_url, ResponseHeaderOverrides};
use crate::{ClientConfig, Credential};
use ks3_core::time::DateTime;
use ks3_core::{Context, Decode, Error, Request, Result, Signer};

/// Executor sends requests to ks3 and decodes their responses.
///
/// Every call is signed again before each attempt. Only transport failures are
/// retried, with a fixed delay in between. A response with a non-2xx status is
/// turned into a [`ks3_core::ServiceError`] and returned right away.
#[derive(Clone, Debug)]
pub struct Executor {
    ctx: Context,
    config: Arc<ClientConfig>,
    endpoint: Uri,
    signer: Option<Signer<Credential>>,
}

impl Executor {
    /// Create a new executor, requests are sent unsigned until a signer is set.
    pub fn new(ctx: Context, config: ClientConfig) -> Result<Self> {
        let endpoint = config.endpoint_uri()?;

        Ok(Self {
            ctx,
            config: Arc::new(config),
            endpoint,
            signer: None,
        })
    }

    /// Set the signer.
    pub fn with_signer(mut self, signer: Signer<Credential>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Config of this executor.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Build a request on the configured endpoint for bucket and key.
    pub fn request(
        &self,
        operation: &'static str,
        method: Method,
        bucket: Option<&str>,
        key: Option<&str>,
    ) -> Request {
        Request::new(
            operation,
            method,
            self.endpoint.clone(),
            Request::resource_path(bucket, key),
        )
        .with_time_offset(self.config.time_offset)
    }

    /// Send the request and decode a successful response with `decoder`.
    pub async fn execute<D: Decode>(&self, mut req: Request, decoder: &D) -> Result<D::Output> {
        self.prepare(&mut req)?;

        let max_attempts = self.config.max_attempts.max(1);
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(
                "{} attempt {attempt}/{max_attempts}: {} {}",
                req.operation, req.method, req.path
            );

            match self.send_once(&mut req, decoder).await {
                Ok(output) => return Ok(output),
                Err(err) if err.is_retryable() && attempt < max_attempts => {
                    warn!(
                        "{} attempt {attempt}/{max_attempts} failed, retry in {:?}: {err}",
                        req.operation, self.config.retry_backoff
                    );
                    tokio::time::sleep(self.config.retry_backoff).await;
                }
                Err(err) => {
                    if err.is_retryable() {
                        warn!("{} failed after {attempt} attempts: {err}", req.operation);
                    } else {
                        debug!("{} failed: {err}", req.operation);
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Build a pre-signed `GET` url with the credential of the signer.
    pub async fn presign_url(
        &self,
        bucket: &str,
        key: &str,
        expires_at: DateTime,
        overrides: &ResponseHeaderOverrides,
    ) -> Result<String> {
        let signer = self
            .signer
            .as_ref()
            .ok_or_else(|| Error::credential_invalid("presign url requires a signer"))?;
        let cred = signer
            .credential()
            .await?
            .ok_or_else(|| Error::credential_invalid("missing credential to presign url"))?;

        presign_url(&self.config, &cred, bucket, key, expires_at, overrides)
    }

    /// Headers that are part of the signature must exist before the first sign.
    fn prepare(&self, req: &mut Request) -> Result<()> {
        if let Some(ua) = &self.config.user_agent {
            req.headers.insert(USER_AGENT, HeaderValue::from_str(ua)?);
        }
        if !req.headers.contains_key(CONTENT_TYPE) {
            req.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static(DEFAULT_MIMETYPE));
        }
        if let Some(body) = &req.body {
            if !req.headers.contains_key(CONTENT_LENGTH) {
                req.headers.insert(CONTENT_LENGTH, HeaderValue::from(body.len()));
            }
        }

        Ok(())
    }

    /// One attempt, the response is dropped on every path out of it.
    async fn send_once<D: Decode>(&self, req: &mut Request, decoder: &D) -> Result<D::Output> {
        req.normalize_resource_path();
        if let Some(signer) = &self.signer {
            signer.sign(req, None).await?;
        }

        let resp = self.ctx.http_send(req.to_http()?).await?;
        let status = resp.status();
        if status.is_success() {
            return decoder.decode(resp);
        }

        let err = ErrorDecoder.decode(resp)?;
        debug!("{} got service error: {err}", req.operation);
        Err(Error::service(err))
    }
}
