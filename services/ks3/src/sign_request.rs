//! KS3 request signer
use std::time::Duration;

use chrono::TimeDelta;
use http::header::AUTHORIZATION;
use http::header::DATE;
use http::HeaderValue;
use log::debug;

use super::canonical::canonical_string;
use super::constants::*;
use super::credential::Credential;
use ks3_core::hash::base64_hmac_sha1;
use ks3_core::time::format_http_date;
use ks3_core::time::now;
use ks3_core::time::DateTime;
use ks3_core::{Context, Error, Request, Result, SignRequest};

/// RequestSigner that implements the KS3 `KSS` authorization.
///
/// The signature is `base64(hmac-sha1(secret_access_key, string_to_sign))`,
/// see [`canonical_string`] for how the string to sign is built.
#[derive(Debug, Default)]
pub struct RequestSigner {
    time: Option<DateTime>,
}

impl RequestSigner {
    /// Create a builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Compute the signature of a request whose `Date` is replaced by `expires`,
    /// seconds since unix epoch.
    ///
    /// The request is left untouched, this is what pre-signed urls carry.
    pub fn get_signature(&self, req: &Request, cred: &Credential, expires: &str) -> String {
        let string_to_sign = canonical_string(req, Some(expires));
        debug!("string to sign: {string_to_sign:?}");

        base64_hmac_sha1(
            cred.secret_access_key.as_bytes(),
            string_to_sign.as_bytes(),
        )
    }

    fn sign_time(&self, req: &Request) -> Result<DateTime> {
        let offset = req.time_offset;
        TimeDelta::try_seconds(offset)
            .and_then(|d| self.time.unwrap_or_else(now).checked_sub_signed(d))
            .ok_or_else(|| Error::request_invalid(format!("time offset {offset}s is out of range")))
    }
}

#[async_trait::async_trait]
impl SignRequest for RequestSigner {
    type Credential = Credential;

    async fn sign_request(
        &self,
        _: &Context,
        req: &mut Request,
        credential: Option<&Self::Credential>,
        expires_in: Option<Duration>,
    ) -> Result<()> {
        let k = credential.ok_or_else(|| {
            Error::credential_invalid(format!("missing credential to sign {}", req.operation))
        })?;
        let now = self.sign_time(req)?;

        match expires_in {
            None => {
                req.headers.insert(DATE, format_http_date(now).parse()?);

                let string_to_sign = canonical_string(req, None);
                debug!("string to sign: {string_to_sign:?}");
                let signature =
                    base64_hmac_sha1(k.secret_access_key.as_bytes(), string_to_sign.as_bytes());

                req.headers.insert(AUTHORIZATION, {
                    let mut value: HeaderValue =
                        format!("{AUTH_SCHEME} {}:{}", k.access_key_id, signature).parse()?;
                    value.set_sensitive(true);

                    value
                });
            }
            Some(expires_in) => {
                let expire = TimeDelta::from_std(expires_in).map_err(|e| {
                    Error::request_invalid(format!("expires {expires_in:?} is out of range"))
                        .with_source(e)
                })?;
                let expires = now
                    .checked_add_signed(expire)
                    .ok_or_else(|| {
                        Error::request_invalid(format!("expires {expires_in:?} is out of range"))
                    })?
                    .timestamp()
                    .to_string();
                let signature = self.get_signature(req, k, &expires);

                req.param_insert(PARAM_ACCESS_KEY_ID, Some(k.access_key_id.clone()));
                req.param_insert(PARAM_EXPIRES, Some(expires));
                req.param_insert(PARAM_SIGNATURE, Some(signature));
            }
        }

        Ok(())
    }
}
