use crate::{constants::*, Credential};
use async_trait::async_trait;
use ks3_core::{Context, ProvideCredential, Result};

/// EnvCredentialProvider loads ks3 credentials from environment variables.
///
/// This provider looks for the following environment variables:
/// - `KS3_ACCESS_KEY_ID`: The access key ID
/// - `KS3_SECRET_ACCESS_KEY`: The secret key
#[derive(Debug, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    /// Create a new EnvCredentialProvider.
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ProvideCredential for EnvCredentialProvider {
    type Credential = Credential;

    async fn provide_credential(&self, ctx: &Context) -> Result<Option<Self::Credential>> {
        match (
            ctx.env_var(KS3_ACCESS_KEY_ID),
            ctx.env_var(KS3_SECRET_ACCESS_KEY),
        ) {
            (Some(ak), Some(sk)) => Ok(Some(Credential::new(ak, sk))),
            _ => Ok(None),
        }
    }
}
