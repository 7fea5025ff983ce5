//! KS3 object storage client core.
//!
//! Requests are built by an [`Executor`], signed with the `KSS` scheme by
//! [`RequestSigner`] and sent with bounded retries on transport failures.
//!
//! ```no_run
//! use http::Method;
//! use ks3_client::{ClientConfig, DefaultCredentialProvider, Executor, RequestSigner};
//! use ks3_core::{BytesDecoder, Context, OsEnv, Result, Signer};
//!
//! # async fn example(ctx: Context) -> Result<()> {
//! let ctx = ctx.with_env(OsEnv);
//! let signer = Signer::new(ctx.clone(), DefaultCredentialProvider::default(), RequestSigner::new());
//! let executor = Executor::new(ctx, ClientConfig::new())?.with_signer(signer);
//!
//! let req = executor.request("GetObject", Method::GET, Some("bucket"), Some("key"));
//! let _content = executor.execute(req, &BytesDecoder).await?;
//! # Ok(())
//! # }
//! ```

mod config;
pub use config::{ClientConfig, Config, Protocol};

mod credential;
pub use credential::Credential;

mod provide_credential;
pub use provide_credential::*;

mod canonical;
pub use canonical::{canonical_string, is_signed_parameter};

mod sign_request;
pub use sign_request::RequestSigner;

mod presign;
pub use presign::{presign_url, ResponseHeaderOverrides};

mod decode;
pub use decode::{ErrorDecoder, MetadataDecoder, Object, ObjectDecoder, ObjectMetadata};

mod executor;
pub use executor::Executor;

mod multipart;
pub use multipart::{
    complete_body, CompleteMultipartUploadResult, InitiateMultipartUploadResult, ListPartsResult,
    MultipartSession, MultipartUploader, Part, PartETag, MAX_PART_NUMBER,
};

mod constants;
pub use constants::RETRY_TIMES;
