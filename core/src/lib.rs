//! Core components for signing and executing KS3 requests.
//!
//! This crate provides the service agnostic types and traits the ks3 crates are
//! built on.
//!
//! ## Overview
//!
//! - **Context**: A container that holds the HTTP sender and environment access
//! - **Request**: The mutable envelope of one call, built, signed, then sent
//! - **Traits**: Abstract interfaces for credential loading (`ProvideCredential`),
//!   request signing (`SignRequest`) and response decoding (`Decode`)
//! - **Signer**: Coordinates credential loading and request signing
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use http::Method;
//! use http::Uri;
//! use ks3_core::{Context, ProvideCredential, Request, Result, SignRequest, Signer, SigningCredential};
//! use std::time::Duration;
//!
//! #[derive(Clone, Debug)]
//! struct MyCredential {
//!     key: String,
//!     secret: String,
//! }
//!
//! impl SigningCredential for MyCredential {
//!     fn is_valid(&self) -> bool {
//!         !self.key.is_empty() && !self.secret.is_empty()
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyLoader;
//!
//! #[async_trait]
//! impl ProvideCredential for MyLoader {
//!     type Credential = MyCredential;
//!
//!     async fn provide_credential(&self, _: &Context) -> Result<Option<Self::Credential>> {
//!         Ok(Some(MyCredential {
//!             key: "my-access-key".to_string(),
//!             secret: "my-secret-key".to_string(),
//!         }))
//!     }
//! }
//!
//! #[derive(Debug)]
//! struct MyBuilder;
//!
//! #[async_trait]
//! impl SignRequest for MyBuilder {
//!     type Credential = MyCredential;
//!
//!     async fn sign_request(
//!         &self,
//!         _ctx: &Context,
//!         req: &mut Request,
//!         cred: Option<&Self::Credential>,
//!         _expires_in: Option<Duration>,
//!     ) -> Result<()> {
//!         let cred = cred.ok_or_else(|| ks3_core::Error::credential_invalid("missing credential"))?;
//!         req.header_insert("x-api-key", &cred.key)
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let signer = Signer::new(Context::new(), MyLoader, MyBuilder);
//!
//! let mut req = Request::new(
//!     "GetObject",
//!     Method::GET,
//!     Uri::from_static("http://kss.ksyun.com"),
//!     "/bucket/key",
//! );
//! signer.sign(&mut req, None).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: Redaction and percent encoding

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod error;
pub use error::{Error, ErrorKind, Result, ServiceError};

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod api;
pub use api::{ProvideCredential, ProvideCredentialChain, SignRequest, SigningCredential};
mod request;
pub use request::Request;
mod signer;
pub use signer::Signer;
mod decode;
pub use decode::{BytesDecoder, Decode, EmptyDecoder, XmlDecoder};
