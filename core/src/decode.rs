//! Response decoders.
//!
//! Every operation picks its decoder when the call is built. The executor only
//! hands successful responses to it, error responses take another path.

use std::fmt::Debug;
use std::marker::PhantomData;

use bytes::Buf;
use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Decode turns a successful response into a typed result.
pub trait Decode: Debug + Send + Sync {
    /// Output of this decoder.
    type Output: Send;

    /// Decode the response.
    ///
    /// Returns a [`crate::ErrorKind::Decode`] error if the response can't be parsed.
    fn decode(&self, resp: http::Response<Bytes>) -> Result<Self::Output>;
}

/// BytesDecoder returns the body as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct BytesDecoder;

impl Decode for BytesDecoder {
    type Output = Bytes;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<Self::Output> {
        Ok(resp.into_body())
    }
}

/// EmptyDecoder drops the body, for calls whose success carries no data.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyDecoder;

impl Decode for EmptyDecoder {
    type Output = ();

    fn decode(&self, _: http::Response<Bytes>) -> Result<Self::Output> {
        Ok(())
    }
}

/// XmlDecoder deserializes the xml body into `T`.
pub struct XmlDecoder<T>(PhantomData<fn() -> T>);

impl<T> XmlDecoder<T> {
    /// Create a new xml decoder.
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for XmlDecoder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for XmlDecoder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "XmlDecoder<{}>", std::any::type_name::<T>())
    }
}

impl<T: DeserializeOwned + Send> Decode for XmlDecoder<T> {
    type Output = T;

    fn decode(&self, resp: http::Response<Bytes>) -> Result<Self::Output> {
        let body = resp.into_body();
        if body.is_empty() {
            return Err(Error::decode(format!(
                "empty body while expecting {}",
                std::any::type_name::<T>()
            )));
        }

        Ok(quick_xml::de::from_reader(body.reader())?)
    }
}
