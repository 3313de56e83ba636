//! Unified error type for all store operations.

use thiserror::Error;

/// Things that can go wrong when using a [`SerializedDict`](crate::SerializedDict).
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum Error {
    /// File system problem (read, write, rename). A missing live file on
    /// load is not an error; everything else ends up here.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// Failed to turn the map into bytes (includes `pack` failures).
    #[error("serialization error: {0}")]
    Serialize(String),
    /// Failed to turn bytes back into the map (includes `unpack` failures).
    #[error("deserialization error: {0}")]
    Deserialize(String),
    /// `get`/`delete` on a key that isn't there. Holds the key's `Debug` form.
    #[error("key not found: {0}")]
    KeyNotFound(String),
    /// Bad configuration (invalid logical name, unset data directory).
    #[error("config error: {0}")]
    Config(String),
}

impl Error {
    /// `true` for [`Error::KeyNotFound`].
    pub fn is_key_not_found(&self) -> bool {
        matches!(self, Error::KeyNotFound(_))
    }

    pub(crate) fn key_not_found<K: std::fmt::Debug>(key: &K) -> Self {
        Error::KeyNotFound(format!("{key:?}"))
    }

    /// Classify a JSON error raised while encoding.
    pub(crate) fn from_json_encode(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::Serialize(err.to_string())
        }
    }

    /// Classify a JSON error raised while decoding.
    pub(crate) fn from_json_decode(err: serde_json::Error) -> Self {
        if err.is_io() {
            Error::Io(err.into())
        } else {
            Error::Deserialize(err.to_string())
        }
    }
}

#[cfg(feature = "msgpack")]
impl From<rmp_serde::encode::Error> for Error {
    fn from(err: rmp_serde::encode::Error) -> Self {
        Error::Serialize(err.to_string())
    }
}

#[cfg(feature = "msgpack")]
impl From<rmp_serde::decode::Error> for Error {
    fn from(err: rmp_serde::decode::Error) -> Self {
        Error::Deserialize(err.to_string())
    }
}

/// Result alias using our [`Error`] type.
pub type Result<T> = std::result::Result<T, Error>;
