//! Storage codecs. Defaults to indented JSON via serde_json.
//!
//! Implement [`Codec`] if you need a different on-disk format. A
//! MessagePack codec ships behind the `msgpack` feature (on by default).

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Turns a packed snapshot into bytes and back.
///
/// The store only ever hands a codec the output of a
/// [`Packer`](crate::pack::Packer), so a codec that can't represent some
/// shape (JSON and non-string map keys, say) should be paired with a packer
/// that avoids it.
pub trait Codec {
    /// Encode a value to bytes.
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized;

    /// Decode bytes back into a value.
    fn decode<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned;

    /// Short label used in log events.
    fn name(&self) -> &'static str;
}

/// JSON codec. Indented by default, like a file meant to be read by hand.
#[derive(Debug, Clone)]
pub struct JsonCodec {
    pretty: bool,
}

impl JsonCodec {
    /// Pretty-printed JSON with two-space indentation.
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Compact JSON (single line, no extra whitespace).
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    /// `true` when output is indented.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Default for JsonCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl Codec for JsonCodec {
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(value)
        } else {
            serde_json::to_vec(value)
        };
        bytes.map_err(Error::from_json_encode)
    }

    fn decode<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        serde_json::from_slice(bytes).map_err(Error::from_json_decode)
    }

    fn name(&self) -> &'static str {
        "json"
    }
}

/// MessagePack codec. Structs are written as maps with field names so the
/// file survives field reordering.
#[cfg(feature = "msgpack")]
#[derive(Debug, Clone, Copy, Default)]
pub struct MsgPackCodec;

#[cfg(feature = "msgpack")]
impl Codec for MsgPackCodec {
    fn encode<T>(&self, value: &T) -> Result<Vec<u8>>
    where
        T: Serialize + ?Sized,
    {
        Ok(rmp_serde::to_vec_named(value)?)
    }

    fn decode<T>(&self, bytes: &[u8]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        Ok(rmp_serde::from_slice(bytes)?)
    }

    fn name(&self) -> &'static str {
        "msgpack"
    }
}
