//! Write-through key-value map persisted to a single file.
//!
//! A [`SerializedDict`] loads `<dir>/<name>` once when it is built and
//! rewrites the whole file after every mutation. The on-disk format is
//! pluggable ([`codec`]): indented JSON by default, MessagePack behind the
//! `msgpack` feature. Keys that JSON can't hold directly are reshaped by a
//! [`Packer`](pack::Packer) on the way out and back.
//!
//! ```rust,no_run
//! use filedict::{DataDir, SerializedDict};
//!
//! let dir = DataDir::from_env().unwrap();
//! let mut db = SerializedDict::<String, u32>::open(&dir, "counts.json").unwrap();
//! db.set("hello".into(), 1).unwrap();
//! assert_eq!(db.get(&"hello".into()).unwrap(), &1);
//! db.backup().unwrap();
//! ```
//!
//! **Single-process only.** Two stores (or two processes) on the same file
//! will clobber each other.

#![deny(missing_docs)]
#![warn(clippy::all)]

pub mod codec;
pub mod config;
pub mod error;
pub mod pack;
pub mod persist;
pub mod store;

#[cfg(feature = "msgpack")]
pub use codec::MsgPackCodec;
pub use codec::{Codec, JsonCodec};
pub use config::DataDir;
pub use error::{Error, Result};
pub use store::{DictBuilder, SerializedDict};
