#![warn(missing_docs, unreachable_pub)]
#![deny(unused_must_use, rust_2018_idioms)]

//! Recursive-length-prefix (RLP) serialization.
//!
//! This is the canonical flavor of RLP: scalars are minimal big-endian byte
//! strings without leading zeros, and the decoder rejects any non-minimal
//! form instead of silently accepting it. Every decodable value consumes
//! exactly the bytes its header declares.

mod decode;
mod encode;
mod error;
mod header;

pub use bytes::BufMut;
pub use decode::Decodable;
pub use encode::Encodable;
pub use error::DecodeError;
pub use header::{length_of_length, Header, EMPTY_LIST_CODE, EMPTY_STRING_CODE};
