use corvid_rlp::{Decodable, DecodeError, Encodable};
use std::{fmt, ops::Deref};

/// An immutable byte buffer that formats as hex.
#[derive(Clone, PartialEq, Eq, Hash, Default)]
pub struct Bytes(pub bytes::Bytes);

impl Bytes {
    /// Creates an empty buffer.
    pub const fn new() -> Self {
        Self(bytes::Bytes::new())
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True if the buffer is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Deref for Bytes {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<[u8]> for Bytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for Bytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(&self.0))
    }
}

impl From<bytes::Bytes> for Bytes {
    fn from(value: bytes::Bytes) -> Self {
        Self(value)
    }
}

impl From<Vec<u8>> for Bytes {
    fn from(value: Vec<u8>) -> Self {
        Self(value.into())
    }
}

impl From<&'static [u8]> for Bytes {
    fn from(value: &'static [u8]) -> Self {
        Self(bytes::Bytes::from_static(value))
    }
}

impl<const N: usize> From<[u8; N]> for Bytes {
    fn from(value: [u8; N]) -> Self {
        Self(bytes::Bytes::copy_from_slice(&value))
    }
}

impl Encodable for Bytes {
    fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
        self.0.encode(out)
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for Bytes {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self(bytes::Bytes::decode(buf)?))
    }
}
