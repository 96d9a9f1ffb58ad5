use corvid_rlp::{Decodable, DecodeError, Encodable};
use std::{fmt, ops::Deref, str::FromStr};

macro_rules! fixed_bytes {
    ($(#[$attr:meta])* $name:ident, $n:expr) => {
        $(#[$attr])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(pub [u8; $n]);

        impl $name {
            /// Size of this value in bytes.
            pub const LEN: usize = $n;

            /// The all-zero value.
            pub const ZERO: Self = Self([0u8; $n]);

            /// Copies the value out of `src`.
            ///
            /// # Panics
            ///
            /// If `src` is not exactly [`Self::LEN`] bytes.
            pub fn from_slice(src: &[u8]) -> Self {
                let mut bytes = [0u8; $n];
                bytes.copy_from_slice(src);
                Self(bytes)
            }

            /// Returns the bytes as a slice.
            pub fn as_slice(&self) -> &[u8] {
                &self.0
            }

            /// True if every byte is zero.
            pub fn is_zero(&self) -> bool {
                self.0 == [0u8; $n]
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::ZERO
            }
        }

        impl From<[u8; $n]> for $name {
            fn from(bytes: [u8; $n]) -> Self {
                Self(bytes)
            }
        }

        impl From<$name> for [u8; $n] {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<[u8]> for $name {
            fn as_ref(&self) -> &[u8] {
                &self.0
            }
        }

        impl Deref for $name {
            type Target = [u8; $n];

            fn deref(&self) -> &Self::Target {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(self, f)
            }
        }

        impl FromStr for $name {
            type Err = hex::FromHexError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let s = s.strip_prefix("0x").unwrap_or(s);
                let decoded = hex::decode(s)?;
                if decoded.len() != $n {
                    return Err(hex::FromHexError::InvalidStringLength)
                }
                Ok(Self::from_slice(&decoded))
            }
        }

        impl Encodable for $name {
            fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
                self.0.encode(out)
            }

            fn length(&self) -> usize {
                self.0.length()
            }
        }

        impl Decodable for $name {
            fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
                Ok(Self(<[u8; $n]>::decode(buf)?))
            }
        }
    };
}

fixed_bytes!(
    /// An Ethereum account address.
    Address,
    20
);

fixed_bytes!(
    /// A 32-byte value, usually a keccak-256 digest.
    B256,
    32
);

fixed_bytes!(
    /// A 2048-bit log bloom filter.
    Bloom,
    256
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format() {
        let addr: Address = "0x3535353535353535353535353535353535353535".parse().unwrap();
        assert_eq!(addr, Address([0x35; 20]));
        assert_eq!(addr.to_string(), "0x3535353535353535353535353535353535353535");

        assert!("0x35".parse::<Address>().is_err());
        assert!("not hex".parse::<B256>().is_err());
    }

    #[test]
    fn rlp_roundtrip() {
        let hash = B256([0xab; 32]);
        let mut out = Vec::new();
        hash.encode(&mut out);
        assert_eq!(out.len(), hash.length());
        assert_eq!(out[0], 0xa0);
        assert_eq!(B256::decode(&mut out.as_slice()).unwrap(), hash);
    }
}
