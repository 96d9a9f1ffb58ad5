use crate::{error::DecodeError, header::Header};
use bytes::Buf;
use ruint::aliases::U256;

/// A type that can be deserialized from RLP.
pub trait Decodable: Sized {
    /// Decodes one item from the front of `buf`, advancing past it.
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError>;
}

/// Reads the payload of a string header and returns it, enforcing scalar
/// canonicality (no leading zeros, fits in `max_len` bytes).
fn decode_scalar_payload<'a>(
    buf: &mut &'a [u8],
    max_len: usize,
) -> Result<&'a [u8], DecodeError> {
    let header = Header::decode(buf)?;
    if header.list {
        return Err(DecodeError::UnexpectedList)
    }
    if header.payload_length > max_len {
        return Err(DecodeError::Overflow)
    }
    let payload = &buf[..header.payload_length];
    if payload.first() == Some(&0) {
        return Err(DecodeError::LeadingZero)
    }
    buf.advance(header.payload_length);
    Ok(payload)
}

macro_rules! uint_decodable {
    ($($t:ty),*) => {$(
        impl Decodable for $t {
            fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
                let payload = decode_scalar_payload(buf, core::mem::size_of::<$t>())?;
                let mut value = 0u128;
                for &byte in payload {
                    value = (value << 8) | byte as u128;
                }
                Ok(value as $t)
            }
        }
    )*};
}

uint_decodable!(u8, u16, u32, u64, u128);

impl Decodable for bool {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        match u8::decode(buf)? {
            0 => Ok(false),
            1 => Ok(true),
            _ => Err(DecodeError::Custom("invalid bool value, must be 0 or 1")),
        }
    }
}

impl Decodable for U256 {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let payload = decode_scalar_payload(buf, 32)?;
        Ok(U256::try_from_be_slice(payload).expect("payload is at most 32 bytes"))
    }
}

impl Decodable for bytes::Bytes {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let header = Header::decode(buf)?;
        if header.list {
            return Err(DecodeError::UnexpectedList)
        }
        let payload = bytes::Bytes::copy_from_slice(&buf[..header.payload_length]);
        buf.advance(header.payload_length);
        Ok(payload)
    }
}

impl<const N: usize> Decodable for [u8; N] {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let header = Header::decode(buf)?;
        if header.list {
            return Err(DecodeError::UnexpectedList)
        }
        if header.payload_length != N {
            return Err(DecodeError::UnexpectedLength)
        }
        let mut arr = [0u8; N];
        arr.copy_from_slice(&buf[..N]);
        buf.advance(N);
        Ok(arr)
    }
}

impl<T: Decodable> Decodable for Vec<T> {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(DecodeError::UnexpectedString)
        }
        let mut payload = &buf[..header.payload_length];
        let mut items = Vec::new();
        while !payload.is_empty() {
            items.push(T::decode(&mut payload)?);
        }
        buf.advance(header.payload_length);
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Encodable;
    use hex_literal::hex;

    fn roundtrip<T: Encodable + Decodable + PartialEq + core::fmt::Debug>(value: T) {
        let mut out = Vec::new();
        value.encode(&mut out);
        let mut slice = out.as_slice();
        let decoded = T::decode(&mut slice).unwrap();
        assert_eq!(decoded, value);
        assert!(slice.is_empty(), "decoder must consume the whole encoding");
    }

    #[test]
    fn roundtrip_uints() {
        for value in [0u64, 1, 0x7f, 0x80, 0xff, 1024, u64::MAX] {
            roundtrip(value);
        }
        roundtrip(u128::MAX);
        roundtrip(U256::MAX);
        roundtrip(U256::ZERO);
    }

    #[test]
    fn roundtrip_bytes() {
        roundtrip(bytes::Bytes::new());
        roundtrip(bytes::Bytes::from_static(b"d"));
        roundtrip(bytes::Bytes::from_static(b"dog"));
        roundtrip(bytes::Bytes::from_static(&[0x80; 60]));
        roundtrip([0u8; 32]);
        roundtrip(vec![1u64, 2, 3]);
        roundtrip(vec![bytes::Bytes::from_static(b"cat"), bytes::Bytes::from_static(b"dog")]);
    }

    #[test]
    fn reject_non_minimal_scalars() {
        // zero must be the empty string, not 0x00
        assert_eq!(u64::decode(&mut &hex!("00")[..]), Err(DecodeError::LeadingZero));
        // leading zero byte in a multi-byte scalar
        assert_eq!(u64::decode(&mut &hex!("820001")[..]), Err(DecodeError::LeadingZero));
        // single byte below 0x80 wrapped in a string header
        assert_eq!(u64::decode(&mut &hex!("8105")[..]), Err(DecodeError::NonCanonicalSingleByte));
        // long form used for a short payload
        let mut long = vec![0xb8u8, 0x37];
        long.extend(core::iter::repeat(b'a').take(0x37));
        assert_eq!(
            bytes::Bytes::decode(&mut long.as_slice()),
            Err(DecodeError::NonCanonicalSize)
        );
    }

    #[test]
    fn reject_overflow_and_underrun() {
        assert_eq!(u8::decode(&mut &hex!("820400")[..]), Err(DecodeError::Overflow));
        assert_eq!(u64::decode(&mut &hex!("83cafe")[..]), Err(DecodeError::InputTooShort));
        assert_eq!(u64::decode(&mut &[][..]), Err(DecodeError::InputTooShort));
        // list header where a scalar is expected
        assert_eq!(u64::decode(&mut &hex!("c0")[..]), Err(DecodeError::UnexpectedList));
        assert_eq!(
            Vec::<u64>::decode(&mut &hex!("83646f67")[..]),
            Err(DecodeError::UnexpectedString)
        );
    }

    #[test]
    fn list_consumes_exact_length() {
        // [1, 2] followed by trailing garbage outside the list is fine for the
        // list itself, the caller sees the remainder
        let bytes = hex!("c20102ff");
        let mut slice = &bytes[..];
        assert_eq!(Vec::<u64>::decode(&mut slice).unwrap(), vec![1, 2]);
        assert_eq!(slice, &hex!("ff"));

        // an item that overruns the declared list payload is malformed
        let bytes = hex!("c2820102");
        assert!(Vec::<u64>::decode(&mut &bytes[..]).is_err());
    }
}
