use crate::error::DecodeError;
use bytes::{Buf, BufMut};

/// A string consisting of a single byte below this code is encoded as itself.
pub const EMPTY_STRING_CODE: u8 = 0x80;

/// Code of the empty list.
pub const EMPTY_LIST_CODE: u8 = 0xc0;

/// The header preceding an RLP payload: whether it is a list and how many
/// payload bytes follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// True if the payload is a list, false for a byte string.
    pub list: bool,
    /// Length of the payload in bytes.
    pub payload_length: usize,
}

impl Header {
    /// Encodes the header into `out`.
    pub fn encode(&self, out: &mut dyn BufMut) {
        if self.payload_length < 56 {
            let code = if self.list { EMPTY_LIST_CODE } else { EMPTY_STRING_CODE };
            out.put_u8(code + self.payload_length as u8);
        } else {
            let be = self.payload_length.to_be_bytes();
            let len_be = &be[self.payload_length.leading_zeros() as usize / 8..];
            let code = if self.list { 0xf7 } else { 0xb7 };
            out.put_u8(code + len_be.len() as u8);
            out.put_slice(len_be);
        }
    }

    /// Number of bytes the encoded header occupies.
    pub fn length(&self) -> usize {
        length_of_length(self.payload_length)
    }

    /// Decodes a header from `buf`, advancing past it.
    ///
    /// A single byte below [`EMPTY_STRING_CODE`] is reported as a string of
    /// length one *without* consuming the byte, so the byte itself remains
    /// available as the payload.
    pub fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let first = *buf.first().ok_or(DecodeError::InputTooShort)?;
        let header = match first {
            0..=0x7f => Self { list: false, payload_length: 1 },
            0x80..=0xb7 => {
                buf.advance(1);
                let h = Self { list: false, payload_length: (first - EMPTY_STRING_CODE) as usize };
                if h.payload_length == 1 {
                    let payload = *buf.first().ok_or(DecodeError::InputTooShort)?;
                    if payload < EMPTY_STRING_CODE {
                        return Err(DecodeError::NonCanonicalSingleByte)
                    }
                }
                h
            }
            0xb8..=0xbf => {
                buf.advance(1);
                Self {
                    list: false,
                    payload_length: decode_long_length(buf, (first - 0xb7) as usize)?,
                }
            }
            0xc0..=0xf7 => {
                buf.advance(1);
                Self { list: true, payload_length: (first - EMPTY_LIST_CODE) as usize }
            }
            0xf8..=0xff => {
                buf.advance(1);
                Self { list: true, payload_length: decode_long_length(buf, (first - 0xf7) as usize)? }
            }
        };

        if buf.len() < header.payload_length {
            return Err(DecodeError::InputTooShort)
        }
        Ok(header)
    }
}

/// Reads a big-endian payload length of `length_of_length` bytes, enforcing
/// minimality of both the length bytes and the long form itself.
fn decode_long_length(buf: &mut &[u8], length_of_length: usize) -> Result<usize, DecodeError> {
    if buf.len() < length_of_length {
        return Err(DecodeError::InputTooShort)
    }
    if length_of_length > core::mem::size_of::<usize>() {
        return Err(DecodeError::Overflow)
    }
    let mut payload_length = 0usize;
    for &byte in &buf[..length_of_length] {
        payload_length = (payload_length << 8) | byte as usize;
    }
    if buf[0] == 0 {
        return Err(DecodeError::LeadingZero)
    }
    if payload_length < 56 {
        return Err(DecodeError::NonCanonicalSize)
    }
    buf.advance(length_of_length);
    Ok(payload_length)
}

/// Length of the header needed for a payload of `payload_length` bytes.
pub fn length_of_length(payload_length: usize) -> usize {
    if payload_length < 56 {
        1
    } else {
        1 + core::mem::size_of::<usize>() - payload_length.leading_zeros() as usize / 8
    }
}
