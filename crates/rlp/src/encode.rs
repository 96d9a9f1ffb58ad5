use crate::header::{Header, EMPTY_STRING_CODE};
use bytes::BufMut;
use ruint::aliases::U256;

/// A type that can be serialized to RLP.
pub trait Encodable {
    /// Appends the RLP representation of `self` to `out`.
    fn encode(&self, out: &mut dyn BufMut);

    /// Length of the RLP representation in bytes, header included.
    fn length(&self) -> usize;
}

impl<T: ?Sized + Encodable> Encodable for &T {
    fn encode(&self, out: &mut dyn BufMut) {
        (**self).encode(out)
    }

    fn length(&self) -> usize {
        (**self).length()
    }
}

macro_rules! uint_encodable {
    ($($t:ty),*) => {$(
        impl Encodable for $t {
            fn encode(&self, out: &mut dyn BufMut) {
                if *self == 0 {
                    out.put_u8(EMPTY_STRING_CODE);
                } else if *self < EMPTY_STRING_CODE as $t {
                    out.put_u8(*self as u8);
                } else {
                    let be = self.to_be_bytes();
                    let be = &be[self.leading_zeros() as usize / 8..];
                    out.put_u8(EMPTY_STRING_CODE + be.len() as u8);
                    out.put_slice(be);
                }
            }

            fn length(&self) -> usize {
                if *self < EMPTY_STRING_CODE as $t {
                    1
                } else {
                    1 + core::mem::size_of::<$t>() - self.leading_zeros() as usize / 8
                }
            }
        }
    )*};
}

uint_encodable!(u8, u16, u32, u64, u128, usize);

impl Encodable for bool {
    fn encode(&self, out: &mut dyn BufMut) {
        (*self as u8).encode(out)
    }

    fn length(&self) -> usize {
        1
    }
}

impl Encodable for U256 {
    fn encode(&self, out: &mut dyn BufMut) {
        let be = self.to_be_bytes::<32>();
        let be = &be[32 - scalar_byte_len(self)..];
        if be.len() == 1 && be[0] < EMPTY_STRING_CODE {
            out.put_u8(be[0]);
        } else {
            out.put_u8(EMPTY_STRING_CODE + be.len() as u8);
            out.put_slice(be);
        }
    }

    fn length(&self) -> usize {
        if self.bit_len() < 8 {
            1
        } else {
            1 + scalar_byte_len(self)
        }
    }
}

/// Number of bytes in the minimal big-endian form of `value`; one for zero.
fn scalar_byte_len(value: &U256) -> usize {
    core::cmp::max(1, (value.bit_len() + 7) / 8)
}

impl Encodable for [u8] {
    fn encode(&self, out: &mut dyn BufMut) {
        if self.len() != 1 || self[0] >= EMPTY_STRING_CODE {
            Header { list: false, payload_length: self.len() }.encode(out);
        }
        out.put_slice(self);
    }

    fn length(&self) -> usize {
        if self.len() == 1 && self[0] < EMPTY_STRING_CODE {
            1
        } else {
            self.len() + Header { list: false, payload_length: self.len() }.length()
        }
    }
}

impl<const N: usize> Encodable for [u8; N] {
    fn encode(&self, out: &mut dyn BufMut) {
        self.as_slice().encode(out)
    }

    fn length(&self) -> usize {
        self.as_slice().length()
    }
}

impl Encodable for bytes::Bytes {
    fn encode(&self, out: &mut dyn BufMut) {
        self.as_ref().encode(out)
    }

    fn length(&self) -> usize {
        self.as_ref().length()
    }
}

impl<T: Encodable> Encodable for Vec<T> {
    fn encode(&self, out: &mut dyn BufMut) {
        let payload_length = self.iter().map(Encodable::length).sum();
        Header { list: true, payload_length }.encode(out);
        for item in self {
            item.encode(out);
        }
    }

    fn length(&self) -> usize {
        let payload_length: usize = self.iter().map(Encodable::length).sum();
        payload_length + Header { list: true, payload_length }.length()
    }
}
