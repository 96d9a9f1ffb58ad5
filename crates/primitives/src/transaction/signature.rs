use crate::{transaction::util, Address, ChainId, B256, U256};
use corvid_rlp::{Decodable, DecodeError, Encodable};

/// The order of the secp256k1 curve, divided by two. Signatures that should be
/// checked according to EIP-2 should have an S value less than or equal to
/// this.
///
/// `57896044618658097711785492504343953926418782139537452191302581570759080747168`
const SECP256K1N_HALF: U256 = U256::from_be_bytes([
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
]);

/// An ECDSA signature over the secp256k1 curve.
///
/// `r`, `s`: values corresponding to the signature of the transaction and
/// used to determine the sender; formally Tr and Ts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Signature {
    /// The R field of the signature; the point on the curve.
    pub r: U256,
    /// The S field of the signature; the point on the curve.
    pub s: U256,
    /// Signature Y parity; formally Ty.
    pub odd_y_parity: bool,
}

impl Signature {
    /// Output the `v` of the signature depending on the chain id.
    ///
    /// Legacy unprotected signatures use `v = {27, 28}`; EIP-155 protected
    /// ones use `v = {0, 1} + chain_id * 2 + 35`.
    #[inline]
    pub fn v(&self, chain_id: Option<ChainId>) -> u64 {
        if let Some(chain_id) = chain_id {
            self.odd_y_parity as u64 + chain_id * 2 + 35
        } else {
            self.odd_y_parity as u64 + 27
        }
    }

    /// Output the length of the `v`, `r`, `s` fields without an RLP header,
    /// using the legacy scheme where EIP-155 support depends on the chain id.
    pub(crate) fn payload_len_with_eip155_chain_id(&self, chain_id: Option<ChainId>) -> usize {
        self.v(chain_id).length() + self.r.length() + self.s.length()
    }

    /// Encode the `v`, `r`, `s` values without an RLP header.
    /// Encodes the `v` value using the legacy scheme with EIP-155 support
    /// depending on the chain id.
    pub(crate) fn encode_with_eip155_chain_id(
        &self,
        out: &mut dyn corvid_rlp::BufMut,
        chain_id: Option<ChainId>,
    ) {
        self.v(chain_id).encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    /// Decodes the `v`, `r`, `s` values without an RLP header.
    /// This will return a chain id if the `v` value is EIP-155 compatible.
    pub(crate) fn decode_with_eip155_chain_id(
        buf: &mut &[u8],
    ) -> Result<(Self, Option<ChainId>), DecodeError> {
        let v = u64::decode(buf)?;
        let r = Decodable::decode(buf)?;
        let s = Decodable::decode(buf)?;
        if v > 36 {
            // EIP-155: v = {0, 1} + CHAIN_ID * 2 + 35
            let odd_y_parity = ((v - 35) % 2) != 0;
            let chain_id = (v - 35) >> 1;
            Ok((Signature { r, s, odd_y_parity }, Some(chain_id)))
        } else {
            // non-EIP-155 legacy scheme, v = 27 for even y-parity, v = 28 for
            // odd; v = 35 and v = 36 would encode chain id zero and are not
            // part of either scheme
            if v != 27 && v != 28 {
                return Err(DecodeError::Custom("invalid signature v value"))
            }
            let odd_y_parity = v == 28;
            Ok((Signature { r, s, odd_y_parity }, None))
        }
    }

    /// Output the length of the `odd_y_parity`, `r`, `s` fields without an
    /// RLP header, as used inside typed envelopes.
    pub(crate) fn payload_len(&self) -> usize {
        self.odd_y_parity.length() + self.r.length() + self.s.length()
    }

    /// Encode the `odd_y_parity`, `r`, `s` values without an RLP header, as
    /// used inside typed envelopes.
    pub(crate) fn encode_inner(&self, out: &mut dyn corvid_rlp::BufMut) {
        self.odd_y_parity.encode(out);
        self.r.encode(out);
        self.s.encode(out);
    }

    /// Decodes the `odd_y_parity`, `r`, `s` values without an RLP header.
    pub(crate) fn decode_inner(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Signature {
            odd_y_parity: Decodable::decode(buf)?,
            r: Decodable::decode(buf)?,
            s: Decodable::decode(buf)?,
        })
    }

    /// Recover the signer from the message digest, _without ensuring that the
    /// signature has a low `s` value_.
    pub fn recover_signer_unchecked(&self, hash: B256) -> Option<Address> {
        let mut sig: [u8; 65] = [0; 65];

        sig[0..32].copy_from_slice(&self.r.to_be_bytes::<32>());
        sig[32..64].copy_from_slice(&self.s.to_be_bytes::<32>());
        sig[64] = self.odd_y_parity as u8;

        // the exact curve error is irrelevant here, recovery either produces
        // an address or it does not
        util::recover_signer_unchecked(&sig, &hash.0).ok()
    }

    /// Recover the signer address from the message digest.
    ///
    /// Enforces the EIP-2 low-s rule: if `s` is greater than
    /// `secp256k1n / 2` the signature is malleable and `None` is returned.
    pub fn recover_signer(&self, hash: B256) -> Option<Address> {
        if self.s > SECP256K1N_HALF {
            return None
        }

        self.recover_signer_unchecked(hash)
    }
}
