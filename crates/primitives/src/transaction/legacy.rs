use crate::{transaction::TransactionKind, Bytes, ChainId, U256};
use corvid_rlp::{Decodable, DecodeError, Encodable};

/// An untyped pre-envelope transaction, optionally replay protected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TxLegacy {
    /// The chain this transaction is replay protected against, recovered
    /// from the signature `v` value. `None` for unprotected transactions.
    pub chain_id: Option<ChainId>,
    /// A scalar value equal to the number of transactions sent by the
    /// sender; formally Tn.
    pub nonce: u64,
    /// Wei paid per unit of gas; formally Tp.
    pub gas_price: u128,
    /// The maximum amount of gas this transaction may consume; formally Tg.
    pub gas_limit: u64,
    /// The recipient, or contract creation when absent; formally Tt.
    pub to: TransactionKind,
    /// Wei transferred to the recipient or endowed to a created contract;
    /// formally Tv.
    pub value: U256,
    /// Call data, or initialization code for a creation; formally Td.
    pub input: Bytes,
}

impl TxLegacy {
    pub(crate) fn fields_len(&self) -> usize {
        let mut len = 0;
        len += self.nonce.length();
        len += self.gas_price.length();
        len += self.gas_limit.length();
        len += self.to.length();
        len += self.value.length();
        len += self.input.length();
        len
    }

    pub(crate) fn encode_fields(&self, out: &mut dyn corvid_rlp::BufMut) {
        self.nonce.encode(out);
        self.gas_price.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
    }

    pub(crate) fn decode_fields(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            chain_id: None,
            nonce: Decodable::decode(buf)?,
            gas_price: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
        })
    }

    /// Length of the EIP-155 tail appended to the signing payload: the chain
    /// id and two zero scalars. Zero for unprotected transactions.
    pub(crate) fn eip155_fields_len(&self) -> usize {
        if let Some(id) = self.chain_id {
            id.length() + 2
        } else {
            0
        }
    }

    /// Encodes the EIP-155 signing tail, if this transaction is protected.
    pub(crate) fn encode_eip155_fields(&self, out: &mut dyn corvid_rlp::BufMut) {
        if let Some(id) = self.chain_id {
            id.encode(out);
            0x00u8.encode(out);
            0x00u8.encode(out);
        }
    }
}
