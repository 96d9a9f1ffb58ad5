use crate::{
    transaction::{AccessList, TransactionKind},
    Bytes, ChainId, U256,
};
use corvid_rlp::{Decodable, DecodeError, Encodable};

/// A fee-market transaction: the sender bids a priority fee on top of the
/// protocol base fee, bounded by an overall fee cap. Transmitted in a type
/// `0x02` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TxFeeMarket {
    /// The chain this transaction is bound to.
    pub chain_id: ChainId,
    /// A scalar value equal to the number of transactions sent by the
    /// sender; formally Tn.
    pub nonce: u64,
    /// Maximum Wei per gas paid to the block producer on top of the base
    /// fee.
    pub max_priority_fee_per_gas: u128,
    /// Maximum total Wei per gas the sender is willing to pay, base fee
    /// included.
    pub max_fee_per_gas: u128,
    /// The maximum amount of gas this transaction may consume; formally Tg.
    pub gas_limit: u64,
    /// The recipient, or contract creation when absent; formally Tt.
    pub to: TransactionKind,
    /// Wei transferred to the recipient or endowed to a created contract;
    /// formally Tv.
    pub value: U256,
    /// Call data, or initialization code for a creation; formally Td.
    pub input: Bytes,
    /// Addresses and storage keys announced as accessed.
    pub access_list: AccessList,
}

impl TxFeeMarket {
    pub(crate) fn fields_len(&self) -> usize {
        let mut len = 0;
        len += self.chain_id.length();
        len += self.nonce.length();
        len += self.max_priority_fee_per_gas.length();
        len += self.max_fee_per_gas.length();
        len += self.gas_limit.length();
        len += self.to.length();
        len += self.value.length();
        len += self.input.length();
        len += self.access_list.length();
        len
    }

    pub(crate) fn encode_fields(&self, out: &mut dyn corvid_rlp::BufMut) {
        self.chain_id.encode(out);
        self.nonce.encode(out);
        self.max_priority_fee_per_gas.encode(out);
        self.max_fee_per_gas.encode(out);
        self.gas_limit.encode(out);
        self.to.encode(out);
        self.value.encode(out);
        self.input.encode(out);
        self.access_list.encode(out);
    }

    pub(crate) fn decode_fields(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self {
            chain_id: Decodable::decode(buf)?,
            nonce: Decodable::decode(buf)?,
            max_priority_fee_per_gas: Decodable::decode(buf)?,
            max_fee_per_gas: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
            access_list: Decodable::decode(buf)?,
        })
    }
}
