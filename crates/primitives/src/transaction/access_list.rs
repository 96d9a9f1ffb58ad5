use crate::{transaction::TransactionKind, Address, B256, Bytes, ChainId, U256};
use corvid_rlp::{Decodable, DecodeError, Encodable, Header};

/// A list of addresses and storage keys the transaction plans to access.
///
/// Accesses outside the list are possible, but more expensive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AccessList(pub Vec<AccessListItem>);

impl AccessList {
    /// True if the list has no entries.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Total number of storage keys across all entries.
    pub fn storage_key_count(&self) -> usize {
        self.0.iter().map(|item| item.storage_keys.len()).sum()
    }
}

impl Encodable for AccessList {
    fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
        self.0.encode(out)
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for AccessList {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self(Decodable::decode(buf)?))
    }
}

/// One account entry of an [`AccessList`]: the address and the storage keys
/// that will be touched under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AccessListItem {
    /// The account address.
    pub address: Address,
    /// Storage slots accessed under the address.
    pub storage_keys: Vec<B256>,
}

impl Encodable for AccessListItem {
    fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
        let payload_length = self.address.length() + self.storage_keys.length();
        Header { list: true, payload_length }.encode(out);
        self.address.encode(out);
        self.storage_keys.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.address.length() + self.storage_keys.length();
        payload_length + Header { list: true, payload_length }.length()
    }
}

impl Decodable for AccessListItem {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(DecodeError::UnexpectedString)
        }
        let started_len = buf.len();
        let item =
            Self { address: Decodable::decode(buf)?, storage_keys: Decodable::decode(buf)? };
        if started_len - buf.len() != header.payload_length {
            return Err(DecodeError::Custom("list length mismatch"))
        }
        Ok(item)
    }
}

/// A transaction that carries an access list alongside the legacy gas price,
/// bound to a chain id and transmitted in a type `0x01` envelope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct TxAccessList {
    /// The chain this transaction is bound to.
    pub chain_id: ChainId,
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
    /// Addresses and storage keys announced as accessed.
    pub access_list: AccessList,
}

impl TxAccessList {
    pub(crate) fn fields_len(&self) -> usize {
        let mut len = 0;
        len += self.chain_id.length();
        len += self.nonce.length();
        len += self.gas_price.length();
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
        self.gas_price.encode(out);
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
            gas_price: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            to: Decodable::decode(buf)?,
            value: Decodable::decode(buf)?,
            input: Decodable::decode(buf)?,
            access_list: Decodable::decode(buf)?,
        })
    }
}
