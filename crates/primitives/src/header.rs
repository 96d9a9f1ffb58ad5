use crate::{keccak256, Address, BlockHash, BlockNumber, Bloom, Bytes, B256};
use corvid_rlp::{Decodable, DecodeError, Encodable, Header as RlpHeader};
use ruint::aliases::U256;

/// An Ethereum block header.
///
/// `base_fee_per_gas` is present only for blocks produced after the fee
/// market activation; headers before that encode fifteen fields.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Header {
    /// Hash of the parent block.
    pub parent_hash: BlockHash,
    /// Hash of the ommers list.
    pub ommers_hash: B256,
    /// Address collecting the priority fees of this block.
    pub beneficiary: Address,
    /// State trie root after executing this block.
    pub state_root: B256,
    /// Trie root of the block's transactions.
    pub transactions_root: B256,
    /// Trie root of the block's receipts.
    pub receipts_root: B256,
    /// Bloom filter over the logs of the block.
    pub logs_bloom: Bloom,
    /// Proof-of-work difficulty.
    pub difficulty: U256,
    /// Block height.
    pub number: BlockNumber,
    /// Gas limit of the block.
    pub gas_limit: u64,
    /// Gas consumed by the block's transactions.
    pub gas_used: u64,
    /// Unix timestamp of the block.
    pub timestamp: u64,
    /// Arbitrary producer-supplied data.
    pub extra_data: Bytes,
    /// Proof-of-work mix digest.
    pub mix_hash: B256,
    /// Proof-of-work nonce, an opaque 8-byte value.
    pub nonce: u64,
    /// Protocol-set per-gas base fee, burned rather than paid to the
    /// beneficiary. `None` before the fee market activation.
    pub base_fee_per_gas: Option<u64>,
}

impl Default for Header {
    fn default() -> Self {
        Self {
            parent_hash: B256::ZERO,
            ommers_hash: B256::ZERO,
            beneficiary: Address::ZERO,
            state_root: B256::ZERO,
            transactions_root: B256::ZERO,
            receipts_root: B256::ZERO,
            logs_bloom: Bloom::ZERO,
            difficulty: U256::ZERO,
            number: 0,
            gas_limit: 0,
            gas_used: 0,
            timestamp: 0,
            extra_data: Bytes::new(),
            mix_hash: B256::ZERO,
            nonce: 0,
            base_fee_per_gas: None,
        }
    }
}

impl Header {
    /// The keccak-256 hash of the RLP encoded header.
    pub fn hash(&self) -> BlockHash {
        let mut out = Vec::with_capacity(self.length());
        self.encode(&mut out);
        keccak256(&out)
    }

    fn payload_length(&self) -> usize {
        let mut length = 0;
        length += self.parent_hash.length();
        length += self.ommers_hash.length();
        length += self.beneficiary.length();
        length += self.state_root.length();
        length += self.transactions_root.length();
        length += self.receipts_root.length();
        length += self.logs_bloom.length();
        length += self.difficulty.length();
        length += self.number.length();
        length += self.gas_limit.length();
        length += self.gas_used.length();
        length += self.timestamp.length();
        length += self.extra_data.length();
        length += self.mix_hash.length();
        length += self.nonce.to_be_bytes().length();
        if let Some(base_fee) = self.base_fee_per_gas {
            length += base_fee.length();
        }
        length
    }
}

impl Encodable for Header {
    fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
        RlpHeader { list: true, payload_length: self.payload_length() }.encode(out);
        self.parent_hash.encode(out);
        self.ommers_hash.encode(out);
        self.beneficiary.encode(out);
        self.state_root.encode(out);
        self.transactions_root.encode(out);
        self.receipts_root.encode(out);
        self.logs_bloom.encode(out);
        self.difficulty.encode(out);
        self.number.encode(out);
        self.gas_limit.encode(out);
        self.gas_used.encode(out);
        self.timestamp.encode(out);
        self.extra_data.encode(out);
        self.mix_hash.encode(out);
        // the nonce is an opaque 8-byte string, not a scalar
        self.nonce.to_be_bytes().encode(out);
        if let Some(base_fee) = self.base_fee_per_gas {
            base_fee.encode(out);
        }
    }

    fn length(&self) -> usize {
        let payload_length = self.payload_length();
        payload_length + RlpHeader { list: true, payload_length }.length()
    }
}

impl Decodable for Header {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let rlp_header = RlpHeader::decode(buf)?;
        if !rlp_header.list {
            return Err(DecodeError::UnexpectedString)
        }
        let started_len = buf.len();

        let mut this = Self {
            parent_hash: Decodable::decode(buf)?,
            ommers_hash: Decodable::decode(buf)?,
            beneficiary: Decodable::decode(buf)?,
            state_root: Decodable::decode(buf)?,
            transactions_root: Decodable::decode(buf)?,
            receipts_root: Decodable::decode(buf)?,
            logs_bloom: Decodable::decode(buf)?,
            difficulty: Decodable::decode(buf)?,
            number: Decodable::decode(buf)?,
            gas_limit: Decodable::decode(buf)?,
            gas_used: Decodable::decode(buf)?,
            timestamp: Decodable::decode(buf)?,
            extra_data: Decodable::decode(buf)?,
            mix_hash: Decodable::decode(buf)?,
            nonce: u64::from_be_bytes(<[u8; 8]>::decode(buf)?),
            base_fee_per_gas: None,
        };

        let consumed = started_len - buf.len();
        if consumed < rlp_header.payload_length {
            this.base_fee_per_gas = Some(u64::decode(buf)?);
        }
        if started_len - buf.len() != rlp_header.payload_length {
            return Err(DecodeError::Custom("list length mismatch"))
        }
        Ok(this)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header {
            parent_hash: B256([1; 32]),
            ommers_hash: B256([2; 32]),
            beneficiary: Address([3; 20]),
            state_root: B256([4; 32]),
            transactions_root: B256([5; 32]),
            receipts_root: B256([6; 32]),
            logs_bloom: Bloom::ZERO,
            difficulty: U256::from(0x020000u64),
            number: 1,
            gas_limit: 5000,
            gas_used: 21000,
            timestamp: 1_438_269_988,
            extra_data: Bytes::from(vec![0x42]),
            mix_hash: B256([7; 32]),
            nonce: 0x539,
            base_fee_per_gas: None,
        }
    }

    #[test]
    fn roundtrip_pre_fee_market() {
        let header = header();
        let mut out = Vec::new();
        header.encode(&mut out);
        assert_eq!(out.len(), header.length());
        assert_eq!(Header::decode(&mut out.as_slice()).unwrap(), header);
    }

    #[test]
    fn roundtrip_with_base_fee() {
        let header = Header { base_fee_per_gas: Some(7), number: 12_965_000, ..header() };
        let mut out = Vec::new();
        header.encode(&mut out);
        let decoded = Header::decode(&mut out.as_slice()).unwrap();
        assert_eq!(decoded.base_fee_per_gas, Some(7));
        assert_eq!(decoded, header);
    }

    #[test]
    fn hash_commits_to_base_fee() {
        let without = header();
        let with = Header { base_fee_per_gas: Some(7), ..header() };
        assert_ne!(without.hash(), with.hash());
    }
}
