//! The transaction model and its wire codec.
//!
//! A [`TransactionSigned`] is transmitted either as a plain RLP list (legacy)
//! or as a typed envelope `type_byte || rlp(payload)`. The canonical hash of
//! a transaction is the keccak-256 of exactly those envelope bytes.

mod access_list;
mod fee_market;
mod legacy;
mod signature;
mod tx_type;
pub mod util;

use crate::{keccak256, Address, Bytes, ChainId, TxHash, B256, U256};
pub use access_list::{AccessList, AccessListItem, TxAccessList};
use bytes::Buf;
use corvid_rlp::{
    Decodable, DecodeError, Encodable, Header, EMPTY_LIST_CODE, EMPTY_STRING_CODE,
};
pub use fee_market::TxFeeMarket;
pub use legacy::TxLegacy;
pub use signature::Signature;
use std::{ops::Deref, sync::OnceLock};
pub use tx_type::TxType;

/// An unsigned transaction, one arm per envelope type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Transaction {
    /// Untyped transaction, optionally replay protected.
    Legacy(TxLegacy),
    /// Access-list transaction, envelope type `0x01`.
    AccessList(TxAccessList),
    /// Fee-market transaction, envelope type `0x02`.
    FeeMarket(TxFeeMarket),
}

impl Transaction {
    /// The envelope type of this transaction.
    pub const fn tx_type(&self) -> TxType {
        match self {
            Transaction::Legacy(_) => TxType::Legacy,
            Transaction::AccessList(_) => TxType::AccessList,
            Transaction::FeeMarket(_) => TxType::FeeMarket,
        }
    }

    /// The chain id, if the transaction is bound to one.
    pub const fn chain_id(&self) -> Option<ChainId> {
        match self {
            Transaction::Legacy(tx) => tx.chain_id,
            Transaction::AccessList(tx) => Some(tx.chain_id),
            Transaction::FeeMarket(tx) => Some(tx.chain_id),
        }
    }

    /// The sender nonce.
    pub const fn nonce(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.nonce,
            Transaction::AccessList(tx) => tx.nonce,
            Transaction::FeeMarket(tx) => tx.nonce,
        }
    }

    /// The gas limit.
    pub const fn gas_limit(&self) -> u64 {
        match self {
            Transaction::Legacy(tx) => tx.gas_limit,
            Transaction::AccessList(tx) => tx.gas_limit,
            Transaction::FeeMarket(tx) => tx.gas_limit,
        }
    }

    /// The recipient, or [`TransactionKind::Create`] for contract creation.
    pub const fn kind(&self) -> &TransactionKind {
        match self {
            Transaction::Legacy(tx) => &tx.to,
            Transaction::AccessList(tx) => &tx.to,
            Transaction::FeeMarket(tx) => &tx.to,
        }
    }

    /// The recipient address, `None` for contract creation.
    pub const fn to(&self) -> Option<Address> {
        self.kind().to()
    }

    /// The transferred value in Wei.
    pub const fn value(&self) -> U256 {
        match self {
            Transaction::Legacy(tx) => tx.value,
            Transaction::AccessList(tx) => tx.value,
            Transaction::FeeMarket(tx) => tx.value,
        }
    }

    /// The call data or initialization code.
    pub const fn input(&self) -> &Bytes {
        match self {
            Transaction::Legacy(tx) => &tx.input,
            Transaction::AccessList(tx) => &tx.input,
            Transaction::FeeMarket(tx) => &tx.input,
        }
    }

    /// The access list, for transaction types that carry one.
    pub const fn access_list(&self) -> Option<&AccessList> {
        match self {
            Transaction::Legacy(_) => None,
            Transaction::AccessList(tx) => Some(&tx.access_list),
            Transaction::FeeMarket(tx) => Some(&tx.access_list),
        }
    }

    /// The fixed gas price, `None` for fee-market transactions.
    pub const fn gas_price(&self) -> Option<u128> {
        match self {
            Transaction::Legacy(tx) => Some(tx.gas_price),
            Transaction::AccessList(tx) => Some(tx.gas_price),
            Transaction::FeeMarket(_) => None,
        }
    }

    /// The maximum total fee per gas the sender will pay. For fixed-price
    /// transactions this is the gas price itself.
    pub const fn max_fee_per_gas(&self) -> u128 {
        match self {
            Transaction::Legacy(tx) => tx.gas_price,
            Transaction::AccessList(tx) => tx.gas_price,
            Transaction::FeeMarket(tx) => tx.max_fee_per_gas,
        }
    }

    /// The priority fee bid, `None` for fixed-price transactions.
    pub const fn max_priority_fee_per_gas(&self) -> Option<u128> {
        match self {
            Transaction::Legacy(_) | Transaction::AccessList(_) => None,
            Transaction::FeeMarket(tx) => Some(tx.max_priority_fee_per_gas),
        }
    }

    /// Heavy operation that hashes the signing payload of this transaction.
    ///
    /// The payload depends on the variant: legacy transactions hash their
    /// field list (with the EIP-155 tail when replay protected), typed
    /// transactions hash the type byte followed by their field list.
    pub fn signature_hash(&self) -> B256 {
        let mut buf = Vec::new();
        match self {
            Transaction::Legacy(tx) => {
                let payload_length = tx.fields_len() + tx.eip155_fields_len();
                Header { list: true, payload_length }.encode(&mut buf);
                tx.encode_fields(&mut buf);
                tx.encode_eip155_fields(&mut buf);
            }
            Transaction::AccessList(tx) => {
                buf.push(1);
                Header { list: true, payload_length: tx.fields_len() }.encode(&mut buf);
                tx.encode_fields(&mut buf);
            }
            Transaction::FeeMarket(tx) => {
                buf.push(2);
                Header { list: true, payload_length: tx.fields_len() }.encode(&mut buf);
                tx.encode_fields(&mut buf);
            }
        }
        keccak256(&buf)
    }
}

/// Whether or not the transaction is a contract creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TransactionKind {
    /// A transaction that creates a contract.
    #[default]
    Create,
    /// A transaction that calls a contract or transfers value.
    Call(Address),
}

impl TransactionKind {
    /// The call target, `None` for creation.
    pub const fn to(&self) -> Option<Address> {
        match self {
            TransactionKind::Create => None,
            TransactionKind::Call(to) => Some(*to),
        }
    }

    /// True for contract creation.
    pub const fn is_create(&self) -> bool {
        matches!(self, TransactionKind::Create)
    }
}

impl Encodable for TransactionKind {
    fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
        match self {
            TransactionKind::Call(to) => to.encode(out),
            // contract creation is denoted by the empty byte string
            TransactionKind::Create => out.put_u8(EMPTY_STRING_CODE),
        }
    }

    fn length(&self) -> usize {
        match self {
            TransactionKind::Call(to) => to.length(),
            TransactionKind::Create => 1,
        }
    }
}

impl Decodable for TransactionKind {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        if let Some(&first) = buf.first() {
            if first == EMPTY_STRING_CODE {
                buf.advance(1);
                Ok(TransactionKind::Create)
            } else {
                let addr = <Address as Decodable>::decode(buf)?;
                Ok(TransactionKind::Call(addr))
            }
        } else {
            Err(DecodeError::InputTooShort)
        }
    }
}

/// A signed transaction with its canonical hash and memoized sender.
///
/// The hash is computed eagerly from the envelope encoding; the sender is
/// recovered on first use and cached, which is safe to share across threads
/// because it is a pure function of the immutable fields.
#[derive(Debug, Clone)]
pub struct TransactionSigned {
    transaction: Transaction,
    signature: Signature,
    hash: TxHash,
    sender: OnceLock<Address>,
}

impl PartialEq for TransactionSigned {
    fn eq(&self, other: &Self) -> bool {
        self.hash == other.hash
    }
}

impl Eq for TransactionSigned {}

impl std::hash::Hash for TransactionSigned {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.hash.hash(state)
    }
}

impl AsRef<Transaction> for TransactionSigned {
    fn as_ref(&self) -> &Transaction {
        &self.transaction
    }
}

impl Deref for TransactionSigned {
    type Target = Transaction;

    fn deref(&self) -> &Self::Target {
        &self.transaction
    }
}

impl TransactionSigned {
    /// Creates a signed transaction, computing the canonical hash from the
    /// envelope encoding.
    pub fn from_transaction_and_signature(transaction: Transaction, signature: Signature) -> Self {
        let mut this =
            Self { transaction, signature, hash: TxHash::ZERO, sender: OnceLock::new() };
        let mut buf = Vec::with_capacity(this.length());
        this.encode(&mut buf);
        this.hash = keccak256(&buf);
        this
    }

    /// The canonical transaction hash, used to identify the transaction.
    pub const fn hash(&self) -> TxHash {
        self.hash
    }

    /// The transaction signature.
    pub const fn signature(&self) -> &Signature {
        &self.signature
    }

    /// The unsigned transaction.
    pub const fn transaction(&self) -> &Transaction {
        &self.transaction
    }

    /// Recovers the sender address, enforcing the low-s rule, and caches the
    /// result. Returns `None` if recovery is impossible or the signature is
    /// malleable.
    pub fn recover_signer(&self) -> Option<Address> {
        if let Some(sender) = self.sender.get() {
            return Some(*sender)
        }
        let sender = self.signature.recover_signer(self.signature_hash())?;
        Some(*self.sender.get_or_init(|| sender))
    }

    /// Recovers the sender address without the low-s check. The result is
    /// not cached.
    pub fn recover_signer_unchecked(&self) -> Option<Address> {
        self.signature.recover_signer_unchecked(self.signature_hash())
    }
}

impl Encodable for TransactionSigned {
    fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
        match &self.transaction {
            Transaction::Legacy(tx) => {
                let payload_length = tx.fields_len() +
                    self.signature.payload_len_with_eip155_chain_id(tx.chain_id);
                Header { list: true, payload_length }.encode(out);
                tx.encode_fields(out);
                self.signature.encode_with_eip155_chain_id(out, tx.chain_id);
            }
            Transaction::AccessList(tx) => {
                out.put_u8(1);
                let payload_length = tx.fields_len() + self.signature.payload_len();
                Header { list: true, payload_length }.encode(out);
                tx.encode_fields(out);
                self.signature.encode_inner(out);
            }
            Transaction::FeeMarket(tx) => {
                out.put_u8(2);
                let payload_length = tx.fields_len() + self.signature.payload_len();
                Header { list: true, payload_length }.encode(out);
                tx.encode_fields(out);
                self.signature.encode_inner(out);
            }
        }
    }

    fn length(&self) -> usize {
        match &self.transaction {
            Transaction::Legacy(tx) => {
                let payload_length = tx.fields_len() +
                    self.signature.payload_len_with_eip155_chain_id(tx.chain_id);
                payload_length + Header { list: true, payload_length }.length()
            }
            Transaction::AccessList(tx) => {
                let payload_length = tx.fields_len() + self.signature.payload_len();
                1 + payload_length + Header { list: true, payload_length }.length()
            }
            Transaction::FeeMarket(tx) => {
                let payload_length = tx.fields_len() + self.signature.payload_len();
                1 + payload_length + Header { list: true, payload_length }.length()
            }
        }
    }
}

/// Decodes a transaction envelope: a plain list is a legacy transaction,
/// anything else is a one-byte type discriminator followed by the typed
/// payload list.
impl Decodable for TransactionSigned {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let original = *buf;
        let first = *buf.first().ok_or(DecodeError::InputTooShort)?;

        let (transaction, signature) = if first >= EMPTY_LIST_CODE {
            let header = Header::decode(buf)?;
            let started_len = buf.len();

            let mut tx = TxLegacy::decode_fields(buf)?;
            let (signature, chain_id) = Signature::decode_with_eip155_chain_id(buf)?;
            tx.chain_id = chain_id;

            if started_len - buf.len() != header.payload_length {
                return Err(DecodeError::Custom("list length mismatch"))
            }
            (Transaction::Legacy(tx), signature)
        } else {
            buf.advance(1);
            let header = Header::decode(buf)?;
            if !header.list {
                return Err(DecodeError::UnexpectedString)
            }
            let started_len = buf.len();

            let (transaction, signature) = match first {
                1 => {
                    let tx = TxAccessList::decode_fields(buf)?;
                    (Transaction::AccessList(tx), Signature::decode_inner(buf)?)
                }
                2 => {
                    let tx = TxFeeMarket::decode_fields(buf)?;
                    (Transaction::FeeMarket(tx), Signature::decode_inner(buf)?)
                }
                _ => return Err(DecodeError::Custom("unsupported transaction type")),
            };

            if started_len - buf.len() != header.payload_length {
                return Err(DecodeError::Custom("list length mismatch"))
            }
            (transaction, signature)
        };

        let consumed = original.len() - buf.len();
        let hash = keccak256(&original[..consumed]);
        Ok(Self { transaction, signature, hash, sender: OnceLock::new() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hex_literal::hex;
    use std::str::FromStr;

    fn simple_legacy(chain_id: Option<ChainId>) -> TxLegacy {
        TxLegacy {
            chain_id,
            nonce: 0,
            gas_price: 1,
            gas_limit: 21000,
            to: TransactionKind::Call(Address([0x35; 20])),
            value: U256::from(1_000_000_000u64),
            input: Bytes::new(),
        }
    }

    fn realistic_signature() -> Signature {
        Signature {
            r: U256::from_be_bytes(hex!(
                "28ef61340bd939bc2195fe537567866003e1a15d3c71ff63e1590620aa636276"
            )),
            s: U256::from_be_bytes(hex!(
                "67cbe9d8997f761aecb703304b3800ccf555c9f3dc64214b297fb1966a3b6d83"
            )),
            odd_y_parity: false,
        }
    }

    #[test]
    fn legacy_unprotected_roundtrip() {
        let tx = TransactionSigned::from_transaction_and_signature(
            Transaction::Legacy(simple_legacy(None)),
            realistic_signature(),
        );

        let mut encoded = Vec::new();
        tx.encode(&mut encoded);
        assert_eq!(encoded.len(), tx.length());
        // short fields plus two 32-byte signature scalars: long-form list
        assert_eq!(encoded[0], 0xf8);
        // v = 27 sits right between the six fields and r
        assert!(encoded.contains(&27));

        let decoded = TransactionSigned::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded.chain_id(), None);
        assert!(!decoded.signature().odd_y_parity);
        assert_eq!(decoded, tx);

        let mut reencoded = Vec::new();
        decoded.encode(&mut reencoded);
        assert_eq!(reencoded, encoded);
    }

    #[test]
    fn legacy_eip155_roundtrip() {
        let tx = TransactionSigned::from_transaction_and_signature(
            Transaction::Legacy(simple_legacy(Some(1))),
            realistic_signature(),
        );

        let mut encoded = Vec::new();
        tx.encode(&mut encoded);
        // v = 0 + 1 * 2 + 35
        assert!(encoded.contains(&37));

        let decoded = TransactionSigned::decode(&mut encoded.as_slice()).unwrap();
        assert_eq!(decoded.chain_id(), Some(1));
        assert!(!decoded.signature().odd_y_parity);

        let mut reencoded = Vec::new();
        decoded.encode(&mut reencoded);
        assert_eq!(reencoded, encoded);
    }

    #[test]
    fn eip155_signing_hash_example() {
        // the canonical replay-protection example: signing payload
        // rlp([9, 20 gwei, 21000, 0x3535..35, 10^18, "", 1, 0, 0])
        let tx = Transaction::Legacy(TxLegacy {
            chain_id: Some(1),
            nonce: 9,
            gas_price: 20_000_000_000,
            gas_limit: 21000,
            to: TransactionKind::Call(Address([0x35; 20])),
            value: U256::from(1_000_000_000_000_000_000u64),
            input: Bytes::new(),
        });
        assert_eq!(
            tx.signature_hash(),
            B256(hex!("daf5a779ae972f972197303d7b574746c7ef83eadac0f2791ad23db92e4c8e53"))
        );

        let signature = Signature {
            r: U256::from_str(
                "18515461264373351373200002665853028612451056578545711640558177340181847433846",
            )
            .unwrap(),
            s: U256::from_str(
                "46948507304638947509940763649030358759909902576025900602547168820602576006531",
            )
            .unwrap(),
            odd_y_parity: false,
        };
        let signed = TransactionSigned::from_transaction_and_signature(tx, signature);
        assert_eq!(
            signed.recover_signer(),
            Some(Address(hex!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")))
        );
        // memoized
        assert_eq!(
            signed.recover_signer(),
            Some(Address(hex!("9d8a62f656a8d1615c1294fd71e9cfb3e4855a4f")))
        );
    }

    #[test]
    fn recover_signer_legacy() {
        let signer = Address(hex!("398137383b3d25c92898c656696e41950e47316b"));
        let hash = B256(hex!("bb3a336e3f823ec18197f1e13ee875700f08f03e2cab75f0d0b118dabb44cba0"));

        let tx = Transaction::Legacy(TxLegacy {
            chain_id: Some(1),
            nonce: 0x18,
            gas_price: 0xfa56ea00,
            gas_limit: 119902,
            to: TransactionKind::Call(Address(hex!("06012c8cf97bead5deae237070f9587f8e7a266d"))),
            value: U256::from(0x1c6bf526340000u64),
            input: Bytes::from(hex!("f7d8c88300000000000000000000000000000000000000000000000000000000000cee6100000000000000000000000000000000000000000000000000000000000ac3e1")),
        });

        let sig = Signature {
            r: U256::from_be_bytes(hex!(
                "2a378831cf81d99a3f06a18ae1b6ca366817ab4d88a70053c41d7a8f0368e031"
            )),
            s: U256::from_be_bytes(hex!(
                "450d831a05b6e418724436c05c155e0a1b7b921015d0fbc2f667aed709ac4fb5"
            )),
            odd_y_parity: false,
        };

        let signed_tx = TransactionSigned::from_transaction_and_signature(tx, sig);
        assert_eq!(signed_tx.hash(), hash, "Expected same hash");
        assert_eq!(signed_tx.recover_signer(), Some(signer), "Recovering signer should pass.");
    }

    #[test]
    fn high_s_mainnet_transaction_is_rejected() {
        // This pre-homestead transaction has a high `s` value; recovery under
        // the low-s rule must fail while unchecked recovery succeeds.
        let raw_tx = hex!("f86d8085746a52880082520894c93f2250589a6563f5359051c1ea25746549f0d889208686e75e903bc000801ba034b6fdc33ea520e8123cf5ac4a9ff476f639cab68980cd9366ccae7aef437ea0a0e517caa5f50e27ca0d1e9a92c503b4ccb039680c6d9d0c71203ed611ea4feb33");
        let tx = TransactionSigned::decode(&mut &raw_tx[..]).unwrap();

        assert_eq!(tx.hash(), keccak256(raw_tx));
        assert!(tx.recover_signer().is_none());
        assert!(tx.recover_signer_unchecked().is_some());
    }

    #[test]
    fn typed_envelope_roundtrip_create() {
        let request = Transaction::AccessList(TxAccessList {
            chain_id: 1,
            nonce: 0,
            gas_price: 1,
            gas_limit: 2,
            to: TransactionKind::Create,
            value: U256::from(3u64),
            input: Bytes::from(vec![1, 2]),
            access_list: Default::default(),
        });
        let signature = Signature { odd_y_parity: true, r: U256::default(), s: U256::default() };
        let tx = TransactionSigned::from_transaction_and_signature(request, signature);

        let mut encoded = Vec::new();
        tx.encode(&mut encoded);
        assert_eq!(encoded.len(), tx.length());
        assert_eq!(encoded[0], 0x01);

        let decoded = TransactionSigned::decode(&mut &*encoded).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.kind(), &TransactionKind::Create);
    }

    #[test]
    fn typed_envelope_roundtrip_fee_market() {
        let request = Transaction::FeeMarket(TxFeeMarket {
            chain_id: 1,
            nonce: 26,
            max_priority_fee_per_gas: 1_500_000_000,
            max_fee_per_gas: 1_500_000_013,
            gas_limit: 21_000,
            to: TransactionKind::Call(Address(hex!("61815774383099e24810ab832a5b2a5425c154d5"))),
            value: U256::from(3_000_000_000_000_000_000u64),
            input: Bytes::new(),
            access_list: AccessList(vec![AccessListItem {
                address: Address([0xde; 20]),
                storage_keys: vec![B256::ZERO, B256([1; 32])],
            }]),
        });
        let signature = Signature {
            odd_y_parity: true,
            r: U256::from_be_bytes(hex!(
                "59e6b67f48fb32e7e570dfb11e042b5ad2e55e3ce3ce9cd989c7e06e07feeafd"
            )),
            s: U256::from_be_bytes(hex!(
                "016b83f4f980694ed2eee4d10667242b1f40dc406901b34125b008d334d47469"
            )),
        };
        let tx = TransactionSigned::from_transaction_and_signature(request, signature);

        let mut encoded = Vec::new();
        tx.encode(&mut encoded);
        assert_eq!(encoded[0], 0x02);

        let decoded = TransactionSigned::decode(&mut &*encoded).unwrap();
        assert_eq!(decoded, tx);
        assert_eq!(decoded.max_priority_fee_per_gas(), Some(1_500_000_000));
        assert_eq!(decoded.access_list().map(|list| list.storage_key_count()), Some(2));
    }

    #[test]
    fn unsupported_type_byte() {
        // type 0x03 envelope with an arbitrary payload list
        let bytes = hex!("03c0");
        assert_eq!(
            TransactionSigned::decode(&mut &bytes[..]),
            Err(DecodeError::Custom("unsupported transaction type"))
        );
    }

    #[test]
    fn trailing_garbage_inside_list_is_rejected() {
        let tx = TransactionSigned::from_transaction_and_signature(
            Transaction::Legacy(simple_legacy(None)),
            realistic_signature(),
        );
        let mut encoded = Vec::new();
        tx.encode(&mut encoded);
        // grow the declared list length and append a byte inside the list
        let payload_len = encoded[1];
        encoded[1] = payload_len + 1;
        encoded.push(0x01);
        assert!(TransactionSigned::decode(&mut encoded.as_slice()).is_err());
    }
}
