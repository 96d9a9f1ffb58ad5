use corvid_primitives::{BlockNumber, B256};
use corvid_rlp::{Decodable, DecodeError, Encodable, Header};
use crc32fast::Hasher;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

/// The rolling CRC-32 over the genesis hash and the big-endian bytes of every
/// past fork block, rendered as the big-endian bytes of the checksum.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForkHash(pub [u8; 4]);

impl fmt::Debug for ForkHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl From<B256> for ForkHash {
    fn from(genesis: B256) -> Self {
        let mut hasher = Hasher::new();
        hasher.update(genesis.as_slice());
        Self(hasher.finalize().to_be_bytes())
    }
}

impl Encodable for ForkHash {
    fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
        self.0.encode(out)
    }

    fn length(&self) -> usize {
        self.0.length()
    }
}

impl Decodable for ForkHash {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        Ok(Self(<[u8; 4]>::decode(buf)?))
    }
}

/// The fork identifier sent at handshake: the checksum of the fork history
/// the peer follows and the next fork block it knows about (zero when none
/// is scheduled).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForkId {
    /// CRC-32 snapshot of the peer's past forks.
    pub hash: ForkHash,
    /// Block number of the peer's next known fork, 0 for none.
    pub next: BlockNumber,
}

impl Encodable for ForkId {
    fn encode(&self, out: &mut dyn corvid_rlp::BufMut) {
        let payload_length = self.hash.length() + self.next.length();
        Header { list: true, payload_length }.encode(out);
        self.hash.encode(out);
        self.next.encode(out);
    }

    fn length(&self) -> usize {
        let payload_length = self.hash.length() + self.next.length();
        payload_length + Header { list: true, payload_length }.length()
    }
}

impl Decodable for ForkId {
    fn decode(buf: &mut &[u8]) -> Result<Self, DecodeError> {
        let header = Header::decode(buf)?;
        if !header.list {
            return Err(DecodeError::UnexpectedString)
        }
        let started_len = buf.len();
        let this = Self { hash: Decodable::decode(buf)?, next: Decodable::decode(buf)? };
        if started_len - buf.len() != header.payload_length {
            return Err(DecodeError::Custom("list length mismatch"))
        }
        Ok(this)
    }
}

/// A remote fork id that cannot belong to the same chain configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// The remote matched one of our past snapshots but announced a
    /// different following fork than the one we activated.
    #[error("remote is stale: local fork id {local:?}, remote fork id {remote:?}")]
    RemoteStale {
        /// Our current fork id.
        local: ForkId,
        /// The fork id the remote sent.
        remote: ForkId,
    },
    /// The remote checksum matches no snapshot of our fork history.
    #[error("incompatible or stale chain: local fork id {local:?}, remote fork id {remote:?}")]
    LocalIncompatibleOrStale {
        /// Our current fork id.
        local: ForkId,
        /// The fork id the remote sent.
        remote: ForkId,
    },
}

/// Tracks the local fork history and head, produces the local [`ForkId`] and
/// validates remote ones.
///
/// Snapshots are computed once at construction: the entry at key zero covers
/// the span from genesis to the first fork, and each fork block keys the
/// snapshot that becomes active at that block.
#[derive(Debug, Clone)]
pub struct ForkFilter {
    /// Fork activation block to the snapshot active from that block on.
    forks: BTreeMap<BlockNumber, ForkHash>,
    /// The current local chain head.
    head: BlockNumber,
}

impl ForkFilter {
    /// Creates a filter from the genesis hash and the ordered fork blocks,
    /// positioned at `head`.
    ///
    /// Duplicate fork blocks and a fork at block zero are ignored, matching
    /// the convention that genesis itself is not a fork.
    pub fn new(
        head: BlockNumber,
        genesis: B256,
        forks: impl IntoIterator<Item = BlockNumber>,
    ) -> Self {
        let fork_blocks =
            forks.into_iter().filter(|block| *block != 0).collect::<BTreeSet<_>>();

        let mut hasher = Hasher::new();
        hasher.update(genesis.as_slice());

        let mut fork_hashes = BTreeMap::new();
        fork_hashes.insert(0, snapshot(&hasher));
        for block in fork_blocks {
            hasher.update(&block.to_be_bytes());
            fork_hashes.insert(block, snapshot(&hasher));
        }

        Self { forks: fork_hashes, head }
    }

    /// Advances (or rewinds) the local head.
    pub fn set_head(&mut self, head: BlockNumber) {
        self.head = head;
    }

    /// The current local head.
    pub const fn head(&self) -> BlockNumber {
        self.head
    }

    /// The fork id describing the local chain at the current head.
    pub fn current(&self) -> ForkId {
        let (_, hash) = self.active_entry();
        ForkId { hash: *hash, next: self.next_fork_block().unwrap_or(0) }
    }

    /// Validates a remote fork id against the local fork history.
    ///
    /// The ruleset follows EIP-2124:
    /// 1. matching the locally active snapshot means both peers follow the
    ///    same rules right now;
    /// 2. matching a past snapshot is fine while the remote is syncing, but
    ///    only if it also knows about the fork we activated next;
    /// 3. matching a future snapshot means we are the one syncing;
    /// 4. everything else is a different chain configuration.
    pub fn validate(&self, remote: ForkId) -> Result<(), ValidationError> {
        let (active_block, active_hash) = self.active_entry();
        if remote.hash == *active_hash {
            return Ok(())
        }

        if let Some((matched_block, _)) =
            self.forks.iter().find(|(_, hash)| **hash == remote.hash)
        {
            if *matched_block < *active_block {
                // remote is behind us; it must at least know about the fork
                // that ended the snapshot it reports
                let following = self
                    .forks
                    .range(matched_block + 1..)
                    .next()
                    .map(|(block, _)| *block)
                    .expect("a past snapshot is always followed by a fork");
                if remote.next == following {
                    return Ok(())
                }
                return Err(ValidationError::RemoteStale { local: self.current(), remote })
            }
            // remote matched a snapshot we have not reached yet
            return Ok(())
        }

        Err(ValidationError::LocalIncompatibleOrStale { local: self.current(), remote })
    }

    /// The entry whose snapshot is active at the current head.
    fn active_entry(&self) -> (&BlockNumber, &ForkHash) {
        self.forks.range(..=self.head).next_back().expect("the genesis entry always exists")
    }

    /// The first fork block past the current head.
    fn next_fork_block(&self) -> Option<BlockNumber> {
        self.forks.range(self.head + 1..).next().map(|(block, _)| *block)
    }
}

fn snapshot(hasher: &Hasher) -> ForkHash {
    ForkHash(hasher.clone().finalize().to_be_bytes())
}
