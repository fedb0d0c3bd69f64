//! Block model: the mutable mining candidate and the sealed block.
//!
//! The two states are distinct types on purpose. A [`CandidateBlock`]
//! exists only while the proof-of-work search is varying its nonce;
//! the only way to obtain a [`Block`] is [`CandidateBlock::seal`],
//! which freezes the header hash, so a mined block cannot be mutated
//! afterwards.

use serde::{Deserialize, Serialize};

use crate::hash::{block_hash, Digest, ZERO_DIGEST};
use crate::merkle::merkle_root;
use crate::transaction::Transaction;

/// Height of the first block in a chain.
pub const FIRST_BLOCK_HEIGHT: u64 = 0;

/// Previous-hash recorded by the first block, which has no parent.
pub const GENESIS_PREVIOUS_HASH: Digest = ZERO_DIGEST;

/// An assembled but not yet mined block. The nonce (and therefore the
/// header hash) is still in flux.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBlock {
    pub height: u64,
    pub previous_hash: Digest,
    pub transactions: Vec<Transaction>,
    pub merkle_root: Digest,
    pub timestamp: u64,
    pub nonce: u64,
}

impl CandidateBlock {
    /// Assemble a candidate over an already-final transaction list.
    /// The Merkle root is fixed here; only the nonce varies afterwards.
    pub fn new(
        height: u64,
        previous_hash: Digest,
        transactions: Vec<Transaction>,
        timestamp: u64,
    ) -> Self {
        let merkle_root = merkle_root(&transactions);
        CandidateBlock {
            height,
            previous_hash,
            transactions,
            merkle_root,
            timestamp,
            nonce: 0,
        }
    }

    /// Hash of the candidate's header at its current nonce.
    pub fn header_hash(&self) -> Digest {
        block_hash(
            &self.previous_hash,
            self.height,
            &self.merkle_root,
            self.timestamp,
            self.nonce,
        )
    }

    /// Freeze the candidate into an immutable mined block, stamping
    /// the header hash at the current nonce.
    pub fn seal(self) -> Block {
        let hash = self.header_hash();
        Block {
            height: self.height,
            previous_hash: self.previous_hash,
            transactions: self.transactions,
            merkle_root: self.merkle_root,
            timestamp: self.timestamp,
            nonce: self.nonce,
            hash,
        }
    }
}

/// A mined, immutable block. Constructed only by sealing a candidate
/// (or deserialized from a peer, in which case nothing is trusted
/// until it passes mined-block verification).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    height: u64,
    previous_hash: Digest,
    transactions: Vec<Transaction>,
    merkle_root: Digest,
    timestamp: u64,
    nonce: u64,
    hash: Digest,
}

impl Block {
    pub fn height(&self) -> u64 {
        self.height
    }

    pub fn previous_hash(&self) -> &Digest {
        &self.previous_hash
    }

    pub fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    pub fn merkle_root(&self) -> &Digest {
        &self.merkle_root
    }

    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// The stored header hash, fixed at seal time.
    pub fn hash(&self) -> &Digest {
        &self.hash
    }

    /// Recompute the header hash from the stored fields. Verification
    /// compares this against [`Block::hash`].
    pub fn computed_hash(&self) -> Digest {
        block_hash(
            &self.previous_hash,
            self.height,
            &self.merkle_root,
            self.timestamp,
            self.nonce,
        )
    }
}

/// Current Unix timestamp in seconds.
pub fn current_timestamp() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::Transaction;

    fn candidate() -> CandidateBlock {
        let coinbase = Transaction::coinbase(FIRST_BLOCK_HEIGHT, "miner".into(), 50);
        CandidateBlock::new(
            FIRST_BLOCK_HEIGHT,
            GENESIS_PREVIOUS_HASH,
            vec![coinbase],
            1_700_000_000,
        )
    }

    #[test]
    fn test_merkle_root_fixed_at_assembly() {
        let block = candidate();
        assert_eq!(block.merkle_root, merkle_root(&block.transactions));
    }

    #[test]
    fn test_nonce_changes_header_hash() {
        let mut block = candidate();
        let before = block.header_hash();
        block.nonce += 1;
        assert_ne!(before, block.header_hash());
    }

    #[test]
    fn test_seal_stamps_current_hash() {
        let mut block = candidate();
        block.nonce = 1234;
        let expected = block.header_hash();

        let sealed = block.seal();
        assert_eq!(*sealed.hash(), expected);
        assert_eq!(sealed.computed_hash(), expected);
        assert_eq!(sealed.nonce(), 1234);
    }

    #[test]
    fn test_sealed_block_round_trips_serde() {
        let sealed = candidate().seal();
        let json = serde_json::to_string(&sealed).unwrap();
        let back: Block = serde_json::from_str(&json).unwrap();
        assert_eq!(sealed, back);
    }
}
