//! Proof-of-work mining and block-assembly core.
//!
//! This crate provides pure implementations of:
//! - SHA-256 block hashing and order-sensitive Merkle roots
//! - Pluggable difficulty and mining-award policies
//! - Pending-transaction filtering (per-transaction validity plus
//!   intra-batch double-spend rejection)
//! - Candidate block assembly with the coinbase appended last
//! - The cancellable nonce search and mined-block verification
//!
//! The ledger, transaction pool and transaction checker are external
//! collaborators consumed through the traits defined here.

pub mod assemble;
pub mod award;
pub mod block;
pub mod difficulty;
pub mod error;
pub mod filter;
pub mod hash;
pub mod merkle;
pub mod pow;
pub mod transaction;

pub use assemble::{extract_mine_award, BlockAssembler};
pub use award::{AwardPolicy, HalvingAward};
pub use block::{Block, CandidateBlock, FIRST_BLOCK_HEIGHT, GENESIS_PREVIOUS_HASH};
pub use difficulty::{
    difficulty_target, hash_meets_difficulty, DifficultyPolicy, FixedDifficulty, StepDifficulty,
};
pub use error::{CoreError, ValidationError};
pub use filter::{PendingTransactionFilter, TransactionValidator};
pub use hash::{digest_hex, sha256, Digest, ZERO_DIGEST};
pub use merkle::merkle_root;
pub use pow::{is_hash_success, is_mined_block_success, CancelFlag, MineOutcome, ProofOfWorkSearch};
pub use transaction::{
    Amount, PublicKey, Transaction, TransactionInput, TransactionKind, TransactionOutput, UtxoRef,
};
