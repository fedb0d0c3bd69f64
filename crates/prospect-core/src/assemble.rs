//! Candidate block assembly and coinbase handling.

use std::sync::Arc;

use crate::award::AwardPolicy;
use crate::block::{current_timestamp, Block, CandidateBlock, FIRST_BLOCK_HEIGHT, GENESIS_PREVIOUS_HASH};
use crate::error::CoreError;
use crate::transaction::{Amount, PublicKey, Transaction};

/// Builds unmined candidate blocks from a filtered transaction batch,
/// appending the coinbase transaction that pays the configured miner.
pub struct BlockAssembler {
    award: Arc<dyn AwardPolicy>,
    miner_key: PublicKey,
}

impl BlockAssembler {
    pub fn new(award: Arc<dyn AwardPolicy>, miner_key: PublicKey) -> Self {
        BlockAssembler { award, miner_key }
    }

    /// Assemble the candidate for the next block after `last` (the
    /// genesis candidate when `last` is `None`), stamped with the
    /// current time.
    ///
    /// The award is computed over the filtered, pre-coinbase batch;
    /// the coinbase is appended as the final transaction before the
    /// Merkle root is fixed.
    pub fn create_packing_block(
        &self,
        last: Option<&Block>,
        filtered: Vec<Transaction>,
    ) -> CandidateBlock {
        self.create_packing_block_at(last, filtered, current_timestamp())
    }

    /// Same as [`create_packing_block`](Self::create_packing_block)
    /// with an explicit timestamp.
    pub fn create_packing_block_at(
        &self,
        last: Option<&Block>,
        filtered: Vec<Transaction>,
        timestamp: u64,
    ) -> CandidateBlock {
        let (height, previous_hash) = match last {
            Some(block) => (block.height() + 1, *block.hash()),
            None => (FIRST_BLOCK_HEIGHT, GENESIS_PREVIOUS_HASH),
        };

        let coinbase = self.create_mine_award_transaction(height, &filtered);

        let mut transactions = filtered;
        transactions.push(coinbase);

        CandidateBlock::new(height, previous_hash, transactions, timestamp)
    }

    /// The coinbase transaction for a block at `height` packing
    /// `packed`: no inputs, one output paying the miner key the
    /// policy's award.
    pub fn create_mine_award_transaction(
        &self,
        height: u64,
        packed: &[Transaction],
    ) -> Transaction {
        let award = self.award.mine_award(height, packed);
        Transaction::coinbase(height, self.miner_key.clone(), award)
    }

    /// Recompute the expected award from the block's non-coinbase
    /// transactions and compare with the award the block embeds.
    ///
    /// Returns `true` when the embedded award is WRONG. (The original
    /// implementation exposed this polarity under a name that read
    /// like the opposite; the behavior is kept, the name is not.)
    pub fn award_mismatch_detected(&self, block: &Block) -> Result<bool, CoreError> {
        let packed: Vec<Transaction> = block
            .transactions()
            .iter()
            .filter(|tx| !tx.is_coinbase())
            .cloned()
            .collect();

        let expected = self.award.mine_award(block.height(), &packed);
        let embedded = extract_mine_award(block)?;
        Ok(expected != embedded)
    }
}

/// The award a block actually embeds: the single output value of its
/// one coinbase transaction.
///
/// A missing coinbase, a duplicate coinbase or a coinbase without an
/// output is a data-integrity error, surfaced to the caller.
pub fn extract_mine_award(block: &Block) -> Result<Amount, CoreError> {
    let height = block.height();
    let mut coinbases = block.transactions().iter().filter(|tx| tx.is_coinbase());

    let coinbase = coinbases
        .next()
        .ok_or(CoreError::MissingCoinbase { height })?;
    if coinbases.next().is_some() {
        return Err(CoreError::DuplicateCoinbase { height });
    }

    coinbase
        .outputs
        .first()
        .map(|output| output.amount)
        .ok_or(CoreError::MissingAwardOutput { height })
}
