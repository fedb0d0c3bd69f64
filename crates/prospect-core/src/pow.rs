//! The proof-of-work search loop and mined-block verification.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info};

use crate::assemble::BlockAssembler;
use crate::block::Block;
use crate::difficulty::{hash_meets_difficulty, DifficultyPolicy};
use crate::filter::PendingTransactionFilter;
use crate::hash::{digest_hex, Digest};
use crate::transaction::Transaction;

/// Cooperative cancellation flag shared between the mining loop and
/// whoever wants to stop it.
///
/// A stop request is non-blocking and idempotent; it does not wait
/// for the in-flight search to actually stop. The search checks the
/// flag before every nonce and clears it when it honors a request.
#[derive(Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the current search to stop. Safe to call from any thread,
    /// any number of times.
    pub fn request_stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop request is pending.
    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Consume a pending request, if any.
    fn take(&self) -> bool {
        self.0.swap(false, Ordering::SeqCst)
    }
}

/// Terminal outcome of one mining search. Cancellation is a normal
/// outcome, not an error.
#[derive(Debug)]
pub enum MineOutcome {
    Mined(Block),
    Cancelled,
}

impl MineOutcome {
    pub fn into_block(self) -> Option<Block> {
        match self {
            MineOutcome::Mined(block) => Some(block),
            MineOutcome::Cancelled => None,
        }
    }
}

/// Whether a hash satisfies a difficulty: its first `difficulty` hex
/// characters equal the all-sentinel target string.
pub fn is_hash_success(hash: &Digest, difficulty: u32) -> bool {
    hash_meets_difficulty(hash, difficulty)
}

/// Verify a mined block with no mining-session state, so a block-sync
/// validator can run the same check the miner does.
///
/// All three must hold: the Merkle root re-derives, the header hash
/// re-derives, and the stored hash meets the policy's difficulty for
/// the block's height.
pub fn is_mined_block_success(difficulty: &dyn DifficultyPolicy, block: &Block) -> bool {
    if crate::merkle::merkle_root(block.transactions()) != *block.merkle_root() {
        return false;
    }
    if block.computed_hash() != *block.hash() {
        return false;
    }
    is_hash_success(block.hash(), difficulty.difficulty(block.height()))
}

/// Drives one full mine cycle: filter the pending batch, assemble the
/// candidate, then search nonces until the difficulty target is met
/// or a stop request arrives.
///
/// Not safe to drive from multiple threads at once; the orchestrator
/// runs at most one search at a time.
pub struct ProofOfWorkSearch {
    filter: PendingTransactionFilter,
    assembler: BlockAssembler,
    difficulty: Arc<dyn DifficultyPolicy>,
    cancel: CancelFlag,
}

impl ProofOfWorkSearch {
    pub fn new(
        filter: PendingTransactionFilter,
        assembler: BlockAssembler,
        difficulty: Arc<dyn DifficultyPolicy>,
        cancel: CancelFlag,
    ) -> Self {
        ProofOfWorkSearch {
            filter,
            assembler,
            difficulty,
            cancel,
        }
    }

    /// A clone of the search's cancellation flag, for external stop
    /// requests.
    pub fn cancel_flag(&self) -> CancelFlag {
        self.cancel.clone()
    }

    pub fn difficulty_policy(&self) -> &dyn DifficultyPolicy {
        self.difficulty.as_ref()
    }

    /// Run one search. The cancellation check runs before every
    /// iteration, so a stop request pending at entry cancels the
    /// search even if the very first hash would have satisfied the
    /// target; honoring a request clears the flag.
    pub fn mine_block(&self, last: Option<&Block>, batch: Vec<Transaction>) -> MineOutcome {
        let filtered = self.filter.filter_batch(batch);
        let mut candidate = self.assembler.create_packing_block(last, filtered);
        let difficulty = self.difficulty.difficulty(candidate.height);

        debug!(
            height = candidate.height,
            difficulty,
            transactions = candidate.transactions.len(),
            "starting proof-of-work search"
        );

        let mut hash = candidate.header_hash();
        loop {
            if self.cancel.take() {
                info!(height = candidate.height, "mining search cancelled");
                return MineOutcome::Cancelled;
            }
            if is_hash_success(&hash, difficulty) {
                break;
            }
            candidate.nonce += 1;
            hash = candidate.header_hash();
        }

        let block = candidate.seal();
        info!(
            height = block.height(),
            nonce = block.nonce(),
            hash = %digest_hex(block.hash()),
            "block mined"
        );
        MineOutcome::Mined(block)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::award::HalvingAward;
    use crate::block::{CandidateBlock, FIRST_BLOCK_HEIGHT, GENESIS_PREVIOUS_HASH};
    use crate::difficulty::FixedDifficulty;
    use crate::error::ValidationError;
    use crate::filter::TransactionValidator;
    use crate::transaction::{TransactionInput, TransactionOutput};

    struct AcceptAll;

    impl TransactionValidator for AcceptAll {
        fn check_transaction(
            &self,
            _context: Option<&Block>,
            _tx: &Transaction,
        ) -> Result<bool, ValidationError> {
            Ok(true)
        }
    }

    fn search(difficulty: u32) -> ProofOfWorkSearch {
        ProofOfWorkSearch::new(
            PendingTransactionFilter::new(Arc::new(AcceptAll)),
            BlockAssembler::new(Arc::new(HalvingAward::new(50, 210_000)), "miner".into()),
            Arc::new(FixedDifficulty(difficulty)),
            CancelFlag::new(),
        )
    }

    fn pending_transfer() -> Transaction {
        let funding = Transaction::coinbase(7, "funder".into(), 100);
        Transaction::transfer(
            vec![TransactionInput {
                utxo: funding.output_ref(0),
            }],
            vec![TransactionOutput {
                recipient: "alice".into(),
                amount: 100,
            }],
        )
    }

    #[test]
    fn test_genesis_mine_at_difficulty_one() {
        let search = search(1);
        let tx = pending_transfer();

        let block = search
            .mine_block(None, vec![tx.clone()])
            .into_block()
            .expect("difficulty 1 search must terminate");

        assert_eq!(block.height(), FIRST_BLOCK_HEIGHT);
        assert_eq!(*block.previous_hash(), GENESIS_PREVIOUS_HASH);
        assert_eq!(block.transactions().len(), 2);
        assert_eq!(block.transactions()[0], tx);
        assert!(block.transactions()[1].is_coinbase());

        assert!(digest_hex(block.hash()).starts_with('0'));
        assert!(is_mined_block_success(search.difficulty_policy(), &block));
    }

    #[test]
    fn test_pre_set_cancel_terminates_without_block() {
        // Difficulty 0 would succeed on the very first hash; a pending
        // stop request must still win.
        let search = search(0);
        let flag = search.cancel_flag();
        flag.request_stop();
        flag.request_stop(); // idempotent

        match search.mine_block(None, Vec::new()) {
            MineOutcome::Cancelled => {}
            MineOutcome::Mined(_) => panic!("cancelled search returned a block"),
        }

        // Honoring the request cleared the flag; the next search runs.
        assert!(!flag.is_requested());
        assert!(search.mine_block(None, Vec::new()).into_block().is_some());
    }

    #[test]
    fn test_is_hash_success_prefix_semantics() {
        let mut digest = [0xffu8; 32];
        assert!(is_hash_success(&digest, 0));
        assert!(!is_hash_success(&digest, 1));

        digest[0] = 0x0a;
        assert!(is_hash_success(&digest, 1));
        assert!(!is_hash_success(&digest, 2));
    }

    #[test]
    fn test_verification_rejects_tampered_merkle_root() {
        let search = search(1);
        let mut block = search
            .mine_block(None, vec![pending_transfer()])
            .into_block()
            .unwrap();

        // Reorder the transactions behind the sealed root.
        let json = serde_json::to_string(&block).unwrap();
        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let txs = value["transactions"].as_array_mut().unwrap();
        txs.reverse();
        block = serde_json::from_value(value).unwrap();

        assert!(!is_mined_block_success(search.difficulty_policy(), &block));
    }

    #[test]
    fn test_verification_rejects_insufficient_difficulty() {
        // Seal a candidate at a nonce whose hash does NOT start with
        // the sentinel digit; merkle root and header hash both match,
        // difficulty alone must fail it.
        let mut candidate = CandidateBlock::new(
            FIRST_BLOCK_HEIGHT,
            GENESIS_PREVIOUS_HASH,
            vec![Transaction::coinbase(0, "miner".into(), 50)],
            1_700_000_000,
        );
        while is_hash_success(&candidate.header_hash(), 1) {
            candidate.nonce += 1;
        }
        let block = candidate.seal();

        assert_eq!(block.computed_hash(), *block.hash());
        assert!(!is_mined_block_success(&FixedDifficulty(1), &block));
        // The same block is fine under a zero-difficulty policy.
        assert!(is_mined_block_success(&FixedDifficulty(0), &block));
    }
}
