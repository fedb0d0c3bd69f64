//! The ledger collaborator: contract plus an in-memory reference
//! implementation used by the demo binary and the tests.

use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;
use tracing::info;

use prospect_core::{
    digest_hex, Amount, Block, Transaction, TransactionOutput, UtxoRef, FIRST_BLOCK_HEIGHT,
    GENESIS_PREVIOUS_HASH,
};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// The block's height does not extend the current tip. Covers the
    /// stale case where another block of the same height was accepted
    /// first.
    #[error("block height {got} does not extend the chain (expected {expected})")]
    NonContiguousHeight { expected: u64, got: u64 },

    #[error("block at height {height} does not reference the current tip hash")]
    PreviousHashMismatch { height: u64 },
}

/// The persistent chain the miner extends. Implementations validate
/// height/previous-hash continuity and are expected to serialize
/// `add_block` calls internally.
pub trait Ledger: Send + Sync {
    fn find_last_block(&self) -> Result<Option<Block>, LedgerError>;
    fn add_block(&self, block: Block) -> Result<(), LedgerError>;
}

struct ChainState {
    blocks: Vec<Block>,
    /// Outputs not yet consumed by any accepted block.
    utxos: HashMap<UtxoRef, TransactionOutput>,
}

/// In-memory ledger. A single mutex serializes reads and writes,
/// which is plenty for one mining thread plus occasional observers.
pub struct MemoryLedger {
    state: Mutex<ChainState>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        MemoryLedger {
            state: Mutex::new(ChainState {
                blocks: Vec::new(),
                utxos: HashMap::new(),
            }),
        }
    }

    pub fn block_count(&self) -> usize {
        self.state.lock().expect("ledger lock poisoned").blocks.len()
    }

    /// The value of an unspent output, if the ledger knows it.
    pub fn utxo_amount(&self, utxo: &UtxoRef) -> Option<Amount> {
        self.state
            .lock()
            .expect("ledger lock poisoned")
            .utxos
            .get(utxo)
            .map(|output| output.amount)
    }

    fn apply_transactions(state: &mut ChainState, transactions: &[Transaction]) {
        for tx in transactions {
            for input in &tx.inputs {
                state.utxos.remove(&input.utxo);
            }
            for (index, output) in tx.outputs.iter().enumerate() {
                state.utxos.insert(tx.output_ref(index as u32), output.clone());
            }
        }
    }
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for MemoryLedger {
    fn find_last_block(&self) -> Result<Option<Block>, LedgerError> {
        let state = self.state.lock().expect("ledger lock poisoned");
        Ok(state.blocks.last().cloned())
    }

    fn add_block(&self, block: Block) -> Result<(), LedgerError> {
        let mut state = self.state.lock().expect("ledger lock poisoned");

        match state.blocks.last() {
            Some(tip) => {
                let expected = tip.height() + 1;
                if block.height() != expected {
                    return Err(LedgerError::NonContiguousHeight {
                        expected,
                        got: block.height(),
                    });
                }
                if block.previous_hash() != tip.hash() {
                    return Err(LedgerError::PreviousHashMismatch {
                        height: block.height(),
                    });
                }
            }
            None => {
                if block.height() != FIRST_BLOCK_HEIGHT {
                    return Err(LedgerError::NonContiguousHeight {
                        expected: FIRST_BLOCK_HEIGHT,
                        got: block.height(),
                    });
                }
                if *block.previous_hash() != GENESIS_PREVIOUS_HASH {
                    return Err(LedgerError::PreviousHashMismatch {
                        height: block.height(),
                    });
                }
            }
        }

        Self::apply_transactions(&mut state, block.transactions());
        info!(
            height = block.height(),
            hash = %digest_hex(block.hash()),
            "block accepted"
        );
        state.blocks.push(block);
        Ok(())
    }
}
