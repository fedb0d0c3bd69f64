//! The pending-transaction pool collaborator.

use std::collections::HashSet;
use std::sync::Mutex;

use prospect_core::{Block, Digest, Transaction};

/// Source of transactions eligible for packing. The core assumes
/// nothing stronger than insertion order.
pub trait TransactionPool: Send + Sync {
    /// The current mineable batch, in insertion order.
    fn mineable_batch(&self) -> Vec<Transaction>;

    /// Drop transactions that landed in an accepted block. Pools that
    /// are pruned elsewhere may ignore this.
    fn remove_packed(&self, _block: &Block) {}
}

/// In-memory pool preserving submission order.
pub struct MemoryPool {
    transactions: Mutex<Vec<Transaction>>,
}

impl MemoryPool {
    pub fn new() -> Self {
        MemoryPool {
            transactions: Mutex::new(Vec::new()),
        }
    }

    pub fn submit(&self, tx: Transaction) {
        self.transactions.lock().expect("pool lock poisoned").push(tx);
    }

    pub fn len(&self) -> usize {
        self.transactions.lock().expect("pool lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for MemoryPool {
    fn default() -> Self {
        Self::new()
    }
}

impl TransactionPool for MemoryPool {
    fn mineable_batch(&self) -> Vec<Transaction> {
        self.transactions.lock().expect("pool lock poisoned").clone()
    }

    fn remove_packed(&self, block: &Block) {
        let packed: HashSet<Digest> = block.transactions().iter().map(|tx| tx.id).collect();
        self.transactions
            .lock()
            .expect("pool lock poisoned")
            .retain(|tx| !packed.contains(&tx.id));
    }
}
