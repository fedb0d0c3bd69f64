//! Mining award policies.

use crate::transaction::{Amount, Transaction};

/// Strategy computing the coinbase award for a block.
///
/// Must be pure for identical inputs: any validator re-derives the
/// expected award from the block height and the packed (non-coinbase)
/// transactions without re-running the miner.
pub trait AwardPolicy: Send + Sync {
    fn mine_award(&self, height: u64, packed: &[Transaction]) -> Amount;
}

/// A halving schedule: the award starts at `base_award` and halves
/// every `halving_interval` blocks.
#[derive(Debug, Clone, Copy)]
pub struct HalvingAward {
    pub base_award: Amount,
    pub halving_interval: u64,
}

impl HalvingAward {
    pub fn new(base_award: Amount, halving_interval: u64) -> Self {
        HalvingAward {
            base_award,
            halving_interval,
        }
    }
}

impl AwardPolicy for HalvingAward {
    fn mine_award(&self, height: u64, _packed: &[Transaction]) -> Amount {
        if self.halving_interval == 0 {
            return self.base_award;
        }
        let halvings = height / self.halving_interval;
        if halvings >= 64 {
            return 0;
        }
        self.base_award >> halvings
    }
}
