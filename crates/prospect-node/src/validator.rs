//! Transaction checker backed by the in-memory ledger's UTXO view.

use std::collections::HashSet;
use std::sync::Arc;

use prospect_core::{
    Amount, Block, Transaction, TransactionKind, TransactionValidator, UtxoRef, ValidationError,
};

use crate::ledger::MemoryLedger;

/// Checks a single pending transaction against ledger state: well
/// formed, spends only UTXOs the ledger knows, and does not pay out
/// more than it consumes.
///
/// Coinbase transactions never pass here; they are created by the
/// assembler, not submitted through the pool.
pub struct UtxoValidator {
    ledger: Arc<MemoryLedger>,
}

impl UtxoValidator {
    pub fn new(ledger: Arc<MemoryLedger>) -> Self {
        UtxoValidator { ledger }
    }
}

impl TransactionValidator for UtxoValidator {
    fn check_transaction(
        &self,
        _context: Option<&Block>,
        tx: &Transaction,
    ) -> Result<bool, ValidationError> {
        if tx.kind == TransactionKind::Coinbase {
            return Ok(false);
        }
        if tx.inputs.is_empty() {
            return Err(ValidationError::Malformed(
                "transfer has no inputs".to_string(),
            ));
        }
        if tx.outputs.is_empty() {
            return Err(ValidationError::Malformed(
                "transfer has no outputs".to_string(),
            ));
        }

        // Each input must name a distinct, currently unspent UTXO.
        let mut seen: HashSet<UtxoRef> = HashSet::new();
        let mut available: Amount = 0;
        for input in &tx.inputs {
            if !seen.insert(input.utxo) {
                return Ok(false);
            }
            match self.ledger.utxo_amount(&input.utxo) {
                Some(amount) => {
                    available = available
                        .checked_add(amount)
                        .ok_or_else(|| ValidationError::Malformed("input overflow".to_string()))?;
                }
                None => return Ok(false),
            }
        }

        let mut paid: Amount = 0;
        for output in &tx.outputs {
            paid = paid
                .checked_add(output.amount)
                .ok_or_else(|| ValidationError::Malformed("output overflow".to_string()))?;
        }

        Ok(paid <= available)
    }
}
