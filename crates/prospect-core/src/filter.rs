//! Pending-transaction filtering ahead of block packing.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use crate::block::Block;
use crate::error::ValidationError;
use crate::hash::digest_hex;
use crate::transaction::{Transaction, UtxoRef};

/// External checker validating a single transaction against ledger
/// state. `context` carries the enclosing block when one exists; the
/// pre-packing filter passes `None`.
///
/// An `Err` from the checker is treated exactly like `Ok(false)`:
/// the transaction is dropped and the batch continues.
pub trait TransactionValidator: Send + Sync {
    fn check_transaction(
        &self,
        context: Option<&Block>,
        tx: &Transaction,
    ) -> Result<bool, ValidationError>;
}

/// Filters a candidate batch down to transactions that are safe to
/// pack: each survivor validated individually against ledger state,
/// and no two survivors spend the same UTXO.
pub struct PendingTransactionFilter {
    validator: Arc<dyn TransactionValidator>,
}

impl PendingTransactionFilter {
    pub fn new(validator: Arc<dyn TransactionValidator>) -> Self {
        PendingTransactionFilter { validator }
    }

    /// Run both passes over the batch, preserving order. An empty
    /// batch is a no-op and performs no validator calls.
    pub fn filter_batch(&self, batch: Vec<Transaction>) -> Vec<Transaction> {
        if batch.is_empty() {
            return Vec::new();
        }
        let survivors = self.drop_invalid(batch);
        Self::drop_intra_batch_double_spends(survivors)
    }

    /// Pass 1: each transaction in original order, checked in
    /// isolation. A checker error drops the transaction the same way
    /// an explicit reject does.
    fn drop_invalid(&self, batch: Vec<Transaction>) -> Vec<Transaction> {
        batch
            .into_iter()
            .filter(|tx| match self.validator.check_transaction(None, tx) {
                Ok(true) => true,
                Ok(false) => {
                    warn!(txid = %digest_hex(&tx.id), "transaction rejected by checker, dropped from batch");
                    false
                }
                Err(err) => {
                    warn!(txid = %digest_hex(&tx.id), %err, "transaction check errored, dropped from batch");
                    false
                }
            })
            .collect()
    }

    /// Pass 2: no UTXO may be spent twice within the batch. The first
    /// transaction claiming a UTXO wins; later conflicters are dropped
    /// whole. A dropped transaction's inputs still claim their UTXOs,
    /// so a third transaction touching the same UTXO is dropped too.
    fn drop_intra_batch_double_spends(batch: Vec<Transaction>) -> Vec<Transaction> {
        let mut claimed: HashSet<UtxoRef> = HashSet::new();
        let mut kept = Vec::with_capacity(batch.len());

        for tx in batch {
            let mut conflict = false;
            for input in &tx.inputs {
                if !claimed.insert(input.utxo) {
                    conflict = true;
                }
            }
            if conflict {
                warn!(txid = %digest_hex(&tx.id), "transaction double-spends a UTXO within the batch, dropped");
            } else {
                kept.push(tx);
            }
        }

        kept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::{TransactionInput, TransactionOutput};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Checker scripted per txid, counting its calls.
    struct ScriptedValidator {
        reject: HashSet<crate::hash::Digest>,
        error: HashSet<crate::hash::Digest>,
        calls: AtomicUsize,
    }

    impl ScriptedValidator {
        fn accept_all() -> Self {
            ScriptedValidator {
                reject: HashSet::new(),
                error: HashSet::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl TransactionValidator for ScriptedValidator {
        fn check_transaction(
            &self,
            _context: Option<&Block>,
            tx: &Transaction,
        ) -> Result<bool, ValidationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.error.contains(&tx.id) {
                return Err(ValidationError::CheckerFailure("scripted".into()));
            }
            Ok(!self.reject.contains(&tx.id))
        }
    }

    fn spend(utxo: UtxoRef, to: &str, amount: u64) -> Transaction {
        Transaction::transfer(
            vec![TransactionInput { utxo }],
            vec![TransactionOutput {
                recipient: to.into(),
                amount,
            }],
        )
    }

    fn funding(n: u64) -> Transaction {
        Transaction::coinbase(n, "funder".into(), 100)
    }

    #[test]
    fn test_empty_batch_no_validator_calls() {
        let validator = Arc::new(ScriptedValidator::accept_all());
        let filter = PendingTransactionFilter::new(validator.clone());

        assert!(filter.filter_batch(Vec::new()).is_empty());
        assert_eq!(validator.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_first_seen_wins_on_double_spend() {
        let utxo = funding(1).output_ref(0);
        let t1 = spend(utxo, "alice", 10);
        let t2 = spend(utxo, "bob", 20);

        let filter = PendingTransactionFilter::new(Arc::new(ScriptedValidator::accept_all()));
        let kept = filter.filter_batch(vec![t1.clone(), t2]);

        assert_eq!(kept, vec![t1]);
    }

    #[test]
    fn test_dropped_conflicter_still_claims_its_inputs() {
        let shared = funding(1).output_ref(0);
        let other = funding(2).output_ref(0);

        let t1 = spend(shared, "alice", 10);
        // T2 conflicts with T1 on `shared` and also claims `other`.
        let t2 = Transaction::transfer(
            vec![
                TransactionInput { utxo: shared },
                TransactionInput { utxo: other },
            ],
            vec![TransactionOutput {
                recipient: "bob".into(),
                amount: 20,
            }],
        );
        // T3 only touches `other`, but T2 already claimed it.
        let t3 = spend(other, "carol", 30);

        let filter = PendingTransactionFilter::new(Arc::new(ScriptedValidator::accept_all()));
        let kept = filter.filter_batch(vec![t1.clone(), t2, t3]);

        assert_eq!(kept, vec![t1]);
    }

    #[test]
    fn test_rejected_and_errored_transactions_dropped() {
        let t1 = spend(funding(1).output_ref(0), "alice", 10);
        let t2 = spend(funding(2).output_ref(0), "bob", 20);
        let t3 = spend(funding(3).output_ref(0), "carol", 30);

        let mut validator = ScriptedValidator::accept_all();
        validator.reject.insert(t1.id);
        validator.error.insert(t3.id);

        let filter = PendingTransactionFilter::new(Arc::new(validator));
        let kept = filter.filter_batch(vec![t1, t2.clone(), t3]);

        assert_eq!(kept, vec![t2]);
    }

    #[test]
    fn test_order_preserved() {
        let txs: Vec<Transaction> = (1..=4)
            .map(|n| spend(funding(n).output_ref(0), "alice", n))
            .collect();

        let filter = PendingTransactionFilter::new(Arc::new(ScriptedValidator::accept_all()));
        let kept = filter.filter_batch(txs.clone());

        assert_eq!(kept, txs);
    }
}
