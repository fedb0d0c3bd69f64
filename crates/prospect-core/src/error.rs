//! Error types for the consensus core.

use thiserror::Error;

/// Data-integrity faults. Fatal to the operation that found them,
/// never silently repaired.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    /// A block that should carry a coinbase transaction has none.
    #[error("block {height} has no coinbase transaction")]
    MissingCoinbase { height: u64 },

    /// A block carries more than one coinbase transaction.
    #[error("block {height} has more than one coinbase transaction")]
    DuplicateCoinbase { height: u64 },

    /// A coinbase transaction has no award output.
    #[error("coinbase transaction in block {height} has no output")]
    MissingAwardOutput { height: u64 },
}

/// A transaction-validation fault reported by the external checker.
///
/// Expected and recoverable: the filter drops the transaction, logs
/// the reason and carries on with the rest of the batch.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("transaction references a UTXO unknown to the ledger")]
    UnknownUtxo,

    #[error("transaction is malformed: {0}")]
    Malformed(String),

    #[error("validator failed: {0}")]
    CheckerFailure(String),
}
