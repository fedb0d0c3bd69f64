//! Miner runtime for the prospect chain.
//!
//! Wraps the pure `prospect-core` consensus logic with the
//! collaborators a running miner needs: a ledger, a transaction pool,
//! a transaction checker, an activation switch and the background
//! mining loop itself.

pub mod activation;
pub mod config;
pub mod ledger;
pub mod miner;
pub mod pool;
pub mod validator;

pub use activation::MinerActivation;
pub use config::{ConfigError, MinerConfig};
pub use ledger::{Ledger, LedgerError, MemoryLedger};
pub use miner::{Miner, MinerHandle, MinerPhase};
pub use pool::{MemoryPool, TransactionPool};
pub use validator::UtxoValidator;
