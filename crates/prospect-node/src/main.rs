//! Demo binary: mine a few blocks against the in-memory ledger.

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use prospect_node::{
    Ledger, MemoryLedger, MemoryPool, Miner, MinerConfig, TransactionPool, UtxoValidator,
};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => MinerConfig::load(&path).unwrap_or_else(|err| {
            eprintln!("could not load {path}: {err}");
            std::process::exit(1);
        }),
        None => MinerConfig {
            difficulty: 3,
            cycle_interval_secs: 1,
            ..MinerConfig::default()
        },
    };

    let ledger = Arc::new(MemoryLedger::new());
    let pool = Arc::new(MemoryPool::new());
    let validator = Arc::new(UtxoValidator::new(Arc::clone(&ledger)));

    let miner = Arc::new(Miner::from_config(
        &config,
        Arc::clone(&ledger) as Arc<dyn Ledger>,
        Arc::clone(&pool) as Arc<dyn TransactionPool>,
        validator,
    ));

    info!(
        difficulty = config.difficulty,
        miner_key = %config.miner_key,
        "starting demo miner"
    );
    let handle = Arc::clone(&miner).spawn();

    // Let the loop run a handful of cycles, then stop it cleanly.
    thread::sleep(Duration::from_secs(10));
    handle.shutdown();

    info!(blocks = ledger.block_count(), "demo finished");
}
