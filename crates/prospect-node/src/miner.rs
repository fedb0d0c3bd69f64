//! The mining orchestrator: one background loop driving fetch,
//! filter, assemble, search, submit cycles.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, info, warn};

use prospect_core::{
    BlockAssembler, CancelFlag, FixedDifficulty, HalvingAward, MineOutcome,
    PendingTransactionFilter, ProofOfWorkSearch, TransactionValidator,
};

use crate::activation::MinerActivation;
use crate::config::MinerConfig;
use crate::ledger::{Ledger, LedgerError};
use crate::pool::TransactionPool;

/// Coarse view of what the mining thread is doing right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MinerPhase {
    Idle = 0,
    Assembling = 1,
    Searching = 2,
}

impl MinerPhase {
    fn from_u8(raw: u8) -> Self {
        match raw {
            1 => MinerPhase::Assembling,
            2 => MinerPhase::Searching,
            _ => MinerPhase::Idle,
        }
    }
}

/// Drives mine cycles and owns the cancellation flag for the search.
///
/// At most one cycle runs at a time: the background loop is a single
/// thread, and driving `run_cycle` concurrently from several threads
/// is unsupported.
pub struct Miner {
    ledger: Arc<dyn Ledger>,
    pool: Arc<dyn TransactionPool>,
    search: ProofOfWorkSearch,
    cancel: CancelFlag,
    activation: Arc<MinerActivation>,
    interval: Duration,
    phase: AtomicU8,
}

impl Miner {
    pub fn new(
        ledger: Arc<dyn Ledger>,
        pool: Arc<dyn TransactionPool>,
        search: ProofOfWorkSearch,
        activation: Arc<MinerActivation>,
        interval: Duration,
    ) -> Self {
        let cancel = search.cancel_flag();
        Miner {
            ledger,
            pool,
            search,
            cancel,
            activation,
            interval,
            phase: AtomicU8::new(MinerPhase::Idle as u8),
        }
    }

    /// Wire a miner from config plus collaborators, with the stock
    /// fixed-difficulty and halving-award policies.
    pub fn from_config(
        config: &MinerConfig,
        ledger: Arc<dyn Ledger>,
        pool: Arc<dyn TransactionPool>,
        validator: Arc<dyn TransactionValidator>,
    ) -> Self {
        let filter = PendingTransactionFilter::new(validator);
        let assembler = BlockAssembler::new(
            Arc::new(HalvingAward::new(config.base_award, config.halving_interval)),
            config.miner_key.as_str().into(),
        );
        let search = ProofOfWorkSearch::new(
            filter,
            assembler,
            Arc::new(FixedDifficulty(config.difficulty)),
            CancelFlag::new(),
        );
        let activation = Arc::new(MinerActivation::new(config.start_active));
        Miner::new(
            ledger,
            pool,
            search,
            activation,
            Duration::from_secs(config.cycle_interval_secs),
        )
    }

    pub fn activation(&self) -> &MinerActivation {
        &self.activation
    }

    pub fn search(&self) -> &ProofOfWorkSearch {
        &self.search
    }

    pub fn phase(&self) -> MinerPhase {
        MinerPhase::from_u8(self.phase.load(Ordering::SeqCst))
    }

    fn set_phase(&self, phase: MinerPhase) {
        self.phase.store(phase as u8, Ordering::SeqCst);
    }

    /// Ask an in-progress search to stop. Never blocks and never
    /// waits for the search to actually wind down.
    pub fn request_stop(&self) {
        self.cancel.request_stop();
    }

    /// One full cycle: fetch the tip and the pending batch, mine, and
    /// submit a found block to the ledger. `Ok(true)` means a block
    /// was mined and accepted this cycle.
    pub fn run_cycle(&self) -> Result<bool, LedgerError> {
        self.set_phase(MinerPhase::Assembling);
        let cycle: Result<bool, LedgerError> = (|| {
            let last = self.ledger.find_last_block()?;
            let batch = self.pool.mineable_batch();

            self.set_phase(MinerPhase::Searching);
            match self.search.mine_block(last.as_ref(), batch) {
                MineOutcome::Mined(block) => {
                    self.ledger.add_block(block.clone())?;
                    self.pool.remove_packed(&block);
                    Ok(true)
                }
                MineOutcome::Cancelled => Ok(false),
            }
        })();
        self.set_phase(MinerPhase::Idle);
        cycle
    }

    /// The long-lived loop: run a cycle, wait out the interval, and
    /// repeat until the shutdown channel signals (or its sender is
    /// dropped).
    ///
    /// The wait is interruptible, so shutdown never has to ride out a
    /// full interval. A found block is submitted within `run_cycle`,
    /// before the wait begins. Cycle faults are recorded and the loop
    /// continues.
    pub fn run_forever(&self, shutdown: Receiver<()>) {
        info!(interval_secs = self.interval.as_secs(), "mining loop started");
        loop {
            if self.activation.is_active() {
                match self.run_cycle() {
                    Ok(true) => {}
                    Ok(false) => debug!("mine cycle ended without a block"),
                    Err(err) => warn!(%err, "mine cycle failed, continuing"),
                }
            } else {
                debug!("miner inactive, skipping cycle");
            }

            match shutdown.recv_timeout(self.interval) {
                Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {}
            }
        }
        info!("mining loop stopped");
    }

    /// Start the background loop on a dedicated thread and hand back
    /// the handle that stops it.
    pub fn spawn(self: Arc<Self>) -> MinerHandle {
        let (stop_tx, stop_rx) = mpsc::channel();
        let cancel = self.cancel.clone();
        let miner = Arc::clone(&self);
        let thread = thread::Builder::new()
            .name("prospect-miner".to_string())
            .spawn(move || miner.run_forever(stop_rx))
            .expect("failed to spawn mining thread");

        MinerHandle {
            stop_tx,
            cancel,
            thread: Some(thread),
        }
    }
}

/// Controls a spawned mining loop. Dropping the handle also stops the
/// loop, since the shutdown channel disconnects.
pub struct MinerHandle {
    stop_tx: Sender<()>,
    cancel: CancelFlag,
    thread: Option<JoinHandle<()>>,
}

impl MinerHandle {
    /// Stop the loop deterministically: cancel any in-flight search,
    /// signal the loop, and join the thread.
    pub fn shutdown(mut self) {
        self.cancel.request_stop();
        let _ = self.stop_tx.send(());
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
