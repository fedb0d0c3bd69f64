//! Miner on/off switch, toggled by external configuration surfaces.

use std::sync::atomic::{AtomicBool, Ordering};

/// Pure activation toggle consulted at the start of every mine cycle.
/// It owns no logic of its own; HTTP/CLI surfaces flip it from
/// outside.
pub struct MinerActivation {
    active: AtomicBool,
}

impl MinerActivation {
    pub fn new(active: bool) -> Self {
        MinerActivation {
            active: AtomicBool::new(active),
        }
    }

    pub fn activate(&self) {
        self.active.store(true, Ordering::SeqCst);
    }

    pub fn deactivate(&self) {
        self.active.store(false, Ordering::SeqCst);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }
}

impl Default for MinerActivation {
    fn default() -> Self {
        Self::new(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle() {
        let activation = MinerActivation::new(false);
        assert!(!activation.is_active());
        activation.activate();
        assert!(activation.is_active());
        activation.deactivate();
        assert!(!activation.is_active());
    }
}
