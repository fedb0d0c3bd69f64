//! Difficulty policies and the leading-zero target check.
//!
//! Difficulty `d` means: the first `d` characters of the block hash's
//! hex text equal a fixed string of `d` sentinel digits. This is a
//! literal prefix comparison over the textual form, not a numeric
//! magnitude test.

/// The digit a winning hash prefix must repeat.
pub const SENTINEL_DIGIT: char = '0';

/// Hex characters in a SHA-256 digest; no hash can satisfy a larger
/// difficulty.
pub const MAX_DIFFICULTY: u32 = 64;

use crate::hash::{digest_hex, Digest};

/// Strategy deciding the required difficulty for a block at a given
/// height.
///
/// Implementations must be deterministic for the same chain prefix
/// and height, so every honest node derives the same requirement.
/// Any chain state a strategy consults is captured at construction.
pub trait DifficultyPolicy: Send + Sync {
    fn difficulty(&self, height: u64) -> u32;
}

/// The target prefix for a difficulty: `d` sentinel digits.
pub fn difficulty_target(difficulty: u32) -> String {
    let d = difficulty.min(MAX_DIFFICULTY) as usize;
    core::iter::repeat(SENTINEL_DIGIT).take(d).collect()
}

/// Whether a digest meets a difficulty: its hex text starts with the
/// target prefix. Difficulties beyond [`MAX_DIFFICULTY`] never match.
pub fn hash_meets_difficulty(digest: &Digest, difficulty: u32) -> bool {
    if difficulty > MAX_DIFFICULTY {
        return false;
    }
    let hex = digest_hex(digest);
    let target = difficulty_target(difficulty);
    hex[..difficulty as usize] == target
}

/// A constant difficulty, independent of height.
#[derive(Debug, Clone, Copy)]
pub struct FixedDifficulty(pub u32);

impl DifficultyPolicy for FixedDifficulty {
    fn difficulty(&self, _height: u64) -> u32 {
        self.0
    }
}

/// Difficulty that steps up by one every `band` blocks, starting from
/// `base`.
#[derive(Debug, Clone, Copy)]
pub struct StepDifficulty {
    pub base: u32,
    pub band: u64,
}

impl DifficultyPolicy for StepDifficulty {
    fn difficulty(&self, height: u64) -> u32 {
        let steps = if self.band == 0 { 0 } else { height / self.band };
        (self.base as u64 + steps).min(MAX_DIFFICULTY as u64) as u32
    }
}
