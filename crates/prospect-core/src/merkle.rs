//! Merkle root computation over an ordered transaction sequence.

use crate::hash::{sha256, Digest, ZERO_DIGEST};
use crate::transaction::Transaction;

/// Compute the Merkle root of an ordered list of transactions.
///
/// The root is order-sensitive: the same transactions in a different
/// order produce a different root, so the packing order carries
/// consensus meaning.
///
/// An empty list yields the zero digest. For a single transaction the
/// root is its id.
pub fn merkle_root(transactions: &[Transaction]) -> Digest {
    let ids: Vec<Digest> = transactions.iter().map(|tx| tx.id).collect();
    merkle_root_of_ids(&ids)
}

/// Compute the Merkle root from bare transaction ids.
///
/// Pairs are concatenated and hashed level by level; an odd trailing
/// node is paired with itself.
pub fn merkle_root_of_ids(ids: &[Digest]) -> Digest {
    if ids.is_empty() {
        return ZERO_DIGEST;
    }

    if ids.len() == 1 {
        return ids[0];
    }

    let mut current_level: Vec<Digest> = ids.to_vec();

    while current_level.len() > 1 {
        let mut next_level = Vec::with_capacity((current_level.len() + 1) / 2);

        for i in (0..current_level.len()).step_by(2) {
            let left = current_level[i];
            let right = if i + 1 < current_level.len() {
                current_level[i + 1]
            } else {
                current_level[i]
            };

            let mut combined = [0u8; 64];
            combined[..32].copy_from_slice(&left);
            combined[32..].copy_from_slice(&right);
            next_level.push(sha256(&combined));
        }

        current_level = next_level;
    }

    current_level[0]
}
