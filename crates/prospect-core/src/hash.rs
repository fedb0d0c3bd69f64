//! SHA-256 digests and block header hashing.

use sha2::{Digest as Sha2Digest, Sha256};

/// A SHA-256 digest.
pub type Digest = [u8; 32];

/// All-zero digest, used as the genesis previous-hash and the Merkle
/// root of an empty transaction list.
pub const ZERO_DIGEST: Digest = [0u8; 32];

/// Single SHA-256 hash.
#[inline]
pub fn sha256(data: &[u8]) -> Digest {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// Lowercase hex text of a digest.
///
/// Difficulty is defined over this textual form: a block meets
/// difficulty `d` when the first `d` characters of this string are
/// all the sentinel digit `'0'`.
pub fn digest_hex(digest: &Digest) -> String {
    hex::encode(digest)
}

/// Compute the hash of a block header.
///
/// The digest covers (previous_hash, height, merkle_root, timestamp,
/// nonce) in a fixed byte layout, so it must be recomputed whenever
/// any of these fields change, that is, once per nonce during
/// the proof-of-work search.
pub fn block_hash(
    previous_hash: &Digest,
    height: u64,
    merkle_root: &Digest,
    timestamp: u64,
    nonce: u64,
) -> Digest {
    let mut header = [0u8; 88];

    // Previous block hash (32 bytes)
    header[0..32].copy_from_slice(previous_hash);

    // Height (8 bytes, big-endian)
    header[32..40].copy_from_slice(&height.to_be_bytes());

    // Merkle root (32 bytes)
    header[40..72].copy_from_slice(merkle_root);

    // Timestamp (8 bytes, big-endian)
    header[72..80].copy_from_slice(&timestamp.to_be_bytes());

    // Nonce (8 bytes, big-endian)
    header[80..88].copy_from_slice(&nonce.to_be_bytes());

    sha256(&header)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_vector() {
        // SHA256("hello")
        let hash = sha256(b"hello");
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(hash.as_slice(), expected.as_slice());
    }

    #[test]
    fn test_digest_hex_length() {
        assert_eq!(digest_hex(&ZERO_DIGEST).len(), 64);
        assert_eq!(digest_hex(&ZERO_DIGEST), "0".repeat(64));
    }

    #[test]
    fn test_block_hash_deterministic() {
        let prev = sha256(b"prev");
        let root = sha256(b"root");

        let a = block_hash(&prev, 7, &root, 1_700_000_000, 42);
        let b = block_hash(&prev, 7, &root, 1_700_000_000, 42);
        assert_eq!(a, b);
    }

    #[test]
    fn test_block_hash_varies_with_each_field() {
        let prev = sha256(b"prev");
        let root = sha256(b"root");
        let base = block_hash(&prev, 7, &root, 1_700_000_000, 42);

        assert_ne!(base, block_hash(&root, 7, &root, 1_700_000_000, 42));
        assert_ne!(base, block_hash(&prev, 8, &root, 1_700_000_000, 42));
        assert_ne!(base, block_hash(&prev, 7, &prev, 1_700_000_000, 42));
        assert_ne!(base, block_hash(&prev, 7, &root, 1_700_000_001, 42));
        assert_ne!(base, block_hash(&prev, 7, &root, 1_700_000_000, 43));
    }
}
