//! Pluggable hashing for merkleization and key derivation.
//!
//! The tree never commits to a specific hash function. Implementations of
//! [`TreeHasher`] supply a raw digest over fixed-width input; the trait's
//! provided methods layer on the structural rules every backend must share:
//!
//! - inputs are exactly 32 or 64 bytes wide
//! - the all-zero 64-byte input maps to the all-zero 32-byte output, so an
//!   empty subtree keeps the zero hash at every level
//!
//! The zero rule lives in the provided [`TreeHasher::hash64`]; backends only
//! implement raw digesting.

use alloy_primitives::B256;
use sha2::{Digest, Sha256};

use crate::{Stem, STEM_LEN};

/// Hash function driving merkleization and key derivation.
///
/// `Send + Sync` is required so hashing can fan out across subtrees when the
/// `parallel` feature is enabled.
pub trait TreeHasher: Clone + Default + Send + Sync {
    /// Raw digest of a fixed-width input. Implementations digest the bytes
    /// as-is; no input is special-cased here.
    fn digest(&self, input: &[u8]) -> B256;

    /// Hash a 32-byte input.
    fn hash32(&self, input: &[u8; 32]) -> B256 {
        self.digest(input)
    }

    /// Hash a 64-byte input. The all-zero input maps to the zero hash.
    fn hash64(&self, input: &[u8; 64]) -> B256 {
        if input.iter().all(|&b| b == 0) {
            return B256::ZERO;
        }
        self.digest(input)
    }

    /// Hash a stored leaf value.
    fn hash_value(&self, value: &B256) -> B256 {
        self.hash32(&value.0)
    }

    /// Combine two child hashes into their parent hash.
    fn merge(&self, left: &B256, right: &B256) -> B256 {
        let mut input = [0u8; 64];
        input[..32].copy_from_slice(left.as_slice());
        input[32..].copy_from_slice(right.as_slice());
        self.hash64(&input)
    }

    /// Bind a stem to the root of its 256-slot subtree:
    /// `H(stem || 0x00 || subtree_root)`.
    fn stem_digest(&self, stem: &Stem, subtree_root: &B256) -> B256 {
        let mut input = [0u8; 64];
        input[..STEM_LEN].copy_from_slice(stem.as_bytes());
        input[STEM_LEN + 1..].copy_from_slice(subtree_root.as_slice());
        self.hash64(&input)
    }
}

/// BLAKE3 backend, the default for development and testing.
#[derive(Clone, Copy, Debug, Default)]
pub struct Blake3Hasher;

impl TreeHasher for Blake3Hasher {
    fn digest(&self, input: &[u8]) -> B256 {
        B256::from(*blake3::hash(input).as_bytes())
    }
}

/// SHA-256 backend.
#[derive(Clone, Copy, Debug, Default)]
pub struct Sha256Hasher;

impl TreeHasher for Sha256Hasher {
    fn digest(&self, input: &[u8]) -> B256 {
        B256::from_slice(&Sha256::digest(input))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hashers() -> (Blake3Hasher, Sha256Hasher) {
        (Blake3Hasher, Sha256Hasher)
    }

    #[test]
    fn zero_64_input_maps_to_zero() {
        let (b3, sha) = hashers();
        assert_eq!(b3.hash64(&[0u8; 64]), B256::ZERO);
        assert_eq!(sha.hash64(&[0u8; 64]), B256::ZERO);
        assert_eq!(b3.merge(&B256::ZERO, &B256::ZERO), B256::ZERO);
        assert_eq!(sha.merge(&B256::ZERO, &B256::ZERO), B256::ZERO);
    }

    #[test]
    fn zero_32_input_is_a_real_digest() {
        let (b3, sha) = hashers();
        assert_ne!(b3.hash32(&[0u8; 32]), B256::ZERO);
        assert_ne!(sha.hash32(&[0u8; 32]), B256::ZERO);
    }

    #[test]
    fn merge_is_positional() {
        let (b3, _) = hashers();
        let a = B256::repeat_byte(0x01);
        let b = B256::repeat_byte(0x02);
        assert_ne!(b3.merge(&a, &b), b3.merge(&b, &a));
    }

    #[test]
    fn stem_digest_separates_stems() {
        let (b3, _) = hashers();
        let subtree = B256::repeat_byte(0x42);
        let s1 = Stem::new([0x01; STEM_LEN]);
        let s2 = Stem::new([0x02; STEM_LEN]);
        assert_ne!(b3.stem_digest(&s1, &subtree), b3.stem_digest(&s2, &subtree));
    }

    #[test]
    fn zero_stem_over_zero_subtree_keeps_the_zero_hash() {
        let (b3, _) = hashers();
        assert_eq!(
            b3.stem_digest(&Stem::default(), &B256::ZERO),
            B256::ZERO
        );
    }

    #[test]
    fn backends_disagree() {
        let (b3, sha) = hashers();
        let input = [0x42u8; 32];
        assert_ne!(b3.hash32(&input), sha.hash32(&input));
    }
}
