//! Tree key types.
//!
//! A tree key is 32 bytes: the leading 31 bytes form the **stem**, which
//! selects a group of 256 co-located values, and the final byte is the
//! **subindex** into that group. Tree traversal consumes the stem one bit at
//! a time, most-significant bit first.

use alloy_primitives::B256;
use std::fmt;

use crate::{Result, TreeError};

/// Stem length in bytes.
pub const STEM_LEN: usize = 31;

/// Number of path bits in a stem (31 bytes, MSB first).
pub const STEM_BITS: usize = STEM_LEN * 8;

/// Number of value slots grouped under one stem.
pub const SLOTS_PER_STEM: usize = 256;

/// Subindex within a stem's group (0-255).
pub type SubIndex = u8;

/// The leading 31 bytes of a tree key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stem([u8; STEM_LEN]);

impl Stem {
    /// Wrap raw stem bytes.
    pub const fn new(bytes: [u8; STEM_LEN]) -> Self {
        Self(bytes)
    }

    /// Build a stem from a slice, rejecting any width other than 31 bytes.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self> {
        let bytes: [u8; STEM_LEN] = slice
            .try_into()
            .map_err(|_| TreeError::InvalidStemLength(slice.len()))?;
        Ok(Self(bytes))
    }

    /// The underlying bytes.
    pub const fn as_bytes(&self) -> &[u8; STEM_LEN] {
        &self.0
    }

    /// Path bit at `depth`, where depth 0 is the MSB of the first byte and
    /// depth 247 is the LSB of the last byte.
    pub fn bit(&self, depth: usize) -> bool {
        debug_assert!(depth < STEM_BITS);
        (self.0[depth / 8] >> (7 - depth % 8)) & 1 == 1
    }

    /// Depth of the first bit where `self` and `other` disagree, or `None`
    /// for equal stems.
    pub fn first_divergence(&self, other: &Self) -> Option<usize> {
        self.0.iter().zip(other.0.iter()).enumerate().find_map(
            |(byte_idx, (a, b))| match a ^ b {
                0 => None,
                diff => Some(byte_idx * 8 + diff.leading_zeros() as usize),
            },
        )
    }
}

impl fmt::Debug for Stem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Stem(0x{})", hex::encode(self.0))
    }
}

impl From<[u8; STEM_LEN]> for Stem {
    fn from(bytes: [u8; STEM_LEN]) -> Self {
        Self(bytes)
    }
}

/// A full 32-byte tree key.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TreeKey {
    /// Stem selecting the 256-value group.
    pub stem: Stem,
    /// Slot within the group.
    pub subindex: SubIndex,
}

impl TreeKey {
    /// Assemble a key from its parts.
    pub const fn new(stem: Stem, subindex: SubIndex) -> Self {
        Self { stem, subindex }
    }

    /// Split a 32-byte word into stem and subindex.
    pub fn from_word(word: B256) -> Self {
        let mut stem = [0u8; STEM_LEN];
        stem.copy_from_slice(&word[..STEM_LEN]);
        Self {
            stem: Stem(stem),
            subindex: word[STEM_LEN],
        }
    }

    /// Build a key from a slice, rejecting any width other than 32 bytes.
    pub fn try_from_slice(slice: &[u8]) -> Result<Self> {
        if slice.len() != 32 {
            return Err(TreeError::InvalidKeyLength(slice.len()));
        }
        Ok(Self::from_word(B256::from_slice(slice)))
    }

    /// Reassemble the 32-byte word form.
    pub fn to_word(&self) -> B256 {
        let mut word = [0u8; 32];
        word[..STEM_LEN].copy_from_slice(&self.stem.0);
        word[STEM_LEN] = self.subindex;
        B256::from(word)
    }
}

impl fmt::Debug for TreeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "TreeKey(0x{}:{})",
            hex::encode(self.stem.0),
            self.subindex
        )
    }
}

impl From<B256> for TreeKey {
    fn from(word: B256) -> Self {
        Self::from_word(word)
    }
}

impl From<TreeKey> for B256 {
    fn from(key: TreeKey) -> Self {
        key.to_word()
    }
}
