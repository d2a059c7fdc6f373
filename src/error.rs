//! Error types for tree operations.

use thiserror::Error;

use crate::Stem;

/// Errors reported by the state tree and its helpers.
///
/// All core operations are total over well-formed fixed-width inputs, so the
/// error surface is small: width violations at the API boundary, the tree
/// depth bound, and malformed proof material.
#[derive(Debug, Error)]
pub enum TreeError {
    /// A key slice was not exactly 32 bytes.
    #[error("invalid key length: expected 32 bytes, got {0}")]
    InvalidKeyLength(usize),

    /// A value slice was not exactly 32 bytes.
    #[error("invalid value length: expected 32 bytes, got {0}")]
    InvalidValueLength(usize),

    /// A stem slice was not exactly 31 bytes.
    #[error("invalid stem length: expected 31 bytes, got {0}")]
    InvalidStemLength(usize),

    /// Insertion recursed past the last stem bit without resolving.
    #[error("tree depth {depth} exceeds the 248-bit stem path")]
    DepthExceeded { depth: usize },

    /// Two distinct stem nodes claimed the same stem.
    #[error("stem collision at {0:?}")]
    StemCollision(Stem),

    /// A code chunk carried a pushdata prefix larger than its body.
    #[error("code chunk pushdata prefix {0} exceeds 31")]
    InvalidChunkPrefix(u8),

    /// A proof is internally inconsistent, independent of any root.
    #[error("malformed proof: {0}")]
    MalformedProof(&'static str),
}

/// Result alias for tree operations.
pub type Result<T> = std::result::Result<T, TreeError>;
