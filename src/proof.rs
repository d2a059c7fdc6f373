//! Single-key Merkle proofs.
//!
//! A proof carries the sibling hashes along the key's path: one hash per
//! internal-node level, then evidence for how the path ends. Directions are
//! not stored; the verifier re-derives them from the key's stem bits, since
//! internal nodes occupy consecutive depths from the root.
//!
//! Three terminal shapes cover presence and absence:
//!
//! - the key's stem is in the tree → an 8-level opening of its slot subtree
//!   (the value may still be absent at the subindex)
//! - a different stem occupies the path → that stem and its subtree digest
//! - the path ends on an empty subtree
//!
//! These are in-memory structures for verification; no wire encoding is
//! defined here.

use alloy_primitives::B256;

use crate::tree::{node_root, slot_hashes, subtree_reduce};
use crate::{
    Node, Result, StateTree, Stem, StemNode, TreeError, TreeHasher, TreeKey, SLOTS_PER_STEM,
};

/// Levels in a stem's slot subtree (256 = 2^8 leaves).
const STEM_SUBTREE_LEVELS: usize = 8;

/// Evidence for how a key's path terminates.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProofTerminal {
    /// The key's stem is present; sibling hashes of its slot subtree,
    /// leaf level first.
    StemOpening {
        /// One sibling per subtree level.
        siblings: [B256; STEM_SUBTREE_LEVELS],
    },
    /// A stem sharing the traversed path prefix, but not equal to the
    /// key's stem, occupies the terminal position.
    DivergentStem {
        /// The occupying stem.
        stem: Stem,
        /// Digest of its slot subtree.
        subtree_root: B256,
    },
    /// The path ends on an empty subtree.
    Empty,
}

/// Proof that `key` maps to `value` (or to nothing) under some root.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Proof {
    /// The key being proven.
    pub key: TreeKey,
    /// The proven value; `None` proves absence.
    pub value: Option<B256>,
    /// Sibling hash per internal-node level, root-most first.
    pub branch: Vec<B256>,
    /// How the path ends.
    pub terminal: ProofTerminal,
}

impl<H: TreeHasher> StateTree<H> {
    /// Build a proof for `key` against the current tree contents.
    pub fn prove(&self, key: &TreeKey) -> Proof {
        let hasher = self.hasher();
        let mut branch = Vec::new();
        let mut node = self.root_node();
        let mut depth = 0;

        loop {
            match node {
                Node::Empty => {
                    return Proof {
                        key: *key,
                        value: None,
                        branch,
                        terminal: ProofTerminal::Empty,
                    };
                }
                Node::Stem(anchored) if *anchored.stem() == key.stem => {
                    return Proof {
                        key: *key,
                        value: anchored.get(key.subindex),
                        branch,
                        terminal: ProofTerminal::StemOpening {
                            siblings: stem_opening(anchored, key.subindex, hasher),
                        },
                    };
                }
                Node::Stem(anchored) => {
                    let leaves = slot_hashes(anchored, hasher);
                    return Proof {
                        key: *key,
                        value: None,
                        branch,
                        terminal: ProofTerminal::DivergentStem {
                            stem: *anchored.stem(),
                            subtree_root: subtree_reduce(leaves, hasher),
                        },
                    };
                }
                Node::Internal(inner) => {
                    let (next, sibling) = if key.stem.bit(depth) {
                        (&inner.right, &inner.left)
                    } else {
                        (&inner.left, &inner.right)
                    };
                    branch.push(node_root(sibling, hasher));
                    node = next;
                    depth += 1;
                }
            }
        }
    }
}

impl Proof {
    /// Check this proof against `root`.
    ///
    /// Returns `Ok(false)` when the recomputed root differs, and an error
    /// when the proof is inconsistent regardless of root.
    pub fn verify<H: TreeHasher>(&self, hasher: &H, root: &B256) -> Result<bool> {
        let mut acc = match &self.terminal {
            ProofTerminal::StemOpening { siblings } => {
                let mut acc = match &self.value {
                    Some(value) => hasher.hash_value(value),
                    None => B256::ZERO,
                };
                let mut position = self.key.subindex as usize;
                for sibling in siblings {
                    acc = if position & 1 == 1 {
                        hasher.merge(sibling, &acc)
                    } else {
                        hasher.merge(&acc, sibling)
                    };
                    position >>= 1;
                }
                hasher.stem_digest(&self.key.stem, &acc)
            }
            ProofTerminal::DivergentStem { stem, subtree_root } => {
                if self.value.is_some() {
                    return Err(TreeError::MalformedProof(
                        "divergent-stem terminal cannot carry a value",
                    ));
                }
                if *stem == self.key.stem {
                    return Err(TreeError::MalformedProof(
                        "divergent stem equals the proven key's stem",
                    ));
                }
                if (0..self.branch.len()).any(|depth| stem.bit(depth) != self.key.stem.bit(depth)) {
                    return Err(TreeError::MalformedProof(
                        "divergent stem is off the proven key's path",
                    ));
                }
                hasher.stem_digest(stem, subtree_root)
            }
            ProofTerminal::Empty => {
                if self.value.is_some() {
                    return Err(TreeError::MalformedProof(
                        "empty terminal cannot carry a value",
                    ));
                }
                B256::ZERO
            }
        };

        for (depth, sibling) in self.branch.iter().enumerate().rev() {
            acc = if self.key.stem.bit(depth) {
                hasher.merge(sibling, &acc)
            } else {
                hasher.merge(&acc, sibling)
            };
        }
        Ok(acc == *root)
    }
}

/// Sibling hashes of one slot's path through a stem's subtree, leaf level
/// first.
fn stem_opening<H: TreeHasher>(
    node: &StemNode,
    slot: u8,
    hasher: &H,
) -> [B256; STEM_SUBTREE_LEVELS] {
    let mut level = slot_hashes(node, hasher);
    let mut siblings = [B256::ZERO; STEM_SUBTREE_LEVELS];
    let mut position = slot as usize;
    for (depth, sibling) in siblings.iter_mut().enumerate() {
        *sibling = level[position ^ 1];
        let width = SLOTS_PER_STEM >> (depth + 1);
        for i in 0..width {
            level[i] = hasher.merge(&level[2 * i], &level[2 * i + 1]);
        }
        position >>= 1;
    }
    siblings
}
