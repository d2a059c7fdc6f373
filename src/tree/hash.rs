//! Merkleization.
//!
//! The root is a pure, post-order function of tree shape and contents:
//!
//! - empty subtree → zero
//! - internal node → `H(left_root || right_root)`
//! - stem node → pairwise-reduce the 256 slot hashes (`H(value)` where
//!   populated, zero where absent) to one digest `D`, then
//!   `H(stem || 0x00 || D)`
//!
//! Insertion order never reaches the hash: two trees holding the same
//! entries have identical shapes, and therefore identical roots.
//!
//! With the `parallel` feature, sibling subtrees hash on separate rayon
//! tasks and a stem's 256 leaf hashes fan out across a parallel iterator;
//! the reduction itself stays level-ordered, so the result is bit-identical
//! to the serial path.

use alloy_primitives::B256;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::{Node, StemNode, TreeHasher, SLOTS_PER_STEM};

use super::StateTree;

impl<H: TreeHasher> StateTree<H> {
    /// Root hash of the tree.
    ///
    /// Recomputed only if the tree changed since the last call; the cached
    /// value is identical to a fresh [`StateTree::compute_root`].
    pub fn root(&mut self) -> B256 {
        if let Some(root) = self.cached_root {
            return root;
        }
        let root = self.compute_root();
        self.cached_root = Some(root);
        root
    }

    /// Merkleize from scratch, ignoring the cache.
    pub fn compute_root(&self) -> B256 {
        node_root(self.root_node(), self.hasher())
    }
}

/// Hash of an arbitrary subtree.
pub(crate) fn node_root<H: TreeHasher>(node: &Node, hasher: &H) -> B256 {
    match node {
        Node::Empty => B256::ZERO,
        Node::Internal(branch) => {
            #[cfg(feature = "parallel")]
            let (left, right) = rayon::join(
                || node_root(&branch.left, hasher),
                || node_root(&branch.right, hasher),
            );
            #[cfg(not(feature = "parallel"))]
            let (left, right) = (
                node_root(&branch.left, hasher),
                node_root(&branch.right, hasher),
            );
            hasher.merge(&left, &right)
        }
        Node::Stem(anchored) => stem_root(anchored, hasher),
    }
}

/// Hash of a stem node: slot reduction bound to the stem.
pub(crate) fn stem_root<H: TreeHasher>(node: &StemNode, hasher: &H) -> B256 {
    let leaves = slot_hashes(node, hasher);
    hasher.stem_digest(node.stem(), &subtree_reduce(leaves, hasher))
}

/// Per-slot leaf hashes: `H(value)` where populated, zero where absent.
pub(crate) fn slot_hashes<H: TreeHasher>(
    node: &StemNode,
    hasher: &H,
) -> Box<[B256; SLOTS_PER_STEM]> {
    let mut leaves = Box::new([B256::ZERO; SLOTS_PER_STEM]);
    #[cfg(feature = "parallel")]
    leaves
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(slot, leaf)| {
            if let Some(value) = node.get(slot as u8) {
                *leaf = hasher.hash_value(&value);
            }
        });
    #[cfg(not(feature = "parallel"))]
    for (slot, value) in node.entries() {
        leaves[slot as usize] = hasher.hash_value(&value);
    }
    leaves
}

/// Pairwise reduction of 256 leaves to a single digest, eight levels deep.
pub(crate) fn subtree_reduce<H: TreeHasher>(
    mut level: Box<[B256; SLOTS_PER_STEM]>,
    hasher: &H,
) -> B256 {
    let mut width = SLOTS_PER_STEM / 2;
    while width > 0 {
        for i in 0..width {
            level[i] = hasher.merge(&level[2 * i], &level[2 * i + 1]);
        }
        width /= 2;
    }
    level[0]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Blake3Hasher, Stem, TreeKey};

    fn tree() -> StateTree<Blake3Hasher> {
        StateTree::new()
    }

    #[test]
    fn empty_tree_root_is_zero() {
        let mut tree = tree();
        assert_eq!(tree.root(), B256::ZERO);
        assert_eq!(tree.compute_root(), B256::ZERO);
    }

    #[test]
    fn single_stem_root_is_its_stem_digest() {
        let mut tree = tree();
        let key = TreeKey::new(Stem::new([0xab; 31]), 4);
        tree.insert(key, B256::repeat_byte(0x42)).unwrap();

        let hasher = Blake3Hasher;
        let mut node = StemNode::new(key.stem);
        node.set(4, B256::repeat_byte(0x42));
        assert_eq!(tree.root(), stem_root(&node, &hasher));
    }

    #[test]
    fn sibling_stems_hash_positionally() {
        let hasher = Blake3Hasher;

        let left_stem = Stem::default();
        let mut right_bytes = [0u8; 31];
        right_bytes[0] = 0b1000_0000;
        let right_stem = Stem::new(right_bytes);

        let mut tree = tree();
        tree.insert(TreeKey::new(left_stem, 0), B256::repeat_byte(0x01))
            .unwrap();
        tree.insert(TreeKey::new(right_stem, 0), B256::repeat_byte(0x02))
            .unwrap();

        let mut left = StemNode::new(left_stem);
        left.set(0, B256::repeat_byte(0x01));
        let mut right = StemNode::new(right_stem);
        right.set(0, B256::repeat_byte(0x02));

        let expected = hasher.merge(&stem_root(&left, &hasher), &stem_root(&right, &hasher));
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn empty_sibling_levels_reach_the_hash() {
        // stems agreeing on their first bit leave one branch level with an
        // empty side; that zero must be merged, not skipped
        let hasher = Blake3Hasher;

        let near = Stem::default();
        let mut far_bytes = [0u8; 31];
        far_bytes[0] = 0b0100_0000;
        let far = Stem::new(far_bytes);

        let mut tree = tree();
        tree.insert(TreeKey::new(near, 0), B256::repeat_byte(0x01))
            .unwrap();
        tree.insert(TreeKey::new(far, 0), B256::repeat_byte(0x02))
            .unwrap();

        let mut near_node = StemNode::new(near);
        near_node.set(0, B256::repeat_byte(0x01));
        let mut far_node = StemNode::new(far);
        far_node.set(0, B256::repeat_byte(0x02));

        let fork = hasher.merge(&stem_root(&near_node, &hasher), &stem_root(&far_node, &hasher));
        let expected = hasher.merge(&fork, &B256::ZERO);
        assert_eq!(tree.root(), expected);
    }

    #[test]
    fn root_cache_tracks_mutation() {
        let mut tree = tree();
        let key = TreeKey::new(Stem::new([0x01; 31]), 0);

        tree.insert(key, B256::repeat_byte(0x01)).unwrap();
        let first = tree.root();
        assert_eq!(tree.root(), first);

        tree.insert(key, B256::repeat_byte(0x02)).unwrap();
        let second = tree.root();
        assert_ne!(first, second);
        assert_eq!(second, tree.compute_root());
    }

    #[test]
    fn stored_zero_differs_from_absent() {
        let mut written = tree();
        written
            .insert(TreeKey::new(Stem::default(), 0), B256::ZERO)
            .unwrap();
        let mut untouched = tree();
        assert_ne!(written.root(), untouched.root());
    }

    #[test]
    fn reduce_of_all_zero_leaves_is_zero() {
        let hasher = Blake3Hasher;
        let node = StemNode::new(Stem::new([0x07; 31]));
        let leaves = slot_hashes(&node, &hasher);
        assert_eq!(subtree_reduce(leaves, &hasher), B256::ZERO);
    }
}
