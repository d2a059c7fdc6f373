//! # ubtree
//!
//! A unified binary Merkle state tree: account headers, storage slots, and
//! contract code chunks all live in one tree of 32-byte keys mapping to
//! 32-byte values.
//!
//! - **Keys** split into a 31-byte *stem* and a final *subindex* byte; the
//!   256 values sharing a stem are owned by a single [`StemNode`] and
//!   committed as one subtree.
//! - **Layout**: [`keys`] derives stems from `(address, tree_index)` so an
//!   account's header, first 64 storage slots, and first 128 code chunks
//!   share one stem, keeping common accesses inside a single branch.
//! - **Code** is stored via [`chunkify`]: 31 code bytes per chunk plus a
//!   leading byte marking PUSH-operand spillover, so a chunk is
//!   interpretable on its own.
//! - **Mutation** is insert/overwrite only; the tree materializes exactly
//!   one internal node per path bit shared between neighboring stems.
//! - **Commitment** is a post-order merkleization with a pluggable
//!   [`TreeHasher`]; empty subtrees hash to zero at every level, and the
//!   root depends only on final contents, never on insertion order.
//!
//! ```
//! use ubtree::{Blake3Hasher, StateTree, TreeKey, B256};
//!
//! let mut tree: StateTree<Blake3Hasher> = StateTree::new();
//! tree.insert(TreeKey::from_word(B256::ZERO), B256::repeat_byte(0x01)).unwrap();
//! let root = tree.root();
//! assert_ne!(root, B256::ZERO);
//! ```
//!
//! The hash function is deliberately not fixed; [`Blake3Hasher`] is the
//! development default and [`Sha256Hasher`] is provided alongside it.

#![cfg_attr(not(test), warn(unused_crate_dependencies))]

mod code;
mod error;
mod hash;
mod key;
pub mod keys;
mod node;
mod proof;
mod tree;

pub use code::{chunkify, dechunkify, CodeChunk, CHUNK_BODY_LEN};
pub use error::{Result, TreeError};
pub use hash::{Blake3Hasher, Sha256Hasher, TreeHasher};
pub use key::{Stem, SubIndex, TreeKey, SLOTS_PER_STEM, STEM_BITS, STEM_LEN};
pub use keys::{
    address32, basic_data_key, code_chunk_key, code_hash_key, derive_key, storage_slot_key,
    AccountKeys, BasicData, BASIC_DATA_LEAF_KEY, CODE_HASH_LEAF_KEY, CODE_OFFSET,
    HEADER_STORAGE_OFFSET, MAIN_STORAGE_OFFSET, STEM_SUBTREE_WIDTH,
};
pub use node::{InternalNode, Node, StemNode};
pub use proof::{Proof, ProofTerminal};
pub use tree::{Iter, StateTree};

pub use alloy_primitives::{Address, B256, U256};
