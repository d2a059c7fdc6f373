//! State layout: mapping accounts, storage, and code onto tree keys.
//!
//! Every piece of account state lives at a key derived from the account's
//! 32-byte address form and a logical position:
//!
//! ```text
//! stem = H(address || le256(tree_index))[..31]
//! key  = stem || sub_index
//! ```
//!
//! Positions pack heterogeneous state into one address space. Within an
//! account's base stem (`tree_index = 0`):
//!
//! - subindex 0: packed basic data (version, code size, nonce, balance)
//! - subindex 1: code hash
//! - subindexes 64..=127: the first 64 storage slots
//! - subindexes 128..=255: the first 128 code chunks
//!
//! Later storage slots move to `MAIN_STORAGE_OFFSET + slot` and later code
//! chunks continue at `CODE_OFFSET + chunk`, each position decomposing into
//! `(tree_index, sub_index) = (pos / 256, pos % 256)`. Grouping the header,
//! early storage, and early code under one stem keeps the common access
//! pattern inside a single branch.

use alloy_primitives::{Address, B256, U256};

use crate::{Stem, SubIndex, TreeHasher, TreeKey, STEM_LEN};

/// Subindex of the packed account header fields.
pub const BASIC_DATA_LEAF_KEY: SubIndex = 0;

/// Subindex of the account's code hash.
pub const CODE_HASH_LEAF_KEY: SubIndex = 1;

/// Position of the first header-resident storage slot.
pub const HEADER_STORAGE_OFFSET: u64 = 64;

/// Position of the first code chunk.
pub const CODE_OFFSET: u64 = 128;

/// Number of value slots under one stem.
pub const STEM_SUBTREE_WIDTH: u64 = 256;

/// Position of the first main-storage slot: `256^31`.
pub const MAIN_STORAGE_OFFSET: U256 = U256::from_limbs([0, 0, 0, 1 << 56]);

// Layout ordering the derivation below relies on. MAIN_STORAGE_OFFSET is
// 2^248 = 256^31, so it sits on a stem-subtree boundary by construction.
const _: () = {
    assert!(STEM_SUBTREE_WIDTH > CODE_OFFSET);
    assert!(CODE_OFFSET > HEADER_STORAGE_OFFSET);
    assert!(HEADER_STORAGE_OFFSET > CODE_HASH_LEAF_KEY as u64);
};

/// Widen a 20-byte address to the 32-byte derivation operand.
pub fn address32(address: Address) -> B256 {
    let mut wide = [0u8; 32];
    wide[12..].copy_from_slice(address.as_slice());
    B256::from(wide)
}

/// Derive the tree key for `(address, tree_index, sub_index)`.
///
/// The stem is the first 31 bytes of `H(address || le256(tree_index))`; the
/// subindex rides along unhashed as the key's final byte, so all positions
/// sharing a tree index share a stem.
pub fn derive_key<H: TreeHasher>(
    hasher: &H,
    address: &B256,
    tree_index: U256,
    sub_index: SubIndex,
) -> TreeKey {
    let mut input = [0u8; 64];
    input[..32].copy_from_slice(address.as_slice());
    input[32..].copy_from_slice(&tree_index.to_le_bytes::<32>());
    let digest = hasher.hash64(&input);

    let mut stem = [0u8; STEM_LEN];
    stem.copy_from_slice(&digest[..STEM_LEN]);
    TreeKey::new(Stem::new(stem), sub_index)
}

/// Key of the packed account header.
pub fn basic_data_key<H: TreeHasher>(hasher: &H, address: &B256) -> TreeKey {
    derive_key(hasher, address, U256::ZERO, BASIC_DATA_LEAF_KEY)
}

/// Key of the account's code hash.
pub fn code_hash_key<H: TreeHasher>(hasher: &H, address: &B256) -> TreeKey {
    derive_key(hasher, address, U256::ZERO, CODE_HASH_LEAF_KEY)
}

/// Key of storage slot `slot`.
///
/// Slots below `CODE_OFFSET - HEADER_STORAGE_OFFSET` sit in the account's
/// base stem at `HEADER_STORAGE_OFFSET + slot`; everything else lives at
/// `MAIN_STORAGE_OFFSET + slot`.
pub fn storage_slot_key<H: TreeHasher>(hasher: &H, address: &B256, slot: U256) -> TreeKey {
    let header_slots = U256::from(CODE_OFFSET - HEADER_STORAGE_OFFSET);
    let (tree_index, sub_index) = if slot < header_slots {
        let pos = HEADER_STORAGE_OFFSET + slot.as_limbs()[0];
        (
            U256::from(pos / STEM_SUBTREE_WIDTH),
            (pos % STEM_SUBTREE_WIDTH) as u8,
        )
    } else {
        // pos = 256^31 + slot; the offset is slot-aligned, so the division
        // splits term by term without overflowing 256 bits
        ((MAIN_STORAGE_OFFSET >> 8) + (slot >> 8), slot.byte(0))
    };
    derive_key(hasher, address, tree_index, sub_index)
}

/// Key of code chunk `chunk_index`.
pub fn code_chunk_key<H: TreeHasher>(hasher: &H, address: &B256, chunk_index: u64) -> TreeKey {
    let pos = U256::from(CODE_OFFSET) + U256::from(chunk_index);
    derive_key(
        hasher,
        address,
        pos >> 8,
        (pos % U256::from(STEM_SUBTREE_WIDTH)).byte(0),
    )
}

/// Account header fields packed into the 32-byte basic-data value.
///
/// Big-endian layout: byte 0 version, bytes 1-4 reserved, bytes 5-7 code
/// size, bytes 8-15 nonce, bytes 16-31 balance.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BasicData {
    /// Layout version, currently 0.
    pub version: u8,
    /// Code size in bytes (24-bit field).
    pub code_size: u32,
    /// Account nonce.
    pub nonce: u64,
    /// Account balance (128-bit field).
    pub balance: u128,
}

impl BasicData {
    /// Assemble header fields at version 0.
    pub const fn new(nonce: u64, balance: u128, code_size: u32) -> Self {
        Self {
            version: 0,
            code_size,
            nonce,
            balance,
        }
    }

    /// Pack into the stored 32-byte value.
    pub fn encode(&self) -> B256 {
        let mut word = [0u8; 32];
        word[0] = self.version;
        word[5..8].copy_from_slice(&self.code_size.to_be_bytes()[1..]);
        word[8..16].copy_from_slice(&self.nonce.to_be_bytes());
        word[16..].copy_from_slice(&self.balance.to_be_bytes());
        B256::from(word)
    }

    /// Unpack from a stored 32-byte value.
    pub fn decode(word: B256) -> Self {
        let mut code_size = [0u8; 4];
        code_size[1..].copy_from_slice(&word[5..8]);
        let mut nonce = [0u8; 8];
        nonce.copy_from_slice(&word[8..16]);
        let mut balance = [0u8; 16];
        balance.copy_from_slice(&word[16..]);
        Self {
            version: word[0],
            code_size: u32::from_be_bytes(code_size),
            nonce: u64::from_be_bytes(nonce),
            balance: u128::from_be_bytes(balance),
        }
    }
}

/// Key helpers bound to one account address.
#[derive(Clone, Copy, Debug)]
pub struct AccountKeys {
    address: B256,
}

impl AccountKeys {
    /// Helper for `address`.
    pub fn new(address: Address) -> Self {
        Self {
            address: address32(address),
        }
    }

    /// The widened 32-byte address operand.
    pub const fn address(&self) -> &B256 {
        &self.address
    }

    /// Key of the packed account header.
    pub fn basic_data<H: TreeHasher>(&self, hasher: &H) -> TreeKey {
        basic_data_key(hasher, &self.address)
    }

    /// Key of the code hash.
    pub fn code_hash<H: TreeHasher>(&self, hasher: &H) -> TreeKey {
        code_hash_key(hasher, &self.address)
    }

    /// Key of storage slot `slot`.
    pub fn storage_slot<H: TreeHasher>(&self, hasher: &H, slot: U256) -> TreeKey {
        storage_slot_key(hasher, &self.address, slot)
    }

    /// Key of code chunk `chunk_index`.
    pub fn code_chunk<H: TreeHasher>(&self, hasher: &H, chunk_index: u64) -> TreeKey {
        code_chunk_key(hasher, &self.address, chunk_index)
    }
}
