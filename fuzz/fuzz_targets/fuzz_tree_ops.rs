#![no_main]

use libfuzzer_sys::fuzz_target;
use ubtree::{Blake3Hasher, StateTree, TreeKey, B256};

// Roots must depend on contents only: inserting the same entries in reverse
// order, with duplicates resolved by last write, commits identically.
fuzz_target!(|data: &[u8]| {
    let mut entries = Vec::new();
    for pair in data.chunks_exact(64) {
        let key = TreeKey::from_word(B256::from_slice(&pair[..32]));
        let value = B256::from_slice(&pair[32..]);
        entries.push((key, value));
    }

    // keep only the final write per key so both orders agree on contents
    let mut last_write = std::collections::HashMap::new();
    for (key, value) in &entries {
        last_write.insert(*key, *value);
    }
    let deduped: Vec<_> = last_write.into_iter().collect();

    let mut forward: StateTree<Blake3Hasher> = StateTree::new();
    forward.insert_batch(deduped.iter().copied()).unwrap();
    let mut backward: StateTree<Blake3Hasher> = StateTree::new();
    backward.insert_batch(deduped.iter().rev().copied()).unwrap();

    assert_eq!(forward.len(), deduped.len());
    assert_eq!(forward.root(), backward.root());

    for (key, value) in &deduped {
        assert_eq!(forward.get(key), Some(*value));
    }
});
