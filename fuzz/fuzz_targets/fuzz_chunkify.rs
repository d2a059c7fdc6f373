#![no_main]

use libfuzzer_sys::fuzz_target;
use ubtree::{chunkify, dechunkify, CodeChunk, CHUNK_BODY_LEN};

// Chunkification must be total, bounded, and reversible for any bytecode.
fuzz_target!(|code: &[u8]| {
    let chunks = chunkify(code);
    assert_eq!(chunks.len(), code.len().div_ceil(CHUNK_BODY_LEN));

    for chunk in &chunks {
        assert!(chunk.pushdata_prefix as usize <= CHUNK_BODY_LEN);
        let decoded = CodeChunk::decode(chunk.encode()).expect("encoded chunk must decode");
        assert_eq!(&decoded, chunk);
    }

    // the first chunk always starts at an opcode
    if let Some(first) = chunks.first() {
        assert_eq!(first.pushdata_prefix, 0);
    }

    assert_eq!(dechunkify(&chunks, code.len()), code);
});
