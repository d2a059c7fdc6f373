#![no_main]

use libfuzzer_sys::fuzz_target;
use ubtree::BasicData;

// Packing must round-trip every in-range field combination.
fuzz_target!(|input: (u64, u128, u32, u8)| {
    let (nonce, balance, raw_code_size, version) = input;
    let code_size = raw_code_size & 0x00ff_ffff;

    let data = BasicData {
        version,
        code_size,
        nonce,
        balance,
    };
    let decoded = BasicData::decode(data.encode());
    assert_eq!(decoded, data);

    // reserved bytes stay clear
    let word = data.encode();
    assert_eq!(&word[1..5], &[0u8; 4]);
});
