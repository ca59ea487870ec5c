#![no_main]
use iblt_reconcile::bit_prefix_set::BitPrefixSet;
use libfuzzer_sys::fuzz_target;

// A malformed bit-prefix-set (bad run length, truncated bit payload, non-zero pad bits) must
// surface as an `Error`, never a panic or an out-of-bounds read.
fuzz_target!(|data: &[u8]| {
    let mut cursor = 0usize;
    if let Ok(set) = BitPrefixSet::decode(data, &mut cursor) {
        assert!(cursor <= data.len());
        let mut reencoded = Vec::new();
        set.encode(&mut reencoded);
        let mut cursor2 = 0usize;
        let back = BitPrefixSet::decode(&reencoded, &mut cursor2).unwrap();
        assert_eq!(back, set);
    }
});
