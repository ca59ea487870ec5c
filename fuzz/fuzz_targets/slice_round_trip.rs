#![no_main]
use iblt_reconcile::txslice::Slice;
use libfuzzer_sys::fuzz_target;

const SLICE_SIZE: usize = 64;

// A Slice's flat wire image is fixed-length (6 + 2 + SLICE_SIZE bytes), so arbitrary fuzz bytes
// are padded/truncated to that length rather than rejected; `from_bytes`/`as_bytes` must still
// round-trip for anything of the right length, since a corrupted bucket inside a real IBLT payload
// looks exactly like this.
fuzz_target!(|data: &[u8]| {
    let wire_len = Slice::<SLICE_SIZE>::WIRE_LEN;
    if data.len() != wire_len {
        return;
    }
    let slice = Slice::<SLICE_SIZE>::from_bytes(data);
    let back = slice.as_bytes();
    assert_eq!(back, data);
    assert_eq!(Slice::<SLICE_SIZE>::from_bytes(&back), slice);
});
