#![no_main]
use iblt_reconcile::wire::Message;
use libfuzzer_sys::fuzz_target;

const SLICE_SIZE: usize = 64;

// `Message::decode` is the first thing to see an attacker-controlled blob; it must never panic,
// only ever return `Err`, no matter how the bytes are mangled.
fuzz_target!(|data: &[u8]| {
    let _ = Message::<SLICE_SIZE>::decode(data);
});
