#![no_main]
use iblt_reconcile::bsl::Transaction;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(parsed) = Transaction::parse(data) {
        let consumed = parsed.consumed();
        assert!(consumed <= data.len());
        assert_eq!(parsed.remaining(), &data[consumed..]);
        assert_eq!(parsed.parsed().as_ref(), &data[..consumed]);
    }
});
