#![no_main]
use iblt_reconcile::bsl::{parse_len, scan_len};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let mut consumed = 0usize;
    let scanned = scan_len(data, &mut consumed);
    #[allow(deprecated)]
    let parsed = parse_len(data);

    match (&scanned, &parsed) {
        (Ok(n), Ok(len)) => {
            assert_eq!(*n, len.n());
            assert_eq!(consumed, len.consumed());
            assert!(consumed <= data.len());
        }
        (Err(_), Err(_)) => {}
        _ => panic!("scan_len and parse_len disagreed on {data:?}"),
    }
});
