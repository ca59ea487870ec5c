#![no_main]
use iblt_reconcile::bsl::TxIn;
use iblt_reconcile::fuzzing::check;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let p = TxIn::parse(data);
    check(data, p);
});
