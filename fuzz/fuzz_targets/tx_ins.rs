#![no_main]
use iblt_reconcile::bsl::TxIns;
use iblt_reconcile::fuzzing::check;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let p = TxIns::parse(data);
    check(data, p);
});
