#![no_main]
use iblt_reconcile::bsl::TxOuts;
use iblt_reconcile::fuzzing::check;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let p = TxOuts::parse(data);
    check(data, p);
});
