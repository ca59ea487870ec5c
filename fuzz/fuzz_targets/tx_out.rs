#![no_main]
use iblt_reconcile::bsl::TxOut;
use iblt_reconcile::fuzzing::check;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let p = TxOut::parse(data);
    check(data, p);
});
