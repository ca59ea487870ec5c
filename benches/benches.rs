use bitcoin_hashes::Hash;
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hex_lit::hex;
use iblt_reconcile::bsl::Transaction;
use iblt_reconcile::raw_iblt::RawIblt;
use iblt_reconcile::reconcile::{decode_block, encode_block, TxRecord, TxSource};
use iblt_reconcile::txid::{Seed, Tid48, Txid};
use iblt_reconcile::txslice::{rebuild_tx, slice_tx};
use iblt_reconcile::wire::Message;

const GENESIS_TX: [u8; 204] = hex!("01000000010000000000000000000000000000000000000000000000000000000000000000ffffffff4d04ffff001d0104455468652054696d65732030332f4a616e2f32303039204368616e63656c6c6f72206f6e206272696e6b206f66207365636f6e64206261696c6f757420666f722062616e6b73ffffffff0100f2052a01000000434104678afdb0fe5548271967f1a67130b7105cd6a828e03909a67962e0ea1f61deb649f6bc3f4cef38c4f35504e51ec112de5c384df7ba0b8d578a4c702b6bf11d5fac00000000");

const SLICE_SIZE: usize = 64;

criterion_group!(
    benches,
    tx_parse,
    slice_and_rebuild,
    raw_iblt_insert,
    encode_decode_round_trip,
);
criterion_main!(benches);

fn tx_parse(c: &mut Criterion) {
    c.benchmark_group("tx_parse")
        .throughput(criterion::Throughput::Bytes(GENESIS_TX.len() as u64))
        .bench_function("parse", |b| {
            b.iter(|| {
                let tx = Transaction::parse(&GENESIS_TX[..]).unwrap().parsed_owned();
                black_box(&tx);
            })
        })
        .bench_function("txid", |b| {
            let tx = Transaction::parse(&GENESIS_TX[..]).unwrap().parsed_owned();
            b.iter(|| {
                black_box(tx.txid());
            })
        });
}

fn slice_and_rebuild(c: &mut Criterion) {
    let tx = Transaction::parse(&GENESIS_TX[..]).unwrap().parsed_owned();
    let txid = Txid::from_hash(bitcoin_hashes::sha256d::Hash::hash(&GENESIS_TX));
    let id = Tid48::derive(Seed::new(352792).unwrap(), &txid);

    c.benchmark_group("slice_and_rebuild")
        .throughput(criterion::Throughput::Bytes(GENESIS_TX.len() as u64))
        .bench_function("slice_tx", |b| {
            b.iter(|| {
                let slices = slice_tx::<SLICE_SIZE>(&tx, id).unwrap();
                black_box(&slices);
            })
        })
        .bench_function("rebuild_tx", |b| {
            let slices = slice_tx::<SLICE_SIZE>(&tx, id).unwrap();
            b.iter(|| {
                let rebuilt = rebuild_tx(&slices).unwrap();
                black_box(&rebuilt);
            })
        });
}

fn raw_iblt_insert(c: &mut Criterion) {
    let tx = Transaction::parse(&GENESIS_TX[..]).unwrap().parsed_owned();
    let txid = Txid::from_hash(bitcoin_hashes::sha256d::Hash::hash(&GENESIS_TX));
    let id = Tid48::derive(Seed::new(1).unwrap(), &txid);
    let slices = slice_tx::<SLICE_SIZE>(&tx, id).unwrap();

    c.benchmark_group("raw_iblt")
        .bench_function("insert_one_tx", |b| {
            b.iter(|| {
                let mut iblt: RawIblt<SLICE_SIZE> = RawIblt::new(4000);
                for s in &slices {
                    iblt.insert(s);
                }
                black_box(&iblt);
            })
        })
        .bench_function("write", |b| {
            let mut iblt: RawIblt<SLICE_SIZE> = RawIblt::new(4000);
            for s in &slices {
                iblt.insert(s);
            }
            b.iter(|| {
                black_box(iblt.write());
            })
        });
}

struct VecMempool {
    records: Vec<(Tid48, TxRecord)>,
}

impl VecMempool {
    fn new(seed: Seed, records: Vec<TxRecord>) -> Self {
        let records = records.into_iter().map(|r| (r.tid48(seed), r)).collect();
        VecMempool { records }
    }
}

impl TxSource for VecMempool {
    fn transactions(&self) -> Box<dyn Iterator<Item = (Tid48, &TxRecord)> + '_> {
        Box::new(self.records.iter().map(|(id, r)| (*id, r)))
    }

    fn by_tid48(&self, id: Tid48) -> Option<&TxRecord> {
        self.records.iter().find(|(i, _)| *i == id).map(|(_, r)| r)
    }
}

fn synth_tx(locktime: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&1i32.to_le_bytes());
    out.push(1); // one input
    out.extend_from_slice(&[0u8; 32]);
    out.extend_from_slice(&0u32.to_le_bytes());
    out.push(0); // empty script
    out.extend_from_slice(&0xffff_ffffu32.to_le_bytes());
    out.push(1); // one output
    out.extend_from_slice(&0u64.to_le_bytes());
    out.push(0); // empty script
    out.extend_from_slice(&locktime.to_le_bytes());
    out
}

fn encode_decode_round_trip(c: &mut Criterion) {
    let seed = Seed::new(352792).unwrap();
    let coinbase = TxRecord::new(synth_tx(0), 0).unwrap();
    let txs: Vec<TxRecord> = (1..=50u32)
        .map(|i| TxRecord::new(synth_tx(i), 1000).unwrap())
        .collect();
    let mempool = VecMempool::new(seed, txs.clone());

    c.benchmark_group("reconcile")
        .bench_function("encode_block", |b| {
            b.iter(|| {
                let msg: Message<SLICE_SIZE> =
                    encode_block(&coinbase, &txs, &mempool, seed, 100, 200).unwrap();
                black_box(&msg);
            })
        })
        .bench_function("decode_block", |b| {
            let msg: Message<SLICE_SIZE> =
                encode_block(&coinbase, &txs, &mempool, seed, 100, 200).unwrap();
            b.iter(|| {
                let decoded = decode_block(&msg, &mempool).unwrap();
                black_box(&decoded);
            })
        });
}
