//! The end-to-end reconciliation driver: turn a block plus a sender's mempool view into a
//! [`crate::wire::Message`], and turn a received message plus a receiver's mempool view back into
//! the block's transaction set (or a decode failure).
//!
//! This is the only layer that touches a mempool at all, and it touches one only through
//! [`TxSource`] — the trait seam spec.md's design notes call for where "a global tx cache keyed by
//! file path" would otherwise leak mempool/storage concerns into the codec. Everything below this
//! layer (slicing, the IBLT, the prefix tree, the wire frame) is a pure function of owned bytes.

use std::collections::{BTreeMap, BTreeSet};

use crate::bit_prefix_set::BitPrefixSet;
use crate::bsl::Transaction;
use crate::iblt::{BucketType, Iblt};
use crate::prefix_tree::PrefixTree;
use crate::raw_iblt::RawIblt;
use crate::txid::{Seed, Tid48, Txid};
use crate::txslice::{rebuild_tx, slice_tx, slices_expected, Slice};
use crate::wire::Message;
use crate::Error;

/// A cached transaction body plus the fee it pays, the unit both the sender's block and either
/// side's mempool are made of.
///
/// Owns its wire bytes rather than borrowing them, unlike [`crate::bsl::Transaction`]: a mempool
/// or block entry outlives whatever buffer it was first read out of, so the codec's external
/// collaborators are expected to hand over owned records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRecord {
    bytes: Vec<u8>,
    fee: u64,
}

impl TxRecord {
    /// Wrap a transaction's wire bytes and the fee (satoshis) it pays. Fails with
    /// [`Error::ParseInvalid`] if `bytes` doesn't parse as a well-formed transaction.
    pub fn new(bytes: Vec<u8>, fee: u64) -> Result<Self, Error> {
        Transaction::parse(&bytes).map_err(|_| Error::ParseInvalid)?;
        Ok(TxRecord { bytes, fee })
    }

    /// The transaction's linearized wire bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The fee this transaction pays, in satoshis.
    pub fn fee(&self) -> u64 {
        self.fee
    }

    /// The linearized wire length, in bytes.
    pub fn length(&self) -> usize {
        self.bytes.len()
    }

    /// `(fee << 13) / length`: satoshi-per-byte scaled by 2^13. spec.md §9 Open Question 4 is
    /// explicit that the shift happens before the division — preserving that unit end-to-end is
    /// what keeps threshold comparisons between sender and receiver consistent.
    pub fn fee_per_byte(&self) -> u64 {
        (self.fee << 13) / self.length() as u64
    }

    fn parsed(&self) -> Transaction<'_> {
        Transaction::parse(&self.bytes)
            .expect("validated at construction")
            .parsed_owned()
    }

    /// This transaction's full 32-byte id.
    pub fn txid(&self) -> Txid {
        Txid::from_hash(self.parsed().txid())
    }

    /// This transaction's seeded 48-bit projection.
    pub fn tid48(&self, seed: Seed) -> Tid48 {
        Tid48::derive(seed, &self.txid())
    }

    /// Split this transaction into `S`-byte slices keyed by `seed`.
    pub fn slices<const S: usize>(&self, seed: Seed) -> Result<Vec<Slice<S>>, Error> {
        slice_tx(&self.parsed(), self.tid48(seed))
    }
}

/// An external mempool view the driver reads through, never owns or mutates.
///
/// spec.md's design notes treat "the mempool and transaction-cache plumbing" as an external
/// collaborator the core only ever sees through a `lookup`-shaped interface; this is that
/// interface, specialized to the one query shape the driver actually needs (every transaction with
/// its seeded id, and point lookups by that id).
///
/// Every id an implementation hands back — from [`TxSource::transactions`] or matched by
/// [`TxSource::by_tid48`] — must be [`TxRecord::tid48`] computed under the same [`Seed`] as the
/// [`Message`] being encoded or decoded. `encode_block`/`decode_block` take `seed` as an explicit
/// argument rather than reading it off the source for exactly this reason: a source built against
/// one seed and queried against another would silently desynchronize every id comparison in the
/// driver. Debug builds of the driver assert this invariant against the ids a source returns.
pub trait TxSource {
    /// Every transaction this source holds, paired with its `Tid48` under whatever seed the
    /// source was built with.
    fn transactions(&self) -> Box<dyn Iterator<Item = (Tid48, &TxRecord)> + '_>;

    /// Resolve a single transaction by its `Tid48`, if this source holds one with that id.
    ///
    /// If more than one transaction collides on the same 48-bit id (end-to-end scenario F), an
    /// implementation may return either — the driver only consults this for whole-transaction
    /// cancellation, and a collision at this layer is already vanishingly rare.
    fn by_tid48(&self, id: Tid48) -> Option<&TxRecord>;
}

/// Encode a block against a sender's mempool view into a wire-ready [`Message`].
///
/// Implements spec.md §4.8's encode steps: a unique-prefix hint for every below-threshold block
/// transaction the sender's own mempool recognizes (§4.8 step 2), a removal hint for every
/// at/above-threshold mempool transaction absent from the block (step 3), and a raw IBLT over
/// every block transaction's slices (step 4). A below-threshold block transaction the sender's
/// mempool has never seen gets no hint — it's still fully represented in the IBLT, so the receiver
/// recovers it as an ordinary "theirs" slice run instead of via the added-set shortcut.
pub fn encode_block<const S: usize>(
    coinbase: &TxRecord,
    block: &[TxRecord],
    mempool: &dyn TxSource,
    seed: Seed,
    min_fee_per_byte: u64,
    bucket_count: usize,
) -> Result<Message<S>, Error> {
    let mut tree: PrefixTree<&TxRecord> = PrefixTree::new();
    for (id, tx) in mempool.transactions() {
        debug_assert_eq!(id, tx.tid48(seed), "TxSource id must match the message seed");
        tree.insert(id, tx);
    }

    let block_ids: BTreeSet<u64> = block.iter().map(|t| t.tid48(seed).id()).collect();

    let mut added = BitPrefixSet::new();
    for tx in block {
        if tx.fee_per_byte() < min_fee_per_byte {
            if let Ok(prefix) = tree.get_unique_prefix(tx.tid48(seed)) {
                added.insert(prefix)?;
            }
        }
    }

    let mut removed = BitPrefixSet::new();
    for (id, tx) in mempool.transactions() {
        if tx.fee_per_byte() >= min_fee_per_byte && !block_ids.contains(&id.id()) {
            removed.insert(tree.get_unique_prefix(id)?)?;
        }
    }

    let mut iblt: RawIblt<S> = RawIblt::new(bucket_count);
    for tx in block {
        for s in tx.slices::<S>(seed)? {
            iblt.insert(&s);
        }
    }

    Ok(Message {
        seed,
        min_fee_per_byte,
        bucket_count,
        coinbase: coinbase.bytes().to_vec(),
        added,
        removed,
        iblt,
    })
}

/// Decode a [`Message`] against a receiver's mempool view into the block's transaction set, in
/// wire-byte form, coinbase first.
///
/// Implements spec.md §4.8's decode steps 2 through 10. Candidate assembly (steps 3–5), IBLT
/// subtraction and peeling (steps 6–8), and fragment reassembly (step 9) all run in order; any
/// deviation from a clean decode returns the specific [`Error`] variant spec.md §7 names for it
/// rather than a single opaque failure, even though a caller that only wants the boolean outcome
/// can just match on `is_err()`.
pub fn decode_block<const S: usize>(
    msg: &Message<S>,
    mempool: &dyn TxSource,
) -> Result<Vec<Vec<u8>>, Error> {
    let mut tree: PrefixTree<&TxRecord> = PrefixTree::new();
    for (id, tx) in mempool.transactions() {
        debug_assert_eq!(id, tx.tid48(msg.seed), "TxSource id must match the message seed");
        tree.insert(id, tx);
    }

    let mut candidates: BTreeMap<u64, &TxRecord> = BTreeMap::new();
    for (id, tx) in mempool.transactions() {
        if tx.fee_per_byte() >= msg.min_fee_per_byte {
            candidates.insert(id.id(), tx);
        }
    }

    for l in 0..=48 {
        for bits in msg.removed.at_length(l) {
            for tx in tree.lookup_prefix(bits) {
                candidates.remove(&tx.tid48(msg.seed).id());
            }
        }
    }
    for l in 0..=48 {
        for bits in msg.added.at_length(l) {
            for tx in tree.lookup_prefix(bits) {
                if tx.fee_per_byte() < msg.min_fee_per_byte {
                    candidates.insert(tx.tid48(msg.seed).id(), tx);
                }
            }
        }
    }

    let mut receiver_iblt: RawIblt<S> = RawIblt::new(msg.bucket_count);
    for tx in candidates.values() {
        for s in tx.slices::<S>(msg.seed)? {
            receiver_iblt.insert(&s);
        }
    }

    let mut iblt = Iblt::new(&msg.iblt, &receiver_iblt)?;
    let mut seen_theirs: BTreeSet<Slice<S>> = BTreeSet::new();
    let mut theirs_slices: Vec<Slice<S>> = Vec::new();

    loop {
        match iblt.next() {
            (BucketType::Neither, _) => break,
            (BucketType::Ours, Some(s)) => {
                // spec.md §4.8 step 7: "the caller looks up the corresponding whole transaction
                // by its Tid48". `candidates` still gates membership — a mempool tx that `by_tid48`
                // resolves but that the added/removed hints have already dropped from the
                // candidate set isn't a legitimate cancellation target.
                let tid48 = s.tid48();
                if !candidates.contains_key(&tid48.id()) {
                    return Err(Error::Corrupt);
                }
                let tx = mempool.by_tid48(tid48).ok_or(Error::Corrupt)?;
                let slices = tx.slices::<S>(msg.seed)?;
                iblt.remove_our_slices(&slices);
                candidates.remove(&tid48.id());
            }
            (BucketType::Theirs, Some(s)) => {
                if !seen_theirs.insert(s) {
                    return Err(Error::DuplicateSlice);
                }
                iblt.remove_their_slice(&s);
                theirs_slices.push(s);
            }
            (_, None) => unreachable!("next() only returns None alongside BucketType::Neither"),
        }
    }

    if !iblt.is_empty() {
        return Err(Error::Residual);
    }

    let recovered = reassemble_theirs(theirs_slices)?;

    let mut out = Vec::with_capacity(1 + candidates.len() + recovered.len());
    out.push(msg.coinbase.clone());
    out.extend(candidates.values().map(|tx| tx.bytes().to_vec()));
    out.extend(recovered.into_iter().map(|(_, bytes)| bytes));
    Ok(out)
}

/// Group peeled "theirs" slices by transaction and rebuild each one, per spec.md §4.8 step 9.
///
/// A group whose fragment offsets (`fragid - frag_base`) aren't exactly the contiguous run
/// `0..len` is rejected as [`Error::BadFragment`]; a group that's contiguous but shorter than the
/// leading slice's declared fragment count is [`Error::Incomplete`] instead — the distinction
/// spec.md draws between "malformed" and "still missing trailing fragments".
fn reassemble_theirs<const S: usize>(slices: Vec<Slice<S>>) -> Result<Vec<(Tid48, Vec<u8>)>, Error> {
    let mut groups: BTreeMap<u64, Vec<Slice<S>>> = BTreeMap::new();
    for s in slices {
        groups.entry(s.tid48().id()).or_default().push(s);
    }

    let mut out = Vec::with_capacity(groups.len());
    for (_, mut group) in groups {
        let tid48 = group[0].tid48();
        let frag_base = tid48.frag_base();
        group.sort_by_key(|s| s.fragid().wrapping_sub(frag_base));

        for (k, s) in group.iter().enumerate() {
            if s.fragid().wrapping_sub(frag_base) as usize != k {
                return Err(Error::BadFragment);
            }
        }

        let n = slices_expected(&group[0])?;
        if n == 0 || n > 0xFFFF {
            return Err(Error::BadFragment);
        }
        if (group.len() as u64) < n {
            return Err(Error::Incomplete);
        }
        if (group.len() as u64) != n {
            return Err(Error::BadFragment);
        }

        let bytes = rebuild_tx(&group)?;
        out.push((tid48, bytes));
    }
    Ok(out)
}
