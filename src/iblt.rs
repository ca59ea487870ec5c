//! Peeling an IBLT of symmetric differences down to the individual slices that caused them.
//!
//! An [`Iblt`] is a [`RawIblt`] built as `theirs - ours`, plus a priority index ([`IbltTodo`]) of
//! every bucket currently known to hold exactly one slice (count `+1` means "theirs", `-1` means
//! "ours"). [`Iblt::next`] peeks at such a bucket without modifying the table; the caller is
//! responsible for actually cancelling it out via [`Iblt::remove_their_slice`] or
//! [`Iblt::remove_our_slices`] once it has decided what to do with the peeled slice, preferring our
//! own missing slices on a tie since recovering one can let the sender drop an entire transaction's
//! worth of fragments at once.

use std::collections::BTreeSet;

use crate::raw_iblt::RawIblt;
use crate::txslice::Slice;

/// How many of the lowest fragment offsets get their own dedicated bin before bins start
/// covering power-of-two-ish ranges.
const SOON: u16 = 8;

/// Number of bins in the extra, log-scaled range covering fragment offsets `SOON..=u16::MAX`.
const LOG_BINS: usize = 16;

/// A postman-sorted priority queue of candidate buckets, ordered by how low their fragment offset
/// (`fragid - frag_base`) is: low offsets (the start of a transaction) are tried first, since
/// recovering them is most likely to let a whole transaction be reassembled.
///
/// Bins `0..SOON` hold individual offsets; bins `SOON..SOON+LOG_BINS` group offsets by
/// `floor(log2(offset - SOON + 1))`, the same scheme the spec's five-open-questions section
/// resolves fragment-offset binning with.
#[derive(Debug, Clone, Default)]
struct IbltTodo {
    bins: Vec<BTreeSet<usize>>,
}

impl IbltTodo {
    fn new() -> Self {
        IbltTodo {
            bins: vec![BTreeSet::new(); SOON as usize + LOG_BINS],
        }
    }

    fn bin_for(fragoff: u16) -> usize {
        if fragoff < SOON {
            fragoff as usize
        } else {
            let offset = (fragoff - SOON) as u32 + 1;
            let log = (31 - offset.leading_zeros()).min(LOG_BINS as u32 - 1) as usize;
            SOON as usize + log
        }
    }

    fn add(&mut self, fragoff: u16, bucket: usize) {
        self.bins[Self::bin_for(fragoff)].insert(bucket);
    }

    fn del(&mut self, fragoff: u16, bucket: usize) {
        self.bins[Self::bin_for(fragoff)].remove(&bucket);
    }

    /// The lowest non-empty bin's priority, if any.
    fn next_todo(&self) -> Option<usize> {
        self.bins.iter().position(|b| !b.is_empty())
    }

    /// The lowest-indexed bucket in a (non-empty) bin.
    fn next(&self, bin: usize) -> usize {
        *self.bins[bin].iter().next().expect("bin known non-empty")
    }
}

/// Which side a peeled-off slice came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BucketType {
    /// Count was `-1`: a slice only we (the local mempool) had.
    Ours,
    /// Count was `+1`: a slice only the remote peer had.
    Theirs,
    /// No singleton bucket is currently available to extract.
    Neither,
}

/// An IBLT of the symmetric difference between two sides' slice sets, ready to be peeled.
pub struct Iblt<const S: usize> {
    riblt: RawIblt<S>,
    ours_todo: IbltTodo,
    theirs_todo: IbltTodo,
}

impl<const S: usize> Iblt<S> {
    /// Build from `theirs - ours`.
    pub fn new(theirs: &RawIblt<S>, ours: &RawIblt<S>) -> Result<Self, crate::Error> {
        let riblt = theirs.subtract(ours)?;
        let mut iblt = Iblt {
            riblt,
            ours_todo: IbltTodo::new(),
            theirs_todo: IbltTodo::new(),
        };
        for n in 0..iblt.riblt.size() {
            iblt.add_todo_if_singleton(n);
        }
        Ok(iblt)
    }

    fn bucket_type(&self, n: usize) -> BucketType {
        match self.riblt.count(n) {
            -1 => BucketType::Ours,
            1 => BucketType::Theirs,
            _ => BucketType::Neither,
        }
    }

    fn fragoff(bucket: &Slice<S>) -> u16 {
        bucket.fragid().wrapping_sub(bucket.tid48().frag_base())
    }

    fn add_todo_if_singleton(&mut self, n: usize) {
        let fragoff = Self::fragoff(self.riblt.bucket(n));
        match self.bucket_type(n) {
            BucketType::Ours => self.ours_todo.add(fragoff, n),
            BucketType::Theirs => self.theirs_todo.add(fragoff, n),
            BucketType::Neither => {}
        }
    }

    fn remove_todo_if_singleton(&mut self, n: usize) {
        let fragoff = Self::fragoff(self.riblt.bucket(n));
        match self.bucket_type(n) {
            BucketType::Ours => self.ours_todo.del(fragoff, n),
            BucketType::Theirs => self.theirs_todo.del(fragoff, n),
            BucketType::Neither => {}
        }
    }

    fn frob_buckets(&mut self, s: &Slice<S>, dir: i16) {
        for n in RawIblt::<S>::select_buckets(s, self.riblt.size()) {
            self.remove_todo_if_singleton(n);
            self.riblt.frob_bucket(n, s, dir);
            self.add_todo_if_singleton(n);
        }
    }

    /// Peek at the next available singleton bucket, preferring [`BucketType::Ours`] on a tie
    /// between the two sides' lowest priorities.
    ///
    /// Non-destructive, per spec: this does not modify the table. The caller must follow up with
    /// [`Iblt::remove_their_slice`] (for a [`BucketType::Theirs`] slice it accepts as genuine) or
    /// [`Iblt::remove_our_slices`] (for the whole transaction a [`BucketType::Ours`] slice
    /// resolves to) — otherwise the same bucket surfaces again on the next call.
    pub fn next(&mut self) -> (BucketType, Option<Slice<S>>) {
        let ours_prio = self.ours_todo.next_todo();
        let theirs_prio = self.theirs_todo.next_todo();

        let (kind, n) = match (ours_prio, theirs_prio) {
            (None, None) => return (BucketType::Neither, None),
            (Some(o), Some(t)) => {
                if o <= t {
                    (BucketType::Ours, self.ours_todo.next(o))
                } else {
                    (BucketType::Theirs, self.theirs_todo.next(t))
                }
            }
            (Some(o), None) => (BucketType::Ours, self.ours_todo.next(o)),
            (None, Some(t)) => (BucketType::Theirs, self.theirs_todo.next(t)),
        };

        let slice = *self.riblt.bucket(n);
        (kind, Some(slice))
    }

    /// Remove a single slice known to be "theirs" (count `+1`) — the complement of peeling it out
    /// via [`Iblt::next`], used once the receiver has reconstructed it from a mempool lookup.
    pub fn remove_their_slice(&mut self, s: &Slice<S>) {
        self.frob_buckets(s, -1);
    }

    /// Remove every slice of a transaction we have locally (count `-1` buckets), letting the
    /// decoder cancel out a whole transaction once its id is known rather than peeling slice by
    /// slice.
    pub fn remove_our_slices(&mut self, slices: &[Slice<S>]) {
        for s in slices {
            self.frob_buckets(s, 1);
        }
    }

    /// True once every bucket's count and contents are zero — full reconciliation.
    pub fn is_empty(&self) -> bool {
        (0..self.riblt.size()).all(|n| self.riblt.count(n) == 0 && self.riblt.bucket(n).is_empty())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::txid::{Seed, Tid48, Txid};
    use bitcoin_hashes::Hash;

    fn slice_for(seed_val: u64, data: &[u8], fragid: u16) -> Slice<8> {
        let txid = Txid::from_hash(bitcoin_hashes::sha256d::Hash::hash(data));
        let id = Tid48::derive(Seed::new(seed_val).unwrap(), &txid);
        let mut bytes = vec![0u8; 6 + 2 + 8];
        bytes[..6].copy_from_slice(&id.id().to_le_bytes()[..6]);
        bytes[6..8].copy_from_slice(&fragid.to_le_bytes());
        Slice::from_bytes(&bytes)
    }

    #[test]
    fn bin_for_splits_individual_and_log_ranges() {
        assert_eq!(IbltTodo::bin_for(0), 0);
        assert_eq!(IbltTodo::bin_for(7), 7);
        assert_eq!(IbltTodo::bin_for(8), 8);
        assert_eq!(IbltTodo::bin_for(9), 9);
        assert!(IbltTodo::bin_for(65535) < (SOON as usize + LOG_BINS));
    }

    #[test]
    fn peels_a_single_theirs_slice() {
        let mut theirs: RawIblt<8> = RawIblt::new(23);
        let ours: RawIblt<8> = RawIblt::new(23);
        let s = slice_for(1, b"some tx bytes", 0);
        theirs.insert(&s);

        let mut iblt = Iblt::new(&theirs, &ours).unwrap();
        let (kind, peeled) = iblt.next();
        assert_eq!(kind, BucketType::Theirs);
        assert_eq!(peeled, Some(s));
        // next() only peeks; the bucket is still there until explicitly cancelled.
        assert!(!iblt.is_empty());
        iblt.remove_their_slice(&s);
        assert!(iblt.is_empty());
        assert_eq!(iblt.next(), (BucketType::Neither, None));
    }

    #[test]
    fn peels_a_single_ours_slice() {
        let theirs: RawIblt<8> = RawIblt::new(23);
        let mut ours: RawIblt<8> = RawIblt::new(23);
        let s = slice_for(1, b"some other tx bytes", 0);
        ours.insert(&s);

        let mut iblt = Iblt::new(&theirs, &ours).unwrap();
        let (kind, peeled) = iblt.next();
        assert_eq!(kind, BucketType::Ours);
        assert_eq!(peeled, Some(s));
        assert!(!iblt.is_empty());
        iblt.remove_our_slices(&[s]);
        assert!(iblt.is_empty());
        assert_eq!(iblt.next(), (BucketType::Neither, None));
    }

    #[test]
    fn empty_tables_yield_neither() {
        let theirs: RawIblt<8> = RawIblt::new(23);
        let ours: RawIblt<8> = RawIblt::new(23);
        let mut iblt = Iblt::new(&theirs, &ours).unwrap();
        assert_eq!(iblt.next(), (BucketType::Neither, None));
        assert!(iblt.is_empty());
    }
}
