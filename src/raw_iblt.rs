//! The raw, bucket-addressed IBLT that actually goes on the wire.
//!
//! Three independent [`murmur3`] hashes place each slice into `NUM_HASHES` of the table's
//! buckets; each bucket XOR-accumulates the flat bytes of every slice routed to it and keeps a
//! signed count of how many slices have been inserted (minus removed). Two raw IBLTs built from
//! the two sides of a reconciliation subtract bucket-for-bucket into a third IBLT holding exactly
//! the symmetric difference, which [`crate::iblt::Iblt`] then peels.

use crate::murmur3::murmur3;
use crate::txslice::Slice;
use crate::Error;

/// Eppstein et al. found 3–4 hashes work well for set reconciliation; Kalle Rosenbaum's reference
/// implementation settled on 3.
const NUM_HASHES: usize = 3;

/// A raw IBLT over `N` buckets of `S`-byte slices.
#[derive(Debug, Clone)]
pub struct RawIblt<const S: usize> {
    buckets: Vec<Slice<S>>,
    counts: Vec<i16>,
}

impl<const S: usize> RawIblt<S> {
    /// An empty table with `size` buckets.
    pub fn new(size: usize) -> Self {
        RawIblt {
            buckets: vec![Slice::zeroed(); size],
            counts: vec![0i16; size],
        }
    }

    /// The number of buckets.
    pub fn size(&self) -> usize {
        self.buckets.len()
    }

    /// A bucket's accumulated slice (the XOR of everything routed to it).
    pub fn bucket(&self, n: usize) -> &Slice<S> {
        &self.buckets[n]
    }

    /// A bucket's signed count.
    pub fn count(&self, n: usize) -> i16 {
        self.counts[n]
    }

    pub(crate) fn select_buckets(slice: &Slice<S>, size: usize) -> [usize; NUM_HASHES] {
        let bytes = slice.as_bytes();
        let mut out = [0usize; NUM_HASHES];
        for (i, o) in out.iter_mut().enumerate() {
            *o = (murmur3(i as u32, &bytes) as usize) % size;
        }
        out
    }

    pub(crate) fn frob_bucket(&mut self, n: usize, s: &Slice<S>, dir: i16) {
        self.counts[n] += dir;
        self.buckets[n].xor_with(s);
    }

    fn frob_buckets(&mut self, s: &Slice<S>, dir: i16) {
        for n in Self::select_buckets(s, self.size()) {
            self.frob_bucket(n, s, dir);
        }
    }

    /// Insert a slice into its `NUM_HASHES` buckets.
    pub fn insert(&mut self, s: &Slice<S>) {
        self.frob_buckets(s, 1);
    }

    /// Remove a slice from its `NUM_HASHES` buckets (the inverse of [`RawIblt::insert`]).
    pub fn remove(&mut self, s: &Slice<S>) {
        self.frob_buckets(s, -1);
    }

    /// Bucket-wise subtraction: `self - other`, the basis for symmetric-difference peeling.
    ///
    /// Fails with [`Error::SizeMismatch`] unless both tables have the same bucket count — the two
    /// sides of a reconciliation must agree on table size before subtracting.
    pub fn subtract(&self, other: &RawIblt<S>) -> Result<RawIblt<S>, Error> {
        if self.size() != other.size() {
            return Err(Error::SizeMismatch);
        }
        let mut out = RawIblt::new(self.size());
        for i in 0..self.size() {
            out.counts[i] = self.counts[i] - other.counts[i];
            out.buckets[i] = self.buckets[i];
            out.buckets[i].xor_with(&other.buckets[i]);
        }
        Ok(out)
    }

    /// Linearize: the signed counts (`size()` little-endian `i16`s) followed by the bucket
    /// contents (`size()` flat slice images).
    pub fn write(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size() * (2 + Slice::<S>::WIRE_LEN));
        for c in &self.counts {
            out.extend_from_slice(&c.to_le_bytes());
        }
        for b in &self.buckets {
            out.extend_from_slice(&b.as_bytes());
        }
        out
    }

    /// Read back a table of `size` buckets from its linearized form.
    ///
    /// Fails with [`Error::ParseTruncated`] unless `bytes.len()` is exactly
    /// `size * (2 + Slice::<S>::WIRE_LEN)` — there is no framing inside a raw IBLT payload, so any
    /// length mismatch at all means the buffer wasn't actually this shape.
    pub fn read(size: usize, bytes: &[u8]) -> Result<Self, Error> {
        let counts_len = size * 2;
        let buckets_len = size * Slice::<S>::WIRE_LEN;
        if bytes.len() != counts_len + buckets_len {
            return Err(Error::ParseTruncated);
        }
        let mut counts = Vec::with_capacity(size);
        for chunk in bytes[..counts_len].chunks_exact(2) {
            counts.push(i16::from_le_bytes([chunk[0], chunk[1]]));
        }
        let mut buckets = Vec::with_capacity(size);
        for chunk in bytes[counts_len..].chunks_exact(Slice::<S>::WIRE_LEN) {
            buckets.push(Slice::from_bytes(chunk));
        }
        Ok(RawIblt { buckets, counts })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn slice(txidbits: u64, fragid: u16, fill: u8) -> Slice<8> {
        let bytes = {
            let mut b = vec![0u8; 6 + 2 + 8];
            b[..6].copy_from_slice(&txidbits.to_le_bytes()[..6]);
            b[6..8].copy_from_slice(&fragid.to_le_bytes());
            b[8..].iter_mut().for_each(|x| *x = fill);
            b
        };
        Slice::from_bytes(&bytes)
    }

    #[test]
    fn insert_then_remove_restores_empty_table() {
        let mut t: RawIblt<8> = RawIblt::new(17);
        let s = slice(0xaabbcc, 3, 0x42);
        t.insert(&s);
        assert!(t.counts.iter().any(|&c| c != 0));
        t.remove(&s);
        assert!(t.counts.iter().all(|&c| c == 0));
        assert!(t.buckets.iter().all(|b| b.is_empty()));
    }

    #[test]
    fn write_read_round_trips() {
        let mut t: RawIblt<8> = RawIblt::new(11);
        t.insert(&slice(1, 0, 1));
        t.insert(&slice(2, 1, 2));
        t.insert(&slice(3, 2, 3));
        let bytes = t.write();
        let back: RawIblt<8> = RawIblt::read(11, &bytes).unwrap();
        assert_eq!(back.counts, t.counts);
        for i in 0..11 {
            assert_eq!(back.bucket(i), t.bucket(i));
        }
    }

    #[test]
    fn read_rejects_wrong_length() {
        assert_eq!(
            RawIblt::<8>::read(11, &[0u8; 3]),
            Err(Error::ParseTruncated)
        );
    }

    #[test]
    fn subtract_of_identical_tables_is_empty() {
        let mut a: RawIblt<8> = RawIblt::new(13);
        a.insert(&slice(9, 0, 9));
        a.insert(&slice(10, 0, 10));
        let diff = a.subtract(&a).unwrap();
        assert!(diff.counts.iter().all(|&c| c == 0));
        assert!(diff.buckets.iter().all(|b| b.is_empty()));
    }

    #[test]
    fn subtract_rejects_size_mismatch() {
        let a: RawIblt<8> = RawIblt::new(10);
        let b: RawIblt<8> = RawIblt::new(11);
        assert_eq!(a.subtract(&b), Err(Error::SizeMismatch));
    }
}
