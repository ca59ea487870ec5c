//! Grouped bit-prefix sets: the "added" / "removed" hints carried on the wire, each a family of
//! bit-vectors of length 0 through 48.
//!
//! Storing each length's vectors in a `BTreeSet<Vec<bool>>` gives a deterministic (lexicographic)
//! iteration order for free, so encoding the same logical set always produces the same bytes — the
//! reference C++ iterates an unordered hash set here, which the design notes flag as needing a
//! defined order for reproducible frames.

use std::collections::BTreeSet;

use crate::txid::TID48_BITS;
use crate::varint::{read_varint, write_varint};
use crate::Error;

const MAX_LEN: usize = TID48_BITS as usize;
const NUM_LENGTHS: usize = MAX_LEN + 1;

/// A set of bit-prefixes, one bucket per prefix length in `0..=48`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BitPrefixSet {
    by_length: Vec<BTreeSet<Vec<bool>>>,
}

impl Default for BitPrefixSet {
    fn default() -> Self {
        Self::new()
    }
}

impl BitPrefixSet {
    /// An empty set.
    pub fn new() -> Self {
        BitPrefixSet {
            by_length: vec![BTreeSet::new(); NUM_LENGTHS],
        }
    }

    /// Add a bit-prefix. Fails with [`Error::InvariantViolation`] if it's longer than 48 bits.
    pub fn insert(&mut self, bits: Vec<bool>) -> Result<(), Error> {
        if bits.len() > MAX_LEN {
            return Err(Error::InvariantViolation);
        }
        self.by_length[bits.len()].insert(bits);
        Ok(())
    }

    /// Every bit-prefix of a given length.
    pub fn at_length(&self, len: usize) -> &BTreeSet<Vec<bool>> {
        &self.by_length[len]
    }

    /// True if every length bucket is empty.
    pub fn is_empty(&self) -> bool {
        self.by_length.iter().all(BTreeSet::is_empty)
    }

    /// Append this set's wire encoding to `out`.
    ///
    /// `varint(min)`, `varint(run)` where `run` spans the contiguous range of non-empty lengths,
    /// `varint(count)` per length in that range, then every bit-vector's bits concatenated
    /// (length-major, then vector order) and packed least-significant-bit first. An empty set
    /// encodes as `varint(0); varint(0)`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        let populated: Vec<usize> = (0..NUM_LENGTHS)
            .filter(|&l| !self.by_length[l].is_empty())
            .collect();
        let (min, max) = match (populated.first(), populated.last()) {
            (Some(&min), Some(&max)) => (min, max),
            _ => {
                write_varint(0, out);
                write_varint(0, out);
                return;
            }
        };

        write_varint(min as u64, out);
        write_varint((max - min + 1) as u64, out);
        for l in min..=max {
            write_varint(self.by_length[l].len() as u64, out);
        }

        let mut packed: Vec<u8> = Vec::new();
        let mut bitoff = 0usize;
        for l in min..=max {
            for v in &self.by_length[l] {
                for &b in v {
                    if bitoff % 8 == 0 {
                        packed.push(0);
                    }
                    if b {
                        let last = packed.len() - 1;
                        packed[last] |= 1 << (bitoff % 8);
                    }
                    bitoff += 1;
                }
            }
        }
        out.extend_from_slice(&packed);
    }

    /// Read a set back out of its wire encoding, advancing `*cursor` past it.
    pub fn decode(bytes: &[u8], cursor: &mut usize) -> Result<Self, Error> {
        let min = read_varint(bytes, cursor)? as usize;
        let run = read_varint(bytes, cursor)? as usize;
        let mut set = BitPrefixSet::new();
        if run == 0 {
            return Ok(set);
        }
        if min >= NUM_LENGTHS || run > NUM_LENGTHS - min {
            return Err(Error::ParseInvalid);
        }
        let max = min + run - 1;

        // Each `count_l` is an untrusted varint (up to u64::MAX) and `bit_len = sum(l * count_l)`
        // can overflow `usize`, or wrap into a byte length that passes the slice bound below and
        // then index far past it in the bit-unpacking loop. Bound every count by the one true
        // invariant available before trusting it — a set of `l`-bit vectors can hold at most `2^l`
        // distinct members — and accumulate `bit_len` with checked arithmetic so a malformed
        // count or an overflowing running total is rejected as `ParseInvalid` before any
        // allocation or indexing happens, mirroring the sanity cap `wire::Message::decode` applies
        // to `bucket_count` before trusting it.
        let mut counts = [0usize; NUM_LENGTHS];
        let mut bit_len: u64 = 0;
        for l in min..=max {
            let count = read_varint(bytes, cursor)?;
            let max_count_at_len = 1u64.checked_shl(l as u32).unwrap_or(u64::MAX);
            if count > max_count_at_len {
                return Err(Error::ParseInvalid);
            }
            let contributed = (l as u64).checked_mul(count).ok_or(Error::ParseInvalid)?;
            bit_len = bit_len.checked_add(contributed).ok_or(Error::ParseInvalid)?;
            counts[l] = count as usize;
        }

        let remaining_bits = bytes.len().saturating_sub(*cursor).saturating_mul(8) as u64;
        if bit_len > remaining_bits {
            return Err(Error::ParseInvalid);
        }

        let byte_len = (bit_len as usize).div_ceil(8);
        let bits = bytes
            .get(*cursor..*cursor + byte_len)
            .ok_or(Error::ParseTruncated)?;

        let mut bitoff = 0usize;
        for l in min..=max {
            for _ in 0..counts[l] {
                let mut v = Vec::with_capacity(l);
                for _ in 0..l {
                    let byte = bits[bitoff / 8];
                    v.push((byte >> (bitoff % 8)) & 1 == 1);
                    bitoff += 1;
                }
                set.by_length[l].insert(v);
            }
        }

        while bitoff % 8 != 0 {
            let byte = bits[bitoff / 8];
            if (byte >> (bitoff % 8)) & 1 == 1 {
                return Err(Error::ParseInvalid);
            }
            bitoff += 1;
        }

        *cursor += byte_len;
        Ok(set)
    }
}
