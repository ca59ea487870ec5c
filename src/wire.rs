//! The composite reconciliation message: seed, fee threshold, bucket count, coinbase transaction,
//! the two bit-prefix hint sets, and the sender's raw IBLT payload.
//!
//! Fields are emitted and parsed strictly in wire order (spec.md §6); there is no length-prefixing
//! between fields, so a truncated or reordered buffer is rejected at the first field that runs out
//! of bytes rather than caught afterward by some trailing checksum.

use crate::bit_prefix_set::BitPrefixSet;
use crate::bsl::Transaction;
use crate::raw_iblt::RawIblt;
use crate::txid::Seed;
use crate::varint::{read_varint, write_varint};
use crate::Error;

/// The 16-byte wire slot a seed occupies: an 8-byte little-endian value followed by 8 reserved
/// zero bytes (spec.md §9 Open Question 1 — locked to "reader tolerates, `decode` may reject").
const SEED_WIRE_LEN: usize = 16;

/// A fully parsed reconciliation message, generic over the deployment's slice size `S`.
#[derive(Debug, Clone)]
pub struct Message<const S: usize> {
    /// The non-zero seed `Tid48` derivation and bucket placement are both keyed on.
    pub seed: Seed,
    /// Minimum `(fee << 13) / length` a block transaction must reach before it's assumed to
    /// already be in every well-behaved receiver's mempool.
    pub min_fee_per_byte: u64,
    /// Bucket count of `iblt`; also the bucket count the receiver must build its own raw IBLT
    /// with before subtracting.
    pub bucket_count: usize,
    /// The block's coinbase transaction, sent in full since it never lives in any mempool.
    pub coinbase: Vec<u8>,
    /// Bit-prefixes of below-threshold block transactions the sender believes the receiver is
    /// missing.
    pub added: BitPrefixSet,
    /// Bit-prefixes of at/above-threshold mempool transactions the sender knows aren't in the
    /// block.
    pub removed: BitPrefixSet,
    /// The sender's raw IBLT over every block transaction's slices.
    pub iblt: RawIblt<S>,
}

impl<const S: usize> Message<S> {
    /// Serialize in wire order: seed, fee threshold, bucket count, coinbase, added, removed, then
    /// the raw IBLT payload.
    ///
    /// No length prefix precedes `coinbase`: a transaction's wire encoding is self-delimiting (its
    /// own varint counts bound the input/output lists), so spec.md §6's literal field order carries
    /// `bytes coinbase_tx` directly and leans on the parser's own cursor to find its end.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(self.seed.get(), &mut out);
        write_varint(self.min_fee_per_byte, &mut out);
        write_varint(self.bucket_count as u64, &mut out);
        out.extend_from_slice(&self.coinbase);
        self.added.encode(&mut out);
        self.removed.encode(&mut out);
        out.extend_from_slice(&self.iblt.write());
        out
    }

    /// Parse a message, rejecting a bucket count past [`MAX_BUCKET_COUNT`] before ever allocating
    /// the raw IBLT it would imply (spec.md §5's "resource bounds" sanity cap).
    pub fn decode(bytes: &[u8]) -> Result<Self, Error> {
        let mut cursor = 0usize;

        let raw_seed = read_varint(bytes, &mut cursor)?;
        let seed = Seed::new(raw_seed)?;
        let min_fee_per_byte = read_varint(bytes, &mut cursor)?;
        let bucket_count = read_varint(bytes, &mut cursor)? as usize;

        let bucket_bytes = bucket_count
            .checked_mul(2 + S)
            .ok_or(Error::ParseInvalid)?;
        if bucket_bytes > MAX_IBLT_BYTES {
            return Err(Error::ParseInvalid);
        }

        let rest = bytes.get(cursor..).ok_or(Error::ParseTruncated)?;
        let parsed_coinbase = Transaction::parse(rest).map_err(|e| match e {
            Error::MoreBytesNeeded => Error::ParseTruncated,
            _ => Error::ParseInvalid,
        })?;
        let coinbase = parsed_coinbase.parsed().as_ref().to_vec();
        cursor += parsed_coinbase.consumed();

        let added = BitPrefixSet::decode(bytes, &mut cursor)?;
        let removed = BitPrefixSet::decode(bytes, &mut cursor)?;

        let iblt_bytes = bytes.get(cursor..).ok_or(Error::ParseTruncated)?;
        let iblt = RawIblt::<S>::read(bucket_count, iblt_bytes)?;

        Ok(Message {
            seed,
            min_fee_per_byte,
            bucket_count,
            coinbase,
            added,
            removed,
            iblt,
        })
    }
}

/// Sanity cap on the raw IBLT payload a decode will allocate: spec.md §5 names "e.g. 100 MiB" —
/// the bound is generous enough for any real deployment while stopping a hostile `bucket_count`
/// from driving an out-of-memory allocation before a single bucket is read.
pub const MAX_IBLT_BYTES: usize = 100 * 1024 * 1024;

/// Reserve an explicit 16-byte seed slot (8-byte LE value, 8 zero bytes) for callers that frame
/// a seed outside of [`Message`] — e.g. the `iblt:` auxiliary line format's 16-byte seed field
/// (spec.md §6), which this crate's wire codec otherwise doesn't implement.
pub fn encode_seed_slot(seed: Seed) -> [u8; SEED_WIRE_LEN] {
    let mut out = [0u8; SEED_WIRE_LEN];
    out[..8].copy_from_slice(&seed.get().to_le_bytes());
    out
}

/// Decode a 16-byte seed slot, rejecting a non-zero reserved upper half with
/// [`Error::ReservedSeedBytesNonZero`] per spec.md §9 Open Question 1.
pub fn decode_seed_slot(bytes: &[u8; SEED_WIRE_LEN]) -> Result<Seed, Error> {
    if bytes[8..].iter().any(|&b| b != 0) {
        return Err(Error::ReservedSeedBytesNonZero);
    }
    let mut raw = [0u8; 8];
    raw.copy_from_slice(&bytes[..8]);
    Seed::new(u64::from_le_bytes(raw))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::txslice::slice_tx;

    fn sample_message() -> Message<8> {
        let coinbase = crate::test_common::GENESIS_TX.to_vec();
        let mut iblt: RawIblt<8> = RawIblt::new(11);
        let tx = Transaction::parse(&coinbase).unwrap().parsed_owned();
        let txid = crate::txid::Txid::from_hash(tx.txid());
        let seed = Seed::new(352792).unwrap();
        let id = crate::txid::Tid48::derive(seed, &txid);
        for s in slice_tx::<8>(&tx, id).unwrap() {
            iblt.insert(&s);
        }
        let mut added = BitPrefixSet::new();
        added.insert(vec![true, false, true]).unwrap();
        let mut removed = BitPrefixSet::new();
        removed.insert(vec![false]).unwrap();
        Message {
            seed,
            min_fee_per_byte: 42,
            bucket_count: 11,
            coinbase,
            added,
            removed,
            iblt,
        }
    }

    #[test]
    fn encode_decode_round_trips() {
        let msg = sample_message();
        let bytes = msg.encode();
        let back: Message<8> = Message::decode(&bytes).unwrap();
        assert_eq!(back.seed, msg.seed);
        assert_eq!(back.min_fee_per_byte, msg.min_fee_per_byte);
        assert_eq!(back.bucket_count, msg.bucket_count);
        assert_eq!(back.coinbase, msg.coinbase);
        assert_eq!(back.added, msg.added);
        assert_eq!(back.removed, msg.removed);
        for i in 0..msg.bucket_count {
            assert_eq!(back.iblt.bucket(i), msg.iblt.bucket(i));
            assert_eq!(back.iblt.count(i), msg.iblt.count(i));
        }
    }

    #[test]
    fn decode_rejects_zero_seed() {
        let mut msg = sample_message();
        msg.seed = Seed::new(1).unwrap();
        let mut bytes = msg.encode();
        bytes[0] = 0;
        assert_eq!(Message::<8>::decode(&bytes), Err(Error::InvariantViolation));
    }

    #[test]
    fn decode_rejects_bucket_count_past_sanity_cap() {
        let mut out = Vec::new();
        write_varint(1, &mut out); // seed
        write_varint(0, &mut out); // fee threshold
        write_varint((MAX_IBLT_BYTES / 8 + 1) as u64, &mut out); // bucket_count
        assert_eq!(Message::<8>::decode(&out), Err(Error::ParseInvalid));
    }

    #[test]
    fn decode_rejects_truncated_coinbase() {
        let msg = sample_message();
        let mut bytes = msg.encode();
        bytes.truncate(50); // well inside the 204-byte coinbase, past its length varint
        assert_eq!(Message::<8>::decode(&bytes), Err(Error::ParseTruncated));
    }

    #[test]
    fn seed_slot_round_trips_and_rejects_nonzero_reserved_half() {
        let seed = Seed::new(352792).unwrap();
        let slot = encode_seed_slot(seed);
        assert_eq!(decode_seed_slot(&slot).unwrap(), seed);

        let mut tampered = slot;
        tampered[15] = 1;
        assert_eq!(
            decode_seed_slot(&tampered),
            Err(Error::ReservedSeedBytesNonZero)
        );
    }
}
