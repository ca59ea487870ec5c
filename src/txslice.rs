//! Fixed-size transaction fragments, the unit an IBLT bucket actually holds.

use crate::bsl::Transaction;
use crate::txid::Tid48;
use crate::varint::{read_varint, varint_len, write_varint};
use crate::{Error, Parse};

/// A fixed-size fragment of a serialized transaction.
///
/// Laid out, for wire purposes, as a flat `6 + 2 + S` byte image: `txidbits` (48 meaningful bits,
/// little-endian), `fragid` (little-endian), then `contents`. [`Slice::as_bytes`] /
/// [`Slice::from_bytes`] materialize that image explicitly rather than relying on native struct
/// layout, since XOR-aggregation and hashing both operate on the flat bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice<const S: usize> {
    txidbits: u64,
    fragid: u16,
    contents: [u8; S],
}

impl<const S: usize> Slice<S> {
    /// The flat wire length of one slice: `6 + 2 + S`.
    pub const WIRE_LEN: usize = 6 + 2 + S;

    /// An all-zero slice.
    pub fn zeroed() -> Self {
        Slice {
            txidbits: 0,
            fragid: 0,
            contents: [0u8; S],
        }
    }

    /// The 48-bit id this slice belongs to.
    pub fn tid48(&self) -> Tid48 {
        Tid48::from_raw(self.txidbits)
    }

    /// The slice's fragment id.
    pub fn fragid(&self) -> u16 {
        self.fragid
    }

    /// The slice payload.
    pub fn contents(&self) -> &[u8; S] {
        &self.contents
    }

    /// True if `txidbits`, `fragid` and every content byte are zero.
    pub fn is_empty(&self) -> bool {
        self.txidbits == 0 && self.fragid == 0 && self.contents.iter().all(|&b| b == 0)
    }

    /// Materialize the flat `6 + 2 + S` byte wire image: `txidbits` LE (6 bytes), `fragid` LE (2
    /// bytes), then `contents`.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(Self::WIRE_LEN);
        out.extend_from_slice(&self.txidbits.to_le_bytes()[..6]);
        out.extend_from_slice(&self.fragid.to_le_bytes());
        out.extend_from_slice(&self.contents);
        out
    }

    /// Parse a slice back out of its flat wire image. Panics if `bytes.len() != Self::WIRE_LEN`:
    /// callers (raw IBLT read) are expected to have already sized-checked the whole buffer.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        assert_eq!(bytes.len(), Self::WIRE_LEN);
        let mut txidbits_buf = [0u8; 8];
        txidbits_buf[..6].copy_from_slice(&bytes[..6]);
        let txidbits = u64::from_le_bytes(txidbits_buf);
        let fragid = u16::from_le_bytes([bytes[6], bytes[7]]);
        let mut contents = [0u8; S];
        contents.copy_from_slice(&bytes[8..8 + S]);
        Slice {
            txidbits,
            fragid,
            contents,
        }
    }

    /// XOR another slice's flat bytes into this one's, in place.
    pub fn xor_with(&mut self, other: &Slice<S>) {
        self.txidbits ^= other.txidbits;
        self.fragid ^= other.fragid;
        for (a, b) in self.contents.iter_mut().zip(other.contents.iter()) {
            *a ^= b;
        }
    }
}

impl<const S: usize> PartialOrd for Slice<S> {
    fn partial_cmp(&self, other: &Self) -> Option<core::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<const S: usize> Ord for Slice<S> {
    /// Ordering: by `(txidbits, fragid)` ascending.
    fn cmp(&self, other: &Self) -> core::cmp::Ordering {
        (self.txidbits, self.fragid).cmp(&(other.txidbits, other.fragid))
    }
}

fn num_slices_for(bytes: usize, slice_size: usize) -> usize {
    (bytes + slice_size - 1) / slice_size
}

/// Split a transaction's linearized wire bytes into fixed-size [`Slice`]s.
///
/// `n = ceil((1 + L) / S)` where `L` is the transaction's wire length, assuming the varint for
/// `n` fits one byte; if encoding `n` would actually take more than one byte, `n` is recomputed
/// using the varint's real length. Fails with [`Error::InvariantViolation`] if the resulting slice
/// count would not fit in the 16-bit `fragid` space.
pub fn slice_tx<const S: usize>(tx: &Transaction<'_>, id: Tid48) -> Result<Vec<Slice<S>>, Error> {
    let tx_bytes = tx.as_ref();
    let mut n = num_slices_for(1 + tx_bytes.len(), S);
    if varint_len(n as u64) > 1 {
        n = num_slices_for(varint_len(n as u64) + tx_bytes.len(), S);
    }
    if n == 0 || n > 0xFFFF {
        return Err(Error::InvariantViolation);
    }

    let mut payload = Vec::with_capacity(n * S);
    write_varint(n as u64, &mut payload);
    payload.extend_from_slice(tx_bytes);
    payload.resize(n * S, 0);

    let frag_base = id.frag_base();
    let mut slices = Vec::with_capacity(n);
    for (k, chunk) in payload.chunks_exact(S).enumerate() {
        let mut contents = [0u8; S];
        contents.copy_from_slice(chunk);
        slices.push(Slice {
            txidbits: id.id(),
            fragid: frag_base.wrapping_add(k as u16),
            contents,
        });
    }
    Ok(slices)
}

/// Re-read the leading varint out of a slice's `contents`, interpreted as the first slice of some
/// transaction. Only meaningful when called on a slice known to be the first fragment.
pub fn slices_expected<const S: usize>(slice: &Slice<S>) -> Result<u64, Error> {
    let mut cursor = 0;
    read_varint(&slice.contents, &mut cursor)
}

/// Reassemble a contiguous, in-order run of slices (all sharing `txidbits`, `fragid` consecutive
/// starting at `frag_base`) back into a transaction.
///
/// Rejects with [`Error::BadFragment`] if the leading varint doesn't match `slices.len()`, and
/// with [`Error::ParseInvalid`] if the remaining bytes don't parse as a well-formed transaction.
pub fn rebuild_tx<const S: usize>(slices: &[Slice<S>]) -> Result<Vec<u8>, Error> {
    if slices.is_empty() {
        return Err(Error::BadFragment);
    }
    let mut payload = Vec::with_capacity(slices.len() * S);
    for s in slices {
        payload.extend_from_slice(&s.contents);
    }

    let mut cursor = 0;
    let n = read_varint(&payload, &mut cursor)?;
    if n == 0 || n > 0xFFFF || n != slices.len() as u64 {
        return Err(Error::BadFragment);
    }

    let tx_bytes = &payload[cursor..];
    let parsed = Transaction::parse(tx_bytes).map_err(|_| Error::ParseInvalid)?;
    Ok(parsed.parsed().as_ref().to_vec())
}
