//! Full 32-byte transaction identifiers and the seeded 48-bit projection the codec reconciles on.

use bitcoin_hashes::Hash;

/// A full transaction identifier: double-SHA256 of the linearized transaction.
///
/// Equality and hashing are over the 32 raw (natural, not reversed) bytes. Bitcoin convention
/// displays a txid in reversed byte order as hex; this type doesn't implement `Display` since the
/// codec never needs to print one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Txid(bitcoin_hashes::sha256d::Hash);

impl Txid {
    /// Wrap an already-computed double-SHA256 hash.
    pub fn from_hash(hash: bitcoin_hashes::sha256d::Hash) -> Self {
        Txid(hash)
    }

    /// The 32 raw bytes, in natural (non-reversed) transmission order.
    pub fn as_bytes(&self) -> &[u8; 32] {
        self.0.as_byte_array()
    }
}

/// The non-zero 64-bit seed a message is keyed on.
///
/// `Seed::new` rejects zero: per spec, `seed != 0` is an invariant across every encode/decode
/// path, since a zero seed would make `Tid48` degenerate to a function of the txid alone for
/// every message and defeats the anti hash-flooding purpose of reseeding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seed(u64);

impl Seed {
    /// Build a seed, rejecting zero.
    pub fn new(value: u64) -> Result<Self, crate::Error> {
        if value == 0 {
            Err(crate::Error::InvariantViolation)
        } else {
            Ok(Seed(value))
        }
    }

    /// The raw seed value.
    pub fn get(&self) -> u64 {
        self.0
    }
}

/// A 48-bit pseudo-random projection of a [`Txid`], keyed by a non-zero [`Seed`].
///
/// Stored as a `u64` with the top 16 bits always zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tid48(u64);

/// Bits in a [`Tid48`].
pub const TID48_BITS: u32 = 48;

impl Tid48 {
    /// Derive `Tid48` from `(seed, txid)`: first 6 bytes of `SHA256(txid.bytes || LE64(seed))`,
    /// read little-endian.
    pub fn derive(seed: Seed, txid: &Txid) -> Self {
        use bitcoin_hashes::sha256;
        let mut engine = sha256::Hash::engine();
        engine.input(txid.as_bytes());
        engine.input(&seed.get().to_le_bytes());
        let h = sha256::Hash::from_engine(engine);
        Tid48::from_hash_bytes(h.as_byte_array())
    }

    fn from_hash_bytes(bytes: &[u8; 32]) -> Self {
        let mut buf = [0u8; 8];
        buf[..6].copy_from_slice(&bytes[..6]);
        Tid48(u64::from_le_bytes(buf))
    }

    /// Reinterpret a raw 48-bit value (e.g. the bits stored inside a wire [`crate::txslice::Slice`]).
    pub fn from_raw(id: u64) -> Self {
        debug_assert_eq!(id >> TID48_BITS, 0, "id must fit in 48 bits");
        Tid48(id & 0x0000_ffff_ffff_ffff)
    }

    /// The 48-bit id.
    pub fn id(&self) -> u64 {
        self.0
    }

    /// `frag_base()`: the low 16 bits of `SHA256(id)`, where `id` is hashed as its 6 little-endian
    /// bytes (a single hash, not a double one — unlike transaction ids).
    pub fn frag_base(&self) -> u16 {
        use bitcoin_hashes::sha256;
        let bytes = self.0.to_le_bytes();
        let h = sha256::Hash::hash(&bytes[..6]);
        let b = h.as_byte_array();
        u16::from_le_bytes([b[0], b[1]])
    }

    /// Does every bit of `id()` match the corresponding position in `bitvec`?
    ///
    /// `bitvec[i]` is tested against bit `i` (least-significant first) of `id()`.
    pub fn matches(&self, bitvec: &[bool]) -> bool {
        for (i, &bit) in bitvec.iter().enumerate() {
            if ((self.0 >> i) & 1 == 1) != bit {
                return false;
            }
        }
        true
    }
}
