#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![deny(missing_docs)]
#![doc = include_str!("../README.md")]

//! Zero-copy Bitcoin transaction parsing plus an IBLT-based block reconciliation codec: slice
//! transactions into fixed-size fragments, fold them into an invertible Bloom lookup table, and
//! peel the symmetric difference between two mempools from the wire.

pub mod bsl;
mod error;
pub mod number;
mod parse_result;
mod slice;
mod visit;

pub mod bit_prefix_set;
pub mod iblt;
mod murmur3;
pub mod prefix_tree;
pub mod reconcile;
pub mod raw_iblt;
pub mod txid;
pub mod txslice;
mod varint;
pub mod wire;

pub use error::Error;
pub use parse_result::ParseResult;
pub use slice::read_slice;
pub use visit::Parse;

/// Common result type throughout the lib
pub type SResult<'a, T> = Result<ParseResult<'a, T>, Error>;

pub use bitcoin_hashes;

/// Helpers shared by the `fuzz/` crate's targets.
///
/// Kept in the library (rather than duplicated per fuzz target) so every `Parse` impl is checked
/// against the same invariant: a successful parse never claims to have consumed more than it was
/// given, and the bytes it reports as "parsed" are exactly its prefix of the input.
pub mod fuzzing {
    use crate::{Parse, SResult};

    /// Check a parse result's bookkeeping against the input it was parsed from. Panics (for
    /// `cargo fuzz` to catch) if a successful parse's consumed/remaining split is inconsistent.
    pub fn check<'a, T: Parse<'a>>(data: &'a [u8], result: SResult<'a, T>) {
        if let Ok(parsed) = result {
            let consumed = parsed.consumed();
            assert!(consumed <= data.len());
            assert_eq!(parsed.remaining(), &data[consumed..]);
            assert_eq!(parsed.parsed().as_ref(), &data[..consumed]);
        }
    }
}
