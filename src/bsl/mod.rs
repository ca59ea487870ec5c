//! Zero-copy parsers for the subset of the Bitcoin transaction wire format the codec needs.
//!
//! Every object here keeps the byte slice it was parsed from, so "deserialization" is free:
//! there is no allocation and no copy, only bounds-checked field extraction. This crate only
//! ever sees legacy (pre-segwit) transactions: the reconciliation wire format has no witness
//! section, so unlike a general-purpose Bitcoin parser, [`Transaction`] doesn't special-case a
//! segwit marker byte.

mod len;
mod out_point;
mod script;
mod transaction;
mod tx_in;
mod tx_ins;
mod tx_out;
mod tx_outs;

pub use len::{parse_len, scan_len, Len};
pub use out_point::OutPoint;
pub use script::Script;
pub use transaction::Transaction;
pub use tx_in::TxIn;
pub use tx_ins::TxIns;
pub use tx_out::TxOut;
pub use tx_outs::TxOuts;
