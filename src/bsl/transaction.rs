use crate::{
    bsl::{TxIns, TxOuts},
    number::{I32, U32},
    ParseResult, SResult,
};

/// A legacy (pre-segwit) Bitcoin transaction.
///
/// The reconciliation wire format never carries a witness section, so unlike a general-purpose
/// parser this doesn't special-case the segwit marker byte: every transaction it sees is encoded
/// the old way, version, inputs, outputs, locktime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction<'a> {
    slice: &'a [u8],
}

impl<'a> Transaction<'a> {
    /// Parse the transaction in the slice
    pub fn parse(slice: &'a [u8]) -> SResult<'a, Self> {
        let version = I32::parse(slice)?;
        let inputs = TxIns::parse(version.remaining())?;
        let outputs = TxOuts::parse(inputs.remaining())?;
        let locktime = U32::parse(outputs.remaining())?;
        let consumed = version.consumed() + inputs.consumed() + outputs.consumed() + locktime.consumed();

        let tx = Transaction {
            slice: &slice[..consumed],
        };
        Ok(ParseResult::new(&slice[consumed..], tx))
    }

    /// Returns the transaction version.
    pub fn version(&self) -> i32 {
        I32::parse(&self.slice[..4])
            .expect("slice length granted during parsing")
            .parsed_owned()
            .into()
    }

    /// Returns the transaction locktime.
    pub fn locktime(&self) -> u32 {
        let from = self.slice.len() - 4;
        U32::parse(&self.slice[from..])
            .expect("slice length granted during parsing")
            .parsed_owned()
            .into()
    }

    /// Return the transaction identifier: double-sha256 of the full wire encoding.
    pub fn txid(&self) -> bitcoin_hashes::sha256d::Hash {
        use bitcoin_hashes::Hash;
        bitcoin_hashes::sha256d::Hash::hash(self.slice)
    }
}

impl<'a> AsRef<[u8]> for Transaction<'a> {
    fn as_ref(&self) -> &[u8] {
        self.slice
    }
}
