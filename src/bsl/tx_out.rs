use crate::bsl::Script;
use crate::number::U64;
use crate::{Parse, ParseResult, SResult};

/// Contains a single transaction output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxOut<'a> {
    slice: &'a [u8],
    value: u64,
    script_pubkey: Script<'a>,
}
impl<'a> Parse<'a> for TxOut<'a> {
    fn parse(slice: &'a [u8]) -> SResult<'a, Self> {
        let value = U64::parse(slice)?;
        let script = Script::parse(value.remaining())?;
        let consumed = value.consumed() + script.consumed();
        let remaining = script.remaining();
        let tx_out = TxOut {
            slice: &slice[..consumed],
            value: value.parsed_owned().into(),
            script_pubkey: script.parsed_owned(),
        };
        Ok(ParseResult::new(remaining, tx_out))
    }
}
impl<'a> TxOut<'a> {
    /// Return the amount of this output (satoshi)
    pub fn value(&self) -> u64 {
        self.value
    }
    /// Return the script pubkey of this output
    pub fn script_pubkey(&self) -> &[u8] {
        self.script_pubkey.script()
    }
}

impl<'a> AsRef<[u8]> for TxOut<'a> {
    fn as_ref(&self) -> &[u8] {
        self.slice
    }
}
