use crate::{
    bsl::{OutPoint, Script},
    number::U32,
    Parse, ParseResult, SResult,
};

/// A single transaction input: the out point it spends, its unlocking script and sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIn<'a> {
    slice: &'a [u8],
    prevout: OutPoint<'a>,
    script_sig: Script<'a>,
    sequence: u32,
}

impl<'a> TxIn<'a> {
    /// The previous output this input spends.
    pub fn prevout(&self) -> &OutPoint {
        &self.prevout
    }
    /// The unlocking script.
    pub fn script_sig(&self) -> &Script {
        &self.script_sig
    }
    /// The sequence number.
    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl<'a> AsRef<[u8]> for TxIn<'a> {
    fn as_ref(&self) -> &[u8] {
        self.slice
    }
}

impl<'a> Parse<'a> for TxIn<'a> {
    fn parse(slice: &'a [u8]) -> SResult<'a, Self> {
        let prevout = OutPoint::parse(slice)?;
        let script = Script::parse(prevout.remaining())?;
        let sequence = U32::parse(script.remaining())?;
        let consumed = prevout.consumed() + script.consumed() + sequence.consumed();
        Ok(ParseResult::new(
            sequence.remaining(),
            TxIn {
                slice: &slice[..consumed],
                prevout: prevout.parsed_owned(),
                script_sig: script.parsed_owned(),
                sequence: sequence.parsed_owned().into(),
            },
        ))
    }
}
