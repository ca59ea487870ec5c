use super::len::{parse_len, Len};
use crate::bsl::TxIn;
use crate::{Parse, ParseResult, SResult};

/// The transaction inputs of a transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxIns<'a> {
    slice: &'a [u8],
    n: usize,
}

impl<'a> Parse<'a> for TxIns<'a> {
    fn parse(slice: &'a [u8]) -> SResult<'a, Self> {
        let Len { mut consumed, n } = parse_len(slice)?;
        let mut remaining = &slice[consumed..];
        let total_inputs = n as usize;

        for _ in 0..total_inputs {
            let tx_in = TxIn::parse(remaining)?;
            remaining = tx_in.remaining();
            consumed += tx_in.consumed();
        }

        Ok(ParseResult::new(
            &slice[consumed..],
            TxIns {
                slice: &slice[..consumed],
                n: total_inputs,
            },
        ))
    }
}

impl<'a> TxIns<'a> {
    /// Returns if there are no transaction inputs
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }
    /// Return the number of transaction inputs
    pub fn n(&self) -> usize {
        self.n
    }
}

impl<'a> AsRef<[u8]> for TxIns<'a> {
    fn as_ref(&self) -> &[u8] {
        self.slice
    }
}

#[cfg(test)]
mod test {
    use hex_lit::hex;

    use crate::{bsl::TxIns, Error, Parse, ParseResult};

    #[test]
    fn parse_tx_ins() {
        let tx_in_bytes = hex!("a15d57094aa7a21a28cb20b59aab8fc7d1149a3bdbcddba9c622e4f5f6a99ece010000006c493046022100f93bb0e7d8db7bd46e40132d1f8242026e045f03a0efe71bbb8e3f475e970d790221009337cd7f1f929f00cc6ff01f03729b069a7c21b59b1736ddfee5db5946c5da8c0121033b9b137ee87d5a812d6f506efdd37f0affa7ffc310711c06c7f3e097c9447c52ffffffff");
        let mut tx_ins = vec![];
        tx_ins.push(2u8);
        tx_ins.extend(&tx_in_bytes);
        tx_ins.extend(&tx_in_bytes);
        let tx_ins_expected = TxIns {
            slice: &tx_ins[..],
            n: 2,
        };
        assert_eq!(
            TxIns::parse(&tx_ins[..]),
            Ok(ParseResult::new(&[][..], tx_ins_expected))
        );

        assert_eq!(
            TxIns::parse(&[0u8][..]),
            Ok(ParseResult::new(
                &[][..],
                TxIns {
                    slice: &[0u8][..],
                    n: 0
                }
            ))
        );

        assert_eq!(
            TxIns::parse(&tx_ins[..tx_ins.len() - 1]),
            Err(Error::MoreBytesNeeded)
        );

        assert_eq!(TxIns::parse(&tx_ins[..22]), Err(Error::MoreBytesNeeded));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn size_of() {
        assert_eq!(std::mem::size_of::<TxIns>(), 24);
    }
}
