use crate::{
    number::{U16, U32, U64},
    visit::Parse,
    Error,
};

/// The bitcoin compact int encoding, up to 253 it consumes 1 byte, then there are markers for
/// `u16`, `u32` or `u64`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Len {
    pub(crate) consumed: usize,
    pub(crate) n: u64,
}

/// Parse `Len` from the slice.
/// This is done without `Parse` trait to have better perfomance.
#[inline(always)]
#[deprecated = "use scan_len instead"]
pub fn parse_len(slice: &[u8]) -> Result<Len, Error> {
    Ok(match slice.first() {
        Some(0xFFu8) => U64::parse(&slice[1..])?.parsed_owned().to_len()?,
        Some(0xFEu8) => U32::parse(&slice[1..])?.parsed_owned().to_len()?,
        Some(0xFDu8) => U16::parse(&slice[1..])?.parsed_owned().to_len()?,
        Some(x) => Len {
            n: *x as u64,
            consumed: 1,
        },
        None => return Err(Error::MoreBytesNeeded),
    })
}

#[inline(always)]
/// Same as `parse_len` but mutates the `consumed` variable and returns only the value.
pub fn scan_len(slice: &[u8], consumed: &mut usize) -> Result<u64, Error> {
    match slice.first() {
        Some(0xFFu8) => {
            let bytes: [u8; 8] = slice
                .get(1..9)
                .ok_or(Error::MoreBytesNeeded)?
                .try_into()
                .expect("static bounds check");
            let n = u64::from_le_bytes(bytes);
            if n > u32::MAX as u64 {
                *consumed += 9;
                Ok(n)
            } else {
                Err(Error::NonMinimalVarInt)
            }
        }
        Some(0xFEu8) => {
            let bytes: [u8; 4] = slice
                .get(1..5)
                .ok_or(Error::MoreBytesNeeded)?
                .try_into()
                .expect("static bounds check");
            let n = u32::from_le_bytes(bytes) as u64;
            if n > u16::MAX as u64 {
                *consumed += 5;
                Ok(n)
            } else {
                Err(Error::NonMinimalVarInt)
            }
        }
        Some(0xFDu8) => {
            let bytes: [u8; 2] = slice
                .get(1..3)
                .ok_or(Error::MoreBytesNeeded)?
                .try_into()
                .expect("static bounds check");
            let n = u16::from_le_bytes(bytes) as u64;
            if n >= 0xFD {
                *consumed += 3;
                Ok(n)
            } else {
                Err(Error::NonMinimalVarInt)
            }
        }
        Some(x) => {
            *consumed += 1;
            Ok(*x as u64)
        }
        None => Err(Error::MoreBytesNeeded),
    }
}

impl Len {
    /// The value encoded in this compact int
    pub fn n(&self) -> u64 {
        self.n
    }

    /// consumed
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// slice_len
    pub fn slice_len(&self) -> usize {
        self.consumed + self.n as usize
    }
}
