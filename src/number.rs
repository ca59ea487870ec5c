//! Contains methods to parse numbers (u8,u16,u32,u64,i32) from slices

use core::convert::TryInto;

use crate::{bsl::Len, slice::read_slice, visit::Parse, Error, ParseResult, SResult};

/// Converts into and from u8 and implements [`Parse`] and `AsRef<[u8]>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct U8([u8; 1]);

impl AsRef<[u8]> for U8 {
    fn as_ref(&self) -> &[u8] {
        &self.0[..]
    }
}

impl From<U8> for u8 {
    fn from(u: U8) -> Self {
        u.0[0]
    }
}

impl From<&U8> for u8 {
    fn from(u: &U8) -> Self {
        u.0[0]
    }
}

impl From<u8> for U8 {
    fn from(u: u8) -> Self {
        U8([u])
    }
}

impl<'a> Parse<'a> for U8 {
    fn parse(slice: &'a [u8]) -> SResult<'a, Self> {
        let p = read_slice(slice, 1)?;
        Ok(ParseResult::new(p.remaining(), U8([p.parsed()[0]])))
    }
}

macro_rules! impl_number {
    ($primitive:ty, $newtype:ident, $size:expr) => {
        #[doc=concat!("Converts into and from ", stringify!($primitive), " and implements [`Parse`] and `AsRef<[u8]>`." )]
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $newtype([u8; $size]);

        impl<'a> Parse<'a> for $newtype {
            fn parse(slice: &'a [u8]) -> SResult<'a, Self> {
                let p = read_slice(slice, $size)?;
                let remaining = p.remaining();
                let arr = p
                    .parsed_owned()
                    .try_into()
                    .expect(concat!("slice length is ", $size));
                Ok(ParseResult::new(remaining, $newtype(arr)))
            }
        }

        impl From<$newtype> for $primitive {
            fn from(u: $newtype) -> Self {
                <$primitive>::from_le_bytes(u.0)
            }
        }

        impl From<&$newtype> for $primitive {
            fn from(u: &$newtype) -> Self {
                <$primitive>::from_le_bytes(u.0)
            }
        }

        impl From<$primitive> for $newtype {
            fn from(u: $primitive) -> Self {
                $newtype(u.to_le_bytes())
            }
        }

        impl AsRef<[u8]> for $newtype {
            fn as_ref(&self) -> &[u8] {
                &self.0[..]
            }
        }
    };
}
impl_number!(u16, U16, 2);
impl_number!(u32, U32, 4);
impl_number!(i32, I32, 4);
impl_number!(u64, U64, 8);

impl U64 {
    /// Convert to `Len`
    pub fn to_len(self) -> Result<Len, Error> {
        let n: u64 = self.into();
        if n > u32::MAX as u64 {
            Ok(Len { n, consumed: 9 })
        } else {
            Err(Error::NonMinimalVarInt)
        }
    }
}

impl U32 {
    /// Convert to `Len`
    pub fn to_len(self) -> Result<Len, Error> {
        let n: u64 = u32::from(self) as u64;
        if n > u16::MAX as u64 {
            Ok(Len { n, consumed: 5 })
        } else {
            Err(Error::NonMinimalVarInt)
        }
    }
}

impl U16 {
    /// Convert to `Len`
    pub fn to_len(self) -> Result<Len, Error> {
        let n: u64 = u16::from(self) as u64;
        if n >= 0xFD {
            Ok(Len { n, consumed: 3 })
        } else {
            Err(Error::NonMinimalVarInt)
        }
    }
}
