use crate::SResult;

/// Parse an object out of a byte slice.
///
/// Implementors keep the slice they were parsed from, so re-serializing is free.
///
/// We don't provide `is_empty` like suggested by clippy because it would have a different
/// meaning: e.g. `TxOuts(&[0u8])` is considered empty because it has no outputs, but is not an
/// empty slice.
#[allow(clippy::len_without_is_empty)]
pub trait Parse<'a>: Sized + AsRef<[u8]> {
    /// Parse the object from the slice.
    fn parse(slice: &'a [u8]) -> SResult<'a, Self>;

    /// Return the serialized length of this object.
    fn len(&self) -> usize {
        self.as_ref().len()
    }
}
