use strand_common::{Result, error::Error};

use crate::{
    cursor::ByteCursor,
    field_kind::FieldKind,
    value::{DecodeFn, WireValue},
};

/// Iterator over the scalar values of a packed repeated field.
///
/// Yields values until the payload is exhausted. A malformed value yields a
/// single `Err` and ends the iteration.
pub struct PackedValues<'a, T> {
    cursor: ByteCursor<'a>,
    decode: DecodeFn<'a, T>,
    failed: bool,
}

impl<'a, T: WireValue<'a>> PackedValues<'a, T> {
    /// Creates the iterator over a packed payload (without its length prefix).
    pub fn new(data: &'a [u8], kind: FieldKind) -> Result<PackedValues<'a, T>> {
        if !kind.is_packable() {
            return Err(Error::invalid_arg(
                "kind",
                format!("{kind} fields cannot be packed"),
            ));
        }
        let decode = T::decoder(kind).ok_or_else(|| {
            Error::invalid_arg(
                "kind",
                format!("{kind} fields do not produce {} values", T::VALUE_TYPE),
            )
        })?;
        Ok(Self::with_decoder(data, decode))
    }
}

impl<'a, T> PackedValues<'a, T> {
    /// Creates the iterator with an already resolved decode function.
    pub fn with_decoder(data: &'a [u8], decode: DecodeFn<'a, T>) -> PackedValues<'a, T> {
        PackedValues {
            cursor: ByteCursor::new(data),
            decode,
            failed: false,
        }
    }
}

impl<T> Iterator for PackedValues<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.cursor.is_at_end() {
            return None;
        }
        let value = (self.decode)(&mut self.cursor);
        self.failed = value.is_err();
        Some(value)
    }
}

impl<T> std::iter::FusedIterator for PackedValues<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_varints() {
        let data = [0x03, 0x8e, 0x02, 0x9e, 0xa7, 0x05];
        let values = PackedValues::<u32>::new(&data, FieldKind::UInt32)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap();
        assert_eq!(values, vec![3, 270, 86942]);
    }

    #[test]
    fn test_packed_fixed_truncated() {
        let data = [1, 0, 0, 0, 2, 0];
        let mut values = PackedValues::<i32>::new(&data, FieldKind::SFixed32).unwrap();
        assert_eq!(values.next().unwrap().unwrap(), 1);
        assert!(values.next().unwrap().unwrap_err().is_corrupt());
        assert!(values.next().is_none());
    }

    #[test]
    fn test_unpackable_kinds() {
        assert!(PackedValues::<&[u8]>::new(&[], FieldKind::String).is_err());
        assert!(PackedValues::<i64>::new(&[], FieldKind::UInt64).is_err());
    }
}
