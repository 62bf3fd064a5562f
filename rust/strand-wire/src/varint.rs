//! Base-128 varints, fixed-width little-endian integers and zig-zag.
//!
//! All decoders take the remaining input as a slice and return the decoded
//! value along with the number of bytes it occupied. They never read past
//! the end of the slice.

use strand_common::{Result, error::Error};

/// Maximum encoded width of a 64-bit varint.
pub const MAX_VARINT_LEN: usize = 10;

/// Maximum encoded width of a 32-bit varint (tags and lengths).
pub const MAX_VARINT32_LEN: usize = 5;

/// Decodes a 64-bit varint.
///
/// Fails if the input ends before the terminating byte, if the encoding is
/// longer than ten bytes, or if the tenth byte carries bits beyond 64. The
/// last check matches prost; the C++ runtime instead drops the excess bits.
#[inline]
pub fn decode_varint(buf: &[u8]) -> Result<(u64, usize)> {
    // Single-byte values dominate real data.
    if let Some(&b) = buf.first() {
        if b < 0x80 {
            return Ok((b as u64, 1));
        }
    }
    decode_varint_slow(buf)
}

#[cold]
fn decode_varint_slow(buf: &[u8]) -> Result<(u64, usize)> {
    let mut value = 0u64;
    for (i, &b) in buf.iter().take(MAX_VARINT_LEN).enumerate() {
        // Only bit 63 is left for the tenth byte.
        if i == MAX_VARINT_LEN - 1 && b > 1 {
            return Err(Error::corrupt("varint", "value overflows 64 bits"));
        }
        value |= ((b & 0x7f) as u64) << (7 * i);
        if b < 0x80 {
            return Ok((value, i + 1));
        }
    }
    if buf.len() >= MAX_VARINT_LEN {
        Err(Error::corrupt("varint", "encoding longer than 10 bytes"))
    } else {
        Err(Error::corrupt("varint", "unexpected end of input"))
    }
}

/// Decodes a varint that must fit in 32 bits, as used by tags and length
/// prefixes.
#[inline]
pub fn decode_varint32(buf: &[u8]) -> Result<(u32, usize)> {
    let mut value = 0u32;
    for (i, &b) in buf.iter().take(MAX_VARINT32_LEN).enumerate() {
        if i == MAX_VARINT32_LEN - 1 && b > 0x0f {
            return Err(Error::corrupt("varint32", "value overflows 32 bits"));
        }
        value |= ((b & 0x7f) as u32) << (7 * i);
        if b < 0x80 {
            return Ok((value, i + 1));
        }
    }
    Err(Error::corrupt("varint32", "unexpected end of input"))
}

/// Returns the encoded width of the varint at the start of `buf` without
/// decoding it.
#[inline]
pub fn varint_len(buf: &[u8]) -> Result<usize> {
    match buf.iter().take(MAX_VARINT_LEN).position(|&b| b < 0x80) {
        Some(pos) => Ok(pos + 1),
        None if buf.len() >= MAX_VARINT_LEN => {
            Err(Error::corrupt("varint", "encoding longer than 10 bytes"))
        }
        None => Err(Error::corrupt("varint", "unexpected end of input")),
    }
}

#[inline]
pub fn decode_fixed32(buf: &[u8]) -> Result<u32> {
    match buf.first_chunk::<4>() {
        Some(bytes) => Ok(u32::from_le_bytes(*bytes)),
        None => Err(Error::corrupt("fixed32", "unexpected end of input")),
    }
}

#[inline]
pub fn decode_fixed64(buf: &[u8]) -> Result<u64> {
    match buf.first_chunk::<8>() {
        Some(bytes) => Ok(u64::from_le_bytes(*bytes)),
        None => Err(Error::corrupt("fixed64", "unexpected end of input")),
    }
}

#[inline]
pub fn zigzag_decode32(n: u32) -> i32 {
    ((n >> 1) as i32) ^ -((n & 1) as i32)
}

#[inline]
pub fn zigzag_decode64(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_varint() {
        assert_eq!(decode_varint(&[0]).unwrap(), (0, 1));
        assert_eq!(decode_varint(&[0x96, 0x01, 0xff]).unwrap(), (150, 2));
        let max = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x01];
        assert_eq!(decode_varint(&max).unwrap(), (u64::MAX, 10));
    }

    #[test]
    fn test_decode_varint_malformed() {
        assert!(decode_varint(&[]).unwrap_err().is_corrupt());
        assert!(decode_varint(&[0x80, 0x80]).unwrap_err().is_corrupt());
        let overflow = [0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0x02];
        assert!(decode_varint(&overflow).unwrap_err().is_corrupt());
        // Rejected even when the low bit alone would have fit.
        let overflow = [0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x80, 0x7f];
        assert!(decode_varint(&overflow).unwrap_err().is_corrupt());
        let too_long = [0x80; 11];
        assert!(decode_varint(&too_long).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_decode_varint32() {
        assert_eq!(decode_varint32(&[0x08]).unwrap(), (8, 1));
        assert_eq!(
            decode_varint32(&[0xff, 0xff, 0xff, 0xff, 0x0f]).unwrap(),
            (u32::MAX, 5)
        );
        assert!(
            decode_varint32(&[0xff, 0xff, 0xff, 0xff, 0x1f])
                .unwrap_err()
                .is_corrupt()
        );
        assert!(decode_varint32(&[0xff, 0xff]).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_varint_len() {
        assert_eq!(varint_len(&[0x01, 0x80]).unwrap(), 1);
        assert_eq!(varint_len(&[0x80, 0x80, 0x01]).unwrap(), 3);
        assert!(varint_len(&[0x80]).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_fixed() {
        assert_eq!(decode_fixed32(&[1, 0, 0, 0, 9]).unwrap(), 1);
        assert_eq!(decode_fixed64(&[0, 0, 0, 0, 0, 0, 0, 0x80]).unwrap(), 1 << 63);
        assert!(decode_fixed32(&[1, 2, 3]).unwrap_err().is_corrupt());
        assert!(decode_fixed64(&[0; 7]).unwrap_err().is_corrupt());
    }

    #[test]
    fn test_zigzag() {
        assert_eq!(zigzag_decode32(0), 0);
        assert_eq!(zigzag_decode32(1), -1);
        assert_eq!(zigzag_decode32(2), 1);
        assert_eq!(zigzag_decode32(u32::MAX), i32::MIN);
        assert_eq!(zigzag_decode64(3), -2);
        assert_eq!(zigzag_decode64(u64::MAX - 1), i64::MAX);
    }
}
