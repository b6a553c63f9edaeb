//! # Little-Endian Byte Primitives
//!
//! Bounds-checked reads and writes of the fixed-width scalars used by the
//! buffer format, plus alignment arithmetic. All multi-byte scalars are
//! little-endian; this is the wire format and is not negotiable.
//!
//! ## Error Handling
//!
//! Every accessor validates that the requested range lies inside the slice
//! and returns `Error::OutOfBounds` otherwise. Offsets are `u32` because the
//! buffer is addressed by 32-bit offsets throughout.

use crate::error::{Error, Result};

#[inline]
fn check_range(buf: &[u8], offset: u32, len: usize) -> Result<usize> {
    let start = offset as usize;
    let end = start
        .checked_add(len)
        .ok_or_else(|| Error::out_of_bounds(format!("offset {} + {} overflows", offset, len)))?;
    if end > buf.len() {
        return Err(Error::out_of_bounds(format!(
            "range {}..{} past used length {}",
            start,
            end,
            buf.len()
        )));
    }
    Ok(start)
}

pub fn read_u8(buf: &[u8], offset: u32) -> Result<u8> {
    let start = check_range(buf, offset, 1)?;
    Ok(buf[start])
}

pub fn write_u8(buf: &mut [u8], offset: u32, value: u8) -> Result<()> {
    let start = check_range(buf, offset, 1)?;
    buf[start] = value;
    Ok(())
}

pub fn read_u32(buf: &[u8], offset: u32) -> Result<u32> {
    let start = check_range(buf, offset, 4)?;
    // INVARIANT: range validated by check_range above
    Ok(u32::from_le_bytes(buf[start..start + 4].try_into().unwrap()))
}

pub fn write_u32(buf: &mut [u8], offset: u32, value: u32) -> Result<()> {
    let start = check_range(buf, offset, 4)?;
    buf[start..start + 4].copy_from_slice(&value.to_le_bytes());
    Ok(())
}

pub fn read_i64(buf: &[u8], offset: u32) -> Result<i64> {
    let start = check_range(buf, offset, 8)?;
    // INVARIANT: range validated by check_range above
    Ok(i64::from_le_bytes(buf[start..start + 8].try_into().unwrap()))
}

pub fn write_i64(buf: &mut [u8], offset: u32, value: i64) -> Result<()> {
    let start = check_range(buf, offset, 8)?;
    buf[start..start + 8].copy_from_slice(&value.to_le_bytes());
    Ok(())
}

pub fn read_f64(buf: &[u8], offset: u32) -> Result<f64> {
    let start = check_range(buf, offset, 8)?;
    // INVARIANT: range validated by check_range above
    Ok(f64::from_le_bytes(buf[start..start + 8].try_into().unwrap()))
}

pub fn write_f64(buf: &mut [u8], offset: u32, value: f64) -> Result<()> {
    let start = check_range(buf, offset, 8)?;
    buf[start..start + 8].copy_from_slice(&value.to_le_bytes());
    Ok(())
}

/// Smallest `o' >= offset` with `o' % align == 0`. `align` must be a power
/// of two.
#[inline]
pub fn align_offset(offset: u32, align: u32) -> u32 {
    debug_assert!(align.is_power_of_two());
    (offset + align - 1) & !(align - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_roundtrip_little_endian() {
        let mut buf = [0u8; 8];
        write_u32(&mut buf, 2, 0x1234_5678).unwrap();
        assert_eq!(&buf[2..6], &[0x78, 0x56, 0x34, 0x12]);
        assert_eq!(read_u32(&buf, 2).unwrap(), 0x1234_5678);
    }

    #[test]
    fn i64_roundtrip_extremes() {
        let mut buf = [0u8; 16];
        for value in [i64::MIN, -1, 0, 1, i64::MAX] {
            write_i64(&mut buf, 3, value).unwrap();
            assert_eq!(read_i64(&buf, 3).unwrap(), value);
        }
    }

    #[test]
    fn f64_roundtrip_bit_exact() {
        let mut buf = [0u8; 8];
        for value in [0.0, -0.0, 88.427, f64::MAX, f64::MIN_POSITIVE, f64::NAN] {
            write_f64(&mut buf, 0, value).unwrap();
            let back = read_f64(&buf, 0).unwrap();
            assert_eq!(back.to_bits(), value.to_bits());
        }
    }

    #[test]
    fn reads_past_end_fail() {
        let buf = [0u8; 4];
        assert!(read_u8(&buf, 4).is_err());
        assert!(read_u32(&buf, 1).is_err());
        assert!(read_i64(&buf, 0).is_err());
        assert!(read_f64(&buf, 0).is_err());
    }

    #[test]
    fn writes_past_end_fail() {
        let mut buf = [0u8; 4];
        assert!(write_u32(&mut buf, 1, 0).is_err());
        assert!(write_i64(&mut buf, 0, 0).is_err());
    }

    #[test]
    fn offset_overflow_fails() {
        let buf = [0u8; 4];
        assert!(read_u32(&buf, u32::MAX).is_err());
    }

    #[test]
    fn align_offset_powers_of_two() {
        assert_eq!(align_offset(0, 4), 0);
        assert_eq!(align_offset(1, 4), 4);
        assert_eq!(align_offset(4, 4), 4);
        assert_eq!(align_offset(97, 4), 100);
        assert_eq!(align_offset(96, 8), 96);
        assert_eq!(align_offset(97, 8), 104);
    }
}
