//! Modbus CRC16 for RTU frames.
//!
//! Uses the CRC-16/MODBUS algorithm (reflected polynomial 0xA001, initial
//! value 0xFFFF) with a 512-byte lookup table.
//!
//! [`validate`] and [`generate`] take the index of the *last payload byte*,
//! not a byte count: the checksum covers `last_index + 1` bytes and occupies
//! the two bytes right after them, low byte first.

use crate::error::BufferError;
use crc::{Crc, CRC_16_MODBUS};

/// CRC-16/MODBUS calculator.
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_MODBUS);

/// Calculate the Modbus CRC16 of a byte slice.
#[inline]
#[must_use]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC16.checksum(data)
}

/// Check the CRC that follows `buf[..=last_index]`.
///
/// Returns `false` when the span or its two CRC bytes do not fit in `buf`.
#[must_use]
pub fn validate(buf: &[u8], last_index: usize) -> bool {
    let Some(end) = crc_end(buf.len(), last_index) else {
        return false;
    };
    let crc = calculate_crc16(&buf[..=last_index]);
    buf[last_index + 1..end] == crc.to_le_bytes()
}

/// Compute the CRC over `buf[..=last_index]` and store it right after the span.
///
/// Returns the CRC value written.
pub fn generate(buf: &mut [u8], last_index: usize) -> Result<u16, BufferError> {
    let end = crc_end(buf.len(), last_index).ok_or(BufferError::OutOfBounds)?;
    let crc = calculate_crc16(&buf[..=last_index]);
    buf[last_index + 1..end].copy_from_slice(&crc.to_le_bytes());
    Ok(crc)
}

/// One past the high CRC byte, if it lies within `len`.
#[inline]
fn crc_end(len: usize, last_index: usize) -> Option<usize> {
    last_index.checked_add(3).filter(|&end| end <= len)
}
