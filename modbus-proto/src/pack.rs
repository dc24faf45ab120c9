//! Bit and register copy primitives.
//!
//! Bits are addressed by absolute index across a byte slice: byte `i / 8`,
//! bit `i % 8`, least significant bit first. Registers travel big-endian.

use crate::error::BufferError;

const BITS_PER_BYTE: usize = 8;

/// Number of bytes needed to hold `bits` packed bits.
#[inline]
#[must_use]
pub const fn bytes_needed(bits: usize) -> usize {
    bits.div_ceil(BITS_PER_BYTE)
}

/// Read the bit at absolute index `index`.
#[inline]
pub fn get_bit(bytes: &[u8], index: usize) -> Result<bool, BufferError> {
    let byte = bytes
        .get(index / BITS_PER_BYTE)
        .ok_or(BufferError::OutOfBounds)?;
    Ok(byte & (1 << (index % BITS_PER_BYTE)) != 0)
}

/// Set or clear the bit at absolute index `index`, leaving the other 7 bits
/// of that byte untouched.
#[inline]
pub fn set_bit(bytes: &mut [u8], index: usize, value: bool) -> Result<(), BufferError> {
    let byte = bytes
        .get_mut(index / BITS_PER_BYTE)
        .ok_or(BufferError::OutOfBounds)?;
    let mask = 1 << (index % BITS_PER_BYTE);
    if value {
        *byte |= mask;
    } else {
        *byte &= !mask;
    }
    Ok(())
}

/// Copy bit `src_index` of `src` to bit `dst_index` of `dst`.
#[inline]
pub fn copy_bit(
    src: &[u8],
    src_index: usize,
    dst: &mut [u8],
    dst_index: usize,
) -> Result<(), BufferError> {
    let value = get_bit(src, src_index)?;
    set_bit(dst, dst_index, value)
}

/// Copy `count` consecutive bits.
pub fn copy_bits(
    src: &[u8],
    src_start: usize,
    dst: &mut [u8],
    dst_start: usize,
    count: usize,
) -> Result<(), BufferError> {
    for i in 0..count {
        copy_bit(src, src_start + i, dst, dst_start + i)?;
    }
    Ok(())
}

/// Write `values` as big-endian words into `out`.
///
/// Returns the number of bytes written.
pub fn write_registers_be(values: &[u16], out: &mut [u8]) -> Result<usize, BufferError> {
    let len = values.len() * 2;
    let out = out.get_mut(..len).ok_or(BufferError::OutOfBounds)?;
    for (chunk, value) in out.chunks_exact_mut(2).zip(values) {
        chunk.copy_from_slice(&value.to_be_bytes());
    }
    Ok(len)
}

/// Fill `out` with big-endian words read from `bytes`.
///
/// Returns the number of registers read.
pub fn read_registers_be(bytes: &[u8], out: &mut [u16]) -> Result<usize, BufferError> {
    let bytes = bytes
        .get(..out.len() * 2)
        .ok_or(BufferError::OutOfBounds)?;
    for (value, chunk) in out.iter_mut().zip(bytes.chunks_exact(2)) {
        *value = u16::from_be_bytes([chunk[0], chunk[1]]);
    }
    Ok(out.len())
}
