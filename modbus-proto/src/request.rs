//! Request descriptor decoded once per accepted frame.

use crate::codes::FunctionCode;

/// `{function code, start address, quantity}` of a received request.
///
/// Applications use [`is_in_range`](Self::is_in_range) and
/// [`is_range_in_range`](Self::is_range_in_range) to test whether the
/// request touches the objects they expose.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Request {
    /// Raw function-code byte.
    pub function: u8,
    /// Address of the first requested object.
    pub location: u16,
    /// Number of requested objects.
    pub amount: u16,
}

impl Request {
    /// Decode the descriptor from a raw frame.
    ///
    /// The start address is the big-endian word at bytes 2-3. The quantity is
    /// 1 for single-write functions, otherwise the big-endian word at bytes
    /// 4-5. Bytes missing from a short frame read as zero.
    #[must_use]
    pub fn decode(frame: &[u8]) -> Self {
        let byte = |i: usize| frame.get(i).copied().unwrap_or(0);
        let function = byte(1);
        let location = u16::from_be_bytes([byte(2), byte(3)]);
        let amount = match FunctionCode::from_u8(function) {
            Some(code) if code.is_single_write() => 1,
            _ => u16::from_be_bytes([byte(4), byte(5)]),
        };
        Self {
            function,
            location,
            amount,
        }
    }

    /// Decoded function code, if it is one this crate knows.
    #[inline]
    #[must_use]
    pub const fn function_code(&self) -> Option<FunctionCode> {
        FunctionCode::from_u8(self.function)
    }

    /// One past the last requested address.
    #[inline]
    #[must_use]
    pub const fn end(&self) -> u32 {
        self.location as u32 + self.amount as u32
    }

    /// Whether `addr` is touched by this request.
    #[inline]
    #[must_use]
    pub const fn is_in_range(&self, addr: u16) -> bool {
        self.location <= addr && (addr as u32) < self.end()
    }

    /// Whether both `start` and `last` are touched by this request.
    #[inline]
    #[must_use]
    pub const fn is_range_in_range(&self, start: u16, last: u16) -> bool {
        self.is_in_range(start) && self.is_in_range(last)
    }

    /// Whether the whole request lies within `[start, start + size)`.
    #[inline]
    #[must_use]
    pub const fn fits_within(&self, start: u16, size: usize) -> bool {
        self.location >= start && self.end() as usize <= (start as usize).saturating_add(size)
    }
}
