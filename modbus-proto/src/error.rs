use core::fmt;

/// Error type for checked buffer access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// An index or span falls outside the slice.
    OutOfBounds,
    /// The frame buffer has no room left.
    Full,
}

impl fmt::Display for BufferError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BufferError::OutOfBounds => f.write_str("index out of bounds"),
            BufferError::Full => f.write_str("frame buffer full"),
        }
    }
}
