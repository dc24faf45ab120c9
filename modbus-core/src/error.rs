use core::fmt;

/// Why a received frame was dropped.
///
/// Frame errors never reach the application as a `Result`: the engine
/// resets silently and counts them in [`FrameStats`](crate::FrameStats).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// More bytes arrived than the frame buffer holds.
    Overflow,
    /// CRC did not match.
    Checksum,
    /// Frame addressed to another device (single-address mode).
    AddressMismatch,
    /// Too short to carry an address, a function code and a CRC.
    TooShort,
}

/// Error type for foreground operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SlaveError {
    /// No checked request is waiting; the call would race the receive path.
    NoPendingRequest,
    /// The response does not fit the frame buffer.
    FrameTooLarge,
}

impl fmt::Display for FrameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameError::Overflow => f.write_str("frame buffer overflow"),
            FrameError::Checksum => f.write_str("CRC mismatch"),
            FrameError::AddressMismatch => f.write_str("frame addressed to another device"),
            FrameError::TooShort => f.write_str("frame too short"),
        }
    }
}

impl fmt::Display for SlaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SlaveError::NoPendingRequest => f.write_str("no pending request"),
            SlaveError::FrameTooLarge => f.write_str("response exceeds frame capacity"),
        }
    }
}
