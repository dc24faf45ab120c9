//! Bus state machine: the legal states, the events that move between them,
//! and the flag view kept for compatibility with bitmask-based tooling.

use core::ops::{BitAnd, BitOr, BitOrAssign};

/// Where the slave is in the receive/respond cycle.
///
/// Every state that carries the timer (`Idle`, `Ready`, `Receiving`)
/// advances it on each tick; the others freeze it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusState {
    /// Waiting for the bus to be quiet long enough to trust the next byte.
    Idle,
    /// Bus quiet; the next byte starts a new frame.
    Ready,
    /// Collecting bytes. `gap` records an inter-character timeout; it is
    /// observable only and does not abort the frame.
    Receiving { gap: bool },
    /// A checked request is waiting for the foreground.
    ReceiveCompleted,
    /// Response sealed, waiting for the first transmit-ready interrupt.
    TransmitRequested,
    /// Response bytes are being shifted out.
    Transmitting,
}

/// Inputs to [`BusState::next`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusEvent {
    /// Timer reached the inter-frame delay start.
    QuietPeriod,
    /// First byte of a frame arrived on a quiet bus.
    FrameStart,
    /// Timer reached the inter-character timeout.
    InterCharTimeout,
    /// End-of-frame silence with a valid, addressed frame.
    FrameAccepted,
    /// Foreground sealed a response.
    SendRequested,
    /// First transmit-ready interrupt.
    TransmitStarted,
    /// Rejection, overflow, transmit complete or explicit discard.
    Reset,
}

impl BusState {
    /// State after `event`, or `None` if the event does not apply here.
    ///
    /// This is the only place transitions are defined.
    #[must_use]
    pub const fn next(self, event: BusEvent) -> Option<Self> {
        use BusEvent as E;
        Some(match (self, event) {
            (_, E::Reset) => Self::Idle,
            (Self::Idle, E::QuietPeriod) => Self::Ready,
            (Self::Ready, E::FrameStart) => Self::Receiving { gap: false },
            (Self::Receiving { .. }, E::InterCharTimeout) => Self::Receiving { gap: true },
            (Self::Receiving { .. }, E::FrameAccepted) => Self::ReceiveCompleted,
            (Self::ReceiveCompleted, E::SendRequested) => Self::TransmitRequested,
            (Self::TransmitRequested, E::TransmitStarted) => Self::Transmitting,
            _ => return None,
        })
    }

    /// Whether ticks advance the timer in this state.
    #[inline]
    #[must_use]
    pub const fn timer_active(self) -> bool {
        matches!(self, Self::Idle | Self::Ready | Self::Receiving { .. })
    }

    /// Equivalent flag combination.
    #[must_use]
    pub const fn flags(self) -> BusFlags {
        match self {
            Self::Idle => BusFlags::TIMER_ACTIVE,
            Self::Ready => BusFlags(BusFlags::TIMER_ACTIVE.0 | BusFlags::BUS_TIMED_OUT.0),
            Self::Receiving { gap: false } => {
                BusFlags(BusFlags::TIMER_ACTIVE.0 | BusFlags::RECEIVING.0)
            }
            Self::Receiving { gap: true } => BusFlags(
                BusFlags::TIMER_ACTIVE.0 | BusFlags::RECEIVING.0 | BusFlags::GAP_DETECTED.0,
            ),
            Self::ReceiveCompleted => BusFlags::RECEIVE_COMPLETED,
            Self::TransmitRequested => BusFlags::TRANSMIT_REQUESTED,
            Self::Transmitting => BusFlags::TRANSMITTING,
        }
    }
}

/// Bus state as a bitfield, one bit per flag.
///
/// # Example
///
/// ```
/// use modbus_core::{BusFlags, BusState};
///
/// let flags = BusState::Receiving { gap: true }.flags();
/// assert!(flags.contains(BusFlags::RECEIVING | BusFlags::GAP_DETECTED));
/// assert!(!flags.contains(BusFlags::RECEIVE_COMPLETED));
/// ```
#[derive(Clone, Copy, Default, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusFlags(pub u8);

impl BusFlags {
    pub const BUS_TIMED_OUT: Self = Self(1 << 0);
    pub const RECEIVING: Self = Self(1 << 1);
    pub const TRANSMITTING: Self = Self(1 << 2);
    pub const RECEIVE_COMPLETED: Self = Self(1 << 3);
    pub const TRANSMIT_REQUESTED: Self = Self(1 << 4);
    pub const TIMER_ACTIVE: Self = Self(1 << 5);
    pub const GAP_DETECTED: Self = Self(1 << 6);

    /// No flags set.
    pub const NONE: Self = Self(0);

    /// Check if all of the given flag(s) are set.
    #[inline]
    #[must_use]
    pub const fn contains(self, flags: BusFlags) -> bool {
        (self.0 & flags.0) == flags.0
    }

    /// Get the raw u8 value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u8 {
        self.0
    }
}

impl BitOr for BusFlags {
    type Output = Self;

    #[inline]
    fn bitor(self, rhs: Self) -> Self::Output {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for BusFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for BusFlags {
    type Output = Self;

    #[inline]
    fn bitand(self, rhs: Self) -> Self::Output {
        Self(self.0 & rhs.0)
    }
}
