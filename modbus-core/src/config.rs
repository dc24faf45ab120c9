//! Slave configuration.

use crate::timing::Timing;

/// Which frames the slave accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Addressing {
    /// Accept only frames whose first byte equals this device address.
    Single(u8),
    /// Accept every frame with a valid CRC (gateways, routers).
    Promiscuous,
}

/// Static configuration of one slave instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SlaveConfig {
    pub addressing: Addressing,
    pub timing: Timing,
}

impl SlaveConfig {
    /// Single-address slave.
    #[must_use]
    pub const fn single(address: u8, timing: Timing) -> Self {
        Self {
            addressing: Addressing::Single(address),
            timing,
        }
    }

    /// Slave answering on every address.
    #[must_use]
    pub const fn promiscuous(timing: Timing) -> Self {
        Self {
            addressing: Addressing::Promiscuous,
            timing,
        }
    }
}

impl Default for SlaveConfig {
    /// Address 0 (never matches a unicast request until
    /// [`set_address`](crate::RtuSlave::set_address) is called) at 19200 baud.
    fn default() -> Self {
        Self::single(0, Timing::default())
    }
}
