//! Driver-facing port abstraction.
//!
//! The engine never touches peripheral registers. Platform glue implements
//! [`Port`] and forwards UART interrupts to the engine's `on_*` hooks.

use embedded_hal::digital::OutputPin;

/// Line direction of a half-duplex transceiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Transmitter enabled, receiver off.
    Drive,
    /// Receiver enabled, transmitter off.
    Listen,
}

/// Hardware operations the engine requests from the platform.
///
/// # `no_std` Compatibility
///
/// Implementations are called from interrupt context and must not block.
pub trait Port {
    /// Enable the transmit-ready interrupt so the platform starts pulling
    /// bytes through [`on_tx_ready`](crate::RtuSlave::on_tx_ready).
    fn enable_tx_ready(&mut self);

    /// Disable the transmit-ready interrupt; every byte has been queued.
    fn disable_tx_ready(&mut self);

    /// Switch the transceiver. Full-duplex ports keep the default no-op.
    fn set_direction(&mut self, direction: Direction) {
        let _ = direction;
    }
}

/// Half-duplex adapter driving a transceiver enable pin (RS-485 DE/RE).
///
/// The pin is driven high to transmit and low to listen.
pub struct HalfDuplex<P, D> {
    port: P,
    enable: D,
}

impl<P: Port, D: OutputPin> HalfDuplex<P, D> {
    /// Wrap `port`, using `enable` as the transceiver direction line.
    pub fn new(port: P, enable: D) -> Self {
        Self { port, enable }
    }

    /// Get a reference to the wrapped port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Get a mutable reference to the wrapped port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Decompose the adapter into its port and pin.
    pub fn into_parts(self) -> (P, D) {
        (self.port, self.enable)
    }
}

impl<P: Port, D: OutputPin> Port for HalfDuplex<P, D> {
    fn enable_tx_ready(&mut self) {
        self.port.enable_tx_ready();
    }

    fn disable_tx_ready(&mut self) {
        self.port.disable_tx_ready();
    }

    fn set_direction(&mut self, direction: Direction) {
        let result = match direction {
            Direction::Drive => self.enable.set_high(),
            Direction::Listen => self.enable.set_low(),
        };
        if result.is_err() {
            warn!("transceiver enable pin error, direction {:?}", direction);
        }
        self.port.set_direction(direction);
    }
}
