//! Bridge between the engine's interrupt-control requests and the tasks.
//!
//! On a bare-metal target the engine would unmask the UART transmit
//! interrupt. Here the transmit task plays that role: "enable tx-ready"
//! wakes it through a [`Signal`], and it pulls bytes with
//! [`on_tx_ready`](modbus_core::SharedSlave::on_tx_ready) until the engine
//! runs dry.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use modbus_core::Port;

/// Wakes the transmit task when a response is queued.
pub type TxSignal = Signal<CriticalSectionRawMutex, ()>;

/// [`Port`] backed by a [`TxSignal`].
pub struct SignalPort {
    tx: &'static TxSignal,
}

impl SignalPort {
    #[must_use]
    pub fn new(tx: &'static TxSignal) -> Self {
        Self { tx }
    }
}

impl Port for SignalPort {
    fn enable_tx_ready(&mut self) {
        self.tx.signal(());
    }

    fn disable_tx_ready(&mut self) {
        // The transmit task stops on its own once `on_tx_ready` returns None.
        self.tx.reset();
    }
}

/// Port type selected by the line driver feature.
#[cfg(not(feature = "rs232"))]
pub type LinePort = modbus_core::HalfDuplex<SignalPort, embassy_rp::gpio::Output<'static>>;

/// Port type selected by the line driver feature.
#[cfg(feature = "rs232")]
pub type LinePort = SignalPort;
