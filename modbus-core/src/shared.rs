//! Interrupt-safe wrapper around [`RtuSlave`].

use core::cell::RefCell;

use critical_section::Mutex;
use modbus_proto::{Request, MAX_FRAME_SIZE};

use crate::port::Port;
use crate::slave::RtuSlave;
use crate::state::BusState;

/// An [`RtuSlave`] shared between interrupt handlers and the foreground.
///
/// Every call runs inside a short critical section, so a hook can never
/// observe a half-finished foreground update and vice versa.
///
/// # Example
///
/// ```
/// use modbus_core::{Port, RtuSlave, SharedSlave, SlaveConfig};
///
/// struct Uart;
///
/// impl Port for Uart {
///     fn enable_tx_ready(&mut self) {}
///     fn disable_tx_ready(&mut self) {}
/// }
///
/// let slave: SharedSlave<Uart> =
///     SharedSlave::new(RtuSlave::new(SlaveConfig::default(), Uart));
///
/// // Receive interrupt
/// slave.on_byte_received(0x01);
/// // Timer interrupt
/// slave.on_tick();
///
/// // Foreground
/// let mut holding = [0u16; 16];
/// if slave.is_receive_completed() {
///     let _ = slave.lock(|s| s.exchange_registers(&mut holding, 0));
/// }
/// ```
pub struct SharedSlave<P, const N: usize = MAX_FRAME_SIZE> {
    inner: Mutex<RefCell<RtuSlave<P, N>>>,
}

impl<P, const N: usize> SharedSlave<P, N> {
    /// Wrap `slave`. Usable in a `static` initializer.
    pub const fn new(slave: RtuSlave<P, N>) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(slave)),
        }
    }
}

impl<P: Port, const N: usize> SharedSlave<P, N> {
    /// Run `f` with exclusive access to the engine.
    pub fn lock<R>(&self, f: impl FnOnce(&mut RtuSlave<P, N>) -> R) -> R {
        critical_section::with(|cs| f(&mut self.inner.borrow_ref_mut(cs)))
    }

    /// See [`RtuSlave::on_byte_received`].
    pub fn on_byte_received(&self, byte: u8) {
        self.lock(|s| s.on_byte_received(byte));
    }

    /// See [`RtuSlave::on_tick`].
    pub fn on_tick(&self) {
        self.lock(|s| s.on_tick());
    }

    /// See [`RtuSlave::on_tx_ready`].
    pub fn on_tx_ready(&self) -> Option<u8> {
        self.lock(|s| s.on_tx_ready())
    }

    /// See [`RtuSlave::on_transmit_complete`].
    pub fn on_transmit_complete(&self) {
        self.lock(|s| s.on_transmit_complete());
    }

    pub fn bus_state(&self) -> BusState {
        self.lock(|s| s.bus_state())
    }

    pub fn is_receive_completed(&self) -> bool {
        self.lock(|s| s.is_receive_completed())
    }

    pub fn request(&self) -> Option<Request> {
        self.lock(|s| s.request())
    }

    /// See [`RtuSlave::reset`].
    pub fn reset(&self) {
        self.lock(|s| s.reset());
    }
}
