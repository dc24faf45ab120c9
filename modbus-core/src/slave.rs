//! The slave engine: receive path, frame timing, response framing and
//! transmit path for one serial line.

use crate::config::{Addressing, SlaveConfig};
use crate::error::{FrameError, SlaveError};
use crate::port::{Direction, Port};
use crate::state::{BusEvent, BusFlags, BusState};
use crate::stats::FrameStats;
use modbus_proto::{ExceptionCode, FrameBuffer, Request, EXCEPTION_FLAG, MAX_FRAME_SIZE, MIN_ADU_LEN};

/// Modbus RTU slave bound to one serial port.
///
/// The engine is driven entirely by its hooks:
///
/// | Hook | Context |
/// |------|---------|
/// | [`on_byte_received`](Self::on_byte_received) | UART receive interrupt |
/// | [`on_tick`](Self::on_tick) | periodic timer interrupt |
/// | [`on_tx_ready`](Self::on_tx_ready) | UART transmit-ready interrupt |
/// | [`on_transmit_complete`](Self::on_transmit_complete) | UART transmit-complete interrupt |
///
/// The foreground polls [`is_receive_completed`](Self::is_receive_completed)
/// and answers with the exchange operations,
/// [`send_exception`](Self::send_exception), or [`reset`](Self::reset).
///
/// Hooks and foreground calls take `&mut self`; when they run in different
/// execution contexts, share the engine through
/// [`SharedSlave`](crate::SharedSlave).
pub struct RtuSlave<P, const N: usize = MAX_FRAME_SIZE> {
    port: P,
    config: SlaveConfig,
    state: BusState,
    timer: u16,
    frame: FrameBuffer<N>,
    request: Request,
    stats: FrameStats,
}

impl<P: Port, const N: usize> RtuSlave<P, N> {
    /// Create a slave and put the transceiver in listen mode.
    ///
    /// The engine starts in [`BusState::Idle`]: it waits for one quiet
    /// period before accepting a frame.
    pub fn new(config: SlaveConfig, mut port: P) -> Self {
        port.set_direction(Direction::Listen);
        Self {
            port,
            config,
            state: BusState::Idle,
            timer: 0,
            frame: FrameBuffer::new(),
            request: Request::default(),
            stats: FrameStats::default(),
        }
    }

    /// Apply `event` through the state table.
    ///
    /// Returns `false` if the event does not apply in the current state.
    fn apply(&mut self, event: BusEvent) -> bool {
        match self.state.next(event) {
            Some(next) => {
                trace!("bus {:?} -> {:?} on {:?}", self.state, next, event);
                self.state = next;
                true
            }
            None => false,
        }
    }

    /// Back to waiting for a quiet bus; drops whatever was in flight.
    ///
    /// Applications call this to deliberately not answer a pending request.
    pub fn reset(&mut self) {
        self.apply(BusEvent::Reset);
        self.timer = 0;
    }

    /// Receive hook: call once per byte read from the UART.
    pub fn on_byte_received(&mut self, byte: u8) {
        self.timer = 0;
        match self.state {
            BusState::Receiving { .. } => {
                if self.frame.push(byte).is_err() {
                    self.reject(FrameError::Overflow);
                }
            }
            BusState::Ready => {
                self.frame.start(byte);
                self.apply(BusEvent::FrameStart);
            }
            // Completed request not yet consumed, or our own response on the
            // wire: the buffer belongs to someone else.
            _ => {}
        }
    }

    /// Tick hook: call at the fixed interval the [`Timing`](crate::Timing)
    /// was derived for.
    pub fn on_tick(&mut self) {
        if !self.state.timer_active() {
            return;
        }
        self.timer = self.timer.saturating_add(1);

        let timing = self.config.timing;
        match self.state {
            BusState::Receiving { .. } => {
                if self.timer == timing.inter_char_timeout {
                    self.apply(BusEvent::InterCharTimeout);
                } else if self.timer == timing.frame_delay_end {
                    self.end_of_frame();
                }
            }
            _ => {
                if self.timer == timing.frame_delay_start {
                    self.apply(BusEvent::QuietPeriod);
                }
            }
        }
    }

    fn end_of_frame(&mut self) {
        match self.check_frame() {
            Ok(()) => {
                self.request = Request::decode(self.frame.as_slice());
                self.stats.record_accepted();
                self.apply(BusEvent::FrameAccepted);
                debug!(
                    "frame accepted: fc {} location {} amount {}",
                    self.request.function,
                    self.request.location,
                    self.request.amount
                );
            }
            Err(error) => self.reject(error),
        }
    }

    fn check_frame(&self) -> Result<(), FrameError> {
        let frame = self.frame.as_slice();
        if frame.len() < MIN_ADU_LEN {
            return Err(FrameError::TooShort);
        }
        if let Addressing::Single(address) = self.config.addressing {
            if frame.first() != Some(&address) {
                return Err(FrameError::AddressMismatch);
            }
        }
        if !self.frame.crc_valid() {
            return Err(FrameError::Checksum);
        }
        Ok(())
    }

    fn reject(&mut self, error: FrameError) {
        match error {
            FrameError::Overflow => warn!("frame dropped: {:?}", error),
            FrameError::AddressMismatch => trace!("frame dropped: {:?}", error),
            _ => debug!("frame dropped: {:?}", error),
        }
        self.stats.record_rejected(error);
        self.reset();
    }

    /// Transmit-ready hook: returns the next byte to write to the UART.
    ///
    /// Disables the transmit-ready interrupt through the [`Port`] once the
    /// last byte has been handed out. Returns `None` when nothing is queued.
    pub fn on_tx_ready(&mut self) -> Option<u8> {
        match self.state {
            BusState::TransmitRequested => {
                self.apply(BusEvent::TransmitStarted);
            }
            BusState::Transmitting => {}
            _ => {
                self.port.disable_tx_ready();
                return None;
            }
        }
        let byte = self.frame.next_tx_byte();
        if self.frame.tx_done() {
            self.port.disable_tx_ready();
        }
        byte
    }

    /// Transmit-complete hook: the last stop bit has left the shift register.
    pub fn on_transmit_complete(&mut self) {
        if !matches!(
            self.state,
            BusState::Transmitting | BusState::TransmitRequested
        ) {
            return;
        }
        self.port.set_direction(Direction::Listen);
        self.reset();
    }

    /// Seal `frame[..=last_index]` as the response and start transmitting.
    ///
    /// `last_index` is the index of the last payload byte; the CRC is
    /// appended after it. Bytes `[0, last_index]` must already hold the
    /// response, see [`frame_mut`](Self::frame_mut).
    pub fn send_message(&mut self, last_index: usize) -> Result<(), SlaveError> {
        if self.state != BusState::ReceiveCompleted {
            return Err(SlaveError::NoPendingRequest);
        }
        let len = self
            .frame
            .finish(last_index)
            .map_err(|_| SlaveError::FrameTooLarge)?;
        self.port.set_direction(Direction::Drive);
        self.apply(BusEvent::SendRequested);
        self.port.enable_tx_ready();
        trace!("response sealed, {} bytes", len);
        Ok(())
    }

    /// Answer the pending request with an exception response.
    pub fn send_exception(&mut self, code: ExceptionCode) -> Result<(), SlaveError> {
        if self.state != BusState::ReceiveCompleted {
            return Err(SlaveError::NoPendingRequest);
        }
        // Accepted frames hold at least address, function code and CRC.
        self.frame
            .resize(3)
            .map_err(|_| SlaveError::FrameTooLarge)?;
        let function = self.frame.get(1).unwrap_or(0) | EXCEPTION_FLAG;
        self.frame
            .set(1, function)
            .and_then(|()| self.frame.set(2, code.code()))
            .map_err(|_| SlaveError::FrameTooLarge)?;
        self.send_message(2)?;
        self.stats.record_exception();
        debug!("exception {:?} for fc {}", code, self.request.function);
        Ok(())
    }

    /// Seal a normal response and count it.
    pub(crate) fn send_response(&mut self, last_index: usize) -> Result<(), SlaveError> {
        self.send_message(last_index)?;
        self.stats.record_response();
        Ok(())
    }

    /// Pending request, or an error if none is waiting.
    pub(crate) fn pending_request(&self) -> Result<Request, SlaveError> {
        if self.state == BusState::ReceiveCompleted {
            Ok(self.request)
        } else {
            Err(SlaveError::NoPendingRequest)
        }
    }

    pub(crate) fn frame_buffer_mut(&mut self) -> &mut FrameBuffer<N> {
        &mut self.frame
    }

    /// Current bus state.
    #[inline]
    #[must_use]
    pub fn bus_state(&self) -> BusState {
        self.state
    }

    /// Current bus state as flags.
    #[inline]
    #[must_use]
    pub fn flags(&self) -> BusFlags {
        self.state.flags()
    }

    /// Whether a checked request is waiting for the foreground.
    #[inline]
    #[must_use]
    pub fn is_receive_completed(&self) -> bool {
        self.state == BusState::ReceiveCompleted
    }

    /// The pending request, if any.
    #[must_use]
    pub fn request(&self) -> Option<Request> {
        self.pending_request().ok()
    }

    /// Start address of the most recently accepted request.
    #[inline]
    #[must_use]
    pub fn requested_address(&self) -> u16 {
        self.request.location
    }

    /// Quantity of the most recently accepted request.
    #[inline]
    #[must_use]
    pub fn requested_amount(&self) -> u16 {
        self.request.amount
    }

    /// Slave address the pending request was sent to.
    ///
    /// Mostly useful in promiscuous mode, where any address is accepted.
    #[must_use]
    pub fn requested_slave(&self) -> Option<u8> {
        self.pending_request().ok().and_then(|_| self.frame.get(0))
    }

    /// Raw bytes of the pending request, CRC included.
    pub fn frame(&self) -> Result<&[u8], SlaveError> {
        self.pending_request()?;
        Ok(self.frame.as_slice())
    }

    /// Writable frame buffer for building a custom response in place.
    ///
    /// Resize and fill it, then call [`send_message`](Self::send_message)
    /// with the index of the last payload byte.
    pub fn frame_mut(&mut self) -> Result<&mut FrameBuffer<N>, SlaveError> {
        self.pending_request()?;
        Ok(&mut self.frame)
    }

    /// Configured device address, `None` in promiscuous mode.
    #[must_use]
    pub fn address(&self) -> Option<u8> {
        match self.config.addressing {
            Addressing::Single(address) => Some(address),
            Addressing::Promiscuous => None,
        }
    }

    /// Answer only on `address` from now on.
    pub fn set_address(&mut self, address: u8) {
        self.config.addressing = Addressing::Single(address);
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &SlaveConfig {
        &self.config
    }

    /// Frame counters since start-up or the last [`clear_stats`](Self::clear_stats).
    #[inline]
    #[must_use]
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    pub fn clear_stats(&mut self) {
        self.stats = FrameStats::default();
    }

    /// Get a reference to the port.
    pub fn port(&self) -> &P {
        &self.port
    }

    /// Get a mutable reference to the port.
    pub fn port_mut(&mut self) -> &mut P {
        &mut self.port
    }

    /// Decompose the slave, returning its port.
    pub fn into_port(self) -> P {
        self.port
    }
}
