//! Modbus RTU slave device for RP2040.
//!
//! This crate wires the platform-agnostic [`modbus_core`] engine to the
//! RP2040 UART, a periodic tick and an optional RS-485 transceiver.
//!
//! # Overview
//!
//! The firmware runs on a Raspberry Pi Pico (RP2040) and:
//! 1. Receives Modbus RTU frames over UART0 (19200 baud, 8N1)
//! 2. Delimits frames by line silence, measured in 100 µs ticks
//! 3. Serves coils, discrete inputs, holding and input registers
//! 4. Transmits the response, driving the RS-485 transceiver if present
//!
//! # Hardware Configuration
//!
//! | Function | GPIO | Description |
//! |----------|------|-------------|
//! | UART0 TX | 0    | Serial transmit |
//! | UART0 RX | 1    | Serial receive |
//! | DE/RE    | 2    | Transceiver enable (with `rs485` feature) |
//! | LED      | 25   | On-board LED, mirrors coil 0 |
//!
//! # Architecture
//!
//! The firmware uses the Embassy async runtime with four concurrent tasks:
//!
//! - **Receive Task**: Feeds every UART byte to the engine
//! - **Tick Task**: Advances the frame timer every [`TICK_US`] microseconds
//! - **Transmit Task**: Woken through [`TxSignal`], drains the response
//! - **Application Task**: Serves completed requests from [`DeviceTables`]
//!
//! The engine is shared between tasks as a [`Slave`] (a
//! [`SharedSlave`](modbus_core::SharedSlave)), so every access runs in a
//! short critical section.
//!
//! # Modules
//!
//! - [`port`]: Engine-to-task bridge ([`SignalPort`])
//! - [`tables`]: Application data ([`DeviceTables`])
//!
//! # Features
//!
//! - **`dev-panic`** (default): Use `panic-probe` for development (prints panic info via RTT)
//! - **`prod-panic`**: Use `panic-reset` for production (silent watchdog reset)
//! - **`single-address`** (default): Answer only on [`SLAVE_ADDRESS`]
//! - **`multiple-address`**: Answer on every address
//! - **`rs485`** (default): Half-duplex line with transceiver enable on GPIO 2
//! - **`rs232`**: Full-duplex line

#![no_std]

#[cfg(all(feature = "single-address", feature = "multiple-address"))]
compile_error!("Cannot enable both `single-address` and `multiple-address` features");

#[cfg(all(feature = "rs485", feature = "rs232"))]
compile_error!("Cannot enable both `rs485` and `rs232` features - they select conflicting line drivers");

pub use modbus_core::{Exchange, RtuSlave, SharedSlave, SlaveConfig, SlaveError, Timing};

pub mod port;
pub mod tables;

pub use port::{LinePort, SignalPort, TxSignal};
pub use tables::{DeviceTables, SERVED_REQUESTS};

/// Frame buffer capacity: the largest RTU frame.
pub const FRAME_SIZE: usize = modbus_core::MAX_FRAME_SIZE;

/// Line speed of UART0.
pub const BAUD_RATE: u32 = modbus_core::DEFAULT_BAUD;

/// Period of the tick task.
pub const TICK_US: u32 = modbus_core::DEFAULT_TICK_US;

/// Device address in single-address mode.
pub const SLAVE_ADDRESS: u8 = 0x01;

/// The engine as shared between the firmware tasks.
pub type Slave = SharedSlave<LinePort, FRAME_SIZE>;

/// Engine configuration selected by the addressing features.
#[must_use]
pub fn slave_config() -> SlaveConfig {
    let timing = Timing::from_baud(BAUD_RATE, TICK_US);
    #[cfg(feature = "multiple-address")]
    {
        SlaveConfig::promiscuous(timing)
    }
    #[cfg(not(feature = "multiple-address"))]
    {
        SlaveConfig::single(SLAVE_ADDRESS, timing)
    }
}
