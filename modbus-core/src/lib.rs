//! Platform-agnostic Modbus RTU slave engine.
//!
//! This crate turns the byte stream of one serial port into checked Modbus
//! requests and queues the responses, without touching any peripheral. It
//! runs in embedded `no_std` environments and on host for testing.
//!
//! # Overview
//!
//! The crate is organized into several modules:
//!
//! - [`slave`]: The engine ([`RtuSlave`]) and its interrupt hooks
//! - [`exchange`]: Function-code dispatch against application tables ([`Exchange`])
//! - [`state`]: Bus state machine ([`BusState`], [`BusEvent`], [`BusFlags`])
//! - [`timing`]: Tick counts derived from baud rate ([`Timing`])
//! - [`config`]: Addressing and timing ([`SlaveConfig`], [`Addressing`])
//! - [`port`]: Platform hooks ([`Port`], [`HalfDuplex`])
//! - [`shared`]: Interrupt-safe wrapper ([`SharedSlave`])
//! - [`stats`]: Frame counters ([`FrameStats`])
//!
//! # Data Flow
//!
//! ```text
//! UART rx ──► on_byte_received ─┐
//! timer   ──► on_tick ──────────┼─► RtuSlave ──► ReceiveCompleted
//!                               │                     │
//! foreground: exchange_registers / exchange_bits ◄────┘
//!                               │
//! UART tx ◄── on_tx_ready ◄─────┘ ──► on_transmit_complete ──► Idle
//! ```
//!
//! # Example
//!
//! ```rust
//! use modbus_core::{Exchange, Port, RtuSlave, SlaveConfig, Timing};
//!
//! struct Uart { tx_ready: bool }
//!
//! impl Port for Uart {
//!     fn enable_tx_ready(&mut self) { self.tx_ready = true; }
//!     fn disable_tx_ready(&mut self) { self.tx_ready = false; }
//! }
//!
//! let timing = Timing::from_baud(19_200, 100);
//! let mut slave: RtuSlave<Uart> =
//!     RtuSlave::new(SlaveConfig::single(0x11, timing), Uart { tx_ready: false });
//!
//! // Bus quiet, then "read 3 holding registers at 0x6B" arrives.
//! for _ in 0..timing.frame_delay_start {
//!     slave.on_tick();
//! }
//! for byte in [0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x76, 0x87] {
//!     slave.on_byte_received(byte);
//! }
//! for _ in 0..timing.frame_delay_end {
//!     slave.on_tick();
//! }
//! assert!(slave.is_receive_completed());
//!
//! let mut holding = [0x0102, 0x0304, 0x0506];
//! assert_eq!(slave.exchange_registers(&mut holding, 0x6B), Ok(Exchange::Response));
//!
//! let mut response = [0u8; 11];
//! for byte in response.iter_mut() {
//!     *byte = slave.on_tx_ready().unwrap();
//! }
//! assert_eq!(&response[..9], &[0x11, 0x03, 0x06, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06]);
//! assert!(!slave.port().tx_ready);
//! slave.on_transmit_complete();
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Log through defmt (for embedded logging)
//! - **`log`**: Log through the `log` facade when defmt is not enabled
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and uses no heap allocations. Frame
//! capacity is the const parameter `N` of [`RtuSlave`], between 8 and 256
//! bytes, checked at compile time.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

// Must come first so the logging macros are visible in every module.
#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod exchange;
pub mod port;
pub mod shared;
pub mod slave;
pub mod state;
pub mod stats;
pub mod timing;

// Re-export main types at crate root
pub use config::{Addressing, SlaveConfig};
pub use error::{FrameError, SlaveError};
pub use exchange::Exchange;
pub use port::{Direction, HalfDuplex, Port};
pub use shared::SharedSlave;
pub use slave::RtuSlave;
pub use state::{BusEvent, BusFlags, BusState};
pub use stats::FrameStats;
pub use timing::{Timing, DEFAULT_BAUD, DEFAULT_TICK_US};

pub use modbus_proto;
pub use modbus_proto::{ExceptionCode, FrameBuffer, FunctionCode, Request, MAX_FRAME_SIZE};
