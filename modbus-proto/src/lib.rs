//! Modbus RTU wire types for the slave engine.
//!
//! This crate holds everything about a frame that does not depend on bus
//! timing or on who owns the serial port:
//!
//! - [`crc`]: Modbus CRC16 ([`calculate_crc16`], [`crc::validate`], [`crc::generate`])
//! - [`codes`]: [`FunctionCode`] and [`ExceptionCode`]
//! - [`frame`]: [`FrameBuffer`], the fixed-capacity store for one in-flight frame
//! - [`request`]: [`Request`], the decoded `{function, location, amount}` descriptor
//! - [`pack`]: bit and big-endian register copy primitives
//!
//! # Frame Format
//!
//! ```text
//! [address:1][function code:1][payload:N][CRC lo:1][CRC hi:1]
//! ```
//!
//! # Example
//!
//! ```
//! use modbus_proto::{crc, FunctionCode, Request};
//!
//! let mut frame = [0x11, 0x03, 0x00, 0x6B, 0x00, 0x03, 0x00, 0x00];
//! // The CRC helpers take the index of the last payload byte.
//! crc::generate(&mut frame, 5).unwrap();
//! assert_eq!(&frame[6..], &[0x76, 0x87]);
//! assert!(crc::validate(&frame, 5));
//!
//! let request = Request::decode(&frame);
//! assert_eq!(request.function_code(), Some(FunctionCode::ReadHoldingRegisters));
//! assert_eq!(request.location, 0x6B);
//! assert_eq!(request.amount, 3);
//! ```
//!
//! # Features
//!
//! - **`std`**: Enable standard library support (for host testing)
//! - **`defmt`**: Enable defmt formatting (for embedded logging)
//!
//! # No-std Support
//!
//! This crate is `#![no_std]` by default and never allocates.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate std;

pub mod codes;
pub mod crc;
mod error;
pub mod frame;
pub mod pack;
pub mod request;

pub use codes::{ExceptionCode, FunctionCode, EXCEPTION_FLAG};
pub use crc::calculate_crc16;
pub use error::BufferError;
pub use frame::{FrameBuffer, MAX_FRAME_SIZE, MIN_ADU_LEN, MIN_FRAME_SIZE, MIN_REQUEST_LEN};
pub use request::Request;
