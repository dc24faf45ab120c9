//! Function-code dispatch between a pending request and application tables.
//!
//! The application owns its coil, discrete-input, holding and input tables
//! and hands one of them to [`RtuSlave::exchange_registers`] or
//! [`RtuSlave::exchange_bits`] together with the Modbus address of its first
//! entry. The dispatcher validates the request against the table, copies
//! data in the direction the function code asks for, and queues either the
//! response or an exception.

use crate::error::SlaveError;
use crate::port::Port;
use crate::slave::RtuSlave;
use modbus_proto::{pack, BufferError, ExceptionCode, FrameBuffer, FunctionCode, Request, MIN_REQUEST_LEN};

/// Header bytes of a read response: address, function code, byte count.
const READ_HEADER: usize = 3;
/// Offset of the data bytes in a write-multiple request.
const WRITE_DATA_OFFSET: usize = 7;
/// Header, byte count and CRC around the data of a write-multiple request.
const WRITE_OVERHEAD: usize = 9;
/// Last index of an echo acknowledgement (address through quantity/value).
const ECHO_LAST_INDEX: usize = 5;

const COIL_ON: u16 = 0xFF00;
const COIL_OFF: u16 = 0x0000;

/// What the dispatcher did with the pending request.
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Exchange {
    /// A normal response was queued.
    Response,
    /// An exception response with this code was queued.
    Exception(ExceptionCode),
    /// The function code is not served by this call; nothing was sent and the
    /// request is still pending.
    NotHandled,
}

impl Exchange {
    /// Whether a response (normal or exception) was queued.
    #[inline]
    pub const fn is_handled(self) -> bool {
        !matches!(self, Exchange::NotHandled)
    }
}

type Outcome = Result<usize, ExceptionCode>;

fn device_failure(_: BufferError) -> ExceptionCode {
    ExceptionCode::SlaveDeviceFailure
}

impl<P: Port, const N: usize> RtuSlave<P, N> {
    /// Serve function codes 3, 4, 6 and 16 from `table`.
    ///
    /// `table[0]` is the register at Modbus address `start_address`. Holding
    /// and input registers are usually separate tables: check
    /// [`Request::function`] first when exposing both.
    pub fn exchange_registers(
        &mut self,
        table: &mut [u16],
        start_address: u16,
    ) -> Result<Exchange, SlaveError> {
        let request = self.pending_request()?;
        let Some(function) = request
            .function_code()
            .filter(|code| code.is_register_access())
        else {
            return Ok(Exchange::NotHandled);
        };

        let frame = self.frame_buffer_mut();
        let outcome = check_request(&request, frame.len(), start_address, table.len()).and_then(
            |offset| match function {
                FunctionCode::PresetSingleRegister => preset_single_register(frame, table, offset),
                FunctionCode::PresetMultipleRegisters => {
                    preset_multiple_registers(frame, &request, table, offset)
                }
                _ => read_registers(frame, &request, table, offset),
            },
        );
        self.complete(outcome)
    }

    /// Serve function codes 1, 2, 5 and 15 from the packed bit table `table`.
    ///
    /// Bit 0 of `table[0]` is the object at Modbus address `start_address`;
    /// `size` is the number of valid bits and is clamped to `table.len() * 8`.
    pub fn exchange_bits(
        &mut self,
        table: &mut [u8],
        start_address: u16,
        size: u16,
    ) -> Result<Exchange, SlaveError> {
        let request = self.pending_request()?;
        let Some(function) = request
            .function_code()
            .filter(|code| code.is_bit_access())
        else {
            return Ok(Exchange::NotHandled);
        };

        let size = usize::from(size).min(table.len().saturating_mul(8));
        let frame = self.frame_buffer_mut();
        let outcome = check_request(&request, frame.len(), start_address, size).and_then(
            |offset| match function {
                FunctionCode::ForceSingleCoil => force_single_coil(frame, table, offset),
                FunctionCode::ForceMultipleCoils => {
                    force_multiple_coils(frame, &request, table, offset)
                }
                _ => read_bits(frame, &request, table, offset),
            },
        );
        self.complete(outcome)
    }

    fn complete(&mut self, outcome: Outcome) -> Result<Exchange, SlaveError> {
        match outcome {
            Ok(last_index) => {
                self.send_response(last_index)?;
                Ok(Exchange::Response)
            }
            Err(code) => {
                self.send_exception(code)?;
                Ok(Exchange::Exception(code))
            }
        }
    }
}

/// Guard shared by every function code. Returns the table offset of the
/// first requested object.
fn check_request(
    request: &Request,
    frame_len: usize,
    start_address: u16,
    size: usize,
) -> Result<usize, ExceptionCode> {
    if request.amount == 0
        || frame_len < MIN_REQUEST_LEN
        || !request.fits_within(start_address, size)
    {
        return Err(ExceptionCode::IllegalDataValue);
    }
    Ok(usize::from(request.location - start_address))
}

fn word_at<const N: usize>(frame: &FrameBuffer<N>, index: usize) -> Result<u16, ExceptionCode> {
    match (frame.get(index), frame.get(index + 1)) {
        (Some(hi), Some(lo)) => Ok(u16::from_be_bytes([hi, lo])),
        _ => Err(ExceptionCode::SlaveDeviceFailure),
    }
}

/// Resize `frame` for a read response carrying `byte_count` data bytes and
/// return the zeroed data area.
fn read_response<const N: usize>(
    frame: &mut FrameBuffer<N>,
    byte_count: usize,
) -> Result<&mut [u8], ExceptionCode> {
    // Byte count field plus CRC must fit after address and function code.
    if byte_count > N - 5 {
        return Err(ExceptionCode::IllegalDataValue);
    }
    let count = u8::try_from(byte_count).map_err(|_| ExceptionCode::IllegalDataValue)?;
    frame
        .resize(READ_HEADER + byte_count)
        .map_err(device_failure)?;
    frame.set(2, count).map_err(device_failure)?;
    let data = frame
        .as_mut_slice()
        .get_mut(READ_HEADER..)
        .ok_or(ExceptionCode::SlaveDeviceFailure)?;
    data.fill(0);
    Ok(data)
}

/// Data area of a write-multiple request after checking its byte count.
fn write_data<const N: usize>(
    frame: &FrameBuffer<N>,
    min_byte_count: usize,
) -> Result<&[u8], ExceptionCode> {
    let byte_count = usize::from(frame.get(6).unwrap_or(0));
    let available = frame.len().saturating_sub(WRITE_OVERHEAD);
    if byte_count < min_byte_count || available < byte_count {
        return Err(ExceptionCode::IllegalDataValue);
    }
    frame
        .as_slice()
        .get(WRITE_DATA_OFFSET..WRITE_DATA_OFFSET + byte_count)
        .ok_or(ExceptionCode::SlaveDeviceFailure)
}

fn read_registers<const N: usize>(
    frame: &mut FrameBuffer<N>,
    request: &Request,
    table: &[u16],
    offset: usize,
) -> Outcome {
    let amount = usize::from(request.amount);
    let values = table
        .get(offset..offset + amount)
        .ok_or(ExceptionCode::SlaveDeviceFailure)?;
    let data = read_response(frame, amount * 2)?;
    let written = pack::write_registers_be(values, data).map_err(device_failure)?;
    Ok(READ_HEADER + written - 1)
}

fn preset_multiple_registers<const N: usize>(
    frame: &mut FrameBuffer<N>,
    request: &Request,
    table: &mut [u16],
    offset: usize,
) -> Outcome {
    let amount = usize::from(request.amount);
    let data = write_data(frame, amount * 2)?;
    let values = table
        .get_mut(offset..offset + amount)
        .ok_or(ExceptionCode::SlaveDeviceFailure)?;
    pack::read_registers_be(data, values).map_err(device_failure)?;
    Ok(ECHO_LAST_INDEX)
}

fn preset_single_register<const N: usize>(
    frame: &mut FrameBuffer<N>,
    table: &mut [u16],
    offset: usize,
) -> Outcome {
    let value = word_at(frame, 4)?;
    let slot = table
        .get_mut(offset)
        .ok_or(ExceptionCode::SlaveDeviceFailure)?;
    *slot = value;
    Ok(ECHO_LAST_INDEX)
}

fn read_bits<const N: usize>(
    frame: &mut FrameBuffer<N>,
    request: &Request,
    table: &[u8],
    offset: usize,
) -> Outcome {
    let amount = usize::from(request.amount);
    let byte_count = pack::bytes_needed(amount);
    let data = read_response(frame, byte_count)?;
    pack::copy_bits(table, offset, data, 0, amount).map_err(device_failure)?;
    Ok(READ_HEADER + byte_count - 1)
}

fn force_multiple_coils<const N: usize>(
    frame: &mut FrameBuffer<N>,
    request: &Request,
    table: &mut [u8],
    offset: usize,
) -> Outcome {
    let amount = usize::from(request.amount);
    let data = write_data(frame, pack::bytes_needed(amount))?;
    pack::copy_bits(data, 0, table, offset, amount).map_err(device_failure)?;
    Ok(ECHO_LAST_INDEX)
}

fn force_single_coil<const N: usize>(
    frame: &mut FrameBuffer<N>,
    table: &mut [u8],
    offset: usize,
) -> Outcome {
    let value = match word_at(frame, 4)? {
        COIL_ON => true,
        COIL_OFF => false,
        _ => return Err(ExceptionCode::IllegalDataValue),
    };
    pack::set_bit(table, offset, value).map_err(device_failure)?;
    Ok(ECHO_LAST_INDEX)
}
