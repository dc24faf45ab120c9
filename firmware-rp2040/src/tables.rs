//! Application data exposed over Modbus.
//!
//! | Table | Addresses | Contents |
//! |-------|-----------|----------|
//! | Coils | 0-15 | Coil 0 drives the on-board LED |
//! | Discrete inputs | 0-7 | Input 0: a frame was rejected since boot |
//! | Holding registers | 0-15 | Free for the master |
//! | Input registers | 0-3 | Uptime, served requests, rejected frames |

use defmt::debug;
use modbus_core::{Exchange, ExceptionCode, FunctionCode, Port, RtuSlave, SlaveError};
use portable_atomic::{AtomicU32, Ordering};

/// Requests answered with a normal or exception response since boot.
pub static SERVED_REQUESTS: AtomicU32 = AtomicU32::new(0);

const COIL_COUNT: u16 = 16;
const DISCRETE_COUNT: u16 = 8;

/// Discrete input set once any frame has been dropped.
pub const FRAME_ERROR_INPUT: usize = 0;

/// Input register indices.
pub mod input {
    pub const UPTIME_SECS: usize = 0;
    pub const SERVED_LO: usize = 1;
    pub const SERVED_HI: usize = 2;
    pub const REJECTED: usize = 3;
}

/// Coil, discrete-input, holding and input tables of the device.
pub struct DeviceTables {
    coils: [u8; 2],
    discrete_inputs: [u8; 1],
    holding: [u16; 16],
    input: [u16; 4],
}

impl DeviceTables {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            coils: [0; 2],
            discrete_inputs: [0; 1],
            holding: [0; 16],
            input: [0; 4],
        }
    }

    /// Answer the pending request on `slave`, if any.
    ///
    /// Function codes outside the data tables get an `IllegalFunction`
    /// exception.
    pub fn serve<P: Port, const N: usize>(
        &mut self,
        slave: &mut RtuSlave<P, N>,
    ) -> Result<Exchange, SlaveError> {
        let Some(request) = slave.request() else {
            return Ok(Exchange::NotHandled);
        };

        let outcome = match request.function_code() {
            Some(FunctionCode::ReadInputStatus) => {
                slave.exchange_bits(&mut self.discrete_inputs, 0, DISCRETE_COUNT)?
            }
            Some(FunctionCode::ReadInputRegisters) => {
                slave.exchange_registers(&mut self.input, 0)?
            }
            Some(code) if code.is_bit_access() => {
                slave.exchange_bits(&mut self.coils, 0, COIL_COUNT)?
            }
            Some(code) if code.is_register_access() => {
                slave.exchange_registers(&mut self.holding, 0)?
            }
            _ => Exchange::NotHandled,
        };

        let outcome = if outcome.is_handled() {
            outcome
        } else {
            slave.send_exception(ExceptionCode::IllegalFunction)?;
            Exchange::Exception(ExceptionCode::IllegalFunction)
        };
        SERVED_REQUESTS.fetch_add(1, Ordering::Relaxed);
        debug!("fc {} -> {:?}", request.function, outcome);
        Ok(outcome)
    }

    /// State of coil `index`.
    #[must_use]
    pub fn coil(&self, index: usize) -> bool {
        self.coils
            .get(index / 8)
            .is_some_and(|byte| byte & (1 << (index % 8)) != 0)
    }

    pub fn set_discrete_input(&mut self, index: usize, value: bool) {
        if let Some(byte) = self.discrete_inputs.get_mut(index / 8) {
            let mask = 1 << (index % 8);
            if value {
                *byte |= mask;
            } else {
                *byte &= !mask;
            }
        }
    }

    pub fn set_input_register(&mut self, index: usize, value: u16) {
        if let Some(slot) = self.input.get_mut(index) {
            *slot = value;
        }
    }
}

impl Default for DeviceTables {
    fn default() -> Self {
        Self::new()
    }
}
