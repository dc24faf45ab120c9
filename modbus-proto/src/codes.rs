//! Modbus function and exception codes.

/// Bit set in the function-code byte of an exception response.
pub const EXCEPTION_FLAG: u8 = 0x80;

/// Function codes understood on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum FunctionCode {
    /// Read single/multiple coils.
    ReadCoilStatus = 1,
    /// Read single/multiple discrete inputs.
    ReadInputStatus = 2,
    /// Read analog output registers.
    ReadHoldingRegisters = 3,
    /// Read analog input registers.
    ReadInputRegisters = 4,
    /// Write a single bit.
    ForceSingleCoil = 5,
    /// Write a single analog output register.
    PresetSingleRegister = 6,
    /// Write multiple bits.
    ForceMultipleCoils = 15,
    /// Write multiple analog output registers.
    PresetMultipleRegisters = 16,
    /// Device description and run status. Never served by the dispatcher.
    ReportSlaveId = 17,
}

impl FunctionCode {
    /// Decode a raw function-code byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::ReadCoilStatus,
            2 => Self::ReadInputStatus,
            3 => Self::ReadHoldingRegisters,
            4 => Self::ReadInputRegisters,
            5 => Self::ForceSingleCoil,
            6 => Self::PresetSingleRegister,
            15 => Self::ForceMultipleCoils,
            16 => Self::PresetMultipleRegisters,
            17 => Self::ReportSlaveId,
            _ => return None,
        })
    }

    /// Raw wire value.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Functions that address exactly one object and carry no quantity field.
    #[inline]
    #[must_use]
    pub const fn is_single_write(self) -> bool {
        matches!(self, Self::ForceSingleCoil | Self::PresetSingleRegister)
    }

    /// Functions operating on 16-bit registers.
    #[inline]
    #[must_use]
    pub const fn is_register_access(self) -> bool {
        matches!(
            self,
            Self::ReadHoldingRegisters
                | Self::ReadInputRegisters
                | Self::PresetSingleRegister
                | Self::PresetMultipleRegisters
        )
    }

    /// Functions operating on coils or discrete inputs.
    #[inline]
    #[must_use]
    pub const fn is_bit_access(self) -> bool {
        matches!(
            self,
            Self::ReadCoilStatus
                | Self::ReadInputStatus
                | Self::ForceSingleCoil
                | Self::ForceMultipleCoils
        )
    }
}

impl TryFrom<u8> for FunctionCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(value)
    }
}

impl From<FunctionCode> for u8 {
    fn from(code: FunctionCode) -> Self {
        code.code()
    }
}

/// Exception codes carried by an exception response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum ExceptionCode {
    IllegalFunction = 1,
    IllegalDataAddress = 2,
    IllegalDataValue = 3,
    SlaveDeviceFailure = 4,
    Acknowledge = 5,
    SlaveDeviceBusy = 6,
    NegativeAcknowledge = 7,
    MemoryParityError = 8,
}

impl ExceptionCode {
    /// Decode a raw exception-code byte.
    #[must_use]
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            1 => Self::IllegalFunction,
            2 => Self::IllegalDataAddress,
            3 => Self::IllegalDataValue,
            4 => Self::SlaveDeviceFailure,
            5 => Self::Acknowledge,
            6 => Self::SlaveDeviceBusy,
            7 => Self::NegativeAcknowledge,
            8 => Self::MemoryParityError,
            _ => return None,
        })
    }

    /// Raw wire value.
    #[inline]
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for ExceptionCode {
    type Error = u8;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::from_u8(value).ok_or(value)
    }
}

impl From<ExceptionCode> for u8 {
    fn from(code: ExceptionCode) -> Self {
        code.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_code_round_trip_values() {
        for raw in [1u8, 2, 3, 4, 5, 6, 15, 16, 17] {
            let code = FunctionCode::try_from(raw).unwrap();
            assert_eq!(u8::from(code), raw);
        }
    }

    #[test]
    fn test_unknown_function_code() {
        assert_eq!(FunctionCode::try_from(0), Err(0));
        assert_eq!(FunctionCode::try_from(7), Err(7));
        assert_eq!(FunctionCode::try_from(0x83), Err(0x83));
    }

    #[test]
    fn test_access_classes_are_disjoint() {
        for raw in 0..=u8::MAX {
            if let Some(code) = FunctionCode::from_u8(raw) {
                assert!(!(code.is_register_access() && code.is_bit_access()));
            }
        }
        assert!(!FunctionCode::ReportSlaveId.is_register_access());
        assert!(!FunctionCode::ReportSlaveId.is_bit_access());
    }

    #[test]
    fn test_single_write_codes() {
        assert!(FunctionCode::ForceSingleCoil.is_single_write());
        assert!(FunctionCode::PresetSingleRegister.is_single_write());
        assert!(!FunctionCode::ForceMultipleCoils.is_single_write());
    }

    #[test]
    fn test_exception_codes() {
        assert_eq!(ExceptionCode::IllegalDataValue.code(), 3);
        assert_eq!(ExceptionCode::try_from(8), Ok(ExceptionCode::MemoryParityError));
        assert_eq!(ExceptionCode::try_from(9), Err(9));
    }
}
