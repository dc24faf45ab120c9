use crate::error::FrameError;

/// Saturating frame counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameStats {
    /// Frames that passed CRC and address checks.
    pub accepted: u16,
    pub crc_errors: u16,
    pub address_mismatches: u16,
    pub overflows: u16,
    pub too_short: u16,
    /// Normal responses sealed for transmission.
    pub responses: u16,
    /// Exception responses sealed for transmission.
    pub exceptions: u16,
}

impl FrameStats {
    pub(crate) fn record_rejected(&mut self, error: FrameError) {
        let counter = match error {
            FrameError::Overflow => &mut self.overflows,
            FrameError::Checksum => &mut self.crc_errors,
            FrameError::AddressMismatch => &mut self.address_mismatches,
            FrameError::TooShort => &mut self.too_short,
        };
        *counter = counter.saturating_add(1);
    }

    pub(crate) fn record_accepted(&mut self) {
        self.accepted = self.accepted.saturating_add(1);
    }

    pub(crate) fn record_response(&mut self) {
        self.responses = self.responses.saturating_add(1);
    }

    pub(crate) fn record_exception(&mut self) {
        self.exceptions = self.exceptions.saturating_add(1);
    }

    /// Frames dropped for any reason.
    #[must_use]
    pub fn rejected(&self) -> u32 {
        u32::from(self.crc_errors)
            + u32::from(self.address_mismatches)
            + u32::from(self.overflows)
            + u32::from(self.too_short)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_rejected_routes_counters() {
        let mut stats = FrameStats::default();
        stats.record_rejected(FrameError::Checksum);
        stats.record_rejected(FrameError::Checksum);
        stats.record_rejected(FrameError::Overflow);
        stats.record_rejected(FrameError::AddressMismatch);
        stats.record_rejected(FrameError::TooShort);
        assert_eq!(stats.crc_errors, 2);
        assert_eq!(stats.overflows, 1);
        assert_eq!(stats.address_mismatches, 1);
        assert_eq!(stats.too_short, 1);
        assert_eq!(stats.rejected(), 5);
        assert_eq!(stats.accepted, 0);
    }

    #[test]
    fn test_counters_saturate() {
        let mut stats = FrameStats {
            accepted: u16::MAX,
            ..FrameStats::default()
        };
        stats.record_accepted();
        assert_eq!(stats.accepted, u16::MAX);
    }
}
