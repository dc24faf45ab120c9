//! Frame timing constants in tick units.
//!
//! Modbus RTU delimits frames by silence alone: 1.5 character times between
//! bytes of one frame, 3.5 between frames. A character is 10 bit times
//! (start, 8 data, stop). From 19200 baud upward the standard fixes the
//! delays instead of scaling them with the bit rate.

/// Default interval between two [`on_tick`](crate::RtuSlave::on_tick) calls.
pub const DEFAULT_TICK_US: u32 = 100;

/// Default line speed.
pub const DEFAULT_BAUD: u32 = 19_200;

/// Fixed delays used from 19200 baud upward, in microseconds.
const FIXED_INTER_CHAR_US: u32 = 700;
const FIXED_FRAME_START_US: u32 = 1_600;
const FIXED_FRAME_END_US: u32 = 1_800;

/// Tick counts at which the timing state machine fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timing {
    /// Silence inside a frame that marks a gap (~1.5 characters).
    pub inter_char_timeout: u16,
    /// Silence after which the bus counts as quiet (~3.5 characters).
    pub frame_delay_start: u16,
    /// Silence that ends a frame being received (~4 characters).
    pub frame_delay_end: u16,
}

impl Timing {
    /// Derive tick counts for `baud` with a tick every `tick_us` microseconds.
    ///
    /// Below 19200 baud, with a character time of `10_000_000 / baud` µs:
    /// inter-character = 1.5, start = 3.5, end = 4 characters, each divided by
    /// the tick period and truncated.
    ///
    /// Every count is at least 1, and the end-of-frame count always lies past
    /// the inter-character count so frame validation can fire.
    ///
    /// # Example
    ///
    /// ```
    /// use modbus_core::Timing;
    ///
    /// let fast = Timing::from_baud(115_200, 100);
    /// assert_eq!((fast.inter_char_timeout, fast.frame_delay_start, fast.frame_delay_end), (7, 16, 18));
    ///
    /// let slow = Timing::from_baud(9_600, 100);
    /// assert_eq!((slow.inter_char_timeout, slow.frame_delay_start, slow.frame_delay_end), (15, 36, 41));
    /// ```
    #[must_use]
    pub const fn from_baud(baud: u32, tick_us: u32) -> Self {
        let tick_us = if tick_us == 0 { 1 } else { tick_us as u64 };
        let (inter, start, end) = if baud >= 19_200 {
            (
                FIXED_INTER_CHAR_US as u64 / tick_us,
                FIXED_FRAME_START_US as u64 / tick_us,
                FIXED_FRAME_END_US as u64 / tick_us,
            )
        } else {
            // Character times scaled by 10 to keep the half steps integral.
            let baud = if baud == 0 { 1 } else { baud as u64 };
            let denom = baud * tick_us;
            (15_000_000 / denom, 35_000_000 / denom, 40_000_000 / denom)
        };

        let inter = clamp_ticks(inter);
        let inter = if inter == u16::MAX { u16::MAX - 1 } else { inter };
        let start = clamp_ticks(start);
        let end = clamp_ticks(end);
        let end = if end > inter { end } else { inter + 1 };

        Self {
            inter_char_timeout: inter,
            frame_delay_start: start,
            frame_delay_end: end,
        }
    }
}

impl Default for Timing {
    fn default() -> Self {
        Self::from_baud(DEFAULT_BAUD, DEFAULT_TICK_US)
    }
}

#[inline]
const fn clamp_ticks(ticks: u64) -> u16 {
    if ticks == 0 {
        1
    } else if ticks > u16::MAX as u64 {
        u16::MAX
    } else {
        ticks as u16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_timing_from_19200() {
        for baud in [19_200, 38_400, 115_200] {
            let timing = Timing::from_baud(baud, 100);
            assert_eq!(timing.inter_char_timeout, 7);
            assert_eq!(timing.frame_delay_start, 16);
            assert_eq!(timing.frame_delay_end, 18);
        }
    }

    #[test]
    fn test_scaled_timing_below_19200() {
        let timing = Timing::from_baud(9_600, 100);
        assert_eq!(timing.inter_char_timeout, 15);
        assert_eq!(timing.frame_delay_start, 36);
        assert_eq!(timing.frame_delay_end, 41);

        let timing = Timing::from_baud(2_400, 100);
        assert_eq!(timing.inter_char_timeout, 62);
        assert_eq!(timing.frame_delay_start, 145);
        assert_eq!(timing.frame_delay_end, 166);
    }

    #[test]
    fn test_slower_tick_scales_down() {
        let timing = Timing::from_baud(19_200, 200);
        assert_eq!(timing.inter_char_timeout, 3);
        assert_eq!(timing.frame_delay_start, 8);
        assert_eq!(timing.frame_delay_end, 9);
    }

    #[test]
    fn test_degenerate_inputs_stay_usable() {
        let timing = Timing::from_baud(0, 0);
        assert!(timing.inter_char_timeout >= 1);
        assert!(timing.frame_delay_end > timing.inter_char_timeout);

        let timing = Timing::from_baud(115_200, 10_000);
        assert_eq!(timing.inter_char_timeout, 1);
        assert_eq!(timing.frame_delay_start, 1);
        assert_eq!(timing.frame_delay_end, 2);
    }

    #[test]
    fn test_default_is_19200_at_100us() {
        assert_eq!(Timing::default(), Timing::from_baud(19_200, 100));
    }
}
