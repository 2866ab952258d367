//! Time domain helpers.
//! Translates between the 64 bit monotonic counter and microseconds.



/// Reference clock of the RF215 timing figures, in Hz.
pub const REF_CLOCK_HZ: u32 = 32_000_000;

/// Fractional bits of Q5 microseconds (1 unit = 1 / 32 us = one 32 MHz cycle).
pub const Q5_SHIFT: u32 = 5;

/// Minimum reset pulse width (625 ns) in Q5 microseconds.
pub const RESET_PULSE_US_Q5: u32 = 20;



/// Converts Q5 microseconds to counter ticks, rounding up.
pub const fn us_q5_to_count(us_q5: u32, freq_hz: u32) -> u32 {
    let num = us_q5 as u64 * freq_hz as u64;
    let den = (1_000_000u64) << Q5_SHIFT;
    ((num + den - 1) / den) as u32
}

/// Converts counter ticks to microseconds (truncating).
pub const fn count_to_us(count: u64, freq_hz: u32) -> u64 {
    ((count as u128 * 1_000_000) / freq_hz as u128) as u64
}

/// Converts microseconds to counter ticks (truncating).
pub const fn us_to_count(us: u64, freq_hz: u32) -> u64 {
    ((us as u128 * freq_hz as u128) / 1_000_000) as u64
}

/// Ticks elapsed between two counter samples. Zero if `now` is behind.
pub const fn elapsed(start: u64, now: u64) -> u64 {
    now.saturating_sub(start)
}
