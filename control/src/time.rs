//! Monotonic time types shared with the firmware clock (microsecond ticks).

/// Point in time on a 1 MHz monotonic clock
pub type Instant = fugit::TimerInstantU64<1_000_000>;

/// Span of time on a 1 MHz monotonic clock
pub type Duration = fugit::TimerDurationU64<1_000_000>;

/// Converts a duration to fractional seconds
pub fn secs_f32(duration: Duration) -> f32 {
    duration.to_micros() as f32 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_milliseconds_to_seconds() {
        assert!((secs_f32(Duration::millis(10)) - 0.01).abs() < 1e-6);
        assert_eq!(secs_f32(Duration::micros(0)), 0.0);
    }
}
