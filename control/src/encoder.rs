//! Encoder Reader
//!
//! Wraps the free-running 16-bit quadrature counter and rejects implausible jumps.
//!
//! # Operation
//! - The first read after construction or [`EncoderReader::reset`] is always accepted
//! - Every later read computes the modular 16-bit delta to the last accepted raw value
//! - A delta larger than the glitch threshold is discarded and the last accepted
//!   position is returned instead
//! - Accepted deltas are accumulated into a 32-bit position, so the counter may wrap
//!   around any number of times without the position jumping
//!
//! # Configuration
//! - Default threshold of 1000 counts, an order of magnitude above the per-cycle motion of
//!   the paddle at full drive and well below its calibrated travel
//! - Thresholds are capped at `i16::MAX`, beyond which a modular delta carries no direction

/// Default implausible-jump threshold in raw counts
pub const DEFAULT_GLITCH_THRESHOLD: u16 = 1000;

/// Raw hardware quadrature counter
pub trait PositionCounter {
    /// Current counter value; wraps around at the 16-bit boundary
    fn read_raw(&mut self) -> i16;
    /// Zeroes the counter
    fn reset(&mut self);
}

impl<C: PositionCounter + ?Sized> PositionCounter for &mut C {
    fn read_raw(&mut self) -> i16 {
        (**self).read_raw()
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

/// Glitch-filtered position reader
pub struct EncoderReader<C> {
    counter: C,
    threshold: u16,
    last_raw: Option<i16>,
    position: i32,
    rejected: u32,
}

impl<C: PositionCounter> EncoderReader<C> {
    /// Creates a reader with the default glitch threshold
    pub fn new(counter: C) -> Self {
        Self::with_threshold(counter, DEFAULT_GLITCH_THRESHOLD)
    }

    /// Creates a reader rejecting deltas larger than `threshold` counts
    pub fn with_threshold(counter: C, threshold: u16) -> Self {
        Self {
            counter,
            threshold: threshold.min(i16::MAX as u16),
            last_raw: None,
            position: 0,
            rejected: 0,
        }
    }

    /// Reads the counter and returns the filtered position
    pub fn read(&mut self) -> i32 {
        let raw = self.counter.read_raw();

        let Some(last) = self.last_raw else {
            self.last_raw = Some(raw);
            self.position = i32::from(raw);
            return self.position;
        };

        let delta = raw.wrapping_sub(last);
        if delta.unsigned_abs() > self.threshold {
            self.rejected = self.rejected.wrapping_add(1);
            debug!("encoder glitch rejected: raw {} last {} delta {}", raw, last, delta);
            return self.position;
        }

        self.last_raw = Some(raw);
        self.position = self.position.wrapping_add(i32::from(delta));
        self.position
    }

    /// Zeroes the hardware counter and forgets the cached reference
    pub fn reset(&mut self) {
        self.counter.reset();
        self.last_raw = None;
        self.position = 0;
    }

    /// Last accepted position, without touching the counter
    pub fn position(&self) -> i32 {
        self.position
    }

    /// Number of samples discarded as glitches since construction
    pub fn rejected(&self) -> u32 {
        self.rejected
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Counter replaying a fixed list of raw values
    struct Replay<'a> {
        samples: &'a [i16],
        index: usize,
        resets: usize,
    }

    impl<'a> Replay<'a> {
        fn new(samples: &'a [i16]) -> Self {
            Self {
                samples,
                index: 0,
                resets: 0,
            }
        }
    }

    impl PositionCounter for Replay<'_> {
        fn read_raw(&mut self) -> i16 {
            let value = self.samples[self.index.min(self.samples.len() - 1)];
            self.index += 1;
            value
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn filtered(samples: &[i16], threshold: u16) -> Vec<i32> {
        let mut reader = EncoderReader::with_threshold(Replay::new(samples), threshold);
        samples.iter().map(|_| reader.read()).collect()
    }

    #[test]
    fn single_outlier_is_replaced_by_last_valid() {
        assert_eq!(
            filtered(&[100, 105, 110, 9999, 115], 1000),
            vec![100, 105, 110, 110, 115]
        );
    }

    #[test]
    fn plausible_sequence_passes_unchanged() {
        let samples = [-40, -20, 0, 25, 300, 1200, 900, -50];
        let expected: Vec<i32> = samples.iter().map(|&s| i32::from(s)).collect();
        assert_eq!(filtered(&samples, 1000), expected);
    }

    #[test]
    fn first_read_is_accepted_even_when_far_from_zero() {
        assert_eq!(filtered(&[20_000, 20_010], 1000), vec![20_000, 20_010]);
    }

    #[test]
    fn consecutive_outliers_are_all_rejected() {
        assert_eq!(
            filtered(&[10, 5000, 5001, 12, 14], 1000),
            vec![10, 10, 10, 12, 14]
        );
    }

    #[test]
    fn counter_wraparound_is_widened() {
        let samples = [i16::MAX - 10, i16::MAX, i16::MIN + 5, i16::MIN + 20];
        let out = filtered(&samples, 1000);
        assert_eq!(out[0], 32_757);
        assert_eq!(out[1], 32_767);
        assert_eq!(out[2], 32_773);
        assert_eq!(out[3], 32_788);
    }

    #[test]
    fn reset_zeroes_counter_and_forgets_reference() {
        let samples = [500, 505, 3000, 3010];
        let mut replay = Replay::new(&samples);
        let mut reader = EncoderReader::with_threshold(&mut replay, 1000);
        assert_eq!(reader.read(), 500);
        assert_eq!(reader.read(), 505);
        reader.reset();
        assert_eq!(reader.position(), 0);
        // A fresh reference accepts the jump that would otherwise be a glitch
        assert_eq!(reader.read(), 3000);
        assert_eq!(reader.read(), 3010);
        assert_eq!(reader.rejected(), 0);
        drop(reader);
        assert_eq!(replay.resets, 1);
    }

    #[test]
    fn default_threshold_catches_jumps_inside_the_travel() {
        let jump = DEFAULT_GLITCH_THRESHOLD as i16 + 500;
        let samples = [2383, 2390, 2390 + jump, 2396, 2402];
        let mut reader = EncoderReader::new(Replay::new(&samples));
        let out: Vec<i32> = samples.iter().map(|_| reader.read()).collect();
        assert_eq!(out, vec![2383, 2390, 2390, 2396, 2402]);
        assert_eq!(reader.rejected(), 1);
    }

    #[test]
    fn rejections_are_counted() {
        let samples = [0, 4000, 8, -4000, 9];
        let mut reader = EncoderReader::with_threshold(Replay::new(&samples), 1000);
        for _ in 0..samples.len() {
            reader.read();
        }
        assert_eq!(reader.rejected(), 2);
        assert_eq!(reader.position(), 9);
    }
}
