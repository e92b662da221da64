//! IR beam-break goal detection
//!
//! The photodiode sits across the goal opening. An intact beam reads near its baseline
//! voltage; a ball in the opening pulls it down. Samples go through a short median filter so a
//! single noisy conversion cannot end a game.

use moving_median::MovingMedian;

/// Median filter window
pub const BEAM_WINDOW: usize = 5;

/// Fraction of the intact baseline below which the beam counts as broken
pub const BASELINE_FRACTION: f32 = 0.7;

/// Beam state transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BeamEvent {
    Broken,
    Restored,
}

/// Median-filtered threshold detector
pub struct BeamDetector {
    filter: MovingMedian<f32, BEAM_WINDOW>,
    threshold_mv: f32,
    broken: bool,
}

impl BeamDetector {
    pub fn new(threshold_mv: f32) -> Self {
        Self {
            filter: MovingMedian::new(),
            threshold_mv,
            broken: false,
        }
    }

    /// Derives the threshold from the voltage measured with the beam intact
    pub fn from_baseline(baseline_mv: f32) -> Self {
        Self::new(baseline_mv * BASELINE_FRACTION)
    }

    pub fn threshold_mv(&self) -> f32 {
        self.threshold_mv
    }

    pub fn is_broken(&self) -> bool {
        self.broken
    }

    /// Feeds one sample in millivolts; returns an event only when the filtered state changes
    pub fn update(&mut self, sample_mv: f32) -> Option<BeamEvent> {
        self.filter.add_value(sample_mv);
        let broken = self.filter.median() < self.threshold_mv;
        if broken == self.broken {
            return None;
        }
        self.broken = broken;
        Some(if broken {
            BeamEvent::Broken
        } else {
            BeamEvent::Restored
        })
    }
}
