//! Calibration Sequencer
//!
//! Discovers the paddle's mechanical travel at the start of every game and returns the
//! paddle to the middle of it before closed-loop control takes over.
//!
//! # Operation
//! The sequencer is tick driven: the caller invokes [`Calibrator::tick`] at a steady rate
//! (1 ms on the paddle node) with the current time and whether the joystick button was just
//! pressed. Phases that need no waiting run back to back within a single tick.
//!
//! | Phase | Action | Leaves when |
//! |---|---|---|
//! | `WaitForManualCenter` | motor stopped, operator centers the paddle by hand | button pressed |
//! | `ResetReference` | zero the encoder at the hand-centered position | immediately |
//! | `DriveLeft` | open-loop negative drive, record the reached position | drive time elapsed |
//! | `SettleLeft` | motor stopped | settle time elapsed |
//! | `DriveRight` | open-loop positive drive, record the reached position | drive time elapsed |
//! | `SettleRight` | motor stopped | settle time elapsed |
//! | `ResolveDirection` | order the extremes, detect motor polarity | immediately |
//! | `ApplyMargin` | pull both extremes inward by the safety margin | immediately |
//! | `ReturnToCenter` | proportional drive toward the center | within tolerance or timeout |
//! | `Done` | motor stopped, range available | terminal |
//!
//! A return-to-center timeout is logged and the sequence still completes; the closed loop
//! corrects whatever offset is left.

use crate::encoder::{EncoderReader, PositionCounter};
use crate::motor::{clamp_to, MotorDrive, Polarity, MAX_COMMAND};
use crate::time::{Duration, Instant};

/// Calibration tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationConfig {
    /// Open-loop drive magnitude in percent
    pub drive_speed: i8,
    /// How long each open-loop drive lasts
    pub drive_duration: Duration,
    /// Pause after each drive
    pub settle_duration: Duration,
    /// Counts removed from each end of the discovered travel
    pub edge_margin: i32,
    /// Distance from center considered close enough, in counts
    pub center_tolerance: i32,
    /// Counts of error per percent of drive while returning to center
    pub center_divisor: i32,
    /// Drive limit while returning to center, in percent
    pub center_speed_limit: i8,
    /// Upper bound on the return-to-center phase
    pub center_timeout: Duration,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            drive_speed: 30,
            drive_duration: Duration::millis(5_000),
            settle_duration: Duration::millis(500),
            edge_margin: 200,
            center_tolerance: 50,
            center_divisor: 15,
            center_speed_limit: 40,
            center_timeout: Duration::millis(5_000),
        }
    }
}

/// Usable paddle travel in raw encoder counts
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CalibrationRange {
    pub min_raw: i32,
    pub max_raw: i32,
    pub center_raw: i32,
    /// Counts per percent of travel
    pub scale_factor: f32,
    pub polarity: Polarity,
}

/// Orders two drive extremes and derives the motor polarity from them
///
/// `left_raw` is the position reached with a negative command, `right_raw` with a positive
/// one. Returns `(lower, upper, polarity)`.
pub fn resolve_direction(left_raw: i32, right_raw: i32) -> (i32, i32, Polarity) {
    if left_raw <= right_raw {
        (left_raw, right_raw, Polarity::Direct)
    } else {
        (right_raw, left_raw, Polarity::Inverted)
    }
}

impl CalibrationRange {
    /// Builds a range from the positions reached by the two open-loop drives
    pub fn from_extremes(left_raw: i32, right_raw: i32, margin: i32) -> Self {
        let (lower, upper, polarity) = resolve_direction(left_raw, right_raw);
        Self::with_margin(lower, upper, polarity, margin)
    }

    /// Shrinks `[lower, upper]` by `margin` on each side
    ///
    /// The margin is limited to a quarter of the travel so the range never inverts. A center
    /// strictly inside the range needs at least 2 counts of travel; below that it sits on
    /// `min_raw`.
    pub fn with_margin(lower: i32, upper: i32, polarity: Polarity, margin: i32) -> Self {
        let (lower, upper) = if lower <= upper { (lower, upper) } else { (upper, lower) };
        let travel = upper.saturating_sub(lower);
        let margin = margin.clamp(0, travel / 4);
        let min_raw = lower + margin;
        let max_raw = upper - margin;
        Self {
            min_raw,
            max_raw,
            center_raw: min_raw + (max_raw - min_raw) / 2,
            scale_factor: (max_raw - min_raw) as f32 / 100.0,
            polarity,
        }
    }

    /// Usable travel in counts
    pub fn travel(&self) -> i32 {
        self.max_raw - self.min_raw
    }

    /// Maps a logical 0-100 position to an absolute raw target
    pub fn target_for_percent(&self, percent: u8) -> i32 {
        let percent = percent.min(100);
        self.min_raw + (f32::from(percent) * self.scale_factor) as i32
    }

    /// Maps a raw position to the logical 0-100 range, saturating outside the travel
    pub fn percent_of(&self, raw: i32) -> u8 {
        if self.travel() == 0 {
            return 50;
        }
        let percent = (raw - self.min_raw) as f32 / self.scale_factor;
        percent.clamp(0.0, 100.0) as u8
    }

    pub fn is_at_lower_edge(&self, raw: i32) -> bool {
        raw <= self.min_raw
    }

    pub fn is_at_upper_edge(&self, raw: i32) -> bool {
        raw >= self.max_raw
    }
}

/// Phases of the calibration sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationPhase {
    WaitForManualCenter,
    ResetReference,
    DriveLeft,
    SettleLeft,
    DriveRight,
    SettleRight,
    ResolveDirection,
    ApplyMargin,
    ReturnToCenter,
    Done,
}

/// Result of a calibration tick
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CalibrationStatus {
    InProgress,
    Done(CalibrationRange),
}

/// Tick-driven calibration state machine
pub struct Calibrator {
    config: CalibrationConfig,
    phase: CalibrationPhase,
    entered: bool,
    deadline: Instant,
    left_raw: i32,
    right_raw: i32,
    resolved: (i32, i32, Polarity),
    range: Option<CalibrationRange>,
    centered: bool,
}

impl Calibrator {
    pub fn new(config: CalibrationConfig) -> Self {
        Self {
            config,
            phase: CalibrationPhase::WaitForManualCenter,
            entered: false,
            deadline: Instant::from_ticks(0),
            left_raw: 0,
            right_raw: 0,
            resolved: (0, 0, Polarity::Direct),
            range: None,
            centered: false,
        }
    }

    pub fn phase(&self) -> CalibrationPhase {
        self.phase
    }

    /// Range computed so far; available from `ReturnToCenter` on
    pub fn range(&self) -> Option<CalibrationRange> {
        self.range
    }

    pub fn is_done(&self) -> bool {
        self.phase == CalibrationPhase::Done
    }

    /// Whether the return-to-center phase ended inside the tolerance band
    pub fn reached_center(&self) -> bool {
        self.centered
    }

    /// Stops the motor and starts over from `WaitForManualCenter`
    pub fn abort<M: MotorDrive>(&mut self, motor: &mut M) {
        motor.set_signed_speed(0);
        if self.phase != CalibrationPhase::WaitForManualCenter {
            warn!("calibration aborted in {}", self.phase);
        }
        *self = Self::new(self.config);
    }

    /// Advances the sequence
    ///
    /// `button_pressed` must be a rising edge, not the held button state.
    pub fn tick<C, M>(
        &mut self,
        now: Instant,
        button_pressed: bool,
        encoder: &mut EncoderReader<C>,
        motor: &mut M,
    ) -> CalibrationStatus
    where
        C: PositionCounter,
        M: MotorDrive,
    {
        loop {
            if !self.entered {
                self.enter(now, encoder, motor);
                self.entered = true;
            }

            let next = match self.phase {
                CalibrationPhase::WaitForManualCenter => {
                    if !button_pressed {
                        return CalibrationStatus::InProgress;
                    }
                    CalibrationPhase::ResetReference
                }
                CalibrationPhase::ResetReference => CalibrationPhase::DriveLeft,
                CalibrationPhase::DriveLeft => {
                    let position = encoder.read();
                    if now < self.deadline {
                        return CalibrationStatus::InProgress;
                    }
                    self.left_raw = position;
                    info!("calibration: left extreme at {}", position);
                    CalibrationPhase::SettleLeft
                }
                CalibrationPhase::SettleLeft => {
                    encoder.read();
                    if now < self.deadline {
                        return CalibrationStatus::InProgress;
                    }
                    CalibrationPhase::DriveRight
                }
                CalibrationPhase::DriveRight => {
                    let position = encoder.read();
                    if now < self.deadline {
                        return CalibrationStatus::InProgress;
                    }
                    self.right_raw = position;
                    info!("calibration: right extreme at {}", position);
                    CalibrationPhase::SettleRight
                }
                CalibrationPhase::SettleRight => {
                    encoder.read();
                    if now < self.deadline {
                        return CalibrationStatus::InProgress;
                    }
                    CalibrationPhase::ResolveDirection
                }
                CalibrationPhase::ResolveDirection => CalibrationPhase::ApplyMargin,
                CalibrationPhase::ApplyMargin => CalibrationPhase::ReturnToCenter,
                CalibrationPhase::ReturnToCenter => {
                    let Some(range) = self.range else {
                        // ApplyMargin always stores a range before this phase
                        return CalibrationStatus::InProgress;
                    };
                    let position = encoder.read();
                    let error = range.center_raw - position;
                    if error.abs() < self.config.center_tolerance {
                        self.centered = true;
                        info!("calibration: centered at {} (target {})", position, range.center_raw);
                        CalibrationPhase::Done
                    } else if now >= self.deadline {
                        warn!(
                            "calibration: center not reached in time, at {} (target {})",
                            position, range.center_raw
                        );
                        CalibrationPhase::Done
                    } else {
                        let divisor = self.config.center_divisor.max(1);
                        let command = clamp_to((error / divisor) as f32, self.config.center_speed_limit);
                        motor.set_signed_speed(range.polarity.apply(command));
                        return CalibrationStatus::InProgress;
                    }
                }
                CalibrationPhase::Done => {
                    return match self.range {
                        Some(range) => CalibrationStatus::Done(range),
                        None => CalibrationStatus::InProgress,
                    };
                }
            };

            debug!("calibration: {} -> {}", self.phase, next);
            self.phase = next;
            self.entered = false;
        }
    }

    /// Entry actions of the current phase
    fn enter<C, M>(&mut self, now: Instant, encoder: &mut EncoderReader<C>, motor: &mut M)
    where
        C: PositionCounter,
        M: MotorDrive,
    {
        let drive = self.config.drive_speed.clamp(0, MAX_COMMAND);
        match self.phase {
            CalibrationPhase::WaitForManualCenter => {
                motor.set_signed_speed(0);
                info!("calibration: center the paddle by hand and press the button");
            }
            CalibrationPhase::ResetReference => {
                encoder.reset();
                encoder.read();
            }
            CalibrationPhase::DriveLeft => {
                self.deadline = now + self.config.drive_duration;
                motor.set_signed_speed(-drive);
            }
            CalibrationPhase::DriveRight => {
                self.deadline = now + self.config.drive_duration;
                motor.set_signed_speed(drive);
            }
            CalibrationPhase::SettleLeft | CalibrationPhase::SettleRight => {
                self.deadline = now + self.config.settle_duration;
                motor.set_signed_speed(0);
            }
            CalibrationPhase::ResolveDirection => {
                self.resolved = resolve_direction(self.left_raw, self.right_raw);
                let (lower, upper, polarity) = self.resolved;
                if lower == upper {
                    warn!("calibration: paddle did not move, travel is zero");
                }
                info!("calibration: travel {}..{}, polarity {}", lower, upper, polarity);
            }
            CalibrationPhase::ApplyMargin => {
                let (lower, upper, polarity) = self.resolved;
                let range = CalibrationRange::with_margin(lower, upper, polarity, self.config.edge_margin);
                info!(
                    "calibration: usable range {}..{}, center {}, {} counts/%",
                    range.min_raw, range.max_raw, range.center_raw, range.scale_factor
                );
                self.range = Some(range);
            }
            CalibrationPhase::ReturnToCenter => {
                self.deadline = now + self.config.center_timeout;
            }
            CalibrationPhase::Done => {
                motor.set_signed_speed(0);
                info!("calibration: done");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Paddle that never moves; records the last motor command
    struct Bench {
        raw: i16,
        last_command: i8,
        commands: usize,
        resets: usize,
    }

    struct BenchCounter<'a>(&'a core::cell::RefCell<Bench>);
    struct BenchMotor<'a>(&'a core::cell::RefCell<Bench>);

    impl PositionCounter for BenchCounter<'_> {
        fn read_raw(&mut self) -> i16 {
            self.0.borrow().raw
        }
        fn reset(&mut self) {
            let mut bench = self.0.borrow_mut();
            bench.raw = 0;
            bench.resets += 1;
        }
    }

    impl MotorDrive for BenchMotor<'_> {
        fn set_signed_speed(&mut self, percent: i8) {
            let mut bench = self.0.borrow_mut();
            bench.last_command = percent;
            bench.commands += 1;
        }
    }

    fn bench() -> core::cell::RefCell<Bench> {
        core::cell::RefCell::new(Bench {
            raw: 123,
            last_command: 0,
            commands: 0,
            resets: 0,
        })
    }

    fn at(ms: u64) -> Instant {
        Instant::from_ticks(ms * 1_000)
    }

    #[test]
    fn inverted_extremes_are_swapped() {
        let range = CalibrationRange::from_extremes(4000, -3500, 200);
        assert_eq!(range.min_raw, -3300);
        assert_eq!(range.max_raw, 3800);
        assert_eq!(range.center_raw, 250);
        assert_eq!(range.polarity, Polarity::Inverted);
        assert!((range.scale_factor - 71.0).abs() < 1e-3);
    }

    #[test]
    fn direct_extremes_keep_order() {
        let range = CalibrationRange::from_extremes(-3500, 4000, 200);
        assert_eq!(range.min_raw, -3300);
        assert_eq!(range.max_raw, 3800);
        assert_eq!(range.polarity, Polarity::Direct);
        assert!(range.min_raw < range.center_raw && range.center_raw < range.max_raw);
    }

    #[test]
    fn margin_is_limited_for_short_travel() {
        let range = CalibrationRange::from_extremes(0, 100, 200);
        assert_eq!(range.min_raw, 25);
        assert_eq!(range.max_raw, 75);
        assert!(range.min_raw < range.center_raw && range.center_raw < range.max_raw);
    }

    #[test]
    fn center_is_strictly_inside_from_two_counts_of_travel() {
        let range = CalibrationRange::with_margin(10, 11, Polarity::Direct, 200);
        assert_eq!((range.min_raw, range.center_raw, range.max_raw), (10, 10, 11));

        let range = CalibrationRange::with_margin(10, 12, Polarity::Direct, 200);
        assert_eq!((range.min_raw, range.center_raw, range.max_raw), (10, 11, 12));
    }

    #[test]
    fn percent_maps_onto_travel() {
        let range = CalibrationRange::from_extremes(-1200, 1200, 200);
        assert_eq!(range.target_for_percent(0), -1000);
        assert_eq!(range.target_for_percent(50), 0);
        assert_eq!(range.target_for_percent(100), 1000);
        assert_eq!(range.target_for_percent(250), 1000);
        assert_eq!(range.percent_of(-1000), 0);
        assert_eq!(range.percent_of(500), 75);
        assert_eq!(range.percent_of(5000), 100);
        assert_eq!(range.percent_of(-5000), 0);
        assert!(range.is_at_lower_edge(-1000));
        assert!(!range.is_at_lower_edge(-999));
        assert!(range.is_at_upper_edge(1000));
    }

    #[test]
    fn waits_for_button_before_moving() {
        let cell = bench();
        let mut encoder = EncoderReader::new(BenchCounter(&cell));
        let mut motor = BenchMotor(&cell);
        let mut calibrator = Calibrator::new(CalibrationConfig::default());

        for ms in 0..100 {
            assert_eq!(
                calibrator.tick(at(ms), false, &mut encoder, &mut motor),
                CalibrationStatus::InProgress
            );
        }
        assert_eq!(calibrator.phase(), CalibrationPhase::WaitForManualCenter);
        assert_eq!(cell.borrow().last_command, 0);
        assert_eq!(cell.borrow().resets, 0);

        calibrator.tick(at(100), true, &mut encoder, &mut motor);
        assert_eq!(calibrator.phase(), CalibrationPhase::DriveLeft);
        assert_eq!(cell.borrow().resets, 1);
        assert_eq!(cell.borrow().last_command, -30);
    }

    #[test]
    fn timed_phases_follow_configuration() {
        let cell = bench();
        let mut encoder = EncoderReader::new(BenchCounter(&cell));
        let mut motor = BenchMotor(&cell);
        let mut calibrator = Calibrator::new(CalibrationConfig::default());

        calibrator.tick(at(0), true, &mut encoder, &mut motor);
        calibrator.tick(at(4_999), false, &mut encoder, &mut motor);
        assert_eq!(calibrator.phase(), CalibrationPhase::DriveLeft);
        calibrator.tick(at(5_000), false, &mut encoder, &mut motor);
        assert_eq!(calibrator.phase(), CalibrationPhase::SettleLeft);
        assert_eq!(cell.borrow().last_command, 0);
        calibrator.tick(at(5_500), false, &mut encoder, &mut motor);
        assert_eq!(calibrator.phase(), CalibrationPhase::DriveRight);
        assert_eq!(cell.borrow().last_command, 30);
        calibrator.tick(at(10_500), false, &mut encoder, &mut motor);
        assert_eq!(calibrator.phase(), CalibrationPhase::SettleRight);
    }

    #[test]
    fn stuck_paddle_times_out_and_still_completes() {
        let cell = bench();
        let mut encoder = EncoderReader::new(BenchCounter(&cell));
        let mut motor = BenchMotor(&cell);
        let config = CalibrationConfig {
            drive_duration: Duration::millis(10),
            settle_duration: Duration::millis(5),
            center_timeout: Duration::millis(20),
            ..CalibrationConfig::default()
        };
        let mut calibrator = Calibrator::new(config);

        calibrator.tick(at(0), true, &mut encoder, &mut motor);
        let mut status = CalibrationStatus::InProgress;
        let mut return_commands = Vec::new();
        for ms in 1..200 {
            // the paddle jumps between the stops and then jams at the right one
            cell.borrow_mut().raw = match calibrator.phase() {
                CalibrationPhase::DriveLeft | CalibrationPhase::SettleLeft => -1000,
                _ => 1000,
            };
            status = calibrator.tick(at(ms), false, &mut encoder, &mut motor);
            if calibrator.phase() == CalibrationPhase::ReturnToCenter {
                return_commands.push(cell.borrow().last_command);
            }
            if status != CalibrationStatus::InProgress {
                break;
            }
        }

        let CalibrationStatus::Done(range) = status else {
            panic!("calibration did not finish");
        };
        assert_eq!(range.min_raw, -800);
        assert_eq!(range.max_raw, 800);
        assert_eq!(range.polarity, Polarity::Direct);
        assert!(!calibrator.reached_center());
        // drive toward center is capped at the configured limit
        assert!(!return_commands.is_empty());
        assert!(return_commands.iter().all(|&c| c == -40));
        assert_eq!(cell.borrow().last_command, 0);
    }

    #[test]
    fn abort_stops_motor_and_restarts() {
        let cell = bench();
        let mut encoder = EncoderReader::new(BenchCounter(&cell));
        let mut motor = BenchMotor(&cell);
        let mut calibrator = Calibrator::new(CalibrationConfig::default());

        calibrator.tick(at(0), true, &mut encoder, &mut motor);
        assert_eq!(cell.borrow().last_command, -30);

        calibrator.abort(&mut motor);
        assert_eq!(cell.borrow().last_command, 0);
        assert_eq!(calibrator.phase(), CalibrationPhase::WaitForManualCenter);
        assert!(calibrator.range().is_none());
    }
}
