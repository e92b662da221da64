//! Position Controller
//!
//! Discrete PID acting on raw encoder counts. Setting `kd` to zero gives the PI variant.
//!
//! # Operation
//! Each update:
//! 1. `error = target - position`
//! 2. The raw error is added to the integral sum, which is then clamped to `±integral_max`
//! 3. `p = kp * error`, `i = T * ki * sum`, `d = (kd / T) * (error - last_error)`
//! 4. `p + i + d` is saturated to `[-100, 100]` and truncated toward zero
//!
//! The period `T` multiplies the integral when it is used, not when it is accumulated, so
//! `integral_max` is expressed in count-cycles.
//!
//! # Configuration
//! Gains are fixed for the lifetime of a controller. The nominal period must match the rate
//! at which [`PositionController::update`] is called; callers that measure their real period
//! use [`PositionController::update_with_period`] instead.

use crate::motor::clamp_command;
use crate::time::{secs_f32, Duration};

/// Proportional, integral and derivative gains
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Gains {
    pub kp: f32,
    pub ki: f32,
    pub kd: f32,
}

/// Controller tuning
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControllerConfig {
    pub gains: Gains,
    /// Bound on the absolute value of the integral sum
    pub integral_max: f32,
    /// Nominal control period
    pub period: Duration,
}

impl Default for ControllerConfig {
    /// Tuned for raw counts sampled every 10 ms
    fn default() -> Self {
        Self {
            gains: Gains {
                kp: 0.1,
                ki: 0.1,
                kd: 0.002,
            },
            integral_max: 20_000.0,
            period: Duration::millis(10),
        }
    }
}

/// PID position controller with integral clamping
#[derive(Debug, Clone)]
pub struct PositionController {
    config: ControllerConfig,
    target: i32,
    integral: f32,
    last_error: f32,
}

impl PositionController {
    pub fn new(config: ControllerConfig) -> Self {
        let integral_max = if config.integral_max.is_finite() {
            libm::fabsf(config.integral_max)
        } else {
            0.0
        };
        let config = ControllerConfig {
            integral_max,
            ..config
        };
        info!(
            "controller: kp={} ki={} kd={} integral_max={} period={}us",
            config.gains.kp,
            config.gains.ki,
            config.gains.kd,
            config.integral_max,
            config.period.to_micros()
        );
        Self {
            config,
            target: 0,
            integral: 0.0,
            last_error: 0.0,
        }
    }

    pub fn set_target(&mut self, target: i32) {
        self.target = target;
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    /// Clears the integral sum and the remembered error; gains and target are kept
    pub fn reset(&mut self) {
        self.integral = 0.0;
        self.last_error = 0.0;
    }

    pub fn integral(&self) -> f32 {
        self.integral
    }

    pub fn last_error(&self) -> f32 {
        self.last_error
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Runs one step at the nominal period
    pub fn update(&mut self, position: i32) -> i8 {
        self.step(position, secs_f32(self.config.period))
    }

    /// Runs one step using a measured period, falling back to the nominal one when it is zero
    pub fn update_with_period(&mut self, position: i32, elapsed: Duration) -> i8 {
        let period = if elapsed.ticks() == 0 {
            self.config.period
        } else {
            elapsed
        };
        self.step(position, secs_f32(period))
    }

    fn step(&mut self, position: i32, period: f32) -> i8 {
        let gains = self.config.gains;
        let error = (i64::from(self.target) - i64::from(position)) as f32;

        self.integral = (self.integral + error).clamp(-self.config.integral_max, self.config.integral_max);

        let p_term = gains.kp * error;
        let i_term = period * gains.ki * self.integral;
        let d_term = if period > 0.0 {
            (gains.kd / period) * (error - self.last_error)
        } else {
            0.0
        };

        self.last_error = error;
        clamp_command(p_term + i_term + d_term)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller(kp: f32, ki: f32, kd: f32, integral_max: f32) -> PositionController {
        PositionController::new(ControllerConfig {
            gains: Gains { kp, ki, kd },
            integral_max,
            period: Duration::millis(20),
        })
    }

    #[test]
    fn zero_error_gives_zero_output() {
        let mut pid = controller(8.0, 2.0, 1.5, 2000.0);
        pid.set_target(50);
        assert_eq!(pid.update(50), 0);
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.last_error(), 0.0);
    }

    #[test]
    fn proportional_only_output_is_truncated() {
        let mut pid = controller(0.25, 0.0, 0.0, 100.0);
        pid.set_target(130);
        // 0.25 * 130 = 32.5
        assert_eq!(pid.update(0), 32);
        pid.set_target(-130);
        assert_eq!(pid.update(0), -32);
    }

    #[test]
    fn output_is_saturated() {
        let mut pid = controller(8.0, 2.0, 1.5, 2000.0);
        pid.set_target(10_000);
        assert_eq!(pid.update(0), 100);
        pid.set_target(-10_000);
        assert_eq!(pid.update(10_000), -100);
        for position in [-30_000, -1, 0, 7, 25_000] {
            let out = pid.update(position);
            assert!((-100..=100).contains(&out));
        }
    }

    #[test]
    fn integral_is_raw_sum_scaled_on_use() {
        let mut pid = controller(0.0, 10.3, 0.0, 1000.0);
        pid.set_target(100);
        // sum = 100, i = 0.02 * 10.3 * 100 = 20.6
        assert_eq!(pid.update(0), 20);
        assert_eq!(pid.integral(), 100.0);
        // sum = 200, i = 41.2
        assert_eq!(pid.update(0), 41);
    }

    #[test]
    fn integral_never_exceeds_bound() {
        let mut pid = controller(1.0, 1.0, 0.0, 500.0);
        pid.set_target(1000);
        for _ in 0..50 {
            pid.update(0);
            assert!(pid.integral().abs() <= 500.0);
        }
        assert_eq!(pid.integral(), 500.0);

        pid.set_target(-1000);
        for _ in 0..50 {
            pid.update(0);
            assert!(pid.integral().abs() <= 500.0);
        }
        assert_eq!(pid.integral(), -500.0);
    }

    #[test]
    fn derivative_reacts_to_error_change() {
        let mut pid = controller(0.0, 0.0, 0.205, 0.0);
        pid.set_target(6);
        // (0.205 / 0.02) * (6 - 0) = 61.5
        assert_eq!(pid.update(0), 61);
        // error unchanged, no derivative
        assert_eq!(pid.update(0), 0);
        // error 6 -> 3: 10.25 * -3 = -30.75
        assert_eq!(pid.update(3), -30);
    }

    #[test]
    fn zero_kd_behaves_as_pi() {
        let mut pi = controller(0.5, 1.0, 0.0, 1000.0);
        pi.set_target(40);
        // p = 20, i = 0.02 * 40 = 0.8
        assert_eq!(pi.update(0), 20);
        assert_eq!(pi.update(20), 11);
    }

    #[test]
    fn measured_period_replaces_nominal() {
        let mut pid = controller(0.0, 10.3, 0.0, 1000.0);
        pid.set_target(100);
        // 0.04 * 10.3 * 100 = 41.2
        assert_eq!(pid.update_with_period(0, Duration::millis(40)), 41);

        let mut pid = controller(0.0, 10.3, 0.0, 1000.0);
        pid.set_target(100);
        assert_eq!(pid.update_with_period(0, Duration::micros(0)), 20);
    }

    #[test]
    fn reset_clears_history_but_keeps_target() {
        let mut pid = controller(1.0, 1.0, 1.0, 100.0);
        pid.set_target(30);
        pid.update(0);
        pid.reset();
        assert_eq!(pid.integral(), 0.0);
        assert_eq!(pid.last_error(), 0.0);
        assert_eq!(pid.target(), 30);
    }

    #[test]
    fn negative_bound_is_normalized() {
        let pid = controller(1.0, 1.0, 0.0, -50.0);
        assert_eq!(pid.config().integral_max, 50.0);
    }
}
