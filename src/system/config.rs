//! Paddle node tuning
//!
//! Timing and hardware constants of the node. Controller gains and the encoder glitch
//! threshold are the library defaults; pin assignments live in [`crate::system::resources`].

use embassy_time::Duration;

/// Closed-loop control period
pub const CONTROL_PERIOD: Duration = Duration::from_millis(10);

/// Calibration state machine tick
pub const CALIBRATION_TICK: Duration = Duration::from_millis(1);

/// TB6612FNG PWM frequency
pub const MOTOR_PWM_FREQ_HZ: u32 = 10_000;

/// Link baud rate to the CAN gateway
pub const LINK_BAUD_RATE: u32 = 115_200;

/// Photodiode sampling interval
pub const IR_SAMPLE_INTERVAL: Duration = Duration::from_millis(10);

/// Samples averaged for the intact-beam baseline at start-up
pub const IR_BASELINE_SAMPLES: u16 = 100;

/// ADC reference voltage in millivolts
pub const ADC_REF_MV: f32 = 3300.0;

/// ADC full scale (12-bit)
pub const ADC_RANGE: f32 = 4096.0;

/// Solenoid on-time per shot
pub const SOLENOID_PULSE: Duration = Duration::from_millis(50);

/// Minimum time between two shots
pub const SOLENOID_COOLDOWN: Duration = Duration::from_millis(200);
