//! Paddle Motor Driver
//!
//! Drives the paddle's DC gear motor through channel A of a TB6612FNG. The driver is owned by
//! the paddle task and commanded synchronously with signed percentages.
//!
//! # Hardware Configuration
//! - PWM: slice 6, output A, 10 kHz
//! - Direction: two GPIOs (forward/backward)
//! - Standby: held high while the node runs
//!
//! A zero command lets the motor coast. Positive commands drive the forward pin; which way
//! that moves the paddle is found during calibration, not assumed here.

use defmt::{Format, info, warn};
use embassy_rp::gpio::{Level, Output};
use embassy_rp::pwm::{self, Pwm};
use paddle_control::MotorDrive;
use tb6612fng::{DriveCommand, Motor};

use crate::system::config::MOTOR_PWM_FREQ_HZ;
use crate::system::resources::MotorResources;

/// The driver rejected its pin configuration
#[derive(Debug, Clone, Copy, Format)]
pub struct MotorInitError;

/// Single TB6612FNG channel plus its standby line
pub struct PaddleMotor {
    motor: Motor<Output<'static>, Output<'static>, Pwm<'static>>,
    _standby: Output<'static>,
    last_command: i8,
}

impl PaddleMotor {
    /// Configures PWM and direction pins and takes the driver out of standby
    pub fn new(r: MotorResources) -> Result<Self, MotorInitError> {
        let clock_freq_hz = embassy_rp::clocks::clk_sys_freq();

        // Smallest divider that keeps the period within the 16-bit counter
        let divider = ((clock_freq_hz / MOTOR_PWM_FREQ_HZ) / 65535 + 1) as u8;
        let period = (clock_freq_hz / (MOTOR_PWM_FREQ_HZ * divider as u32)) as u16 - 1;

        let mut pwm_config = pwm::Config::default();
        pwm_config.divider = divider.into();
        pwm_config.top = period;

        let forward = Output::new(r.forward_pin, Level::Low);
        let backward = Output::new(r.backward_pin, Level::Low);
        let pwm = Pwm::new_output_a(r.pwm_slice, r.pwm_pin, pwm_config);
        let motor = Motor::new(forward, backward, pwm).map_err(|_| MotorInitError)?;

        let standby = Output::new(r.standby_pin, Level::High);
        info!("Paddle motor ready, PWM {} Hz (divider {}, top {})", MOTOR_PWM_FREQ_HZ, divider, period);

        Ok(Self {
            motor,
            _standby: standby,
            last_command: 0,
        })
    }
}

impl MotorDrive for PaddleMotor {
    fn set_signed_speed(&mut self, percent: i8) {
        let percent = percent.clamp(-100, 100);
        if percent == self.last_command {
            return;
        }

        let command = match percent {
            0 => DriveCommand::Stop,
            p if p > 0 => DriveCommand::Forward(p.unsigned_abs()),
            p => DriveCommand::Backward(p.unsigned_abs()),
        };

        match self.motor.drive(command) {
            Ok(()) => self.last_command = percent,
            Err(_) => warn!("Paddle motor rejected command {}", percent),
        }
    }
}
