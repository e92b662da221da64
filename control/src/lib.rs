//! Paddle position control core
//!
//! Everything the paddle node needs to turn a joystick percentage into a motor command,
//! without touching hardware. The firmware supplies the encoder counter and the motor
//! through [`encoder::PositionCounter`] and [`motor::MotorDrive`], and a monotonic clock
//! through [`time::Instant`].
//!
//! # Modules
//! - [`encoder`]: glitch-filtered reading of the 16-bit quadrature counter
//! - [`controller`]: discrete PID with integral clamping
//! - [`calibration`]: travel discovery and return to center
//! - [`control_loop`]: per-cycle target mapping, edge veto and motor output
//! - [`command`] and [`link`]: messages from the joystick node and their serial framing
//! - [`beam`] and [`servo`]: goal detection and shooter angle helpers

#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod beam;
pub mod calibration;
pub mod command;
pub mod control_loop;
pub mod controller;
pub mod encoder;
pub mod link;
pub mod motor;
pub mod servo;
pub mod time;

pub use calibration::{CalibrationConfig, CalibrationRange, CalibrationStatus, Calibrator};
pub use command::{ButtonEdge, JoystickCommand, Message};
pub use control_loop::{ControlLoop, CycleReport, LoopConfig};
pub use controller::{ControllerConfig, Gains, PositionController};
pub use encoder::{EncoderReader, PositionCounter};
pub use motor::{MotorDrive, Polarity};
