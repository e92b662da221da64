//! Motor actuation seam
//!
//! Commands are signed percentages in `[-100, 100]`. Zero stops the motor, the sign picks the
//! direction and the magnitude the duty cycle.

/// Largest magnitude a motor command may carry
pub const MAX_COMMAND: i8 = 100;

/// Something that can drive the paddle motor with a signed percentage
pub trait MotorDrive {
    /// Applies a signed speed in percent. Values outside `[-100, 100]` are saturated by the caller.
    fn set_signed_speed(&mut self, percent: i8);
}

impl<M: MotorDrive + ?Sized> MotorDrive for &mut M {
    fn set_signed_speed(&mut self, percent: i8) {
        (**self).set_signed_speed(percent);
    }
}

/// Saturates a computed output to `[-100, 100]` and truncates it toward zero
pub fn clamp_command(value: f32) -> i8 {
    clamp_to(value, MAX_COMMAND)
}

/// Saturates a computed output to `[-limit, limit]` and truncates it toward zero
pub fn clamp_to(value: f32, limit: i8) -> i8 {
    let limit = f32::from(limit.unsigned_abs().min(MAX_COMMAND as u8));
    if value.is_nan() {
        return 0;
    }
    value.clamp(-limit, limit) as i8
}

/// Relation between motor command sign and encoder count direction
///
/// Discovered during calibration instead of being baked into the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Polarity {
    /// A positive command increases the raw encoder count
    Direct,
    /// A positive command decreases the raw encoder count
    Inverted,
}

impl Polarity {
    /// Maps a command expressed in encoder-count sense to the motor's own sense
    pub fn apply(self, command: i8) -> i8 {
        let command = command.clamp(-MAX_COMMAND, MAX_COMMAND);
        match self {
            Polarity::Direct => command,
            Polarity::Inverted => -command,
        }
    }
}
