//! Shooter servo mapping
//!
//! Standard hobby servo on a 20 ms frame. The joystick's Y axis points the shooter; the axis is
//! inverted so pushing the stick up raises the barrel.

/// Servo frame period in microseconds
pub const PERIOD_US: u32 = 20_000;
/// Pulse width at 0 %
pub const MIN_PULSE_US: u16 = 900;
/// Pulse width at 100 %
pub const MAX_PULSE_US: u16 = 2100;

/// Pulse width for a 0-100 % position, saturating above 100
pub fn pulse_width_us(percent: u8) -> u16 {
    let percent = u32::from(percent.min(100));
    let span = u32::from(MAX_PULSE_US - MIN_PULSE_US);
    MIN_PULSE_US + (span * percent / 100) as u16
}

/// Servo position for a joystick Y reading
pub fn position_from_joystick(y: u8) -> u8 {
    100 - y.min(100)
}
