//! Control Loop Driver
//!
//! One [`ControlLoop::cycle`] per control period, after calibration:
//! 1. Read the filtered encoder position
//! 2. Flag the lower and upper edges of the calibrated travel
//! 3. On a new joystick command, move the target toward the requested percentage
//! 4. Run the position controller and limit its output
//! 5. Veto any command that would push further into an edge
//! 6. Map the command through the calibrated polarity and hand it to the motor
//!
//! The motor is held at zero until the first joystick command of the session arrives.

use crate::calibration::CalibrationRange;
use crate::command::JoystickCommand;
use crate::controller::PositionController;
use crate::encoder::{EncoderReader, PositionCounter};
use crate::motor::{clamp_to, MotorDrive};
use crate::time::Duration;

/// Play-time limits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LoopConfig {
    /// Largest drive magnitude during play, in percent
    pub max_drive: i8,
    /// Largest target change per joystick command, in percentage points; 0 disables the limit
    pub target_slew: u8,
    /// Cycles between status log lines; 0 disables them
    pub status_every: u32,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_drive: 50,
            target_slew: 10,
            status_every: 100,
        }
    }
}

/// What happened during one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CycleReport {
    pub position: i32,
    pub target: i32,
    /// Controller output after limiting, in encoder-count sense
    pub proposed: i8,
    /// Command after the edge veto, in encoder-count sense
    pub command: i8,
    pub at_lower_edge: bool,
    pub at_upper_edge: bool,
}

impl CycleReport {
    pub fn vetoed(&self) -> bool {
        self.command != self.proposed
    }
}

/// Forces a command to zero when it would drive further into an edge
pub fn edge_veto(command: i8, at_lower_edge: bool, at_upper_edge: bool) -> i8 {
    if (at_lower_edge && command < 0) || (at_upper_edge && command > 0) {
        0
    } else {
        command
    }
}

/// Moves `current` toward `requested` by at most `step`
fn slew(current: u8, requested: u8, step: u8) -> u8 {
    if step == 0 {
        return requested;
    }
    if requested > current {
        current.saturating_add(step).min(requested)
    } else {
        current.saturating_sub(step).max(requested)
    }
}

/// Closed-loop paddle control for one game session
pub struct ControlLoop {
    range: CalibrationRange,
    controller: PositionController,
    config: LoopConfig,
    target_percent: u8,
    engaged: bool,
    vetoing: bool,
    cycles: u32,
}

impl ControlLoop {
    /// Starts a session on a fresh range; the controller history is cleared and the target
    /// parked at the center
    pub fn new(range: CalibrationRange, mut controller: PositionController, config: LoopConfig) -> Self {
        controller.reset();
        controller.set_target(range.center_raw);
        Self {
            range,
            controller,
            config,
            target_percent: 50,
            engaged: false,
            vetoing: false,
            cycles: 0,
        }
    }

    pub fn range(&self) -> &CalibrationRange {
        &self.range
    }

    pub fn controller(&self) -> &PositionController {
        &self.controller
    }

    /// Logical target in percent of the travel
    pub fn target_percent(&self) -> u8 {
        self.target_percent
    }

    /// Whether a joystick command has been received this session
    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    /// Runs one control cycle
    ///
    /// `command` is the joystick state received since the previous cycle, if any, and
    /// `elapsed` the measured time since the previous cycle.
    pub fn cycle<C, M>(
        &mut self,
        encoder: &mut EncoderReader<C>,
        command: Option<&JoystickCommand>,
        elapsed: Duration,
        motor: &mut M,
    ) -> CycleReport
    where
        C: PositionCounter,
        M: MotorDrive,
    {
        let position = encoder.read();
        let at_lower_edge = self.range.is_at_lower_edge(position);
        let at_upper_edge = self.range.is_at_upper_edge(position);

        if let Some(joystick) = command {
            self.target_percent = slew(self.target_percent, joystick.x.min(100), self.config.target_slew);
            self.controller.set_target(self.range.target_for_percent(self.target_percent));
            if !self.engaged {
                info!("control loop engaged, target {}%", self.target_percent);
                self.engaged = true;
            }
        }

        let proposed = if self.engaged {
            let output = self.controller.update_with_period(position, elapsed);
            clamp_to(f32::from(output), self.config.max_drive)
        } else {
            0
        };

        let vetoed = edge_veto(proposed, at_lower_edge, at_upper_edge);
        if (vetoed != proposed) != self.vetoing {
            self.vetoing = vetoed != proposed;
            if self.vetoing {
                debug!(
                    "edge veto: position {} command {} (lower {} upper {})",
                    position, proposed, at_lower_edge, at_upper_edge
                );
            }
        }

        motor.set_signed_speed(self.range.polarity.apply(vetoed));

        self.cycles = self.cycles.wrapping_add(1);
        if self.config.status_every > 0 && self.cycles % self.config.status_every == 0 {
            debug!(
                "control: pos {} ({}%) target {} ({}%) cmd {} integral {}",
                position,
                self.range.percent_of(position),
                self.controller.target(),
                self.target_percent,
                vetoed,
                self.controller.integral()
            );
        }

        CycleReport {
            position,
            target: self.controller.target(),
            proposed,
            command: vetoed,
            at_lower_edge,
            at_upper_edge,
        }
    }

    /// Issues the zero command that must precede leaving the loop
    pub fn stop<M: MotorDrive>(&mut self, motor: &mut M) {
        motor.set_signed_speed(0);
        info!("control loop stopped after {} cycles", self.cycles);
    }
}
