//! Paddle Session Task
//!
//! Owns the paddle motor and the encoder reader and runs one game session after another.
//!
//! # Operation
//! Every session:
//! 1. Calibration, ticked every 1 ms. It idles until the operator has centered the paddle by
//!    hand and pressed the joystick button, then finds the travel and returns to center
//! 2. Closed-loop play every 10 ms: the paddle follows the joystick X axis, a button press
//!    fires the solenoid
//! 3. On an end request the motor is stopped before the task starts over
//!
//! An end request during calibration aborts it with the motor stopped.

use defmt::{error, info};
use embassy_time::{Instant, Ticker};
use paddle_control::calibration::CalibrationPhase;
use paddle_control::time;
use paddle_control::{
    ButtonEdge, CalibrationConfig, CalibrationRange, CalibrationStatus, Calibrator, ControlLoop, ControllerConfig,
    EncoderReader, LoopConfig, PositionController,
};

use crate::system::config::{CALIBRATION_TICK, CONTROL_PERIOD};
use crate::system::event::{self, Events};
use crate::system::resources::MotorResources;
use crate::system::session;
use crate::task::encoder::QuadratureCounter;
use crate::task::motor_driver::PaddleMotor;
use crate::task::solenoid;

type Encoder = EncoderReader<QuadratureCounter>;

/// Current time on the control library's clock
fn now() -> time::Instant {
    time::Instant::from_ticks(Instant::now().as_micros())
}

#[embassy_executor::task]
pub async fn paddle(r: MotorResources) {
    let mut motor = match PaddleMotor::new(r) {
        Ok(motor) => motor,
        Err(e) => {
            error!("Paddle motor unavailable: {}", e);
            return;
        }
    };
    let mut encoder = EncoderReader::new(QuadratureCounter);
    let mut button = ButtonEdge::new();

    loop {
        session::clear_end_request();

        let Some(range) = calibrate(&mut encoder, &mut motor, &mut button).await else {
            event::send(Events::SessionEnded).await;
            continue;
        };

        event::send(Events::PlayStarted).await;
        play(range, &mut encoder, &mut motor, &mut button).await;
        event::send(Events::SessionEnded).await;
    }
}

/// Runs the calibration sequence; `None` when it was aborted
async fn calibrate(
    encoder: &mut Encoder,
    motor: &mut PaddleMotor,
    button: &mut ButtonEdge,
) -> Option<CalibrationRange> {
    let mut calibrator = Calibrator::new(CalibrationConfig::default());
    let mut ticker = Ticker::every(CALIBRATION_TICK);
    let mut announced = false;

    loop {
        if session::take_end_request() {
            calibrator.abort(motor);
            return None;
        }

        let pressed = session::take_joystick()
            .map(|joystick| button.update(joystick.button))
            .unwrap_or(false);

        if let CalibrationStatus::Done(range) = calibrator.tick(now(), pressed, encoder, motor) {
            return Some(range);
        }

        if !announced && calibrator.phase() != CalibrationPhase::WaitForManualCenter {
            announced = true;
            event::send(Events::CalibrationStarted).await;
        }

        ticker.next().await;
    }
}

/// Closed-loop play until an end request arrives
async fn play(range: CalibrationRange, encoder: &mut Encoder, motor: &mut PaddleMotor, button: &mut ButtonEdge) {
    let controller = PositionController::new(ControllerConfig {
        period: time::Duration::micros(CONTROL_PERIOD.as_micros()),
        ..ControllerConfig::default()
    });
    let mut control = ControlLoop::new(range, controller, LoopConfig::default());
    let mut ticker = Ticker::every(CONTROL_PERIOD);
    let mut last = Instant::now();

    info!("Paddle play started, range {}..{}", range.min_raw, range.max_raw);

    while !session::take_end_request() {
        let joystick = session::take_joystick();
        if let Some(joystick) = joystick {
            if button.update(joystick.button) {
                solenoid::fire();
            }
        }

        let current = Instant::now();
        let elapsed = time::Duration::micros((current - last).as_micros());
        last = current;

        control.cycle(encoder, joystick.as_ref(), elapsed, motor);

        ticker.next().await;
    }

    control.stop(motor);
}
