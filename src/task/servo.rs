//! Shooter Servo
//!
//! Points the launcher with a hobby servo. The RP2350's PWM slices are shared with the motor,
//! so the servo signal comes from the PIO PWM program instead, on PIO1.

use core::time::Duration;

use defmt::{debug, info};
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::pwm::{PioPwm, PioPwmProgram};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use paddle_control::servo::{pulse_width_us, PERIOD_US};

use crate::system::resources::{Irqs, ServoResources};

/// Requested servo position, 0-100 %
static POSITION: Signal<CriticalSectionRawMutex, u8> = Signal::new();

/// Moves the servo to a 0-100 % position
pub fn set_position(percent: u8) {
    POSITION.signal(percent);
}

#[embassy_executor::task]
pub async fn servo(r: ServoResources) {
    let Pio { mut common, sm0, .. } = Pio::new(r.pio, Irqs);
    let program = PioPwmProgram::new(&mut common);
    let mut pwm = PioPwm::new(&mut common, sm0, r.pin, &program);

    pwm.set_period(Duration::from_micros(u64::from(PERIOD_US)));
    pwm.write(Duration::from_micros(u64::from(pulse_width_us(50))));
    pwm.start();
    info!("Servo ready");

    let mut current = 50;
    loop {
        let percent = POSITION.wait().await;
        if percent == current {
            continue;
        }
        current = percent;
        let pulse = pulse_width_us(percent);
        debug!("Servo {}% -> {} us", percent, pulse);
        pwm.write(Duration::from_micros(u64::from(pulse)));
    }
}
