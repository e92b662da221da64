//! Ball launcher solenoid
//!
//! Fires one short pulse per request. The driver input is active low, so the pin idles high.
//! Requests arriving while a pulse or the cooldown after it is running are dropped.

use defmt::{debug, info};
use embassy_rp::gpio::{Level, Output};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embassy_time::Timer;

use crate::system::config::{SOLENOID_COOLDOWN, SOLENOID_PULSE};
use crate::system::resources::SolenoidResources;

/// Pending shot request
static FIRE: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Requests a single shot
pub fn fire() {
    FIRE.signal(());
}

#[embassy_executor::task]
pub async fn solenoid(r: SolenoidResources) {
    let mut pin = Output::new(r.pin, Level::High);
    info!("Solenoid ready");

    loop {
        FIRE.wait().await;

        debug!("Solenoid fired");
        pin.set_low();
        Timer::after(SOLENOID_PULSE).await;
        pin.set_high();

        Timer::after(SOLENOID_COOLDOWN).await;
        // Presses during the pulse or cooldown do not queue another shot
        FIRE.reset();
    }
}
