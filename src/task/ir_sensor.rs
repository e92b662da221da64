//! Goal IR Sensor
//!
//! Watches the photodiode across the goal opening and reports beam breaks.
//!
//! # Operation
//! - Averages the intact-beam level at start-up to derive the break threshold
//! - Samples every 10 ms through a median filter
//! - Emits an event only when the filtered state changes
//!
//! # Voltage Calculation
//! ```text
//! millivolts = adc_value * 3300 / 4096
//! ```

use defmt::{info, warn};
use embassy_rp::adc::{self, Adc, Async, Channel};
use embassy_rp::gpio::Pull;
use embassy_time::{Ticker, Timer};
use paddle_control::beam::{BeamDetector, BeamEvent};

use crate::system::config::{ADC_RANGE, ADC_REF_MV, IR_BASELINE_SAMPLES, IR_SAMPLE_INTERVAL};
use crate::system::event::{self, Events};
use crate::system::resources::{IrSensorResources, Irqs};

/// Reads one conversion in millivolts; a failed conversion is logged and skipped
async fn read_mv(adc: &mut Adc<'static, Async>, channel: &mut Channel<'static>) -> Option<f32> {
    match adc.read(channel).await {
        Ok(raw) => Some(f32::from(raw) * ADC_REF_MV / ADC_RANGE),
        Err(e) => {
            warn!("IR sensor conversion failed: {}", e);
            None
        }
    }
}

#[embassy_executor::task]
pub async fn ir_sensor(r: IrSensorResources) {
    let mut adc = Adc::new(r.adc, Irqs, adc::Config::default());
    let mut channel = Channel::new_pin(r.photodiode_pin, Pull::None);

    // Let the emitter and the analog front end settle
    Timer::after_millis(500).await;

    let mut sum = 0.0;
    let mut count = 0u16;
    for _ in 0..IR_BASELINE_SAMPLES {
        if let Some(mv) = read_mv(&mut adc, &mut channel).await {
            sum += mv;
            count += 1;
        }
        Timer::after_millis(1).await;
    }
    let baseline = if count > 0 { sum / f32::from(count) } else { ADC_REF_MV };
    let mut detector = BeamDetector::from_baseline(baseline);
    info!(
        "IR baseline {} mV from {} samples, threshold {} mV",
        baseline,
        count,
        detector.threshold_mv()
    );

    let mut ticker = Ticker::every(IR_SAMPLE_INTERVAL);
    loop {
        ticker.next().await;
        let Some(mv) = read_mv(&mut adc, &mut channel).await else {
            continue;
        };
        match detector.update(mv) {
            Some(BeamEvent::Broken) => event::send(Events::BeamBroken).await,
            Some(BeamEvent::Restored) => event::send(Events::BeamRestored).await,
            None => {}
        }
    }
}
