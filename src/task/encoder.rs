//! Paddle quadrature encoder
//!
//! The RP2350 has no quadrature decoder peripheral, so a PIO state machine decodes the A/B
//! channels and this task folds every step into a free-running 16-bit counter. The counter
//! wraps like a hardware counter register would; widening and glitch rejection happen in
//! [`paddle_control::EncoderReader`] on the reading side.
//!
//! # Operation
//! - PIO0 state machine 0 runs the rotary encoder program on the two phase pins
//! - Each decoded step adds or subtracts one count, wrapping at the 16-bit boundary
//! - [`QuadratureCounter`] exposes the counter to the paddle task

use core::sync::atomic::{AtomicU16, Ordering};

use defmt::info;
use embassy_rp::pio::Pio;
use embassy_rp::pio_programs::rotary_encoder::{Direction, PioEncoder, PioEncoderProgram};
use paddle_control::PositionCounter;

use crate::system::resources::{EncoderResources, Irqs};

/// Raw step count, two's complement in 16 bits
static COUNT: AtomicU16 = AtomicU16::new(0);

/// Handle to the step counter maintained by [`encoder`]
pub struct QuadratureCounter;

impl PositionCounter for QuadratureCounter {
    fn read_raw(&mut self) -> i16 {
        COUNT.load(Ordering::Relaxed) as i16
    }

    fn reset(&mut self) {
        COUNT.store(0, Ordering::Relaxed);
    }
}

/// Encoder decoding task
#[embassy_executor::task]
pub async fn encoder(r: EncoderResources) {
    let Pio { mut common, sm0, .. } = Pio::new(r.pio, Irqs);
    let program = PioEncoderProgram::new(&mut common);
    let mut decoder = PioEncoder::new(&mut common, sm0, r.phase_a_pin, r.phase_b_pin, &program);

    info!("Encoder decoding started");

    loop {
        match decoder.read().await {
            Direction::Clockwise => COUNT.fetch_add(1, Ordering::Relaxed),
            Direction::CounterClockwise => COUNT.fetch_sub(1, Ordering::Relaxed),
        };
    }
}
