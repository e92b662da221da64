//! Hardware Resource Management
//!
//! Allocates pins and peripherals of the paddle node to the tasks that own them. Every
//! resource has exactly one owner, so no task needs a lock to touch its hardware.
//!
//! # Resource Groups
//! - Motor: TB6612FNG channel A (direction pins, PWM, standby)
//! - Encoder: quadrature channels A/B decoded by PIO0
//! - Link: UART0 towards the CAN gateway, with its DMA channels
//! - IR sensor: photodiode on an ADC pin
//! - Solenoid: active-low driver pin
//! - Servo: shooter servo driven by PIO1

use assign_resources::assign_resources;
use embassy_rp::adc::InterruptHandler as AdcInterruptHandler;
use embassy_rp::bind_interrupts;
use embassy_rp::peripherals::{self, PIO0, PIO1, UART0};
use embassy_rp::pio::InterruptHandler as PioInterruptHandler;
use embassy_rp::uart::InterruptHandler as UartInterruptHandler;
use embassy_rp::Peri;

assign_resources! {
    /// TB6612FNG motor driver, channel A
    motor: MotorResources {
        standby_pin: PIN_22,
        pwm_slice: PWM_SLICE6,
        pwm_pin: PIN_28,
        forward_pin: PIN_21,
        backward_pin: PIN_20,
    },
    /// Paddle quadrature encoder
    encoder: EncoderResources {
        pio: PIO0,
        phase_a_pin: PIN_6,
        phase_b_pin: PIN_7,
    },
    /// Serial link to the CAN gateway
    link: LinkResources {
        uart: UART0,
        tx_pin: PIN_0,
        rx_pin: PIN_1,
        tx_dma: DMA_CH0,
        rx_dma: DMA_CH1,
    },
    /// Goal photodiode
    ir_sensor: IrSensorResources {
        adc: ADC,
        photodiode_pin: PIN_26,
    },
    /// Ball launcher solenoid (active low)
    solenoid: SolenoidResources {
        pin: PIN_15,
    },
    /// Shooter angle servo
    servo: ServoResources {
        pio: PIO1,
        pin: PIN_16,
    },
}

bind_interrupts!(pub struct Irqs {
    ADC_IRQ_FIFO => AdcInterruptHandler;
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
    PIO1_IRQ_0 => PioInterruptHandler<PIO1>;
    UART0_IRQ => UartInterruptHandler<UART0>;
});
