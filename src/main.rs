//! Paddle node firmware entry point
//!
//! Initializes the hardware and spawns the paddle, link and peripheral tasks.

#![no_std]
#![no_main]

use crate::task::{
    encoder::encoder, ir_sensor::ir_sensor, link::link, orchestrate::orchestrate, paddle::paddle, servo::servo,
    solenoid::solenoid,
};
use embassy_executor::Spawner;
use embassy_rp::block::ImageDef;
use embassy_rp::config::Config;
use system::resources::{
    AssignedResources, EncoderResources, IrSensorResources, LinkResources, MotorResources, ServoResources,
    SolenoidResources,
};
use {defmt_rtt as _, panic_probe as _};

/// Firmware image type for bootloader
#[link_section = ".start_block"]
#[used]
pub static IMAGE_DEF: ImageDef = ImageDef::secure_exe();

/// System core modules
mod system;
/// Task implementations
mod task;

/// Firmware entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let p = embassy_rp::init(Config::default());

    // Split the resources into separate groups, one per owning task
    let r = split_resources!(p);

    spawner.spawn(orchestrate()).unwrap();
    // Encoder first so the counter runs before the paddle task reads it
    spawner.spawn(encoder(r.encoder)).unwrap();
    spawner.spawn(paddle(r.motor)).unwrap();
    spawner.spawn(link(r.link)).unwrap();
    spawner.spawn(ir_sensor(r.ir_sensor)).unwrap();
    spawner.spawn(solenoid(r.solenoid)).unwrap();
    spawner.spawn(servo(r.servo)).unwrap();
}
