//! Task implementations
pub mod encoder;
pub mod ir_sensor;
pub mod link;
pub mod motor_driver;
pub mod orchestrate;
pub mod paddle;
pub mod servo;
pub mod solenoid;
