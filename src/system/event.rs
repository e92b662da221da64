//! System Events
//!
//! Defines events and the channel tasks use to report them to the orchestrator.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

/// Multi-producer, single-consumer event channel with capacity of 10
pub static EVENT_CHANNEL: Channel<CriticalSectionRawMutex, Events, 10> = Channel::new();

/// Sends an event to the system channel
pub async fn send(event: Events) {
    EVENT_CHANNEL.sender().send(event).await;
}

/// Receives the next event from the system channel
pub async fn wait() -> Events {
    EVENT_CHANNEL.receiver().receive().await
}

/// System-wide events
#[derive(Debug, Clone, Copy, defmt::Format)]
pub enum Events {
    /// Operator pressed the button and the paddle started its calibration drives
    CalibrationStarted,
    /// Calibration finished, closed-loop play begins
    PlayStarted,
    /// Paddle task stopped the motor and left the session
    SessionEnded,
    /// Goal photodiode went dark
    BeamBroken,
    /// Goal photodiode sees the emitter again
    BeamRestored,
    /// Joystick node asked to end the game
    GameOverReceived,
}
