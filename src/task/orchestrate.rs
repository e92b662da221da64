//! Orchestrator Module
//!
//! Tracks the game phase from system events and decides when a session has to end.

use defmt::{debug, info};
use paddle_control::Message;

use crate::system::event::{self, Events};
use crate::system::session;
use crate::system::state::{GameState, SYSTEM_STATE};
use crate::task::link;

/// Main orchestrator task
///
/// Listens for system events, updates the shared state and reacts to the changes.
#[embassy_executor::task]
pub async fn orchestrate() {
    info!("Orchestrator started");
    loop {
        let event = event::wait().await;
        if let Some(state_change) = process_event(event).await {
            handle_state_changes(state_change).await;
        }
    }
}

/// Applies an event to the system state
///
/// Returns the event when it needs a reaction beyond the state update.
async fn process_event(event: Events) -> Option<Events> {
    let mut state = SYSTEM_STATE.lock().await;

    match event {
        Events::CalibrationStarted => state.set_game_state(GameState::Calibrating).then_some(event),
        Events::PlayStarted => state.set_game_state(GameState::Playing).then_some(event),
        Events::SessionEnded => state.set_game_state(GameState::Menu).then_some(event),
        Events::BeamBroken => {
            if state.game_state == GameState::Playing {
                state.goals = state.goals.wrapping_add(1);
                Some(event)
            } else {
                None
            }
        }
        Events::BeamRestored => None,
        Events::GameOverReceived => (state.game_state != GameState::Menu).then_some(event),
    }
}

/// Reacts to state changes
async fn handle_state_changes(event: Events) {
    match event {
        Events::CalibrationStarted => info!("Calibrating paddle"),
        Events::PlayStarted => info!("Game on"),
        Events::SessionEnded => info!("Back in menu, waiting for the button"),
        Events::BeamBroken => {
            let goals = SYSTEM_STATE.lock().await.goals;
            info!("Goal! {} so far, ending game", goals);
            session::request_end();
            link::send(Message::GameOver).await;
        }
        Events::GameOverReceived => {
            info!("Ending game on request of the joystick node");
            session::request_end();
        }
        Events::BeamRestored => debug!("Beam restored"),
    }
}
