//! System State Management
//!
//! Game phase and score of the paddle node, shared behind a mutex. Only the orchestrator
//! writes it; other tasks may read it.

use defmt::Format;
use embassy_sync::{blocking_mutex::raw::CriticalSectionRawMutex, mutex::Mutex};

/// Global system state protected by a mutex
pub static SYSTEM_STATE: Mutex<CriticalSectionRawMutex, SystemState> = Mutex::new(SystemState {
    game_state: GameState::Menu,
    goals: 0,
});

#[derive(Format)]
pub struct SystemState {
    pub game_state: GameState,
    /// Beam breaks counted while playing since power-up
    pub goals: u32,
}

impl SystemState {
    /// Moves to a new phase; returns false when already there
    pub fn set_game_state(&mut self, new_state: GameState) -> bool {
        if self.game_state == new_state {
            return false;
        }
        self.game_state = new_state;
        true
    }
}

/// Phases of a game as seen from the paddle node
#[derive(Debug, Clone, Copy, PartialEq, Format)]
pub enum GameState {
    /// Waiting for the operator to center the paddle and press the button
    Menu,
    /// Discovering paddle travel
    Calibrating,
    /// Paddle follows the joystick
    Playing,
}
