//! Paddle Session Signals
//!
//! Hand-over points between the link task, the orchestrator and the paddle task. Both are
//! latest-value signals polled without blocking from the paddle task, so a missing message
//! never stretches a control period.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use paddle_control::JoystickCommand;

/// Most recent joystick state received over the link
static JOYSTICK: Signal<CriticalSectionRawMutex, JoystickCommand> = Signal::new();

/// Request to stop the motor and leave the current session
static END: Signal<CriticalSectionRawMutex, ()> = Signal::new();

/// Publishes a joystick state, replacing one not yet consumed
pub fn publish_joystick(command: JoystickCommand) {
    JOYSTICK.signal(command);
}

/// Takes the joystick state received since the last call, if any
pub fn take_joystick() -> Option<JoystickCommand> {
    JOYSTICK.try_take()
}

/// Asks the paddle task to end the running session
pub fn request_end() {
    END.signal(());
}

/// Consumes a pending end request
pub fn take_end_request() -> bool {
    END.try_take().is_some()
}

/// Drops requests that arrived while no session was running
pub fn clear_end_request() {
    END.reset();
}
