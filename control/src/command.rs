//! Messages exchanged with the joystick node

use serde::{Deserialize, Serialize};

/// Joystick state as broadcast by the controller node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct JoystickCommand {
    /// Horizontal axis, 0-100
    pub x: u8,
    /// Vertical axis, 0-100
    pub y: u8,
    pub button: bool,
    pub slider_left: u8,
    pub slider_right: u8,
}

impl JoystickCommand {
    /// Caps both axes at 100
    pub fn normalized(self) -> Self {
        Self {
            x: self.x.min(100),
            y: self.y.min(100),
            ..self
        }
    }
}

/// Everything that crosses the link
///
/// Variants follow the order of the joystick node's CAN ids (0x000 joystick, 0x001 game over),
/// so the encoded discriminant equals the id of the frame the gateway received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Message {
    Joystick(JoystickCommand),
    GameOver,
}

/// Rising-edge detector for the joystick button
#[derive(Debug, Clone, Copy, Default)]
pub struct ButtonEdge {
    last: bool,
}

impl ButtonEdge {
    pub const fn new() -> Self {
        Self { last: false }
    }

    /// Feeds the current button level; returns true only on a released-to-pressed transition
    pub fn update(&mut self, pressed: bool) -> bool {
        let rising = pressed && !self.last;
        self.last = pressed;
        rising
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizing_caps_axes_and_keeps_the_rest() {
        let command = JoystickCommand {
            x: 180,
            y: 40,
            button: true,
            slider_left: 200,
            slider_right: 7,
        }
        .normalized();
        assert_eq!(
            command,
            JoystickCommand {
                x: 100,
                y: 40,
                button: true,
                slider_left: 200,
                slider_right: 7,
            }
        );
    }

    #[test]
    fn button_edge_fires_once_per_press() {
        let mut edge = ButtonEdge::new();
        let levels = [false, true, true, true, false, true, false];
        let edges: Vec<bool> = levels.iter().map(|&l| edge.update(l)).collect();
        assert_eq!(edges, vec![false, true, false, false, false, true, false]);
    }
}
