//! Gamepad support. With the `gamepad` feature, controllers are read through gilrs: the d-pad and
//! left stick steer, the South button (A on Xbox layouts) jumps. Without it the gamepad is inert.

use crate::input::{Action, Controls, InputState};

/// Stick deflection needed before it counts as a direction.
pub const STICK_DEADZONE: f32 = 0.3;

/// Maps a horizontal stick value to (left, right).
pub fn stick_direction(x: f32, deadzone: f32) -> (bool, bool) {
    (x < -deadzone, x > deadzone)
}

/// Held state of the controller inputs the game cares about.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
struct PadState {
    dpad_left: bool,
    dpad_right: bool,
    stick_x: f32,
    jump: bool,
}

impl PadState {
    fn is_held(&self, action: Action) -> bool {
        let (stick_left, stick_right) = stick_direction(self.stick_x, STICK_DEADZONE);
        match action {
            Action::Left => self.dpad_left || stick_left,
            Action::Right => self.dpad_right || stick_right,
            Action::Jump => self.jump,
        }
    }
}

/// Tracks controller input in its own InputState so that releasing a pad button never releases
/// a key still held on the keyboard.
pub struct Gamepad {
    #[cfg(feature = "gamepad")]
    gilrs: Option<gilrs::Gilrs>,
    pad: PadState,
    input: InputState,
}

impl Default for Gamepad {
    fn default() -> Self {
        Self::new()
    }
}

impl Gamepad {
    pub fn new() -> Self {
        Self {
            #[cfg(feature = "gamepad")]
            gilrs: match gilrs::Gilrs::new() {
                Ok(gilrs) => {
                    for (_, pad) in gilrs.gamepads() {
                        log::info!("Found gamepad \"{}\"", pad.name());
                    }
                    Some(gilrs)
                }
                Err(e) => {
                    log::warn!("Gamepad support unavailable: {}", e);
                    None
                }
            },
            pad: PadState::default(),
            input: InputState::for_actions(&Action::ALL),
        }
    }

    /// Drains pending controller events. Call once per frame before reading `controls`.
    pub fn poll(&mut self) {
        #[cfg(feature = "gamepad")]
        if let Some(gilrs) = &mut self.gilrs {
            use gilrs::{Axis, Button, EventType};

            while let Some(gilrs::Event { event, .. }) = gilrs.next_event() {
                match event {
                    EventType::ButtonPressed(button, _) | EventType::ButtonReleased(button, _) => {
                        let pressed = matches!(event, EventType::ButtonPressed(..));
                        match button {
                            Button::DPadLeft => self.pad.dpad_left = pressed,
                            Button::DPadRight => self.pad.dpad_right = pressed,
                            Button::South => self.pad.jump = pressed,
                            _ => {}
                        }
                    }
                    EventType::AxisChanged(Axis::LeftStickX, value, _) => self.pad.stick_x = value,
                    EventType::Connected => log::info!("Gamepad connected"),
                    EventType::Disconnected => {
                        log::info!("Gamepad disconnected");
                        self.pad = PadState::default();
                    }
                    _ => {}
                }
            }
        }

        self.apply();
    }

    fn apply(&mut self) {
        for action in Action::ALL {
            let held = self.pad.is_held(action);
            if held != self.input.is_active(action) {
                self.input.process_action(action, held);
            }
        }
    }

    pub fn controls(&self) -> Controls {
        self.input.controls()
    }

    pub fn update(&mut self) {
        self.input.update();
    }
}
