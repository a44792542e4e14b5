use std::collections::HashMap;

use winit::{event::ElementState, keyboard::KeyCode};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ButtonState {
    Pressed,
    Down,
    Released,
    #[default]
    Up,
}

impl ButtonState {
    fn transition(&self, key_down: bool) -> ButtonState {
        if key_down {
            match self {
                ButtonState::Pressed => ButtonState::Down,
                ButtonState::Down => ButtonState::Down,
                ButtonState::Released => ButtonState::Pressed,
                ButtonState::Up => ButtonState::Pressed,
            }
        } else {
            match self {
                ButtonState::Pressed => ButtonState::Released,
                ButtonState::Down => ButtonState::Released,
                ButtonState::Released => ButtonState::Up,
                ButtonState::Up => ButtonState::Up,
            }
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, ButtonState::Pressed | ButtonState::Down)
    }
}

// ---------------------------------------------------------------------------------------------------------------------

/// The things a player can ask the hero to do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Left,
    Right,
    Jump,
}

impl Action {
    pub const ALL: [Action; 3] = [Action::Left, Action::Right, Action::Jump];

    pub fn for_key(key: KeyCode) -> Option<Action> {
        match key {
            KeyCode::ArrowLeft | KeyCode::KeyA => Some(Action::Left),
            KeyCode::ArrowRight | KeyCode::KeyD => Some(Action::Right),
            KeyCode::ArrowUp | KeyCode::KeyW | KeyCode::Space => Some(Action::Jump),
            _ => None,
        }
    }
}

/// Per-frame snapshot of the actions the game reads.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Controls {
    pub left: bool,
    pub right: bool,
    /// True only on the frame the jump button went down.
    pub jump: bool,
}

impl Controls {
    /// Combines two input sources, e.g. keyboard and gamepad.
    pub fn merge(self, other: Controls) -> Controls {
        Controls {
            left: self.left || other.left,
            right: self.right || other.right,
            jump: self.jump || other.jump,
        }
    }
}

// ---------------------------------------------------------------------------------------------------------------------

#[derive(Default, Debug)]
pub struct InputState {
    buttons: HashMap<Action, ButtonState>,
}

impl InputState {
    pub fn for_actions(actions: &[Action]) -> Self {
        let mut buttons = HashMap::new();
        for action in actions {
            buttons.insert(*action, ButtonState::default());
        }

        Self { buttons }
    }

    pub fn get_button_state(&self, action: Action) -> Option<&ButtonState> {
        self.buttons.get(&action)
    }

    pub fn is_active(&self, action: Action) -> bool {
        self.get_button_state(action)
            .map_or(false, |state| state.is_active())
    }

    /// Feeds a keyboard event; returns true if the key is mapped to a registered action.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) -> bool {
        match Action::for_key(key) {
            Some(action) => self.process_action(action, state == ElementState::Pressed),
            None => false,
        }
    }

    pub fn process_action(&mut self, action: Action, pressed: bool) -> bool {
        if let Some(button_state) = self.buttons.get(&action) {
            let new_state = button_state.transition(pressed);
            // key repeat reports Pressed again; only the first one is a press
            if !(pressed && button_state.is_active()) {
                self.buttons.insert(action, new_state);
            }
            true
        } else {
            false
        }
    }

    pub fn controls(&self) -> Controls {
        Controls {
            left: self.is_active(Action::Left),
            right: self.is_active(Action::Right),
            jump: self.get_button_state(Action::Jump) == Some(&ButtonState::Pressed),
        }
    }

    /// Advances Pressed to Down and Released to Up; call once per frame after the game has read input.
    pub fn update(&mut self) {
        let previous_button_state = std::mem::take(&mut self.buttons);
        for (action, button_state) in previous_button_state {
            self.buttons
                .insert(action, button_state.transition(button_state.is_active()));
        }
    }
}

#[cfg(test)]
mod input_tests {
    use super::*;

    #[test]
    fn button_state_cycle() {
        let mut input = InputState::for_actions(&Action::ALL);
        input.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed);
        assert_eq!(input.get_button_state(Action::Jump), Some(&ButtonState::Pressed));
        assert!(input.controls().jump);

        input.update();
        assert_eq!(input.get_button_state(Action::Jump), Some(&ButtonState::Down));
        assert!(!input.controls().jump);

        input.process_keyboard(KeyCode::ArrowUp, ElementState::Released);
        assert_eq!(input.get_button_state(Action::Jump), Some(&ButtonState::Released));
        input.update();
        assert_eq!(input.get_button_state(Action::Jump), Some(&ButtonState::Up));
    }

    #[test]
    fn key_repeat_does_not_retrigger_jump() {
        let mut input = InputState::for_actions(&Action::ALL);
        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        input.update();
        input.process_keyboard(KeyCode::Space, ElementState::Pressed);
        assert!(!input.controls().jump);
        assert!(input.is_active(Action::Jump));
    }

    #[test]
    fn alternate_keys_map_to_actions() {
        let mut input = InputState::for_actions(&Action::ALL);
        assert!(input.process_keyboard(KeyCode::KeyA, ElementState::Pressed));
        assert!(input.process_keyboard(KeyCode::ArrowRight, ElementState::Pressed));
        assert!(!input.process_keyboard(KeyCode::KeyQ, ElementState::Pressed));
        let controls = input.controls();
        assert!(controls.left && controls.right && !controls.jump);
    }

    #[test]
    fn unregistered_actions_are_ignored() {
        let mut input = InputState::for_actions(&[Action::Left]);
        assert!(!input.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed));
        assert!(!input.controls().jump);
        assert_eq!(input.get_button_state(Action::Jump), None);
        assert!(input.process_keyboard(KeyCode::ArrowLeft, ElementState::Pressed));
        assert!(input.controls().left);
    }
}
