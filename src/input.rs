//! Keyboard bindings and the per-tick input snapshot.
//!
//! The render thread feeds raw key events into [`RawInput`] as they
//! arrive; once per tick the simulation thread freezes them into an
//! [`InputFrame`]. Taps are edge-triggered and consumed by the tick that
//! sees them, holds carry a tick counter for charge-style behavior.

use std::collections::{HashMap, HashSet};

use sdl2::keyboard::Keycode;
use strum_macros::EnumIter;

/// Every action the game understands. Keys map to these, and game code
/// only ever sees actions, so rebinding never touches gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter)]
pub enum Action {
    Up,
    Down,
    Left,
    Right,
    Fire,
    Confirm,
    Back,
    Pause,
    Mute,
}

/// Mapping from physical keys to actions.
#[derive(Debug, Clone)]
pub struct Bindings {
    key_bindings: HashMap<Keycode, Action>,
}

impl Default for Bindings {
    fn default() -> Self {
        let mut key_bindings = HashMap::new();

        // Ship control
        key_bindings.insert(Keycode::Up, Action::Up);
        key_bindings.insert(Keycode::W, Action::Up);
        key_bindings.insert(Keycode::Down, Action::Down);
        key_bindings.insert(Keycode::S, Action::Down);
        key_bindings.insert(Keycode::Left, Action::Left);
        key_bindings.insert(Keycode::A, Action::Left);
        key_bindings.insert(Keycode::Right, Action::Right);
        key_bindings.insert(Keycode::D, Action::Right);
        key_bindings.insert(Keycode::Space, Action::Fire);

        // Menus and meta
        key_bindings.insert(Keycode::Return, Action::Confirm);
        key_bindings.insert(Keycode::Escape, Action::Back);
        key_bindings.insert(Keycode::P, Action::Pause);
        key_bindings.insert(Keycode::M, Action::Mute);

        Self { key_bindings }
    }
}

impl Bindings {
    pub fn action(&self, key: Keycode) -> Option<Action> {
        self.key_bindings.get(&key).copied()
    }
}

/// Raw input accumulated between ticks by the render thread.
#[derive(Debug, Default)]
pub struct RawInput {
    /// Actions pressed since the last tick, in press order.
    pressed: Vec<Action>,
    /// Actions currently held down.
    down: HashSet<Action>,
    /// How many consecutive ticks each held action has been down.
    hold_ticks: HashMap<Action, u32>,
}

impl RawInput {
    pub fn key_down(&mut self, action: Action) {
        if self.down.insert(action) {
            self.pressed.push(action);
        }
    }

    pub fn key_up(&mut self, action: Action) {
        self.down.remove(&action);
    }

    /// Freezes the accumulated input into a frame for one tick and clears
    /// the edge-triggered state.
    pub fn next_frame(&mut self) -> InputFrame {
        let tapped: HashSet<Action> = self.pressed.drain(..).collect();

        for action in &self.down {
            *self.hold_ticks.entry(*action).or_insert(0) += 1;
        }
        let down = &self.down;
        self.hold_ticks.retain(|action, _| down.contains(action));

        InputFrame {
            tapped,
            held: self.hold_ticks.clone(),
        }
    }
}

/// The input snapshot a single simulation tick sees.
#[derive(Debug, Clone, Default)]
pub struct InputFrame {
    tapped: HashSet<Action>,
    held: HashMap<Action, u32>,
}

impl InputFrame {
    /// Whether the action was pressed since the previous tick.
    pub fn tapped(&self, action: Action) -> bool {
        self.tapped.contains(&action)
    }

    /// Whether the action is currently held.
    pub fn held(&self, action: Action) -> bool {
        self.held.contains_key(&action)
    }

    /// How many consecutive ticks the action has been held, 0 if it is not.
    pub fn held_ticks(&self, action: Action) -> u32 {
        self.held.get(&action).copied().unwrap_or(0)
    }

    /// Builds a frame with these actions freshly tapped.
    pub fn with_tapped(actions: &[Action]) -> Self {
        Self {
            tapped: actions.iter().copied().collect(),
            held: HashMap::new(),
        }
    }

    /// Builds a frame with these actions held for the given tick counts.
    pub fn with_held(actions: &[(Action, u32)]) -> Self {
        Self {
            tapped: HashSet::new(),
            held: actions.iter().copied().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tap_consumed_by_one_frame() {
        let mut raw = RawInput::default();
        raw.key_down(Action::Fire);
        raw.key_up(Action::Fire);

        let frame = raw.next_frame();
        assert!(frame.tapped(Action::Fire));
        assert!(!frame.held(Action::Fire));

        // The tap was consumed; the release means no hold either
        let frame = raw.next_frame();
        assert!(!frame.tapped(Action::Fire));
        assert!(!frame.held(Action::Fire));
    }

    #[test]
    fn test_hold_ticks_accumulate() {
        let mut raw = RawInput::default();
        raw.key_down(Action::Up);

        assert_eq!(raw.next_frame().held_ticks(Action::Up), 1);
        assert_eq!(raw.next_frame().held_ticks(Action::Up), 2);
        assert_eq!(raw.next_frame().held_ticks(Action::Up), 3);

        raw.key_up(Action::Up);
        assert_eq!(raw.next_frame().held_ticks(Action::Up), 0);
    }

    #[test]
    fn test_repeated_key_down_is_one_tap() {
        let mut raw = RawInput::default();
        raw.key_down(Action::Fire);
        raw.key_down(Action::Fire);

        let frame = raw.next_frame();
        assert!(frame.tapped(Action::Fire));
        assert_eq!(frame.held_ticks(Action::Fire), 1);
    }
}
