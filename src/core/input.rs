use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Grape number, 1-based.
    Grape(u8),
    Instructions,
    Rehearse,
    Exit,
}

/// Physical key of a fresh press. Releases and auto-repeat are dropped so
/// holding a key never eats more than one grape.
pub fn pressed_key(event: &KeyEvent) -> Option<KeyCode> {
    if event.state != ElementState::Pressed || event.repeat {
        return None;
    }
    match event.physical_key {
        PhysicalKey::Code(code) => Some(code),
        PhysicalKey::Unidentified(_) => None,
    }
}

/// The number row maps to grapes 1..=12: `1`-`9`, then `0`, `-`, `=`.
#[inline(always)]
pub fn grape_from_keycode(code: KeyCode) -> Option<u8> {
    let grape = match code {
        KeyCode::Digit1 | KeyCode::Numpad1 => 1,
        KeyCode::Digit2 | KeyCode::Numpad2 => 2,
        KeyCode::Digit3 | KeyCode::Numpad3 => 3,
        KeyCode::Digit4 | KeyCode::Numpad4 => 4,
        KeyCode::Digit5 | KeyCode::Numpad5 => 5,
        KeyCode::Digit6 | KeyCode::Numpad6 => 6,
        KeyCode::Digit7 | KeyCode::Numpad7 => 7,
        KeyCode::Digit8 | KeyCode::Numpad8 => 8,
        KeyCode::Digit9 | KeyCode::Numpad9 => 9,
        KeyCode::Digit0 | KeyCode::Numpad0 => 10,
        KeyCode::Minus | KeyCode::NumpadSubtract => 11,
        KeyCode::Equal | KeyCode::NumpadAdd => 12,
        _ => return None,
    };
    Some(grape)
}

pub fn action_from_keycode(code: KeyCode) -> Option<KeyAction> {
    if let Some(grape) = grape_from_keycode(code) {
        return Some(KeyAction::Grape(grape));
    }
    match code {
        KeyCode::KeyH | KeyCode::F1 => Some(KeyAction::Instructions),
        KeyCode::KeyT => Some(KeyAction::Rehearse),
        KeyCode::Escape => Some(KeyAction::Exit),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn number_row_covers_all_twelve_grapes() {
        let row = [
            KeyCode::Digit1,
            KeyCode::Digit2,
            KeyCode::Digit3,
            KeyCode::Digit4,
            KeyCode::Digit5,
            KeyCode::Digit6,
            KeyCode::Digit7,
            KeyCode::Digit8,
            KeyCode::Digit9,
            KeyCode::Digit0,
            KeyCode::Minus,
            KeyCode::Equal,
        ];
        let grapes: Vec<u8> = row.iter().filter_map(|&k| grape_from_keycode(k)).collect();
        assert_eq!(grapes, (1..=12).collect::<Vec<u8>>());
        assert_eq!(grape_from_keycode(KeyCode::Numpad0), Some(10));
    }

    #[test]
    fn commands() {
        assert_eq!(action_from_keycode(KeyCode::KeyH), Some(KeyAction::Instructions));
        assert_eq!(action_from_keycode(KeyCode::F1), Some(KeyAction::Instructions));
        assert_eq!(action_from_keycode(KeyCode::KeyT), Some(KeyAction::Rehearse));
        assert_eq!(action_from_keycode(KeyCode::Escape), Some(KeyAction::Exit));
        assert_eq!(action_from_keycode(KeyCode::Equal), Some(KeyAction::Grape(12)));
        assert_eq!(action_from_keycode(KeyCode::KeyQ), None);
    }
}
