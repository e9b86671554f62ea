//! Translation of crossterm key events into launcher key input.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};
use flightdeck_core::{Key, KeyInput, Modifiers};

/// Map a terminal key event to a key-down for the session.
///
/// Releases return `None`. A bare Shift press is only reported by terminals
/// with the kitty keyboard protocol enabled.
pub fn to_key_input(event: &KeyEvent) -> Option<KeyInput> {
    let repeat = match event.kind {
        KeyEventKind::Press => false,
        KeyEventKind::Repeat => true,
        KeyEventKind::Release => return None,
    };

    let key = match event.code {
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => Key::Shift,
        KeyCode::Esc => Key::Escape,
        KeyCode::Enter => Key::Enter,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Char(c) if !c.is_control() => Key::Char(c),
        _ => Key::Other,
    };

    let mut input = KeyInput::new(key).with_modifiers(to_modifiers(event.modifiers));
    input.repeat = repeat;
    Some(input)
}

fn to_modifiers(modifiers: KeyModifiers) -> Modifiers {
    Modifiers {
        shift: modifiers.contains(KeyModifiers::SHIFT),
        ctrl: modifiers.contains(KeyModifiers::CONTROL),
        alt: modifiers.contains(KeyModifiers::ALT),
        meta: modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
    }
}
