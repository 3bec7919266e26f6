// Copyright 2025 Lablup Inc. and Jeongkyu Shin
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    ToggleGlyphs,
    TogglePerCore,
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    Ignore,
}

pub fn handle_key_event(key_event: KeyEvent) -> KeyAction {
    if key_event.kind == KeyEventKind::Release {
        return KeyAction::Ignore;
    }

    match key_event.code {
        KeyCode::Char('c') if key_event.modifiers.contains(KeyModifiers::CONTROL) => {
            KeyAction::Quit
        }
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('s') => KeyAction::ToggleGlyphs,
        KeyCode::Char('p') => KeyAction::TogglePerCore,
        KeyCode::Up => KeyAction::ScrollUp,
        KeyCode::Down => KeyAction::ScrollDown,
        KeyCode::PageUp => KeyAction::PageUp,
        KeyCode::PageDown => KeyAction::PageDown,
        _ => KeyAction::Ignore,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char('q'))), KeyAction::Quit);
        assert_eq!(handle_key_event(key(KeyCode::Esc)), KeyAction::Quit);
        assert_eq!(
            handle_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyAction::Quit
        );
    }

    #[test]
    fn test_toggles_and_unbound_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Char('s'))), KeyAction::ToggleGlyphs);
        assert_eq!(handle_key_event(key(KeyCode::Char('p'))), KeyAction::TogglePerCore);
        assert_eq!(handle_key_event(key(KeyCode::Char('c'))), KeyAction::Ignore);
        assert_eq!(handle_key_event(key(KeyCode::Left)), KeyAction::Ignore);
    }

    #[test]
    fn test_scroll_keys() {
        assert_eq!(handle_key_event(key(KeyCode::Up)), KeyAction::ScrollUp);
        assert_eq!(handle_key_event(key(KeyCode::Down)), KeyAction::ScrollDown);
        assert_eq!(handle_key_event(key(KeyCode::PageUp)), KeyAction::PageUp);
        assert_eq!(handle_key_event(key(KeyCode::PageDown)), KeyAction::PageDown);
    }
}
