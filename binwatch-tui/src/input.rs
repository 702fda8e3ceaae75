use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Action {
    None,
    Quit,
    /// Run `Synchronizer::refresh_now` out of band
    Refresh,
}

pub(crate) fn handle_key_event(key: KeyEvent) -> Action {
    use KeyCode::{Char, Esc, F};

    // Global quit shortcuts
    if key.code == Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return Action::Quit;
    }

    match key.code {
        Char('q') | Esc if key.modifiers.is_empty() => Action::Quit,
        Char('r' | 'R') | F(5) => Action::Refresh,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn quit_shortcuts() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q'), KeyModifiers::NONE)),
            Action::Quit
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Action::Quit
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('q'), KeyModifiers::ALT)),
            Action::None
        );
    }

    #[test]
    fn refresh_shortcuts() {
        assert_eq!(
            handle_key_event(key(KeyCode::Char('r'), KeyModifiers::NONE)),
            Action::Refresh
        );
        assert_eq!(
            handle_key_event(key(KeyCode::F(5), KeyModifiers::NONE)),
            Action::Refresh
        );
        assert_eq!(
            handle_key_event(key(KeyCode::Char('x'), KeyModifiers::NONE)),
            Action::None
        );
    }
}
