use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

use super::app::{App, Message, Mode};

/// Upper bound on how long one poll blocks waiting for input.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

pub fn handle_events(app: &App, timeout: Option<Duration>) -> Result<Option<Message>> {
    let timeout = timeout.map_or(POLL_INTERVAL, |t| t.min(POLL_INTERVAL));
    if event::poll(timeout)? {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                return Ok(None);
            }

            // When help is showing, handle scroll and dismiss keys
            if app.show_help {
                let msg = match key.code {
                    KeyCode::Char('?') | KeyCode::Esc => Some(Message::ToggleHelp),
                    KeyCode::Char('j') | KeyCode::Down => Some(Message::ScrollHelpDown),
                    KeyCode::Char('k') | KeyCode::Up => Some(Message::ScrollHelpUp),
                    _ => None,
                };
                return Ok(msg);
            }

            let msg = match app.mode {
                Mode::Normal => handle_normal_mode(key.code, key.modifiers),
                Mode::Search => handle_search_mode(key.code),
                Mode::Jump => handle_jump_mode(key.code),
            };

            return Ok(msg);
        }
    }

    Ok(None)
}

fn handle_normal_mode(code: KeyCode, modifiers: KeyModifiers) -> Option<Message> {
    match code {
        KeyCode::Char('q') => Some(Message::Quit),
        KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => Some(Message::Quit),
        KeyCode::Char('?') => Some(Message::ToggleHelp),

        // Tabs
        KeyCode::Char('[') | KeyCode::Left | KeyCode::BackTab => Some(Message::PrevTab),
        KeyCode::Char(']') | KeyCode::Right | KeyCode::Tab => Some(Message::NextTab),

        // Navigation
        KeyCode::Char('j') | KeyCode::Down => Some(Message::NextItem),
        KeyCode::Char('k') | KeyCode::Up => Some(Message::PrevItem),
        KeyCode::Char('g') | KeyCode::Home => Some(Message::FirstItem),
        KeyCode::Char('G') | KeyCode::End => Some(Message::LastItem),
        KeyCode::Char('d') if modifiers.contains(KeyModifiers::CONTROL) => Some(Message::PageDown),
        KeyCode::Char('u') if modifiers.contains(KeyModifiers::CONTROL) => Some(Message::PageUp),
        KeyCode::PageDown => Some(Message::PageDown),
        KeyCode::PageUp => Some(Message::PageUp),

        // Search
        KeyCode::Char('/') => Some(Message::EnterSearch),
        KeyCode::Esc => Some(Message::ClearSearch),

        // Sort and filters
        KeyCode::Char('s') => Some(Message::CycleSort),
        KeyCode::Char('1') => Some(Message::CycleSector),
        KeyCode::Char('2') => Some(Message::CycleCountry),
        KeyCode::Char('3') => Some(Message::CycleOwner),
        KeyCode::Char('4') => Some(Message::CycleDomain),
        KeyCode::Char('r') => Some(Message::Reset),

        // Quick jump
        KeyCode::Char('f') => Some(Message::EnterJump),

        // Links
        KeyCode::Char('o') | KeyCode::Enter => Some(Message::OpenUrl),
        KeyCode::Char('c') => Some(Message::CopyUrl),

        _ => None,
    }
}

fn handle_search_mode(code: KeyCode) -> Option<Message> {
    match code {
        KeyCode::Esc | KeyCode::Enter => Some(Message::ExitSearch),
        KeyCode::Backspace => Some(Message::SearchBackspace),
        KeyCode::Char(c) => Some(Message::SearchInput(c)),
        _ => None,
    }
}

fn handle_jump_mode(code: KeyCode) -> Option<Message> {
    match code {
        KeyCode::Char(c) if c.is_ascii_alphabetic() || c == '#' => Some(Message::JumpTo(c)),
        _ => Some(Message::CancelJump),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_captures_letters() {
        assert!(matches!(
            handle_search_mode(KeyCode::Char('q')),
            Some(Message::SearchInput('q'))
        ));
        assert!(matches!(
            handle_search_mode(KeyCode::Enter),
            Some(Message::ExitSearch)
        ));
    }

    #[test]
    fn test_jump_mode() {
        assert!(matches!(
            handle_jump_mode(KeyCode::Char('m')),
            Some(Message::JumpTo('m'))
        ));
        assert!(matches!(
            handle_jump_mode(KeyCode::Char('#')),
            Some(Message::JumpTo('#'))
        ));
        assert!(matches!(
            handle_jump_mode(KeyCode::Esc),
            Some(Message::CancelJump)
        ));
    }

    #[test]
    fn test_ctrl_c_quits() {
        assert!(matches!(
            handle_normal_mode(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Some(Message::Quit)
        ));
        assert!(matches!(
            handle_normal_mode(KeyCode::Char('c'), KeyModifiers::NONE),
            Some(Message::CopyUrl)
        ));
    }
}
