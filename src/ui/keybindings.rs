//! Keyboard shortcuts for the form.
//!
//! Single source of truth for both key dispatch and the footer hint line.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::{Color, Style},
    text::{Line, Span},
};

/// What a shortcut does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Next step, or submit on the last step
    Advance,
    /// Previous step, or quit on the first one
    Back,
    FocusNext,
    FocusPrev,
    Quit,
}

/// A keyboard shortcut definition
#[derive(Debug, Clone)]
pub struct Shortcut {
    /// Primary key for this shortcut
    pub key: KeyCode,
    /// Alternative key bound to the same action
    pub alt_key: Option<KeyCode>,
    /// Whether Ctrl must be held
    pub ctrl: bool,
    pub description: &'static str,
    pub action: Action,
}

impl Shortcut {
    /// Format key for display (e.g., "Enter", "Ctrl+c/Ctrl+q")
    pub fn key_display(&self) -> String {
        let fmt = |code: &KeyCode| {
            if self.ctrl {
                format!("Ctrl+{}", format_keycode(code))
            } else {
                format_keycode(code)
            }
        };
        match &self.alt_key {
            Some(alt) => format!("{}/{}", fmt(&self.key), fmt(alt)),
            None => fmt(&self.key),
        }
    }

    /// Whether a key event triggers this shortcut
    pub fn matches(&self, event: KeyEvent) -> bool {
        if event.modifiers.contains(KeyModifiers::CONTROL) != self.ctrl {
            return false;
        }
        event.code == self.key || self.alt_key == Some(event.code)
    }
}

/// Format a KeyCode for display
fn format_keycode(key: &KeyCode) -> String {
    match key {
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "Shift+Tab".to_string(),
        _ => format!("{key:?}"),
    }
}

pub static SHORTCUTS: &[Shortcut] = &[
    Shortcut {
        key: KeyCode::Enter,
        alt_key: None,
        ctrl: false,
        description: "next / submit",
        action: Action::Advance,
    },
    Shortcut {
        key: KeyCode::Esc,
        alt_key: None,
        ctrl: false,
        description: "back",
        action: Action::Back,
    },
    Shortcut {
        key: KeyCode::Tab,
        alt_key: None,
        ctrl: false,
        description: "next field",
        action: Action::FocusNext,
    },
    Shortcut {
        key: KeyCode::BackTab,
        alt_key: None,
        ctrl: false,
        description: "prev field",
        action: Action::FocusPrev,
    },
    Shortcut {
        key: KeyCode::Char('c'),
        alt_key: Some(KeyCode::Char('q')),
        ctrl: true,
        description: "quit",
        action: Action::Quit,
    },
];

/// Map a key press to a form action; other keys go to the focused field
pub fn action_for(key: KeyEvent) -> Option<Action> {
    SHORTCUTS
        .iter()
        .find(|shortcut| shortcut.matches(key))
        .map(|shortcut| shortcut.action)
}

/// Footer line listing every shortcut
pub fn footer_line() -> Line<'static> {
    let mut spans = Vec::with_capacity(SHORTCUTS.len() * 2);
    for shortcut in SHORTCUTS {
        spans.push(Span::styled(
            shortcut.key_display(),
            Style::default().fg(Color::Yellow),
        ));
        spans.push(Span::raw(format!(" {}  ", shortcut.description)));
    }
    Line::from(spans)
}
