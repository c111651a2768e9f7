//! Terminal session that restores the screen on drop.

use anyhow::Result;
use crossterm::{
    cursor::{Hide, Show},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Frame, Terminal};
use std::io::{self, Stdout, Write};

/// Raw-mode alternate-screen terminal, restored when dropped.
///
/// Restoration also happens on early `?` returns and, through
/// [`install_panic_hook`], on panics.
pub struct TerminalSession {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    active: bool,
}

impl TerminalSession {
    /// Enter raw mode and the alternate screen
    pub fn start() -> Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            Self::restore();
            return Err(e.into());
        }
        match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => Ok(Self {
                terminal,
                active: true,
            }),
            Err(e) => {
                Self::restore();
                Err(e.into())
            }
        }
    }

    pub fn draw<F>(&mut self, render: F) -> Result<()>
    where
        F: FnOnce(&mut Frame),
    {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Leave the alternate screen; safe to call more than once
    pub fn restore() {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
        let _ = io::stdout().flush();
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if std::mem::replace(&mut self.active, false) {
            Self::restore();
        }
    }
}

/// Install panic hook that restores terminal before printing panic.
pub fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        TerminalSession::restore();
        original_hook(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_restore_is_callable_without_session() {
        // Terminal ops fail without a tty but must not panic
        TerminalSession::restore();
        TerminalSession::restore();
    }
}
