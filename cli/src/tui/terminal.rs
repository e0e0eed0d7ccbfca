use std::io;

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

pub const MIN_WIDTH: u16 = 40;
pub const MIN_HEIGHT: u16 = 10;

pub type ChatTerminal = Terminal<CrosstermBackend<io::Stdout>>;

pub fn check_tui_support() -> Result<(), String> {
    if !atty::is(atty::Stream::Stdout) || !atty::is(atty::Stream::Stdin) {
        return Err("stdin/stdout is not a terminal".to_string());
    }
    if !cfg!(windows) && std::env::var("TERM").is_err() {
        return Err("TERM environment variable not set".to_string());
    }
    let (width, height) = terminal::size().map_err(|e| format!("terminal size failed: {e}"))?;
    if width < MIN_WIDTH || height < MIN_HEIGHT {
        return Err(format!(
            "terminal too small ({width}x{height}), need at least {MIN_WIDTH}x{MIN_HEIGHT}"
        ));
    }
    Ok(())
}

pub fn setup_terminal() -> Result<ChatTerminal, String> {
    enable_raw_mode().map_err(|e| e.to_string())?;
    let mut stdout = io::stdout();
    let entered = execute!(stdout, terminal::EnterAlternateScreen, EnableMouseCapture)
        .map_err(|e| e.to_string());
    undo_on_err(entered, || {
        let _ = disable_raw_mode();
    })?;
    let backend = CrosstermBackend::new(stdout);
    undo_on_err(Terminal::new(backend).map_err(|e| e.to_string()), || {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), terminal::LeaveAlternateScreen, DisableMouseCapture);
    })
}

/// Runs `undo` when `res` is an error, so a half-initialised terminal is handed back.
fn undo_on_err<T>(res: Result<T, String>, undo: impl FnOnce()) -> Result<T, String> {
    if res.is_err() {
        undo();
    }
    res
}

pub fn restore_terminal(terminal: &mut ChatTerminal) {
    let _ = disable_raw_mode();
    let _ = execute!(
        terminal.backend_mut(),
        terminal::LeaveAlternateScreen,
        DisableMouseCapture
    );
    let _ = terminal.show_cursor();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn failed_setup_step_runs_its_undo() {
        let undone = Cell::new(0);
        let res: Result<(), String> = undo_on_err(Err("no alt screen".into()), || {
            undone.set(undone.get() + 1)
        });
        assert!(res.is_err());
        assert_eq!(undone.get(), 1);

        let ok = undo_on_err(Ok(7), || undone.set(undone.get() + 1));
        assert_eq!(ok, Ok(7));
        assert_eq!(undone.get(), 1);
    }
}
