//! Raw-mode keyboard input for the watch.

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal;

use crate::states::WatchEvent;

/// Keeps the terminal in raw mode for its lifetime.
pub struct RawMode;

impl RawMode {
    pub fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(RawMode)
    }
}

impl Drop for RawMode {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

/// Waits up to `timeout` for a key press and translates it to a watch
/// event. Returns `None` on timeout or for keys the watch ignores.
pub fn poll_key(timeout: Duration) -> io::Result<Option<WatchEvent>> {
    if !event::poll(timeout)? {
        return Ok(None);
    }
    match event::read()? {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            // Ctrl-C acts as the quit key while the terminal is raw.
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                return Ok(Some(WatchEvent::Key('q')));
            }
            Ok(match key.code {
                KeyCode::Up => Some(WatchEvent::ArrowUp),
                KeyCode::Down => Some(WatchEvent::ArrowDown),
                KeyCode::Left => Some(WatchEvent::ArrowLeft),
                KeyCode::Right => Some(WatchEvent::ArrowRight),
                KeyCode::Char(ch) => Some(WatchEvent::Key(ch)),
                _ => None,
            })
        }
        _ => Ok(None),
    }
}
