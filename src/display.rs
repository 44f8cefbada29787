//! Single-line watch face renderer.
//!
//! The face is ` mm hh:mm:ss` where `mm` is a two-letter mode indicator.
//! A cursor column selects which digit the arrow keys edit; column 0 is the
//! line start, where up/down switch modes instead.

use std::io::{self, Write};

use crate::clock::Clock;

/// Terminal columns addressed by the cursor, line start first, then the
/// six digit positions of `hh:mm:ss`.
const CURSOR_COLUMNS: [usize; 7] = [0, 4, 5, 7, 8, 10, 11];

pub struct Display {
    cursor: usize,
    mode: String,
}

impl Display {
    pub fn new() -> Self {
        Self {
            cursor: 0,
            mode: String::new(),
        }
    }

    pub fn set_mode(&mut self, mode: &str) {
        self.mode = mode.to_string();
    }

    /// Current cursor position, `0..=6`.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Moves the cursor one digit left; false if already at the line start.
    pub fn cursor_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    /// Moves the cursor one digit right; false if already at the last digit.
    pub fn cursor_right(&mut self) -> bool {
        if self.cursor + 1 >= CURSOR_COLUMNS.len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = 0;
    }

    /// Paints the running time; the colon blinks once per second.
    pub fn print_time(&self, clock: &Clock) {
        let (hour, min, sec) = clock.hms();
        let millis = clock.millis();
        let colon = (250..750).contains(&millis);
        self.print_groups(hour, min, sec, colon);
    }

    /// Paints three two-digit groups with or without separating colons.
    pub fn print_groups(&self, grp1: u32, grp2: u32, grp3: u32, show_colon: bool) {
        let sep = if show_colon { ':' } else { ' ' };
        let line = format!(
            " {:2} {:02}{}{:02}{}{:02}",
            self.mode, grp1, sep, grp2, sep, grp3
        );
        self.render(&line);
    }

    /// Repaints the line and parks the terminal cursor on the edit column.
    fn render(&self, line: &str) {
        let column = CURSOR_COLUMNS[self.cursor.min(CURSOR_COLUMNS.len() - 1)];
        print!("\r{}\r{}", line, &line[..column.min(line.len())]);
        io::stdout().flush().ok();
    }
}

impl Default for Display {
    fn default() -> Self {
        Self::new()
    }
}
