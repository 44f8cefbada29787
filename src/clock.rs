//! Settable wall clock for the watch display.

use chrono::{Duration, Local, NaiveDateTime, Timelike};

/// Local time plus a user-set offset.
///
/// Setting the time never touches the system clock; the difference between
/// the requested time of day and the wall clock is kept as an offset.
pub struct Clock {
    offset: Duration,
}

impl Clock {
    pub fn new() -> Self {
        Self {
            offset: Duration::zero(),
        }
    }

    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local() + self.offset
    }

    /// Current (hour, minute, second) of the displayed time.
    pub fn hms(&self) -> (u32, u32, u32) {
        let now = self.now();
        (now.hour(), now.minute(), now.second())
    }

    /// Millisecond of the current second; drives the blink phases.
    pub fn millis(&self) -> u32 {
        self.now().nanosecond() / 1_000_000
    }

    /// Moves the displayed time of day to `hour:min:sec`, keeping the date.
    pub fn set_time(&mut self, hour: u32, min: u32, sec: u32) {
        let wall = Local::now().naive_local();
        let shown = wall + self.offset;
        if let Some(target) = shown.date().and_hms_opt(hour, min, sec) {
            self.offset = target - wall;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}
