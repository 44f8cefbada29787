//! The watch state machine: Root with ShowTime and SetTime children.

use statechart_core::{Control, Fsm, FsmBuilder, FsmDescription, FsmError, State, StateArgs};

use crate::clock::Clock;
use crate::display::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchStateId {
    Root,
    ShowTime,
    SetTime,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchEvent {
    Tick,
    Key(char),
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
}

/// Data shared by all watch states.
pub struct Watch {
    pub clock: Clock,
    pub display: Display,
}

pub struct WatchDesc;

impl FsmDescription for WatchDesc {
    type StateId = WatchStateId;
    type Event = WatchEvent;
    type Context = Watch;
}

/// Common behavior below every mode: quitting the application.
struct RootState;

impl State<WatchDesc> for RootState {
    fn on_event(
        &mut self,
        event: &WatchEvent,
        watch: &mut Watch,
        ctl: &mut Control<'_, WatchDesc>,
    ) -> bool {
        match event {
            WatchEvent::ArrowLeft if watch.display.cursor() == 0 => {
                ctl.stop();
                true
            }
            WatchEvent::Key('x') | WatchEvent::Key('q') => {
                ctl.stop();
                true
            }
            _ => false,
        }
    }
}

struct ShowTimeState;

impl State<WatchDesc> for ShowTimeState {
    fn on_event(
        &mut self,
        event: &WatchEvent,
        watch: &mut Watch,
        ctl: &mut Control<'_, WatchDesc>,
    ) -> bool {
        match event {
            WatchEvent::Tick => {
                watch.display.print_time(&watch.clock);
            }
            WatchEvent::ArrowUp | WatchEvent::ArrowDown => {
                ctl.transition(WatchStateId::SetTime);
            }
            _ => {}
        }
        false
    }
}

/// Digit editing for the time of day; commits when the cursor is moved
/// right past the last digit.
struct SetTimeState {
    hour: u32,
    min: u32,
    sec: u32,
}

impl SetTimeState {
    fn enter(mut args: StateArgs<'_, WatchDesc>) -> Self {
        let watch = args.ctx();
        watch.display.set_mode("st");
        let (hour, min, sec) = watch.clock.hms();
        Self { hour, min, sec }
    }

    fn adjust_up(&mut self, column: usize) {
        fn add(value: &mut u32, step: u32, limit: u32) {
            if *value + step < limit {
                *value += step;
            }
        }
        match column {
            1 => add(&mut self.hour, 10, 24),
            2 => add(&mut self.hour, 1, 24),
            3 => add(&mut self.min, 10, 60),
            4 => add(&mut self.min, 1, 60),
            5 => add(&mut self.sec, 10, 60),
            6 => add(&mut self.sec, 1, 60),
            _ => {}
        }
    }

    fn adjust_down(&mut self, column: usize) {
        fn sub(value: &mut u32, step: u32) {
            if *value >= step {
                *value -= step;
            }
        }
        match column {
            1 => sub(&mut self.hour, 10),
            2 => sub(&mut self.hour, 1),
            3 => sub(&mut self.min, 10),
            4 => sub(&mut self.min, 1),
            5 => sub(&mut self.sec, 10),
            6 => sub(&mut self.sec, 1),
            _ => {}
        }
    }
}

impl State<WatchDesc> for SetTimeState {
    fn on_event(
        &mut self,
        event: &WatchEvent,
        watch: &mut Watch,
        ctl: &mut Control<'_, WatchDesc>,
    ) -> bool {
        match event {
            WatchEvent::Tick => {
                watch.display.print_groups(self.hour, self.min, self.sec, true);
                false
            }
            WatchEvent::ArrowLeft => {
                watch.display.cursor_left();
                true
            }
            WatchEvent::ArrowRight => {
                if !watch.display.cursor_right() {
                    // Past the last digit: commit and go back to the time.
                    watch.display.reset_cursor();
                    watch.clock.set_time(self.hour, self.min, self.sec);
                    ctl.transition(WatchStateId::ShowTime);
                }
                true
            }
            WatchEvent::ArrowUp => {
                if watch.display.cursor() == 0 {
                    ctl.transition(WatchStateId::ShowTime);
                } else {
                    self.adjust_up(watch.display.cursor());
                }
                true
            }
            WatchEvent::ArrowDown => {
                if watch.display.cursor() == 0 {
                    ctl.transition(WatchStateId::ShowTime);
                } else {
                    self.adjust_down(watch.display.cursor());
                }
                true
            }
            _ => false,
        }
    }
}

/// Wires up the watch machine. The caller still picks the start state.
pub fn build_watch() -> Result<Fsm<WatchDesc>, FsmError> {
    let mut builder = FsmBuilder::<WatchDesc>::new();
    builder.add_state(WatchStateId::Root, None, |_args| Ok(Box::new(RootState)))?;
    builder.add_state(
        WatchStateId::ShowTime,
        Some(WatchStateId::Root),
        |mut args| {
            args.ctx().display.set_mode("ti");
            Ok(Box::new(ShowTimeState))
        },
    )?;
    builder.add_state(WatchStateId::SetTime, Some(WatchStateId::Root), |args| {
        Ok(Box::new(SetTimeState::enter(args)))
    })?;
    Ok(builder.build(Watch {
        clock: Clock::new(),
        display: Display::new(),
    }))
}
