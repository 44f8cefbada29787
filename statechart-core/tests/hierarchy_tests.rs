//! End-to-end tests for a small three-state hierarchy.
//!
//! The machine has two base states and one child state, a shared observable
//! integer written by every hook, and a trace observer that outlives the
//! machine so teardown order can be checked after drop.

use std::cell::RefCell;
use std::rc::Rc;

use statechart_core::{Control, Fsm, FsmBuilder, FsmDescription, FsmError, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Sid {
    S1,
    S2,
    S3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ev {
    Ev1,
    Ev2,
    Ev3,
}

type Trace = Rc<RefCell<Vec<&'static str>>>;

struct Shared {
    data: i32,
    d2: i32,
    trace: Trace,
}

struct Desc;

impl FsmDescription for Desc {
    type StateId = Sid;
    type Event = Ev;
    type Context = Shared;
}

struct State1;

impl State<Desc> for State1 {
    fn on_event(&mut self, event: &Ev, ctx: &mut Shared, ctl: &mut Control<'_, Desc>) -> bool {
        ctx.data = 1;
        match event {
            Ev::Ev1 => ctl.transition(Sid::S2),
            Ev::Ev3 => ctl.transition(Sid::S3),
            Ev::Ev2 => {}
        }
        false
    }

    fn on_exit(&mut self, ctx: &mut Shared) {
        ctx.data = 10;
        ctx.trace.borrow_mut().push("exit s1");
    }
}

struct State2;

impl State<Desc> for State2 {
    fn on_event(&mut self, event: &Ev, ctx: &mut Shared, ctl: &mut Control<'_, Desc>) -> bool {
        match event {
            Ev::Ev1 => ctl.transition(Sid::S1),
            Ev::Ev2 => {
                ctx.data = 15;
                ctx.d2 = 2;
            }
            Ev::Ev3 => ctl.transition(Sid::S3),
        }
        false
    }

    fn on_exit(&mut self, ctx: &mut Shared) {
        ctx.data = 11;
        ctx.trace.borrow_mut().push("exit s2");
    }
}

// Child of S1; events it does not consume bubble to its parent.
struct State3;

impl State<Desc> for State3 {
    fn on_event(&mut self, event: &Ev, ctx: &mut Shared, ctl: &mut Control<'_, Desc>) -> bool {
        match event {
            Ev::Ev1 => ctl.transition(Sid::S1),
            Ev::Ev2 => ctx.data = 115,
            Ev::Ev3 => {}
        }
        false
    }

    fn on_exit(&mut self, ctx: &mut Shared) {
        ctx.data = 111;
        ctx.trace.borrow_mut().push("exit s3");
    }
}

fn machine(trace: &Trace) -> Fsm<Desc> {
    let mut builder = FsmBuilder::<Desc>::new();
    builder
        .add_state(Sid::S1, None, |mut args| {
            args.ctx().data = 0;
            args.ctx().trace.borrow_mut().push("enter s1");
            Ok(Box::new(State1))
        })
        .unwrap();
    builder
        .add_state(Sid::S2, None, |mut args| {
            args.ctx().data = 5;
            args.ctx().trace.borrow_mut().push("enter s2");
            Ok(Box::new(State2))
        })
        .unwrap();
    builder
        .add_state(Sid::S3, Some(Sid::S1), |mut args| {
            args.ctx().data = 15;
            args.ctx().trace.borrow_mut().push("enter s3");
            Ok(Box::new(State3))
        })
        .unwrap();
    builder.build(Shared {
        data: -1,
        d2: -2,
        trace: trace.clone(),
    })
}

#[test]
fn start_runs_entry_action() {
    let trace = Trace::default();
    let mut fsm = machine(&trace);

    assert_eq!(fsm.context().data, -1);
    assert!(!fsm.is_running());

    fsm.set_start_state(Sid::S1).unwrap();
    assert_eq!(fsm.context().data, 0);
    assert_eq!(fsm.current_state(), Some(Sid::S1));
    assert!(fsm.is_running());
}

#[test]
fn scenario_walkthrough() {
    let trace = Trace::default();
    let mut fsm = machine(&trace);
    fsm.set_start_state(Sid::S1).unwrap();

    // Handled without a transition.
    fsm.post_event(Ev::Ev2).unwrap();
    assert_eq!(fsm.context().data, 1);
    assert_eq!(fsm.current_state(), Some(Sid::S1));

    // S1 -> S2: exit action runs before the entry action.
    fsm.post_event(Ev::Ev1).unwrap();
    assert_eq!(fsm.context().data, 5);
    assert_eq!(fsm.context().d2, -2);
    assert_eq!(fsm.current_state(), Some(Sid::S2));

    // S2 handles and also writes the machine context.
    fsm.post_event(Ev::Ev2).unwrap();
    assert_eq!(fsm.context().data, 15);
    assert_eq!(fsm.context().d2, 2);
    assert_eq!(fsm.current_state(), Some(Sid::S2));

    // Back to S1.
    fsm.post_event(Ev::Ev1).unwrap();
    assert_eq!(fsm.context().data, 0);
    assert_eq!(fsm.context().d2, 2);
    assert_eq!(fsm.current_state(), Some(Sid::S1));

    // S1 -> S3: S1 is S3's parent and already active, so it is not
    // exited and not re-entered.
    let exits_before = trace.borrow().len();
    fsm.post_event(Ev::Ev3).unwrap();
    assert_eq!(fsm.context().data, 15);
    assert_eq!(fsm.current_state(), Some(Sid::S3));
    assert_eq!(fsm.depth(), 2);
    assert!(!trace.borrow()[exits_before..].contains(&"exit s1"));
    assert!(!trace.borrow()[exits_before..].contains(&"enter s1"));

    // An event S3 does not consume bubbles to its parent S1.
    fsm.post_event(Ev::Ev2).unwrap();
    assert_eq!(fsm.context().data, 1);
    assert_eq!(fsm.current_state(), Some(Sid::S3));
}

#[test]
fn drop_exits_active_states_leaf_to_root() {
    let trace = Trace::default();
    let mut fsm = machine(&trace);
    fsm.set_start_state(Sid::S1).unwrap();
    fsm.post_event(Ev::Ev3).unwrap();
    assert_eq!(fsm.current_state(), Some(Sid::S3));

    drop(fsm);

    let recorded = trace.borrow();
    assert_eq!(
        &recorded[recorded.len() - 2..],
        &["exit s3", "exit s1"],
        "teardown must exit the leaf before its parent"
    );
}

#[test]
fn stop_is_equivalent_to_teardown_and_idempotent() {
    let trace = Trace::default();
    let mut fsm = machine(&trace);
    fsm.set_start_state(Sid::S1).unwrap();
    fsm.post_event(Ev::Ev3).unwrap();

    fsm.stop();
    assert!(!fsm.is_running());
    assert_eq!(fsm.current_state(), None);
    fsm.stop();

    let err = fsm.post_event(Ev::Ev2).unwrap_err();
    assert!(matches!(err, FsmError::NotStarted));

    let recorded = trace.borrow();
    assert_eq!(&recorded[recorded.len() - 2..], &["exit s3", "exit s1"]);
}

#[test]
fn every_entry_has_a_matching_exit() {
    let trace = Trace::default();
    let mut fsm = machine(&trace);
    fsm.set_start_state(Sid::S1).unwrap();
    for event in [Ev::Ev2, Ev::Ev1, Ev::Ev2, Ev::Ev1, Ev::Ev3, Ev::Ev2] {
        fsm.post_event(event).unwrap();
    }
    drop(fsm);

    let recorded = trace.borrow();
    for state in ["s1", "s2", "s3"] {
        let enters = recorded
            .iter()
            .filter(|line| **line == format!("enter {state}"))
            .count();
        let exits = recorded
            .iter()
            .filter(|line| **line == format!("exit {state}"))
            .count();
        assert_eq!(enters, exits, "unbalanced entry/exit for {state}");
    }
}
