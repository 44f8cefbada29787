//! Shared fixture machine for the statechart benchmarks.
//!
//! A three-deep chain (`Root > Mid > Leaf`) with a sibling root `Side`, so
//! benchmarks can exercise leaf dispatch, full-path bubbling, and
//! cross-subtree transitions on the same machine.

use statechart_core::{Control, Fsm, FsmBuilder, FsmDescription, State};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Id {
    Root,
    Mid,
    Leaf,
    Side,
}

#[derive(Debug, Clone, Copy)]
pub enum Ev {
    /// Consumed by the leaf immediately.
    Consume,
    /// Bubbles through the whole path; only the root consumes it.
    Bubble,
    /// Alternates between the three-deep leaf and the sibling root.
    Hop,
}

#[derive(Default)]
pub struct Counters {
    pub handled: u64,
}

pub struct BenchDesc;

impl FsmDescription for BenchDesc {
    type StateId = Id;
    type Event = Ev;
    type Context = Counters;
}

struct Node {
    id: Id,
}

impl State<BenchDesc> for Node {
    fn on_event(&mut self, event: &Ev, ctx: &mut Counters, ctl: &mut Control<'_, BenchDesc>) -> bool {
        ctx.handled += 1;
        match event {
            Ev::Consume => true,
            Ev::Bubble => self.id == Id::Root,
            Ev::Hop => {
                let target = if ctl.leaf_state() == Id::Side {
                    Id::Leaf
                } else {
                    Id::Side
                };
                ctl.transition(target);
                true
            }
        }
    }
}

pub fn build_machine() -> Fsm<BenchDesc> {
    let mut builder = FsmBuilder::<BenchDesc>::new();
    for (id, parent) in [
        (Id::Root, None),
        (Id::Mid, Some(Id::Root)),
        (Id::Leaf, Some(Id::Mid)),
        (Id::Side, None),
    ] {
        builder
            .add_state(id, parent, move |_args| Ok(Box::new(Node { id })))
            .unwrap();
    }
    builder.build(Counters::default())
}
