//! State traits and the handler-side control surface.

use std::fmt;
use std::hash::Hash;

use crate::error::{state_name, FsmError};
use crate::queue::EventQueue;

/// Ties together the user-supplied types of one machine.
///
/// Implemented on a marker type; the implementation names the state
/// identifier enumeration, the event value type, and the context struct
/// shared by every state of the machine.
pub trait FsmDescription: 'static {
    /// Identifier enumeration with one value per state. Treated as an
    /// opaque key; equality and hashing are all the engine needs.
    type StateId: Copy + Eq + Hash + fmt::Debug + 'static;

    /// Event value type. The engine inspects no fields and takes ownership
    /// on enqueue.
    type Event: 'static;

    /// User data shared across all states of the machine, owned by the
    /// facade and lent to states during entry, event handling, and exit.
    type Context;
}

/// A live state instance on the active path.
///
/// Instances are created when the state is entered (the factory call is the
/// entry action) and torn down when it is left: `on_exit` runs first, then
/// the instance is dropped.
pub trait State<D: FsmDescription> {
    /// Handles one event. Return `true` to consume it and stop the walk
    /// towards the root; return `false` to let ancestors see it.
    ///
    /// Requesting a transition through `ctl` also stops the walk, whatever
    /// the return value.
    fn on_event(
        &mut self,
        event: &D::Event,
        ctx: &mut D::Context,
        ctl: &mut Control<'_, D>,
    ) -> bool;

    /// Exit action, invoked right before the instance is dropped.
    fn on_exit(&mut self, _ctx: &mut D::Context) {}
}

/// A state instance as stored on the active path.
pub type BoxedState<D> = Box<dyn State<D>>;

/// Error type a state factory may fail with.
pub type EntryError = Box<dyn std::error::Error + Send + Sync>;

/// Constructor bound to a registered state.
pub type StateFactory<D> =
    Box<dyn Fn(StateArgs<'_, D>) -> Result<BoxedState<D>, EntryError>>;

/// Recorded outcome of a `transition`/`stop` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Pending<Id> {
    /// Transition to the named state.
    To(Id),
    /// Terminal transition: exit every active state.
    Stop,
}

impl<Id: fmt::Debug> Pending<Id> {
    fn describe(&self) -> String {
        match self {
            Pending::To(id) => state_name(id),
            Pending::Stop => "<stop>".to_string(),
        }
    }
}

/// The single-slot pending transition record.
///
/// A handler (or an entering constructor) may request at most one
/// transition; a second request overrides the first, last write wins.
#[derive(Debug)]
pub(crate) struct TransitionSlot<Id> {
    pending: Option<Pending<Id>>,
    overridden: Option<(String, String)>,
}

impl<Id: Copy + fmt::Debug> TransitionSlot<Id> {
    pub(crate) fn new() -> Self {
        Self {
            pending: None,
            overridden: None,
        }
    }

    pub(crate) fn request(&mut self, next: Pending<Id>) {
        if let Some(prev) = self.pending {
            tracing::warn!(
                "transition request {} overrides pending {}",
                next.describe(),
                prev.describe()
            );
            self.overridden = Some((prev.describe(), next.describe()));
        }
        self.pending = Some(next);
    }

    pub(crate) fn take(&mut self) -> Option<Pending<Id>> {
        self.overridden = None;
        self.pending.take()
    }

    /// Returns the (pending, requested) pair of the last override, if any.
    pub(crate) fn take_override(&mut self) -> Option<(String, String)> {
        self.overridden.take()
    }

    pub(crate) fn clear(&mut self) {
        self.pending = None;
        self.overridden = None;
    }
}

/// Construction-time context handed to a state factory.
pub struct StateArgs<'a, D: FsmDescription> {
    ctx: &'a mut D::Context,
    state_id: D::StateId,
    slot: &'a mut TransitionSlot<D::StateId>,
}

impl<'a, D: FsmDescription> StateArgs<'a, D> {
    pub(crate) fn new(
        ctx: &'a mut D::Context,
        state_id: D::StateId,
        slot: &'a mut TransitionSlot<D::StateId>,
    ) -> Self {
        Self {
            ctx,
            state_id,
            slot,
        }
    }

    /// The machine context the state is being constructed into.
    pub fn ctx(&mut self) -> &mut D::Context {
        &mut *self.ctx
    }

    /// The identifier of the state being entered.
    pub fn state_id(&self) -> D::StateId {
        self.state_id
    }

    /// Redirects the machine to `target`.
    ///
    /// Applied as soon as the constructor returns, before any deeper state
    /// of the entry segment is entered.
    pub fn transition(&mut self, target: D::StateId) {
        self.slot.request(Pending::To(target));
    }
}

/// Handler-side control surface, passed to every `on_event` call.
pub struct Control<'a, D: FsmDescription> {
    slot: &'a mut TransitionSlot<D::StateId>,
    queue: &'a mut EventQueue<D::Event>,
    leaf: D::StateId,
}

impl<'a, D: FsmDescription> Control<'a, D> {
    pub(crate) fn new(
        slot: &'a mut TransitionSlot<D::StateId>,
        queue: &'a mut EventQueue<D::Event>,
        leaf: D::StateId,
    ) -> Self {
        Self { slot, queue, leaf }
    }

    /// Requests a transition to `target`.
    ///
    /// The request is recorded, not executed; the dispatcher applies it
    /// once the current handler returns. The transition is taken from the
    /// current leaf, even when an ancestor handler requests it.
    pub fn transition(&mut self, target: D::StateId) {
        self.slot.request(Pending::To(target));
    }

    /// Requests termination: every active state is exited leaf-to-root and
    /// the machine stops running.
    pub fn stop(&mut self) {
        self.slot.request(Pending::Stop);
    }

    /// Enqueues an event for delivery after the current one completes.
    ///
    /// Handlers cannot dispatch; the event is observed only once the
    /// current event has finished, including any transitions it triggered.
    pub fn post_event(&mut self, event: D::Event) -> Result<(), FsmError> {
        self.queue.push(event)
    }

    /// The identifier of the current leaf state.
    pub fn leaf_state(&self) -> D::StateId {
        self.leaf
    }
}
