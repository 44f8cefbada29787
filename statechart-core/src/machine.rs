//! The machine facade: setup, run-to-completion dispatch, transitions.

use crate::error::{state_name, FsmError};
use crate::path::ActivePath;
use crate::queue::EventQueue;
use crate::registry::Registry;
use crate::state::{
    BoxedState, Control, EntryError, FsmDescription, Pending, StateArgs, TransitionSlot,
};

const DEFAULT_QUEUE_CAPACITY: usize = 16;

/// Collects state registrations and configuration before the machine runs.
///
/// Building consumes the builder, so the registry is frozen by construction
/// once the machine exists.
pub struct FsmBuilder<D: FsmDescription> {
    registry: Registry<D>,
    queue_capacity: usize,
    strict_transitions: bool,
}

impl<D: FsmDescription> FsmBuilder<D> {
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            strict_transitions: false,
        }
    }

    /// Registers a state.
    ///
    /// `factory` runs every time the state is entered; its side effects are
    /// the entry action. States may be registered in any order, so `parent`
    /// may name a state that is added later.
    pub fn add_state<F>(
        &mut self,
        id: D::StateId,
        parent: Option<D::StateId>,
        factory: F,
    ) -> Result<&mut Self, FsmError>
    where
        F: Fn(StateArgs<'_, D>) -> Result<BoxedState<D>, EntryError> + 'static,
    {
        self.registry.add(id, parent, Box::new(factory))?;
        Ok(self)
    }

    /// Overrides the event queue capacity (default 16).
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    /// Makes a second transition request within one handler an error
    /// instead of a last-write-wins override.
    pub fn with_strict_transitions(mut self) -> Self {
        self.strict_transitions = true;
        self
    }

    /// Finishes setup. `context` is the user data shared by every state.
    pub fn build(self, context: D::Context) -> Fsm<D> {
        Fsm {
            registry: self.registry,
            path: ActivePath::new(),
            queue: EventQueue::new(self.queue_capacity),
            slot: TransitionSlot::new(),
            strict: self.strict_transitions,
            started: false,
            context,
        }
    }
}

impl<D: FsmDescription> Default for FsmBuilder<D> {
    fn default() -> Self {
        Self::new()
    }
}

/// A running hierarchical state machine.
///
/// Events are processed one at a time to completion: each event walks the
/// active path leaf-to-root until a handler consumes it or requests a
/// transition, and only then is the next queued event dequeued. Posting
/// from within a handler therefore never reenters dispatch; handlers only
/// see the enqueue-side of the queue through [`Control`].
pub struct Fsm<D: FsmDescription> {
    registry: Registry<D>,
    path: ActivePath<D>,
    queue: EventQueue<D::Event>,
    slot: TransitionSlot<D::StateId>,
    strict: bool,
    started: bool,
    context: D::Context,
}

impl<D: FsmDescription> Fsm<D> {
    pub fn builder() -> FsmBuilder<D> {
        FsmBuilder::new()
    }

    /// Starts the machine by entering `target` and all its ancestors,
    /// root first.
    ///
    /// Parent links are checked here: a parent that was never registered
    /// reports `UnknownParent`, a parent loop `CycleDetected`. Fails with
    /// `AlreadyStarted` on a second call.
    pub fn set_start_state(&mut self, target: D::StateId) -> Result<(), FsmError> {
        if self.started {
            return Err(FsmError::AlreadyStarted);
        }
        self.registry.validate()?;
        self.registry.ancestor_chain(target)?;
        self.started = true;
        tracing::debug!("starting machine at {:?}", target);
        self.apply_target(Pending::To(target))
    }

    /// Posts an event and drains the queue.
    ///
    /// Events already queued by handlers are delivered first, in FIFO
    /// order. Fails with `NotStarted` before `set_start_state` or after the
    /// machine has terminated, and with `QueueOverflow` when the queue is
    /// at capacity (the event is dropped).
    pub fn post_event(&mut self, event: D::Event) -> Result<(), FsmError> {
        if !self.started || self.path.is_empty() {
            return Err(FsmError::NotStarted);
        }
        self.queue.push(event)?;
        self.drain_queue()
    }

    /// The leaf state, or `None` once the machine has terminated.
    pub fn current_state(&self) -> Option<D::StateId> {
        self.path.leaf_id()
    }

    pub fn is_running(&self) -> bool {
        !self.path.is_empty()
    }

    /// Number of currently entered states.
    pub fn depth(&self) -> usize {
        self.path.depth()
    }

    /// Identifier at `index` on the active path, root first.
    pub fn state_id_at(&self, index: usize) -> Option<D::StateId> {
        self.path.id_at(index)
    }

    pub fn context(&self) -> &D::Context {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut D::Context {
        &mut self.context
    }

    pub fn registry(&self) -> &Registry<D> {
        &self.registry
    }

    /// Terminates the machine: exits every active state leaf-to-root and
    /// discards undelivered events. Idempotent.
    pub fn stop(&mut self) {
        self.exit_all();
    }

    fn drain_queue(&mut self) -> Result<(), FsmError> {
        while let Some(event) = self.queue.pop() {
            self.deliver(&event)?;
            if self.path.is_empty() {
                // Terminal transition: whatever is still queued is dropped.
                self.queue.clear();
                break;
            }
        }
        Ok(())
    }

    /// Delivers one event leaf-to-root.
    fn deliver(&mut self, event: &D::Event) -> Result<(), FsmError> {
        let leaf = match self.path.leaf_id() {
            Some(id) => id,
            None => return Ok(()),
        };
        for index in (0..self.path.depth()).rev() {
            let consumed = {
                let mut ctl = Control::new(&mut self.slot, &mut self.queue, leaf);
                self.path
                    .state_mut(index)
                    .on_event(event, &mut self.context, &mut ctl)
            };
            if let Some((pending, requested)) = self.slot.take_override() {
                if self.strict {
                    self.slot.clear();
                    return Err(FsmError::TransitionAlreadyPending { pending, requested });
                }
            }
            if let Some(pending) = self.slot.take() {
                // A transition ends the walk: the states above the common
                // ancestor are about to be exited.
                return self.apply_target(pending);
            }
            if consumed {
                break;
            }
        }
        Ok(())
    }

    /// Applies a recorded transition.
    ///
    /// Exits everything below the common ancestor leaf-to-root, then enters
    /// the target chain root-to-leaf. A constructor may itself request a
    /// transition; it is applied as soon as that constructor returns,
    /// before any deeper entry runs.
    fn apply_target(&mut self, pending: Pending<D::StateId>) -> Result<(), FsmError> {
        let mut next = Some(pending);
        while let Some(step) = next.take() {
            let target = match step {
                Pending::Stop => {
                    self.exit_all();
                    continue;
                }
                Pending::To(target) => target,
            };
            let chain = self.registry.ancestor_chain(target)?;
            let keep = self.path.common_prefix_len(&chain);
            while self.path.depth() > keep {
                self.pop_leaf();
            }
            for &id in &chain[keep..] {
                self.push_state(id)?;
                if let Some(redirect) = self.slot.take() {
                    next = Some(redirect);
                    break;
                }
            }
        }
        Ok(())
    }

    /// Enters `id` as the new leaf. On factory failure the path is left at
    /// the prefix entered so far.
    fn push_state(&mut self, id: D::StateId) -> Result<(), FsmError> {
        tracing::debug!("entering {:?}", id);
        let descriptor = self.registry.resolve(id)?;
        let args = StateArgs::new(&mut self.context, id, &mut self.slot);
        match descriptor.construct(args) {
            Ok(instance) => {
                self.path.push(id, instance);
                Ok(())
            }
            Err(source) => {
                self.slot.clear();
                Err(FsmError::ConstructionFailed {
                    state: state_name(id),
                    source,
                })
            }
        }
    }

    fn pop_leaf(&mut self) {
        if let Some((id, mut instance)) = self.path.pop() {
            tracing::debug!("exiting {:?}", id);
            instance.on_exit(&mut self.context);
        }
    }

    fn exit_all(&mut self) {
        while !self.path.is_empty() {
            self.pop_leaf();
        }
        self.queue.clear();
    }
}

impl<D: FsmDescription> Drop for Fsm<D> {
    fn drop(&mut self) {
        self.exit_all();
    }
}
