//! Engine error types.

use std::fmt;

use thiserror::Error;

/// Errors from the state machine engine.
#[derive(Debug, Error)]
pub enum FsmError {
    #[error("duplicate state: {state}")]
    DuplicateState { state: String },

    #[error("unknown state: {state}")]
    UnknownState { state: String },

    #[error("unknown parent: state {state} names parent {parent}, which is never registered")]
    UnknownParent { state: String, parent: String },

    #[error("state hierarchy contains a cycle through {state}")]
    CycleDetected { state: String },

    #[error("machine already started")]
    AlreadyStarted,

    #[error("machine not running")]
    NotStarted,

    #[error("event queue full (capacity {capacity})")]
    QueueOverflow { capacity: usize },

    #[error("entering state {state} failed")]
    ConstructionFailed {
        state: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("transition already pending: {pending} overridden by {requested}")]
    TransitionAlreadyPending { pending: String, requested: String },
}

impl FsmError {
    /// Returns whether the error left the machine in a running state.
    ///
    /// Registry and start-time errors have no side effects; dispatch-time
    /// errors abort the current event but keep the entered prefix alive.
    pub fn is_dispatch_error(&self) -> bool {
        matches!(
            self,
            FsmError::ConstructionFailed { .. }
                | FsmError::TransitionAlreadyPending { .. }
                | FsmError::QueueOverflow { .. }
        )
    }
}

/// Renders an opaque state identifier for error reporting.
pub(crate) fn state_name(id: impl fmt::Debug) -> String {
    format!("{id:?}")
}
