//! # statechart-core
//!
//! Hierarchical finite state machine engine.
//!
//! This crate provides:
//! - A state registry with parent links forming the state tree
//! - An active path owning the live state instances, root to leaf
//! - Run-to-completion event dispatch with leaf-to-root bubbling
//! - Hierarchical transitions diffed against the least common ancestor
//!
//! States are ordinary types implementing [`State`]; entering a state runs
//! its registered factory (entry action), leaving it runs `on_exit` and
//! drops the instance. Handlers request transitions through [`Control`];
//! the request is recorded and applied after the current event finishes its
//! walk up the active path, which keeps the path valid while handlers run.

pub mod error;
pub mod machine;
pub mod path;
pub mod queue;
pub mod registry;
pub mod state;

pub use error::FsmError;
pub use machine::{Fsm, FsmBuilder};
pub use path::ActivePath;
pub use queue::EventQueue;
pub use registry::{Registry, StateDescriptor};
pub use state::{BoxedState, Control, EntryError, FsmDescription, State, StateArgs, StateFactory};
