//! The active path: live state instances, root first, leaf last.

use crate::state::{BoxedState, FsmDescription, State};

struct PathEntry<D: FsmDescription> {
    id: D::StateId,
    instance: BoxedState<D>,
}

/// Owns the chain of currently entered states.
///
/// Each instance is owned exclusively by its slot; pushing and popping is
/// orchestrated by the machine so that entry and exit actions see the
/// context. Positions count from the root: index 0 is the outermost state,
/// `depth() - 1` the leaf.
pub struct ActivePath<D: FsmDescription> {
    entries: Vec<PathEntry<D>>,
}

impl<D: FsmDescription> ActivePath<D> {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The innermost active state, if the machine is running.
    pub fn leaf_id(&self) -> Option<D::StateId> {
        self.entries.last().map(|entry| entry.id)
    }

    pub fn id_at(&self, index: usize) -> Option<D::StateId> {
        self.entries.get(index).map(|entry| entry.id)
    }

    /// Iterates the active identifiers from root to leaf.
    pub fn ids(&self) -> impl Iterator<Item = D::StateId> + '_ {
        self.entries.iter().map(|entry| entry.id)
    }

    /// Length of the longest common prefix between the active path and a
    /// root-first ancestor chain.
    pub(crate) fn common_prefix_len(&self, chain: &[D::StateId]) -> usize {
        self.entries
            .iter()
            .zip(chain)
            .take_while(|(entry, id)| entry.id == **id)
            .count()
    }

    pub(crate) fn push(&mut self, id: D::StateId, instance: BoxedState<D>) {
        self.entries.push(PathEntry { id, instance });
    }

    pub(crate) fn pop(&mut self) -> Option<(D::StateId, BoxedState<D>)> {
        self.entries.pop().map(|entry| (entry.id, entry.instance))
    }

    pub(crate) fn state_mut(&mut self, index: usize) -> &mut dyn State<D> {
        self.entries[index].instance.as_mut()
    }
}
