//! State descriptor registry.
//!
//! The registry maps every state identifier to its constructor and optional
//! parent. It is populated through the builder before the machine starts and
//! read-only afterwards; parent links may reference states registered later,
//! so `UnknownParent` and `CycleDetected` are only diagnosed by `validate`,
//! which runs at start time.

use std::collections::HashMap;
use std::fmt;

use crate::error::{state_name, FsmError};
use crate::state::{BoxedState, EntryError, FsmDescription, StateArgs, StateFactory};

/// Everything the engine knows about one registered state.
pub struct StateDescriptor<D: FsmDescription> {
    id: D::StateId,
    parent: Option<D::StateId>,
    factory: StateFactory<D>,
}

impl<D: FsmDescription> StateDescriptor<D> {
    pub fn id(&self) -> D::StateId {
        self.id
    }

    pub fn parent(&self) -> Option<D::StateId> {
        self.parent
    }

    /// Runs the factory; construction side effects are the entry action.
    pub(crate) fn construct(
        &self,
        args: StateArgs<'_, D>,
    ) -> Result<BoxedState<D>, EntryError> {
        (self.factory)(args)
    }
}

impl<D: FsmDescription> fmt::Debug for StateDescriptor<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateDescriptor")
            .field("id", &self.id)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// The frozen set of state descriptors of one machine.
pub struct Registry<D: FsmDescription> {
    descriptors: HashMap<D::StateId, StateDescriptor<D>>,
}

impl<D: FsmDescription> Registry<D> {
    pub(crate) fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// Binds `id` to its factory and optional parent.
    ///
    /// Fails with `DuplicateState` if `id` was already registered. The
    /// parent does not have to be registered yet.
    pub fn add(
        &mut self,
        id: D::StateId,
        parent: Option<D::StateId>,
        factory: StateFactory<D>,
    ) -> Result<(), FsmError> {
        if self.descriptors.contains_key(&id) {
            return Err(FsmError::DuplicateState {
                state: state_name(id),
            });
        }
        self.descriptors.insert(
            id,
            StateDescriptor {
                id,
                parent,
                factory,
            },
        );
        Ok(())
    }

    /// Looks up the descriptor for `id`.
    pub fn resolve(&self, id: D::StateId) -> Result<&StateDescriptor<D>, FsmError> {
        self.descriptors.get(&id).ok_or_else(|| FsmError::UnknownState {
            state: state_name(id),
        })
    }

    pub fn contains(&self, id: D::StateId) -> bool {
        self.descriptors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Returns the ancestor chain of `id`, root first, `id` last.
    pub fn ancestor_chain(&self, id: D::StateId) -> Result<Vec<D::StateId>, FsmError> {
        let mut chain = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if chain.len() >= self.descriptors.len() {
                return Err(FsmError::CycleDetected {
                    state: state_name(id),
                });
            }
            chain.push(current);
            cursor = self.resolve(current)?.parent();
        }
        chain.reverse();
        Ok(chain)
    }

    /// Checks that every parent link resolves and that the parent relation
    /// forms a forest.
    pub fn validate(&self) -> Result<(), FsmError> {
        for descriptor in self.descriptors.values() {
            if let Some(parent) = descriptor.parent() {
                if !self.contains(parent) {
                    return Err(FsmError::UnknownParent {
                        state: state_name(descriptor.id()),
                        parent: state_name(parent),
                    });
                }
            }
        }
        for &id in self.descriptors.keys() {
            self.ancestor_chain(id)?;
        }
        Ok(())
    }
}

impl<D: FsmDescription> fmt::Debug for Registry<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("states", &self.descriptors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::State;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum Id {
        A,
        B,
        C,
    }

    struct Desc;

    impl FsmDescription for Desc {
        type StateId = Id;
        type Event = ();
        type Context = ();
    }

    struct Nop;

    impl State<Desc> for Nop {
        fn on_event(&mut self, _: &(), _: &mut (), _: &mut crate::state::Control<'_, Desc>) -> bool {
            false
        }
    }

    fn nop_factory() -> StateFactory<Desc> {
        Box::new(|_args| Ok(Box::new(Nop)))
    }

    #[test]
    fn test_duplicate_state_rejected() {
        let mut registry = Registry::<Desc>::new();
        registry.add(Id::A, None, nop_factory()).unwrap();

        let err = registry.add(Id::A, None, nop_factory()).unwrap_err();
        assert!(matches!(err, FsmError::DuplicateState { .. }));
    }

    #[test]
    fn test_resolve_unknown_state() {
        let registry = Registry::<Desc>::new();
        let err = registry.resolve(Id::A).unwrap_err();
        assert!(matches!(err, FsmError::UnknownState { .. }));
    }

    #[test]
    fn test_ancestor_chain_is_root_first() {
        let mut registry = Registry::<Desc>::new();
        // Forward reference: C is registered before its parent B.
        registry.add(Id::C, Some(Id::B), nop_factory()).unwrap();
        registry.add(Id::B, Some(Id::A), nop_factory()).unwrap();
        registry.add(Id::A, None, nop_factory()).unwrap();

        assert_eq!(registry.ancestor_chain(Id::C).unwrap(), vec![Id::A, Id::B, Id::C]);
        assert_eq!(registry.ancestor_chain(Id::A).unwrap(), vec![Id::A]);
    }

    #[test]
    fn test_validate_accepts_forest() {
        let mut registry = Registry::<Desc>::new();
        registry.add(Id::A, None, nop_factory()).unwrap();
        registry.add(Id::B, None, nop_factory()).unwrap();
        registry.add(Id::C, Some(Id::A), nop_factory()).unwrap();

        registry.validate().unwrap();
    }

    #[test]
    fn test_validate_reports_unknown_parent() {
        let mut registry = Registry::<Desc>::new();
        registry.add(Id::B, Some(Id::A), nop_factory()).unwrap();

        let err = registry.validate().unwrap_err();
        assert!(matches!(err, FsmError::UnknownParent { .. }));
    }

    #[test]
    fn test_validate_reports_cycle() {
        let mut registry = Registry::<Desc>::new();
        registry.add(Id::A, Some(Id::B), nop_factory()).unwrap();
        registry.add(Id::B, Some(Id::A), nop_factory()).unwrap();

        let err = registry.validate().unwrap_err();
        assert!(matches!(err, FsmError::CycleDetected { .. }));
    }

    #[test]
    fn test_self_parent_is_a_cycle() {
        let mut registry = Registry::<Desc>::new();
        registry.add(Id::A, Some(Id::A), nop_factory()).unwrap();

        let err = registry.ancestor_chain(Id::A).unwrap_err();
        assert!(matches!(err, FsmError::CycleDetected { .. }));
    }
}
