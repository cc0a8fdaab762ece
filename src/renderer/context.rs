//! Per-context render state tracking and enforcement.
//!
//! Each GPU context gets one [`RenderContext`] tracking the state objects
//! last applied to it. Draw submission resolves every state type through
//! three tiers (enforced override, object state, type default) and only
//! the states whose effective value differs from the tracked current value
//! are re-applied.
//!
//! The tracker assumes the single-thread-per-context contract: it is never
//! shared across threads and carries no internal locking.

use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::errors::{KilnError, Result};
use crate::renderer::Renderer;
use crate::renderer::state::{RenderState, STATE_TYPE_COUNT, StateSet, StateType};
use crate::renderer::task_queue::TaskQueue;

/// Opaque identity of a registered GPU context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub(crate) u64);

type StateSlots = [Option<RenderState>; STATE_TYPE_COUNT];

/// State tracking for one GPU context.
pub struct RenderContext {
    id: ContextId,
    /// Overrides that supersede object states until cleared.
    enforced: StateSlots,
    /// Saved override maps for nested special passes.
    enforced_stack: Vec<StateSlots>,
    /// What the GPU is believed to have applied, per type.
    current: StateSlots,
}

impl RenderContext {
    pub(crate) fn new(id: ContextId) -> Self {
        Self {
            id,
            enforced: Default::default(),
            enforced_stack: Vec::new(),
            current: Default::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Install an override: until cleared, per-object resolution for this
    /// state's type uses it instead of the object's own state.
    pub fn enforce_state(&mut self, state: RenderState) {
        let index = state.state_type().index();
        self.enforced[index] = Some(state);
    }

    pub fn clear_enforced_state(&mut self, state_type: StateType) {
        self.enforced[state_type.index()] = None;
    }

    /// Remove all overrides. Required at the end of any pass that set them.
    pub fn clear_enforced_states(&mut self) {
        self.enforced = Default::default();
    }

    #[must_use]
    pub fn has_enforced_states(&self) -> bool {
        self.enforced.iter().any(Option::is_some)
    }

    #[must_use]
    pub fn enforced_state(&self, state_type: StateType) -> Option<&RenderState> {
        self.enforced[state_type.index()].as_ref()
    }

    #[must_use]
    pub fn current_state(&self, state_type: StateType) -> Option<&RenderState> {
        self.current[state_type.index()].as_ref()
    }

    /// Save the current override map. Does not change the live overrides.
    pub fn push_enforced_states(&mut self) {
        self.enforced_stack.push(self.enforced.clone());
    }

    /// Restore the override map saved by the matching push; anything
    /// enforced or cleared since then is reverted.
    pub fn pop_enforced_states(&mut self) -> Result<()> {
        let Some(saved) = self.enforced_stack.pop() else {
            return Err(KilnError::EnforcedStackUnderflow);
        };
        self.enforced = saved;
        Ok(())
    }

    /// Scoped enforcement: the returned guard restores the pre-scope
    /// override map when dropped, on every exit path.
    pub fn enforced_scope(&mut self) -> EnforcedScope<'_> {
        self.push_enforced_states();
        EnforcedScope { context: self }
    }

    /// Resolve the states a draw of `object` must apply.
    ///
    /// For each type: effective = enforced override, else object state, else
    /// type default. States equal to the tracked current value are elided;
    /// the rest are recorded as current and returned for application.
    pub fn resolve_states(&mut self, object: &StateSet) -> SmallVec<[RenderState; STATE_TYPE_COUNT]> {
        let mut required = SmallVec::new();
        for state_type in StateType::ALL {
            let index = state_type.index();
            let effective = match &self.enforced[index] {
                Some(enforced) => enforced.clone(),
                None => object
                    .get(state_type)
                    .cloned()
                    .unwrap_or_else(|| RenderState::default_for(state_type)),
            };
            if self.current[index].as_ref() != Some(&effective) {
                self.current[index] = Some(effective.clone());
                required.push(effective);
            }
        }
        required
    }

    /// Forget everything believed applied.
    ///
    /// Must be called after any operation whose GPU side effects this tracker
    /// cannot see (replaying a recorded command list, foreign GL code), so
    /// the next resolution re-applies every state instead of skipping calls
    /// the GPU no longer matches.
    pub fn invalidate_states(&mut self) {
        self.current = Default::default();
    }
}

/// RAII guard for a pass that enforces states.
///
/// Dereferences to the context so the pass body uses it in place; dropping
/// restores the override map saved at scope entry.
pub struct EnforcedScope<'a> {
    context: &'a mut RenderContext,
}

impl Deref for EnforcedScope<'_> {
    type Target = RenderContext;

    fn deref(&self) -> &RenderContext {
        self.context
    }
}

impl DerefMut for EnforcedScope<'_> {
    fn deref_mut(&mut self) -> &mut RenderContext {
        self.context
    }
}

impl Drop for EnforcedScope<'_> {
    fn drop(&mut self) {
        // The constructor pushed, so the stack cannot underflow here.
        if let Some(saved) = self.context.enforced_stack.pop() {
            self.context.enforced = saved;
        }
    }
}

struct RegisteredContext {
    state: RenderContext,
    tasks: TaskQueue,
}

/// Explicit registry of GPU contexts.
///
/// Owns each context's state tracker and task queue, tracks which context is
/// current on the driving thread, and notifies clean listeners when a
/// context is destroyed. Passed to the components that need it; never a
/// process-global.
#[derive(Default)]
pub struct ContextRegistry {
    next_id: u64,
    current: Option<ContextId>,
    contexts: FxHashMap<ContextId, RegisteredContext>,
    clean_listeners: Vec<Box<dyn FnMut(ContextId)>>,
}

impl ContextRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_context(&mut self) -> ContextId {
        let id = ContextId(self.next_id);
        self.next_id += 1;
        self.contexts.insert(
            id,
            RegisteredContext {
                state: RenderContext::new(id),
                tasks: TaskQueue::new(),
            },
        );
        id
    }

    pub fn make_current(&mut self, id: ContextId) -> Result<()> {
        if !self.contexts.contains_key(&id) {
            return Err(KilnError::UnknownContext(id));
        }
        self.current = Some(id);
        Ok(())
    }

    #[must_use]
    pub fn current(&self) -> Option<ContextId> {
        self.current
    }

    #[must_use]
    pub fn is_current(&self, id: ContextId) -> bool {
        self.current == Some(id)
    }

    pub fn context_mut(&mut self, id: ContextId) -> Result<&mut RenderContext> {
        self.contexts
            .get_mut(&id)
            .map(|c| &mut c.state)
            .ok_or(KilnError::UnknownContext(id))
    }

    pub fn task_queue(&self, id: ContextId) -> Result<&TaskQueue> {
        self.contexts
            .get(&id)
            .map(|c| &c.tasks)
            .ok_or(KilnError::UnknownContext(id))
    }

    /// Run when a context is destroyed, to release context-tied resources.
    pub fn add_clean_listener(&mut self, listener: impl FnMut(ContextId) + 'static) {
        self.clean_listeners.push(Box::new(listener));
    }

    /// Drain the given context's deferred tasks. The context must be current
    /// on the calling thread.
    pub fn execute_tasks(&mut self, id: ContextId, renderer: &mut dyn Renderer) -> Result<usize> {
        let queue = self.task_queue(id)?;
        Ok(queue.execute_all(renderer))
    }

    /// Tear a context down: fire clean listeners, drain its remaining
    /// deferred work, and drop its tracking.
    ///
    /// Call with the context current: the drained tasks issue GPU deletes.
    pub fn destroy_context(&mut self, id: ContextId, renderer: &mut dyn Renderer) -> Result<()> {
        if !self.contexts.contains_key(&id) {
            return Err(KilnError::UnknownContext(id));
        }
        for listener in &mut self.clean_listeners {
            listener(id);
        }
        if let Some(entry) = self.contexts.remove(&id) {
            entry.tasks.execute_all(renderer);
        }
        if self.current == Some(id) {
            self.current = None;
        }
        Ok(())
    }
}
