use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::SubscriptionId;

/// Host hook that fires exactly once when the binding's owner is torn down.
pub trait LifecycleHook {
    /// Registers `callback` for teardown. Returns `None` when the owner is
    /// already gone and the callback ran immediately.
    fn on_teardown(&self, callback: Box<dyn FnOnce()>) -> Option<SubscriptionId>;
    /// Drops a registration that has not fired yet.
    fn cancel_teardown(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct OwnerScopeState {
    torn_down: bool,
    next_id: u64,
    callbacks: IndexMap<SubscriptionId, Box<dyn FnOnce()>>,
}

/// Owner scope standing in for the host component that mounts the chart.
///
/// Callbacks registered after teardown run immediately.
#[derive(Clone, Default)]
pub struct OwnerScope {
    inner: Rc<RefCell<OwnerScopeState>>,
}

impl OwnerScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs every registered callback once, in registration order.
    pub fn teardown(&self) {
        let callbacks = {
            let mut state = self.inner.borrow_mut();
            if state.torn_down {
                return;
            }
            state.torn_down = true;
            std::mem::take(&mut state.callbacks)
        };
        for callback in callbacks.into_values() {
            callback();
        }
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.borrow().torn_down
    }

    #[must_use]
    pub fn pending_callbacks(&self) -> usize {
        self.inner.borrow().callbacks.len()
    }
}

impl LifecycleHook for OwnerScope {
    fn on_teardown(&self, callback: Box<dyn FnOnce()>) -> Option<SubscriptionId> {
        let mut state = self.inner.borrow_mut();
        if state.torn_down {
            drop(state);
            callback();
            return None;
        }
        let id = SubscriptionId::from_raw(state.next_id);
        state.next_id += 1;
        state.callbacks.insert(id, callback);
        Some(id)
    }

    fn cancel_teardown(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().callbacks.shift_remove(&id).is_some()
    }
}
