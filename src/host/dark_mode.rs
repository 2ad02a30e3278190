use std::cell::RefCell;
use std::rc::Rc;

use super::{SubscriptionId, Subscribers};

/// Read-only view of the process-wide dark-mode flag.
///
/// Bindings never write the flag; they only observe it.
pub trait DarkModeProvider {
    fn is_dark(&self) -> bool;
    fn subscribe(&self, callback: Rc<dyn Fn(bool)>) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct DarkModeState {
    dark: bool,
    subscribers: Subscribers<dyn Fn(bool)>,
}

/// Host-owned dark-mode flag.
///
/// Every `set` notifies, even when the value is unchanged; de-duplication is
/// left to derived values such as `ThemeResolver`.
#[derive(Clone, Default)]
pub struct DarkModeFlag {
    inner: Rc<RefCell<DarkModeState>>,
}

impl DarkModeFlag {
    #[must_use]
    pub fn new(dark: bool) -> Self {
        let flag = Self::default();
        flag.inner.borrow_mut().dark = dark;
        flag
    }

    pub fn set(&self, dark: bool) {
        let callbacks = {
            let mut state = self.inner.borrow_mut();
            state.dark = dark;
            state.subscribers.snapshot()
        };
        for callback in callbacks {
            callback(dark);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl DarkModeProvider for DarkModeFlag {
    fn is_dark(&self) -> bool {
        self.inner.borrow().dark
    }

    fn subscribe(&self, callback: Rc<dyn Fn(bool)>) -> SubscriptionId {
        self.inner.borrow_mut().subscribers.insert(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().subscribers.remove(id)
    }
}
