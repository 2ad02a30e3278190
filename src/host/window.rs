use std::cell::RefCell;
use std::rc::Rc;

use super::{SubscriptionId, Subscribers};

/// The host window's resize signal.
pub trait WindowResizeSource {
    fn add_resize_listener(&self, callback: Rc<dyn Fn()>) -> SubscriptionId;
    fn remove_resize_listener(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct WindowState {
    listeners: Subscribers<dyn Fn()>,
}

#[derive(Clone, Default)]
pub struct WindowEvents {
    inner: Rc<RefCell<WindowState>>,
}

impl WindowEvents {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit_resize(&self) {
        let listeners = self.inner.borrow().listeners.snapshot();
        for listener in listeners {
            listener();
        }
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }
}

impl WindowResizeSource for WindowEvents {
    fn add_resize_listener(&self, callback: Rc<dyn Fn()>) -> SubscriptionId {
        self.inner.borrow_mut().listeners.insert(callback)
    }

    fn remove_resize_listener(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }
}
