use std::cell::RefCell;
use std::rc::Rc;

use tracing::trace;

use crate::render::SurfaceHandle;

use super::{SubscriptionId, Subscribers};

/// Reactive reference to the rendering surface a binding targets.
///
/// Starts unresolved in the common case; implementations must notify
/// subscribers when it resolves instead of expecting to be polled.
pub trait ElementSource {
    fn current(&self) -> Option<SurfaceHandle>;
    fn on_resolve(&self, callback: Rc<dyn Fn(&SurfaceHandle)>) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

#[derive(Default)]
struct ElementRefState {
    surface: Option<SurfaceHandle>,
    subscribers: Subscribers<dyn Fn(&SurfaceHandle)>,
}

/// In-process element reference cell.
///
/// Clones share one cell, so the host keeps a clone to resolve it later.
#[derive(Clone, Default)]
pub struct ElementRef {
    inner: Rc<RefCell<ElementRefState>>,
}

impl ElementRef {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a reference that is already resolved.
    #[must_use]
    pub fn resolved(surface: SurfaceHandle) -> Self {
        let element = Self::new();
        element.inner.borrow_mut().surface = Some(surface);
        element
    }

    /// Points the reference at `surface` and notifies every subscriber.
    ///
    /// Re-publishing the current surface notifies again; subscribers decide
    /// whether a repeat matters.
    pub fn resolve(&self, surface: SurfaceHandle) {
        let callbacks = {
            let mut state = self.inner.borrow_mut();
            state.surface = Some(surface.clone());
            state.subscribers.snapshot()
        };
        trace!(surface = surface.id().raw(), "element reference resolved");
        for callback in callbacks {
            callback(&surface);
        }
    }

    /// Drops the current surface without notifying (the node left the tree).
    pub fn clear(&self) {
        self.inner.borrow_mut().surface = None;
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().subscribers.len()
    }
}

impl ElementSource for ElementRef {
    fn current(&self) -> Option<SurfaceHandle> {
        self.inner.borrow().surface.clone()
    }

    fn on_resolve(&self, callback: Rc<dyn Fn(&SurfaceHandle)>) -> SubscriptionId {
        self.inner.borrow_mut().subscribers.insert(callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().subscribers.remove(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::{ElementRef, ElementSource};
    use crate::render::{SurfaceHandle, SurfaceId};

    #[test]
    fn every_resolve_notifies_subscribers() {
        let element = ElementRef::new();
        let hits = Rc::new(Cell::new(0));
        let counter = Rc::clone(&hits);
        element.on_resolve(Rc::new(move |_| counter.set(counter.get() + 1)));

        let surface = SurfaceHandle::attached(SurfaceId::new(1), 640, 480);
        element.resolve(surface.clone());
        element.resolve(surface.clone());
        assert_eq!(hits.get(), 2);
        assert_eq!(element.current(), Some(surface));

        element.resolve(SurfaceHandle::attached(SurfaceId::new(2), 640, 480));
        assert_eq!(hits.get(), 3);
    }
}
