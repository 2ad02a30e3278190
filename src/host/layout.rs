use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::{SubscriptionId, Subscribers};

/// Payload published when the hosting layout resizes its content area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutChange {
    pub width: u32,
    pub height: u32,
}

impl LayoutChange {
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LayoutSubscribeOptions {
    /// When `false` the subscriber is invoked with `None`.
    pub wants_payload: bool,
}

pub type LayoutCallback = Rc<dyn Fn(Option<&LayoutChange>)>;

/// Shared publish/subscribe channel for layout-change notifications.
///
/// Each subscription is independent and individually revocable.
pub trait LayoutChannel {
    fn subscribe(
        &self,
        callback: LayoutCallback,
        options: LayoutSubscribeOptions,
    ) -> SubscriptionId;
    fn unsubscribe(&self, id: SubscriptionId) -> bool;
}

struct LayoutEntry {
    callback: LayoutCallback,
    options: LayoutSubscribeOptions,
}

#[derive(Default)]
struct LayoutState {
    entries: Subscribers<LayoutEntry>,
}

#[derive(Clone, Default)]
pub struct LayoutNotifier {
    inner: Rc<RefCell<LayoutState>>,
}

impl LayoutNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, change: LayoutChange) {
        let entries = self.inner.borrow().entries.snapshot();
        for entry in entries {
            let payload = entry.options.wants_payload.then_some(&change);
            (entry.callback)(payload);
        }
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().entries.len()
    }
}

impl LayoutChannel for LayoutNotifier {
    fn subscribe(
        &self,
        callback: LayoutCallback,
        options: LayoutSubscribeOptions,
    ) -> SubscriptionId {
        self.inner
            .borrow_mut()
            .entries
            .insert(Rc::new(LayoutEntry { callback, options }))
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().entries.remove(id)
    }
}
