use std::rc::Rc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Opaque token returned by every subscribe call; used to revoke it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Ordered callback registry shared by the in-process host sources.
///
/// Notification goes through `snapshot` so the owning `RefCell` borrow is
/// released before any callback runs.
pub(crate) struct Subscribers<F: ?Sized> {
    next_id: u64,
    entries: IndexMap<SubscriptionId, Rc<F>>,
}

impl<F: ?Sized> Default for Subscribers<F> {
    fn default() -> Self {
        Self {
            next_id: 0,
            entries: IndexMap::new(),
        }
    }
}

impl<F: ?Sized> Subscribers<F> {
    pub(crate) fn insert(&mut self, callback: Rc<F>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.entries.insert(id, callback);
        id
    }

    pub(crate) fn remove(&mut self, id: SubscriptionId) -> bool {
        self.entries.shift_remove(&id).is_some()
    }

    #[must_use]
    pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
        self.entries.values().cloned().collect()
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
