use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::host::{DarkModeProvider, SubscriptionId, Subscribers};

/// Theme requested by the caller at bind time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    /// Follow the host's dark-mode flag.
    #[default]
    Default,
}

impl ThemePreference {
    #[must_use]
    pub const fn resolve(self, global_dark: bool) -> Theme {
        match self {
            Self::Light => Theme::Light,
            Self::Dark => Theme::Dark,
            Self::Default if global_dark => Theme::Dark,
            Self::Default => Theme::Light,
        }
    }
}

/// Effective theme handed to the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

struct ResolverShared {
    requested: ThemePreference,
    resolved: Theme,
    subscribers: Subscribers<dyn Fn(Theme)>,
}

/// Derived node computing the effective theme from the requested preference
/// and the host dark-mode flag.
///
/// Subscribers hear about changes of the resolved value only; repeated flag
/// writes that resolve to the same theme are swallowed.
pub struct ThemeResolver {
    shared: Rc<RefCell<ResolverShared>>,
    provider: Rc<dyn DarkModeProvider>,
    upstream: Cell<Option<SubscriptionId>>,
}

impl ThemeResolver {
    #[must_use]
    pub fn new(requested: ThemePreference, provider: Rc<dyn DarkModeProvider>) -> Self {
        let shared = Rc::new(RefCell::new(ResolverShared {
            requested,
            resolved: requested.resolve(provider.is_dark()),
            subscribers: Subscribers::default(),
        }));
        let weak = Rc::downgrade(&shared);
        let upstream = provider.subscribe(Rc::new(move |dark| recompute(&weak, dark)));

        Self {
            shared,
            provider,
            upstream: Cell::new(Some(upstream)),
        }
    }

    #[must_use]
    pub fn current(&self) -> Theme {
        self.shared.borrow().resolved
    }

    #[must_use]
    pub fn requested(&self) -> ThemePreference {
        self.shared.borrow().requested
    }

    /// Replaces the requested preference and re-derives against the live flag.
    pub fn set_requested(&self, requested: ThemePreference) {
        self.shared.borrow_mut().requested = requested;
        recompute(&Rc::downgrade(&self.shared), self.provider.is_dark());
    }

    pub fn subscribe(&self, callback: Rc<dyn Fn(Theme)>) -> SubscriptionId {
        self.shared.borrow_mut().subscribers.insert(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.shared.borrow_mut().subscribers.remove(id)
    }

    /// Stops following the dark-mode flag. Safe to call repeatedly.
    pub fn detach(&self) {
        if let Some(id) = self.upstream.take() {
            self.provider.unsubscribe(id);
        }
    }

    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.upstream.get().is_some()
    }
}

impl Drop for ThemeResolver {
    fn drop(&mut self) {
        self.detach();
    }
}

fn recompute(shared: &Weak<RefCell<ResolverShared>>, dark: bool) {
    let Some(shared) = shared.upgrade() else {
        return;
    };
    let (theme, listeners) = {
        let mut state = shared.borrow_mut();
        let next = state.requested.resolve(dark);
        if next == state.resolved {
            return;
        }
        debug!(from = state.resolved.as_str(), to = next.as_str(), "effective theme changed");
        state.resolved = next;
        (next, state.subscribers.snapshot())
    };
    for listener in listeners {
        listener(theme);
    }
}
