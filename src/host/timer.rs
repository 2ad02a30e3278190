use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    #[must_use]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// Host timer service (`setTimeout`/`clearTimeout` shaped).
pub trait TimerHost {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle;
    /// Returns `true` when a pending timer was removed.
    fn clear_timeout(&self, handle: TimerHandle) -> bool;
}

#[derive(Default)]
struct ManualTimersState {
    now: Duration,
    next_id: u64,
    queue: BTreeMap<(Duration, u64), Box<dyn FnOnce()>>,
    deadlines: HashMap<u64, Duration>,
}

/// Deterministic timer host driven by an explicit virtual clock.
///
/// Used by tests and by headless hosts that pump time themselves.
#[derive(Clone, Default)]
pub struct ManualTimers {
    inner: Rc<RefCell<ManualTimersState>>,
}

impl ManualTimers {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn now(&self) -> Duration {
        self.inner.borrow().now
    }

    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.inner.borrow().queue.len()
    }

    /// Moves the clock forward, firing due timers in deadline order.
    ///
    /// Timers scheduled by a callback fire in the same call when their
    /// deadline falls inside the advanced window.
    pub fn advance(&self, by: Duration) {
        let target = self.now() + by;
        loop {
            let due = {
                let mut state = self.inner.borrow_mut();
                let Some(key) = state.queue.keys().next().copied() else {
                    break;
                };
                if key.0 > target {
                    break;
                }
                state.now = key.0;
                state.deadlines.remove(&key.1);
                state.queue.remove(&key)
            };
            if let Some(callback) = due {
                callback();
            }
        }
        self.inner.borrow_mut().now = target;
    }

    pub fn advance_ms(&self, millis: u64) {
        self.advance(Duration::from_millis(millis));
    }

    /// Fires every pending timer, including ones scheduled while draining.
    pub fn run_until_idle(&self) {
        loop {
            let last_deadline = self.inner.borrow().queue.keys().next_back().map(|key| key.0);
            let Some(deadline) = last_deadline else {
                break;
            };
            let now = self.now();
            self.advance(deadline.saturating_sub(now));
        }
    }
}

impl TimerHost for ManualTimers {
    fn set_timeout(&self, delay: Duration, callback: Box<dyn FnOnce()>) -> TimerHandle {
        let mut state = self.inner.borrow_mut();
        let id = state.next_id;
        state.next_id += 1;
        let deadline = state.now + delay;
        state.queue.insert((deadline, id), callback);
        state.deadlines.insert(id, deadline);
        TimerHandle(id)
    }

    fn clear_timeout(&self, handle: TimerHandle) -> bool {
        let mut state = self.inner.borrow_mut();
        match state.deadlines.remove(&handle.0) {
            Some(deadline) => state.queue.remove(&(deadline, handle.0)).is_some(),
            None => false,
        }
    }
}
