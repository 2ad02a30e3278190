use std::cell::RefCell;
use std::rc::{Rc, Weak};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::host::{TimerHandle, TimerHost};

/// Trailing-edge debounce window applied to resize triggers.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    Linear,
    CubicIn,
    #[default]
    CubicOut,
    CubicInOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeAnimation {
    pub duration_ms: u32,
    pub easing: Easing,
}

impl Default for ResizeAnimation {
    fn default() -> Self {
        Self {
            duration_ms: 300,
            easing: Easing::CubicOut,
        }
    }
}

/// Parameters forwarded to the engine's resize call.
///
/// `None` dimensions mean "measure the live surface".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeOptions {
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub animation: Option<ResizeAnimation>,
}

impl Default for ResizeOptions {
    fn default() -> Self {
        Self {
            width: None,
            height: None,
            animation: Some(ResizeAnimation::default()),
        }
    }
}

impl ResizeOptions {
    #[must_use]
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    #[must_use]
    pub fn with_animation(mut self, animation: ResizeAnimation) -> Self {
        self.animation = Some(animation);
        self
    }

    #[must_use]
    pub fn without_animation(mut self) -> Self {
        self.animation = None;
        self
    }
}

struct SchedulerState {
    window: Duration,
    timers: Rc<dyn TimerHost>,
    action: Rc<dyn Fn(ResizeOptions)>,
    pending_args: Option<ResizeOptions>,
    timer_handle: Option<TimerHandle>,
}

/// Debounces resize requests so a burst collapses into one trailing call
/// carrying the most recent parameters.
///
/// Clones share the same pending state.
#[derive(Clone)]
pub struct ResizeScheduler {
    inner: Rc<RefCell<SchedulerState>>,
}

impl ResizeScheduler {
    #[must_use]
    pub fn new(timers: Rc<dyn TimerHost>, action: Rc<dyn Fn(ResizeOptions)>) -> Self {
        Self::with_window(RESIZE_DEBOUNCE, timers, action)
    }

    #[must_use]
    pub fn with_window(
        window: Duration,
        timers: Rc<dyn TimerHost>,
        action: Rc<dyn Fn(ResizeOptions)>,
    ) -> Self {
        Self {
            inner: Rc::new(RefCell::new(SchedulerState {
                window,
                timers,
                action,
                pending_args: None,
                timer_handle: None,
            })),
        }
    }

    /// Replaces the pending parameters and restarts the window.
    pub fn schedule(&self, args: ResizeOptions) {
        let weak = Rc::downgrade(&self.inner);
        let mut state = self.inner.borrow_mut();
        state.pending_args = Some(args);
        if let Some(handle) = state.timer_handle.take() {
            state.timers.clear_timeout(handle);
        }
        let handle = state
            .timers
            .set_timeout(state.window, Box::new(move || fire(&weak)));
        state.timer_handle = Some(handle);
        trace!(timer = handle.raw(), "resize scheduled");
    }

    /// Drops any pending invocation. Returns `true` if one was pending.
    pub fn cancel(&self) -> bool {
        let mut state = self.inner.borrow_mut();
        state.pending_args = None;
        match state.timer_handle.take() {
            Some(handle) => {
                state.timers.clear_timeout(handle);
                trace!(timer = handle.raw(), "pending resize cancelled");
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.inner.borrow().timer_handle.is_some()
    }

    #[must_use]
    pub fn window(&self) -> Duration {
        self.inner.borrow().window
    }
}

fn fire(weak: &Weak<RefCell<SchedulerState>>) {
    let Some(inner) = weak.upgrade() else {
        return;
    };
    let (action, args) = {
        let mut state = inner.borrow_mut();
        state.timer_handle = None;
        let Some(args) = state.pending_args.take() else {
            return;
        };
        (Rc::clone(&state.action), args)
    };
    trace!("debounced resize fired");
    action(args);
}
