//! Capabilities a binding consumes from its host UI.
//!
//! Each collaborator is a trait so bindings stay testable; the concrete types
//! here are in-process implementations used by headless hosts and tests.

mod dark_mode;
mod diagnostics;
mod element;
mod headless;
mod layout;
mod lifecycle;
mod subscribers;
mod timer;
mod window;

use std::rc::Rc;

pub use dark_mode::{DarkModeFlag, DarkModeProvider};
pub use diagnostics::{
    Diagnostic, DiagnosticKind, DiagnosticLevel, DiagnosticSink, RecordingDiagnostics,
    TracingDiagnostics,
};
pub use element::{ElementRef, ElementSource};
pub use headless::HeadlessHost;
pub use layout::{
    LayoutCallback, LayoutChange, LayoutChannel, LayoutNotifier, LayoutSubscribeOptions,
};
pub use lifecycle::{LifecycleHook, OwnerScope};
pub use subscribers::SubscriptionId;
pub(crate) use subscribers::Subscribers;
pub use timer::{ManualTimers, TimerHandle, TimerHost};
pub use window::{WindowEvents, WindowResizeSource};

/// Host collaborators shared by every binding created in one UI tree.
///
/// Cloning is cheap; each field is reference counted.
#[derive(Clone)]
pub struct BindingContext {
    pub dark_mode: Rc<dyn DarkModeProvider>,
    pub layout: Rc<dyn LayoutChannel>,
    pub window: Rc<dyn WindowResizeSource>,
    pub lifecycle: Rc<dyn LifecycleHook>,
    pub timers: Rc<dyn TimerHost>,
    pub diagnostics: Rc<dyn DiagnosticSink>,
}

impl BindingContext {
    /// Creates a context that reports diagnostics through `tracing`.
    #[must_use]
    pub fn new(
        dark_mode: Rc<dyn DarkModeProvider>,
        layout: Rc<dyn LayoutChannel>,
        window: Rc<dyn WindowResizeSource>,
        lifecycle: Rc<dyn LifecycleHook>,
        timers: Rc<dyn TimerHost>,
    ) -> Self {
        Self {
            dark_mode,
            layout,
            window,
            lifecycle,
            timers,
            diagnostics: Rc::new(TracingDiagnostics),
        }
    }

    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: Rc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = diagnostics;
        self
    }
}
