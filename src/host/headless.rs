use std::rc::Rc;

use super::{
    BindingContext, DarkModeFlag, LayoutNotifier, ManualTimers, OwnerScope, RecordingDiagnostics,
    WindowEvents,
};

/// Bundle of in-process host collaborators.
///
/// Keeps a handle to every source so the embedder (or a test) can drive
/// theme flips, layout notifications, window resizes, time and teardown.
#[derive(Clone, Default)]
pub struct HeadlessHost {
    pub dark_mode: DarkModeFlag,
    pub layout: LayoutNotifier,
    pub window: WindowEvents,
    pub owner: OwnerScope,
    pub timers: ManualTimers,
    pub diagnostics: RecordingDiagnostics,
}

impl HeadlessHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_dark_mode(dark: bool) -> Self {
        Self {
            dark_mode: DarkModeFlag::new(dark),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn context(&self) -> BindingContext {
        BindingContext::new(
            Rc::new(self.dark_mode.clone()),
            Rc::new(self.layout.clone()),
            Rc::new(self.window.clone()),
            Rc::new(self.owner.clone()),
            Rc::new(self.timers.clone()),
        )
        .with_diagnostics(Rc::new(self.diagnostics.clone()))
    }
}
