use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use tracing::{error, warn};

use crate::error::BindingError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DiagnosticKind {
    /// Options or a render arrived before the target element was mounted.
    PrematureRender,
    /// The rendering engine refused to create an instance.
    EngineInitFailed,
    /// An engine call on a live instance reported an error.
    EngineCallFailed,
    UseAfterDispose,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiagnosticLevel {
    Warning,
    Error,
}

impl DiagnosticKind {
    #[must_use]
    pub const fn level(self) -> DiagnosticLevel {
        match self {
            Self::EngineInitFailed | Self::EngineCallFailed => DiagnosticLevel::Error,
            Self::PrematureRender | Self::UseAfterDispose => DiagnosticLevel::Warning,
        }
    }
}

/// Non-fatal report surfaced to the host instead of failing the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    #[must_use]
    pub fn premature_render() -> Self {
        Self {
            kind: DiagnosticKind::PrematureRender,
            message: "render attempted before mount; options are cached until the element resolves"
                .to_owned(),
        }
    }

    #[must_use]
    pub fn engine_init_failed(err: &BindingError) -> Self {
        Self {
            kind: DiagnosticKind::EngineInitFailed,
            message: err.to_string(),
        }
    }

    #[must_use]
    pub fn engine_call_failed(operation: &str, err: &BindingError) -> Self {
        Self {
            kind: DiagnosticKind::EngineCallFailed,
            message: format!("{operation}: {err}"),
        }
    }

    #[must_use]
    pub fn use_after_dispose(operation: &str) -> Self {
        Self {
            kind: DiagnosticKind::UseAfterDispose,
            message: format!("{operation} called on a disposed binding"),
        }
    }

    #[must_use]
    pub fn level(&self) -> DiagnosticLevel {
        self.kind.level()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Receiver for non-fatal binding diagnostics.
pub trait DiagnosticSink {
    fn report(&self, diagnostic: &Diagnostic);
}

/// Default sink: forwards diagnostics to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingDiagnostics;

impl DiagnosticSink for TracingDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        match diagnostic.level() {
            DiagnosticLevel::Warning => {
                warn!(kind = ?diagnostic.kind, "{}", diagnostic.message);
            }
            DiagnosticLevel::Error => {
                error!(kind = ?diagnostic.kind, "{}", diagnostic.message);
            }
        }
    }
}

/// Sink that keeps every diagnostic for later inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingDiagnostics {
    entries: Rc<RefCell<Vec<Diagnostic>>>,
}

impl RecordingDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn entries(&self) -> Vec<Diagnostic> {
        self.entries.borrow().clone()
    }

    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|entry| entry.kind == kind)
            .count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.entries.borrow_mut().clear();
    }
}

impl DiagnosticSink for RecordingDiagnostics {
    fn report(&self, diagnostic: &Diagnostic) {
        self.entries.borrow_mut().push(diagnostic.clone());
    }
}
