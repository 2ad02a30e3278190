use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::core::{ChartOptions, ResizeOptions, Theme};
use crate::error::{BindingError, BindingResult};

use super::{EngineInstance, RenderingEngine, SurfaceHandle, SurfaceId};

/// One call observed by `RecordingEngine`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EngineCall {
    Init {
        instance: u64,
        surface: SurfaceId,
        theme: Theme,
    },
    SetOption {
        instance: u64,
        options: ChartOptions,
    },
    Clear {
        instance: u64,
    },
    Resize {
        instance: u64,
        options: ResizeOptions,
    },
    Dispose {
        instance: u64,
    },
}

#[derive(Default)]
struct EngineLog {
    calls: Vec<EngineCall>,
    next_instance: u64,
    live_instances: usize,
    fail_next_init: Option<String>,
    fail_set_option: Option<String>,
}

/// Headless engine that draws nothing and records every call.
///
/// Surfaces without area are rejected the way a real engine refuses a
/// zero-sized container. Clones share one log.
#[derive(Clone, Default)]
pub struct RecordingEngine {
    log: Rc<RefCell<EngineLog>>,
}

impl RecordingEngine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn calls(&self) -> Vec<EngineCall> {
        self.log.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.log.borrow_mut().calls.clear();
    }

    #[must_use]
    pub fn init_count(&self) -> usize {
        self.count(|call| matches!(call, EngineCall::Init { .. }))
    }

    #[must_use]
    pub fn dispose_count(&self) -> usize {
        self.count(|call| matches!(call, EngineCall::Dispose { .. }))
    }

    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.count(|call| matches!(call, EngineCall::Clear { .. }))
    }

    /// Options passed to `set_option`, in call order.
    #[must_use]
    pub fn applied_options(&self) -> Vec<ChartOptions> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::SetOption { options, .. } => Some(options.clone()),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn resize_calls(&self) -> Vec<ResizeOptions> {
        self.log
            .borrow()
            .calls
            .iter()
            .filter_map(|call| match call {
                EngineCall::Resize { options, .. } => Some(*options),
                _ => None,
            })
            .collect()
    }

    #[must_use]
    pub fn live_instances(&self) -> usize {
        self.log.borrow().live_instances
    }

    /// Makes the next `init` fail with `reason`.
    pub fn fail_next_init(&self, reason: impl Into<String>) {
        self.log.borrow_mut().fail_next_init = Some(reason.into());
    }

    /// Makes every `set_option` fail until reset with `None`.
    pub fn fail_set_option(&self, reason: Option<String>) {
        self.log.borrow_mut().fail_set_option = reason;
    }

    fn count(&self, predicate: impl Fn(&EngineCall) -> bool) -> usize {
        self.log
            .borrow()
            .calls
            .iter()
            .filter(|call| predicate(call))
            .count()
    }
}

impl RenderingEngine for RecordingEngine {
    type Instance = RecordedInstance;

    fn init(&self, surface: &SurfaceHandle, theme: Theme) -> BindingResult<Self::Instance> {
        let mut log = self.log.borrow_mut();
        if let Some(reason) = log.fail_next_init.take() {
            return Err(BindingError::EngineInit { reason });
        }
        if !surface.has_area() {
            return Err(BindingError::EngineInit {
                reason: format!(
                    "surface {} has no area ({}x{})",
                    surface.id().raw(),
                    surface.width(),
                    surface.height()
                ),
            });
        }

        let id = log.next_instance;
        log.next_instance += 1;
        log.live_instances += 1;
        log.calls.push(EngineCall::Init {
            instance: id,
            surface: surface.id(),
            theme,
        });
        Ok(RecordedInstance {
            id,
            log: Rc::clone(&self.log),
        })
    }
}

pub struct RecordedInstance {
    id: u64,
    log: Rc<RefCell<EngineLog>>,
}

impl RecordedInstance {
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    fn push(&self, call: EngineCall) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl EngineInstance for RecordedInstance {
    fn set_option(&mut self, options: &ChartOptions) -> BindingResult<()> {
        if let Some(reason) = self.log.borrow().fail_set_option.clone() {
            return Err(BindingError::Engine(reason));
        }
        self.push(EngineCall::SetOption {
            instance: self.id,
            options: options.clone(),
        });
        Ok(())
    }

    fn clear(&mut self) {
        self.push(EngineCall::Clear { instance: self.id });
    }

    fn resize(&mut self, options: &ResizeOptions) {
        self.push(EngineCall::Resize {
            instance: self.id,
            options: *options,
        });
    }

    fn dispose(self) {
        let mut log = self.log.borrow_mut();
        log.live_instances = log.live_instances.saturating_sub(1);
        log.calls.push(EngineCall::Dispose { instance: self.id });
    }
}
