use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

use tracing::warn;

use crate::core::{ChartOptions, ResizeOptions, Theme, ThemePreference};
use crate::error::{BindingError, BindingResult};
use crate::host::{BindingContext, ElementSource};
use crate::render::RenderingEngine;

use super::binding_core::{BindingCore, SharedCore};
use super::{BindOptions, BindingSnapshot, BindingState, SetOptionsOutcome};

/// Handle to one chart bound to one host surface.
///
/// Clones share the same binding. The binding tears itself down when the
/// host owner scope is torn down, when `dispose` is called, or when the last
/// handle is dropped.
///
/// Accessors other than `engine` return `BindingError::Busy` instead of
/// panicking when reached from inside an operation, e.g. from a diagnostic
/// sink.
pub struct ChartBinding<E: RenderingEngine> {
    core: SharedCore<E>,
    engine: Rc<E>,
}

impl<E: RenderingEngine> Clone for ChartBinding<E> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
            engine: Rc::clone(&self.engine),
        }
    }
}

impl<E: RenderingEngine + 'static> ChartBinding<E> {
    /// Binds `initial` to the surface `element` resolves to.
    ///
    /// Initialization happens immediately when the element is already
    /// mounted, otherwise on its first resolve notification.
    pub fn bind(
        engine: E,
        context: BindingContext,
        element: Rc<dyn ElementSource>,
        initial: ChartOptions,
        options: BindOptions,
    ) -> Self {
        let engine = Rc::new(engine);
        let core = Rc::new_cyclic(|weak| {
            RefCell::new(BindingCore::new(
                Rc::clone(&engine),
                context,
                element,
                initial,
                options,
                weak,
            ))
        });
        BindingCore::attach(&core);
        Self { core, engine }
    }
}

impl<E: RenderingEngine> ChartBinding<E> {
    /// Replaces the cached options, clearing previous chart state first.
    pub fn set_options(&self, options: ChartOptions) -> BindingResult<SetOptionsOutcome> {
        self.set_options_with(options, true)
    }

    /// Replaces the cached options.
    ///
    /// Before the element is mounted the options are only cached and a
    /// `PrematureRender` diagnostic is reported; the result is `Deferred`.
    /// An engine that rejects initialization yields `BindingError::EngineInit`
    /// and the options stay cached for the next resolve.
    pub fn set_options_with(
        &self,
        options: ChartOptions,
        clear_previous: bool,
    ) -> BindingResult<SetOptionsOutcome> {
        self.core_mut("set_options")?
            .set_options(options, clear_previous)
    }

    /// Applies the cached, theme-adjusted options. Returns `false` when no
    /// instance exists yet; the request is honored once one does.
    pub fn render(&self) -> BindingResult<bool> {
        self.core_mut("render")?.render()
    }

    /// Resizes right away with the default 300ms cubic-out animation.
    pub fn resize(&self) -> bool {
        self.resize_with(ResizeOptions::default())
    }

    pub fn resize_with(&self, options: ResizeOptions) -> bool {
        self.core_mut("resize")
            .map(|mut core| core.resize(&options))
            .unwrap_or(false)
    }

    /// Routes a resize through the debounce window shared with the host
    /// resize signals.
    pub fn request_resize(&self, options: ResizeOptions) -> bool {
        self.core_mut("request_resize")
            .map(|core| core.request_resize(options))
            .unwrap_or(false)
    }

    pub fn dispose(&self) {
        if let Ok(mut core) = self.core_mut("dispose") {
            core.dispose();
        }
    }

    /// Changes the requested theme; a different effective theme rebuilds the
    /// engine instance.
    pub fn set_theme(&self, theme: ThemePreference) -> BindingResult<()> {
        let resolver = {
            let core = self.core_mut("set_theme")?;
            core.ensure_live("set_theme")?;
            Rc::clone(core.theme())
        };
        resolver.set_requested(theme);
        Ok(())
    }

    pub fn state(&self) -> BindingResult<BindingState> {
        self.core_ref("state").map(|core| core.state())
    }

    pub fn theme(&self) -> BindingResult<Theme> {
        self.core_ref("theme").map(|core| core.theme().current())
    }

    pub fn is_rendered(&self) -> BindingResult<bool> {
        self.core_ref("is_rendered").map(|core| core.is_rendered())
    }

    pub fn has_instance(&self) -> BindingResult<bool> {
        self.core_ref("has_instance").map(|core| core.has_instance())
    }

    pub fn cached_options(&self) -> BindingResult<ChartOptions> {
        self.core_ref("cached_options")
            .map(|core| core.cached_options().clone())
    }

    /// The engine this binding drives. Never blocked by a running operation.
    #[must_use]
    pub fn engine(&self) -> Rc<E> {
        Rc::clone(&self.engine)
    }

    /// Grants scoped access to the live engine instance, if any.
    pub fn with_instance<R>(&self, f: impl FnOnce(&mut E::Instance) -> R) -> Option<R> {
        let mut core = self.core_mut("with_instance").ok()?;
        core.instance_mut().map(f)
    }

    pub fn snapshot(&self) -> BindingResult<BindingSnapshot> {
        self.core_ref("snapshot").map(|core| core.snapshot())
    }

    fn core_ref(&self, operation: &'static str) -> BindingResult<Ref<'_, BindingCore<E>>> {
        self.core.try_borrow().map_err(|_| {
            warn!(operation, "binding read while another operation is running");
            BindingError::Busy
        })
    }

    fn core_mut(&self, operation: &'static str) -> BindingResult<RefMut<'_, BindingCore<E>>> {
        self.core.try_borrow_mut().map_err(|_| {
            warn!(operation, "binding re-entered while another operation is running");
            BindingError::Busy
        })
    }
}
