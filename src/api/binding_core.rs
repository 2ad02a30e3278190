use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, trace, warn};

use crate::core::{
    ChartOptions, OptionCache, ResizeOptions, ResizeScheduler, Theme, ThemeResolver,
};
use crate::error::{BindingError, BindingResult};
use crate::host::{
    BindingContext, Diagnostic, ElementSource, LayoutChange, LayoutSubscribeOptions,
    SubscriptionId,
};
use crate::render::{EngineInstance, RenderingEngine, SurfaceHandle};

use super::{BindOptions, BindingSnapshot, BindingState, SetOptionsOutcome};

const DARK_BACKGROUND_KEY: &str = "backgroundColor";
const DARK_BACKGROUND: &str = "transparent";

pub(super) type SharedCore<E> = Rc<RefCell<BindingCore<E>>>;
pub(super) type WeakCore<E> = Weak<RefCell<BindingCore<E>>>;

#[derive(Debug, Clone, Copy)]
enum ResizeSubscription {
    Window(SubscriptionId),
    Layout(SubscriptionId),
}

#[derive(Debug, Default)]
struct BindingSubscriptions {
    element: Option<SubscriptionId>,
    theme: Option<SubscriptionId>,
    resize: Option<ResizeSubscription>,
    teardown: Option<SubscriptionId>,
}

/// State shared between a `ChartBinding` handle and the host callbacks.
///
/// Host callbacks hold a `Weak` to it and go through `with_core`, so a
/// dropped handle silently stops reacting.
pub(super) struct BindingCore<E: RenderingEngine> {
    engine: Rc<E>,
    context: BindingContext,
    options: BindOptions,
    element: Rc<dyn ElementSource>,
    surface: Option<SurfaceHandle>,
    instance: Option<E::Instance>,
    cache: OptionCache,
    theme: Rc<ThemeResolver>,
    scheduler: ResizeScheduler,
    state: BindingState,
    rendered: bool,
    render_requested: bool,
    subscriptions: BindingSubscriptions,
    init_count: u64,
    render_count: u64,
}

impl<E: RenderingEngine + 'static> BindingCore<E> {
    pub(super) fn new(
        engine: Rc<E>,
        context: BindingContext,
        element: Rc<dyn ElementSource>,
        initial: ChartOptions,
        options: BindOptions,
        weak: &WeakCore<E>,
    ) -> Self {
        let theme = Rc::new(ThemeResolver::new(
            options.theme,
            Rc::clone(&context.dark_mode),
        ));
        let resize_target = weak.clone();
        let scheduler = ResizeScheduler::new(
            Rc::clone(&context.timers),
            Rc::new(move |resize: ResizeOptions| {
                with_core(&resize_target, "debounced resize", |core| {
                    core.resize(&resize);
                });
            }),
        );

        Self {
            engine,
            context,
            options,
            element,
            surface: None,
            instance: None,
            cache: OptionCache::new(initial),
            theme,
            scheduler,
            state: BindingState::Unbound,
            rendered: false,
            render_requested: false,
            subscriptions: BindingSubscriptions::default(),
            init_count: 0,
            render_count: 0,
        }
    }

    /// Wires the host subscriptions and moves `Unbound -> AwaitingElement`,
    /// initializing right away when the element is already mounted.
    pub(super) fn attach(core: &SharedCore<E>) {
        let weak = Rc::downgrade(core);
        let mut this = core.borrow_mut();

        let theme_target = weak.clone();
        let theme_id = this.theme.subscribe(Rc::new(move |theme: Theme| {
            with_core(&theme_target, "theme change", |core| {
                core.on_theme_changed(theme);
            });
        }));
        let element_target = weak.clone();
        let element_id = this
            .element
            .on_resolve(Rc::new(move |surface: &SurfaceHandle| {
                with_core(&element_target, "element resolve", |core| {
                    core.on_element_resolved(surface);
                });
            }));
        this.subscriptions.theme = Some(theme_id);
        this.subscriptions.element = Some(element_id);
        this.state = BindingState::AwaitingElement;
        debug!(
            theme = this.theme.current().as_str(),
            auto_resize = this.options.auto_resize,
            render_immediately = this.options.render_immediately,
            "chart binding created"
        );

        if let Some(surface) = this.available_surface() {
            this.on_element_resolved(&surface);
        }

        let lifecycle = Rc::clone(&this.context.lifecycle);
        drop(this);
        let teardown = lifecycle.on_teardown(Box::new(move || {
            with_core(&weak, "owner teardown", BindingCore::dispose);
        }));
        let mut this = core.borrow_mut();
        if this.state == BindingState::Disposed {
            return;
        }
        this.subscriptions.teardown = teardown;
    }
}

impl<E: RenderingEngine> BindingCore<E> {
    pub(super) fn set_options(
        &mut self,
        options: ChartOptions,
        clear_previous: bool,
    ) -> BindingResult<SetOptionsOutcome> {
        self.ensure_live("set_options")?;
        self.cache.set(options);

        let created = if self.instance.is_some() {
            false
        } else {
            let Some(surface) = self.available_surface() else {
                self.report(Diagnostic::premature_render());
                return Ok(SetOptionsOutcome::Deferred);
            };
            self.initialize(&surface)?;
            true
        };
        // A fresh instance has nothing to clear.
        self.apply_cached(clear_previous && !created)
    }

    pub(super) fn render(&mut self) -> BindingResult<bool> {
        self.ensure_live("render")?;
        if self.instance.is_none() {
            self.render_requested = true;
            let Some(surface) = self.available_surface() else {
                self.report(Diagnostic::premature_render());
                return Ok(false);
            };
            self.initialize(&surface)?;
        }

        let applied = self.themed_options();
        let Some(instance) = self.instance.as_mut() else {
            return Ok(false);
        };
        if let Err(err) = instance.set_option(&applied) {
            self.report(Diagnostic::engine_call_failed("set_option", &err));
            return Err(err);
        }

        self.rendered = true;
        self.render_requested = false;
        self.render_count += 1;
        self.state = BindingState::Rendered;
        trace!(
            render_count = self.render_count,
            fields = applied.len(),
            "chart rendered"
        );
        Ok(true)
    }

    pub(super) fn resize(&mut self, options: &ResizeOptions) -> bool {
        if self.state == BindingState::Disposed {
            return false;
        }
        match self.instance.as_mut() {
            Some(instance) => {
                instance.resize(options);
                trace!(width = ?options.width, height = ?options.height, "chart resized");
                true
            }
            None => false,
        }
    }

    pub(super) fn request_resize(&self, options: ResizeOptions) -> bool {
        if !self.state.is_live() {
            return false;
        }
        self.scheduler.schedule(options);
        true
    }

    /// Idempotent teardown. Pending resizes and subscriptions are released
    /// before the engine instance goes away.
    pub(super) fn dispose(&mut self) {
        if self.state == BindingState::Disposed {
            return;
        }

        let cancelled_resize = self.scheduler.cancel();
        if let Some(id) = self.subscriptions.theme.take() {
            self.theme.unsubscribe(id);
        }
        self.theme.detach();
        match self.subscriptions.resize.take() {
            Some(ResizeSubscription::Window(id)) => {
                self.context.window.remove_resize_listener(id);
            }
            Some(ResizeSubscription::Layout(id)) => {
                self.context.layout.unsubscribe(id);
            }
            None => {}
        }
        if let Some(id) = self.subscriptions.element.take() {
            self.element.unsubscribe(id);
        }
        if let Some(id) = self.subscriptions.teardown.take() {
            self.context.lifecycle.cancel_teardown(id);
        }

        let had_instance = self.instance.is_some();
        self.release_instance();
        self.state = BindingState::Disposed;
        debug!(had_instance, cancelled_resize, "chart binding disposed");
    }

    pub(super) fn state(&self) -> BindingState {
        self.state
    }

    pub(super) fn theme(&self) -> &Rc<ThemeResolver> {
        &self.theme
    }

    pub(super) fn cached_options(&self) -> &ChartOptions {
        self.cache.get()
    }

    pub(super) fn is_rendered(&self) -> bool {
        self.rendered
    }

    pub(super) fn instance_mut(&mut self) -> Option<&mut E::Instance> {
        self.instance.as_mut()
    }

    pub(super) fn has_instance(&self) -> bool {
        self.instance.is_some()
    }

    pub(super) fn ensure_live(&self, operation: &str) -> BindingResult<()> {
        if self.state == BindingState::Disposed {
            self.report(Diagnostic::use_after_dispose(operation));
            return Err(BindingError::Disposed);
        }
        Ok(())
    }

    pub(super) fn snapshot(&self) -> BindingSnapshot {
        BindingSnapshot {
            state: self.state,
            requested_theme: self.theme.requested(),
            theme: self.theme.current(),
            rendered: self.rendered,
            has_instance: self.instance.is_some(),
            auto_resize: self.options.auto_resize,
            render_immediately: self.options.render_immediately,
            resize_pending: self.scheduler.is_pending(),
            init_count: self.init_count,
            render_count: self.render_count,
        }
    }

    fn on_element_resolved(&mut self, surface: &SurfaceHandle) {
        if self.state == BindingState::Disposed {
            return;
        }
        if !surface.is_attached() {
            trace!(surface = surface.id().raw(), "element resolved to a detached node");
            return;
        }
        if self.instance.is_some() {
            if self.surface.as_ref().map(SurfaceHandle::id) == Some(surface.id()) {
                return;
            }
            debug!(
                surface = surface.id().raw(),
                "element swapped; rebinding engine instance"
            );
            self.release_instance();
        }

        if self.initialize(surface).is_ok() {
            self.apply_cached_logged(false);
        }
    }

    /// Engines cannot swap themes on a live instance, so every change of the
    /// effective theme rebuilds the instance from the cache.
    fn on_theme_changed(&mut self, theme: Theme) {
        if self.state == BindingState::Disposed {
            return;
        }
        if self.instance.is_some() {
            debug!(theme = theme.as_str(), "theme changed; reinitializing engine instance");
            self.release_instance();
        }
        // Also retries an instance whose previous initialization failed.
        let Some(surface) = self.available_surface() else {
            debug!(
                theme = theme.as_str(),
                "theme changed before initialization"
            );
            self.state = BindingState::AwaitingElement;
            return;
        };
        if self.initialize(&surface).is_ok() {
            self.apply_cached_logged(false);
        }
    }

    fn initialize(&mut self, surface: &SurfaceHandle) -> BindingResult<()> {
        let theme = self.theme.current();
        match self.engine.init(surface, theme) {
            Ok(instance) => {
                self.instance = Some(instance);
                self.surface = Some(surface.clone());
                self.init_count += 1;
                self.state = BindingState::Initialized;
                self.ensure_resize_subscription();
                debug!(
                    surface = surface.id().raw(),
                    theme = theme.as_str(),
                    init_count = self.init_count,
                    "engine instance initialized"
                );
                Ok(())
            }
            Err(err) => {
                self.state = BindingState::AwaitingElement;
                self.report(Diagnostic::engine_init_failed(&err));
                Err(err)
            }
        }
    }

    fn apply_cached(&mut self, clear: bool) -> BindingResult<SetOptionsOutcome> {
        if clear {
            if let Some(instance) = self.instance.as_mut() {
                instance.clear();
            }
        }
        if self.rendered || self.options.render_immediately || self.render_requested {
            self.render()?;
            return Ok(SetOptionsOutcome::Rendered);
        }
        Ok(SetOptionsOutcome::Staged)
    }

    fn apply_cached_logged(&mut self, clear: bool) {
        if let Err(err) = self.apply_cached(clear) {
            warn!(error = %err, "cached options could not be applied");
        }
    }

    fn themed_options(&self) -> ChartOptions {
        let cached = self.cache.get();
        if self.theme.current().is_dark() {
            return cached.with_defaults(
                &ChartOptions::new().with_field(DARK_BACKGROUND_KEY, DARK_BACKGROUND),
            );
        }
        cached.clone()
    }

    fn available_surface(&self) -> Option<SurfaceHandle> {
        self.element
            .current()
            .filter(SurfaceHandle::is_attached)
    }

    fn ensure_resize_subscription(&mut self) {
        if self.subscriptions.resize.is_some() {
            return;
        }
        let scheduler = self.scheduler.clone();
        let subscription = if self.options.auto_resize {
            ResizeSubscription::Window(self.context.window.add_resize_listener(Rc::new(
                move || scheduler.schedule(ResizeOptions::default()),
            )))
        } else {
            ResizeSubscription::Layout(self.context.layout.subscribe(
                Rc::new(move |_: Option<&LayoutChange>| {
                    scheduler.schedule(ResizeOptions::default());
                }),
                LayoutSubscribeOptions {
                    wants_payload: false,
                },
            ))
        };
        trace!(?subscription, "resize subscription registered");
        self.subscriptions.resize = Some(subscription);
    }

    fn release_instance(&mut self) {
        if let Some(instance) = self.instance.take() {
            instance.dispose();
            trace!("engine instance disposed");
        }
    }

    fn report(&self, diagnostic: Diagnostic) {
        self.context.diagnostics.report(&diagnostic);
    }
}

impl<E: RenderingEngine> Drop for BindingCore<E> {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Runs `f` against the core behind `weak`, if it is still alive and not
/// already borrowed further up the stack.
fn with_core<E: RenderingEngine>(
    weak: &WeakCore<E>,
    event: &'static str,
    f: impl FnOnce(&mut BindingCore<E>),
) {
    let Some(core) = weak.upgrade() else {
        trace!(event, "binding dropped; notification ignored");
        return;
    };
    match core.try_borrow_mut() {
        Ok(mut core) => f(&mut *core),
        Err(_) => warn!(event, "re-entrant binding notification skipped"),
    };
}
