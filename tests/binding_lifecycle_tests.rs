use std::cell::RefCell;
use std::rc::Rc;

use chart_binding::api::{BindOptions, BindingState, ChartBinding, SetOptionsOutcome};
use chart_binding::core::{ChartOptions, Theme};
use chart_binding::host::{Diagnostic, DiagnosticKind, DiagnosticSink, ElementRef, HeadlessHost};
use chart_binding::render::{EngineCall, RecordingEngine, SurfaceHandle, SurfaceId};
use chart_binding::BindingError;
use serde_json::json;

fn surface(id: u64) -> SurfaceHandle {
    SurfaceHandle::attached(SurfaceId::new(id), 800, 400)
}

fn series(values: serde_json::Value) -> ChartOptions {
    ChartOptions::new().with_field("series", values)
}

fn bind(
    host: &HeadlessHost,
    engine: &RecordingEngine,
    element: &ElementRef,
    options: BindOptions,
) -> ChartBinding<RecordingEngine> {
    ChartBinding::bind(
        engine.clone(),
        host.context(),
        Rc::new(element.clone()),
        ChartOptions::new(),
        options,
    )
}

#[test]
fn options_set_before_mount_render_once_when_element_resolves() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::new();
    let binding = bind(
        &host,
        &engine,
        &element,
        BindOptions::new().with_auto_resize(false),
    );
    assert_eq!(binding.state(), Ok(BindingState::AwaitingElement));

    let outcome = binding
        .set_options(series(json!([1, 2, 3])))
        .expect("set options before mount");
    assert_eq!(outcome, SetOptionsOutcome::Deferred);
    assert!(engine.calls().is_empty());
    let diagnostics = host.diagnostics.entries();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].kind, DiagnosticKind::PrematureRender);
    assert!(diagnostics[0]
        .message
        .contains("render attempted before mount"));

    element.resolve(surface(1));

    assert_eq!(
        engine.calls(),
        vec![
            EngineCall::Init {
                instance: 0,
                surface: SurfaceId::new(1),
                theme: Theme::Light,
            },
            EngineCall::SetOption {
                instance: 0,
                options: series(json!([1, 2, 3])),
            },
        ]
    );
    assert_eq!(binding.state(), Ok(BindingState::Rendered));
    assert_eq!(binding.is_rendered(), Ok(true));
}

#[test]
fn already_mounted_element_initializes_during_bind() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(surface(7));
    let binding = ChartBinding::bind(
        engine.clone(),
        host.context(),
        Rc::new(element.clone()),
        series(json!([4])),
        BindOptions::default(),
    );

    assert_eq!(binding.state(), Ok(BindingState::Rendered));
    assert_eq!(engine.init_count(), 1);
    assert_eq!(engine.applied_options(), vec![series(json!([4]))]);
    assert!(host.diagnostics.is_empty());
}

#[test]
fn staged_options_wait_for_explicit_render_then_follow_up_calls_render() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(surface(1));
    let binding = bind(
        &host,
        &engine,
        &element,
        BindOptions::new().with_render_immediately(false),
    );
    assert_eq!(binding.state(), Ok(BindingState::Initialized));
    assert!(engine.applied_options().is_empty());

    let outcome = binding
        .set_options(series(json!([1])))
        .expect("stage options");
    assert_eq!(outcome, SetOptionsOutcome::Staged);
    assert_eq!(engine.clear_count(), 1);
    assert!(engine.applied_options().is_empty());

    assert!(binding.render().expect("render"));
    assert_eq!(binding.state(), Ok(BindingState::Rendered));

    let outcome = binding
        .set_options_with(series(json!([2])), false)
        .expect("render after first render");
    assert_eq!(outcome, SetOptionsOutcome::Rendered);
    assert_eq!(engine.clear_count(), 1);
    assert_eq!(
        engine.applied_options(),
        vec![series(json!([1])), series(json!([2]))]
    );
}

#[test]
fn render_requested_before_mount_is_honored_on_resolve() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::new();
    let binding = bind(
        &host,
        &engine,
        &element,
        BindOptions::new().with_render_immediately(false),
    );

    assert!(!binding.render().expect("render before mount"));
    assert_eq!(host.diagnostics.count(DiagnosticKind::PrematureRender), 1);

    element.resolve(surface(2));
    assert_eq!(binding.state(), Ok(BindingState::Rendered));
    assert_eq!(engine.applied_options().len(), 1);
}

#[test]
fn set_options_overwrites_cache_without_merging() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(surface(1));
    let binding = bind(&host, &engine, &element, BindOptions::default());

    binding
        .set_options(ChartOptions::new().with_field("title", "cpu"))
        .expect("first options");
    binding
        .set_options(series(json!([9])))
        .expect("second options");

    assert_eq!(binding.cached_options(), Ok(series(json!([9]))));
    assert_eq!(engine.applied_options().last(), Some(&series(json!([9]))));
}

#[test]
fn detached_surface_does_not_initialize() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::new();
    let binding = bind(&host, &engine, &element, BindOptions::default());

    element.resolve(SurfaceHandle::detached(SurfaceId::new(3)));
    assert_eq!(binding.state(), Ok(BindingState::AwaitingElement));
    assert_eq!(engine.init_count(), 0);

    element.resolve(surface(3));
    assert_eq!(binding.state(), Ok(BindingState::Rendered));
}

#[test]
fn element_swap_rebuilds_instance_on_new_surface() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::new();
    let _binding = ChartBinding::bind(
        engine.clone(),
        host.context(),
        Rc::new(element.clone()),
        series(json!([5])),
        BindOptions::default(),
    );

    element.resolve(surface(1));
    engine.clear_calls();
    element.resolve(surface(2));

    assert_eq!(
        engine.calls(),
        vec![
            EngineCall::Dispose { instance: 0 },
            EngineCall::Init {
                instance: 1,
                surface: SurfaceId::new(2),
                theme: Theme::Light,
            },
            EngineCall::SetOption {
                instance: 1,
                options: series(json!([5])),
            },
        ]
    );
    assert_eq!(engine.live_instances(), 1);
}

#[test]
fn engine_init_failure_keeps_binding_awaiting_with_options_cached() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::new();
    let binding = bind(&host, &engine, &element, BindOptions::default());

    engine.fail_next_init("webgl context lost");
    element.resolve(surface(1));

    assert_eq!(binding.state(), Ok(BindingState::AwaitingElement));
    assert_eq!(binding.has_instance(), Ok(false));
    assert_eq!(host.diagnostics.count(DiagnosticKind::EngineInitFailed), 1);

    let outcome = binding
        .set_options(series(json!([3, 2, 1])))
        .expect("second attempt initializes");
    assert_eq!(outcome, SetOptionsOutcome::Rendered);
    assert_eq!(engine.applied_options(), vec![series(json!([3, 2, 1]))]);
}

#[test]
fn zero_area_surface_reports_init_error_to_caller() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(SurfaceHandle::attached(SurfaceId::new(1), 0, 0));
    let binding = bind(&host, &engine, &element, BindOptions::default());
    assert_eq!(host.diagnostics.count(DiagnosticKind::EngineInitFailed), 1);

    let err = binding
        .set_options(series(json!([1])))
        .expect_err("engine rejects zero-area surface");
    assert!(matches!(err, BindingError::EngineInit { .. }));
    assert_eq!(binding.state(), Ok(BindingState::AwaitingElement));
    assert_eq!(binding.cached_options(), Ok(series(json!([1]))));
}

#[test]
fn dispose_is_idempotent() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(surface(1));
    let binding = bind(&host, &engine, &element, BindOptions::default());

    binding.dispose();
    binding.dispose();
    host.owner.teardown();

    assert_eq!(binding.state(), Ok(BindingState::Disposed));
    assert_eq!(engine.dispose_count(), 1);
    assert_eq!(engine.live_instances(), 0);
    assert!(host.diagnostics.is_empty());
}

#[test]
fn owner_teardown_releases_every_subscription() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(surface(1));
    let binding = bind(&host, &engine, &element, BindOptions::default());
    assert_eq!(element.subscriber_count(), 1);
    assert_eq!(host.dark_mode.subscriber_count(), 1);
    assert_eq!(host.layout.subscriber_count(), 1);

    host.owner.teardown();

    assert_eq!(binding.state(), Ok(BindingState::Disposed));
    assert_eq!(binding.has_instance(), Ok(false));
    assert_eq!(element.subscriber_count(), 0);
    assert_eq!(host.dark_mode.subscriber_count(), 0);
    assert_eq!(host.layout.subscriber_count(), 0);
    assert_eq!(engine.live_instances(), 0);
}

#[test]
fn teardown_before_mount_stops_waiting_for_element() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::new();
    let binding = bind(&host, &engine, &element, BindOptions::default());

    host.owner.teardown();
    element.resolve(surface(1));

    assert_eq!(binding.state(), Ok(BindingState::Disposed));
    assert_eq!(engine.init_count(), 0);
}

#[test]
fn calls_after_dispose_fail_softly() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(surface(1));
    let binding = bind(&host, &engine, &element, BindOptions::default());
    binding.dispose();
    engine.clear_calls();

    assert_eq!(
        binding.set_options(series(json!([1]))),
        Err(BindingError::Disposed)
    );
    assert_eq!(binding.render(), Err(BindingError::Disposed));
    assert!(!binding.resize());
    assert!(engine.calls().is_empty());
    assert_eq!(host.diagnostics.count(DiagnosticKind::UseAfterDispose), 2);
}

#[test]
fn dropping_last_handle_disposes_binding() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(surface(1));
    let binding = bind(
        &host,
        &engine,
        &element,
        BindOptions::new().with_auto_resize(true),
    );
    let second_handle = binding.clone();
    drop(binding);
    assert_eq!(engine.live_instances(), 1);

    drop(second_handle);
    assert_eq!(engine.live_instances(), 0);
    assert_eq!(host.window.listener_count(), 0);
    assert_eq!(element.subscriber_count(), 0);

    host.owner.teardown();
    assert_eq!(engine.dispose_count(), 1);
}

#[test]
fn engine_set_option_failure_is_reported_and_returned() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::resolved(surface(1));
    let binding = bind(&host, &engine, &element, BindOptions::default());

    engine.fail_set_option(Some("invalid series type".to_owned()));
    let err = binding
        .set_options(series(json!("bogus")))
        .expect_err("engine rejects options");
    assert_eq!(err, BindingError::Engine("invalid series type".to_owned()));
    assert_eq!(host.diagnostics.count(DiagnosticKind::EngineCallFailed), 1);
    assert_eq!(binding.has_instance(), Ok(true));
}

#[test]
fn with_instance_exposes_live_instance_only() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::new();
    let binding = bind(&host, &engine, &element, BindOptions::default());
    assert_eq!(binding.with_instance(|instance| instance.id()), None);

    element.resolve(surface(1));
    assert_eq!(binding.with_instance(|instance| instance.id()), Some(0));
    assert_eq!(binding.engine().init_count(), 1);
}

/// Sink that reads the binding it is reporting for.
#[derive(Default)]
struct InspectingSink {
    binding: RefCell<Option<ChartBinding<RecordingEngine>>>,
    observed: RefCell<Vec<Result<BindingState, BindingError>>>,
}

impl DiagnosticSink for InspectingSink {
    fn report(&self, _diagnostic: &Diagnostic) {
        if let Some(binding) = self.binding.borrow().as_ref() {
            self.observed.borrow_mut().push(binding.state());
            assert_eq!(binding.snapshot(), Err(BindingError::Busy));
            assert_eq!(binding.cached_options(), Err(BindingError::Busy));
            assert_eq!(binding.engine().init_count(), 0);
        }
    }
}

#[test]
fn accessors_called_from_a_reporting_sink_return_busy() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();
    let element = ElementRef::new();
    let sink = Rc::new(InspectingSink::default());
    let binding = ChartBinding::bind(
        engine.clone(),
        host.context().with_diagnostics(sink.clone()),
        Rc::new(element.clone()),
        ChartOptions::new(),
        BindOptions::default(),
    );
    *sink.binding.borrow_mut() = Some(binding.clone());

    let outcome = binding
        .set_options(series(json!([1])))
        .expect("cached before mount");

    assert_eq!(outcome, SetOptionsOutcome::Deferred);
    assert_eq!(*sink.observed.borrow(), vec![Err(BindingError::Busy)]);
    assert_eq!(binding.state(), Ok(BindingState::AwaitingElement));
    sink.binding.borrow_mut().take();
}

#[test]
fn disposed_bindings_leave_no_teardown_registration_behind() {
    let host = HeadlessHost::new();
    let engine = RecordingEngine::new();

    for id in 0..5 {
        let binding = bind(
            &host,
            &engine,
            &ElementRef::resolved(surface(id)),
            BindOptions::default(),
        );
        assert_eq!(host.owner.pending_callbacks(), 1);
        binding.dispose();
        assert_eq!(host.owner.pending_callbacks(), 0);
    }

    let _live = bind(
        &host,
        &engine,
        &ElementRef::resolved(surface(9)),
        BindOptions::default(),
    );
    drop(bind(
        &host,
        &engine,
        &ElementRef::resolved(surface(10)),
        BindOptions::default(),
    ));
    assert_eq!(host.owner.pending_callbacks(), 1);

    host.owner.teardown();
    assert_eq!(engine.live_instances(), 0);
}
