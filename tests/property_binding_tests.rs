use std::rc::Rc;

use chart_binding::api::{BindOptions, BindingState, ChartBinding};
use chart_binding::core::{ChartOptions, ResizeOptions};
use chart_binding::host::{ElementRef, HeadlessHost};
use chart_binding::render::{RecordingEngine, SurfaceHandle, SurfaceId};
use proptest::prelude::*;
use serde_json::json;

fn surface() -> SurfaceHandle {
    SurfaceHandle::attached(SurfaceId::new(1), 400, 300)
}

fn options_strategy() -> impl Strategy<Value = ChartOptions> {
    (
        prop::collection::btree_map("[a-zA-Z]{1,10}", any::<i64>(), 0..6),
        prop::option::of("#[0-9a-f]{6}"),
    )
        .prop_map(|(fields, background)| {
            let mut options = ChartOptions::new();
            for (key, value) in fields {
                options = options.with_field(key, value);
            }
            if let Some(color) = background {
                options = options.with_field("backgroundColor", color);
            }
            options
        })
}

proptest! {
    #[test]
    fn options_cached_before_mount_render_exactly_once(
        values in prop::collection::vec(any::<i32>(), 0..32)
    ) {
        let host = HeadlessHost::new();
        let engine = RecordingEngine::new();
        let element = ElementRef::new();
        let binding = ChartBinding::bind(
            engine.clone(),
            host.context(),
            Rc::new(element.clone()),
            ChartOptions::new(),
            BindOptions::default(),
        );
        let options = ChartOptions::new().with_field("series", json!(values));

        binding.set_options(options.clone()).expect("cache before mount");
        prop_assert!(engine.calls().is_empty());
        element.resolve(surface());

        prop_assert_eq!(engine.init_count(), 1);
        prop_assert_eq!(engine.applied_options(), vec![options]);
    }

    #[test]
    fn repeated_dispose_matches_single_dispose(extra_disposals in 0usize..8) {
        let host = HeadlessHost::new();
        let engine = RecordingEngine::new();
        let binding = ChartBinding::bind(
            engine.clone(),
            host.context(),
            Rc::new(ElementRef::resolved(surface())),
            ChartOptions::new(),
            BindOptions::new().with_auto_resize(true),
        );

        binding.dispose();
        for _ in 0..extra_disposals {
            binding.dispose();
        }

        prop_assert_eq!(binding.state(), Ok(BindingState::Disposed));
        prop_assert_eq!(engine.dispose_count(), 1);
        prop_assert_eq!(engine.live_instances(), 0);
        prop_assert_eq!(host.window.listener_count(), 0);
        prop_assert!(host.diagnostics.is_empty());
    }

    #[test]
    fn resize_burst_inside_window_fires_once_with_last_parameters(
        widths in prop::collection::vec(1u32..4_000, 1..20),
        gap_ms in 0u64..200
    ) {
        let host = HeadlessHost::new();
        let engine = RecordingEngine::new();
        let binding = ChartBinding::bind(
            engine.clone(),
            host.context(),
            Rc::new(ElementRef::resolved(surface())),
            ChartOptions::new(),
            BindOptions::default(),
        );

        for (index, width) in widths.iter().enumerate() {
            if index > 0 {
                host.timers.advance_ms(gap_ms);
            }
            binding.request_resize(ResizeOptions::default().with_size(*width, 300));
        }
        prop_assert!(engine.resize_calls().is_empty());
        host.timers.advance_ms(200);

        let last = *widths.last().expect("non-empty burst");
        prop_assert_eq!(
            engine.resize_calls(),
            vec![ResizeOptions::default().with_size(last, 300)]
        );
    }

    #[test]
    fn dark_render_layers_transparent_background_under_cached_fields(
        options in options_strategy()
    ) {
        let host = HeadlessHost::with_dark_mode(false);
        let engine = RecordingEngine::new();
        let binding = ChartBinding::bind(
            engine.clone(),
            host.context(),
            Rc::new(ElementRef::resolved(surface())),
            options.clone(),
            BindOptions::default(),
        );
        engine.clear_calls();

        host.dark_mode.set(true);

        let applied = engine.applied_options();
        prop_assert_eq!(applied.len(), 1);
        let expected = options.with_defaults(
            &ChartOptions::new().with_field("backgroundColor", "transparent"),
        );
        prop_assert_eq!(&applied[0], &expected);
        match options.get("backgroundColor") {
            Some(color) => {
                prop_assert_eq!(applied[0].get("backgroundColor"), Some(color));
            }
            None => {
                prop_assert_eq!(
                    applied[0].get("backgroundColor"),
                    Some(&json!("transparent"))
                );
            }
        }
        prop_assert_eq!(binding.cached_options(), Ok(options));
    }
}
