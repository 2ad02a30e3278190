//! chart-binding: lifecycle controller attaching declarative chart options to
//! a host rendering surface.
//!
//! A `ChartBinding` owns one engine instance per surface and sequences its
//! initialization, rendering, theme-driven rebuilds, debounced resizes and
//! teardown. Host capabilities are injected through `host::BindingContext`.

pub mod api;
pub mod core;
pub mod error;
pub mod host;
pub mod render;
pub mod telemetry;

pub use api::{BindOptions, ChartBinding};
pub use error::{BindingError, BindingResult};
