mod recording_engine;
mod surface;

pub use recording_engine::{EngineCall, RecordedInstance, RecordingEngine};
pub use surface::{SurfaceHandle, SurfaceId};

use crate::core::{ChartOptions, ResizeOptions, Theme};
use crate::error::BindingResult;

/// Contract implemented by any charting backend.
///
/// The binding only sequences calls; drawing, layout and styling stay inside
/// the engine.
pub trait RenderingEngine {
    type Instance: EngineInstance;

    fn init(&self, surface: &SurfaceHandle, theme: Theme) -> BindingResult<Self::Instance>;
}

/// A live chart bound to one surface. Not reusable across surfaces.
pub trait EngineInstance {
    fn set_option(&mut self, options: &ChartOptions) -> BindingResult<()>;
    fn clear(&mut self);
    fn resize(&mut self, options: &ResizeOptions);
    /// Consumes the instance; ownership makes a second dispose impossible.
    fn dispose(self);
}
