pub mod option_cache;
pub mod options;
pub mod resize;
pub mod theme;

pub use option_cache::OptionCache;
pub use options::ChartOptions;
pub use resize::{Easing, RESIZE_DEBOUNCE, ResizeAnimation, ResizeOptions, ResizeScheduler};
pub use theme::{Theme, ThemePreference, ThemeResolver};
