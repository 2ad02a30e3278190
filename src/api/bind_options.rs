use serde::{Deserialize, Serialize};

use crate::core::ThemePreference;
use crate::error::{BindingError, BindingResult};

/// Per-binding options fixed at bind time.
///
/// Serializable so hosts can keep chart setup in their own config files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindOptions {
    #[serde(default)]
    pub theme: ThemePreference,
    /// Render as soon as options are applied instead of waiting for an
    /// explicit `render` call.
    #[serde(default = "default_render_immediately")]
    pub render_immediately: bool,
    /// `true` follows the window resize signal; `false` follows the host
    /// layout-change channel.
    #[serde(default)]
    pub auto_resize: bool,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            theme: ThemePreference::Default,
            render_immediately: default_render_immediately(),
            auto_resize: false,
        }
    }
}

impl BindOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_theme(mut self, theme: ThemePreference) -> Self {
        self.theme = theme;
        self
    }

    #[must_use]
    pub fn with_render_immediately(mut self, render_immediately: bool) -> Self {
        self.render_immediately = render_immediately;
        self
    }

    #[must_use]
    pub fn with_auto_resize(mut self, auto_resize: bool) -> Self {
        self.auto_resize = auto_resize;
        self
    }

    pub fn to_json_pretty(self) -> BindingResult<String> {
        serde_json::to_string_pretty(&self).map_err(|e| {
            BindingError::InvalidOptions(format!("failed to serialize bind options: {e}"))
        })
    }

    pub fn from_json_str(input: &str) -> BindingResult<Self> {
        serde_json::from_str(input)
            .map_err(|e| BindingError::InvalidOptions(format!("failed to parse bind options: {e}")))
    }
}

fn default_render_immediately() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::BindOptions;
    use crate::core::ThemePreference;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let options = BindOptions::from_json_str(r#"{"theme": "dark"}"#).expect("parse");
        assert_eq!(options.theme, ThemePreference::Dark);
        assert!(options.render_immediately);
        assert!(!options.auto_resize);
    }

    #[test]
    fn json_roundtrip_keeps_builder_values() {
        let options = BindOptions::new()
            .with_theme(ThemePreference::Light)
            .with_render_immediately(false)
            .with_auto_resize(true);
        let json = options.to_json_pretty().expect("serialize");
        assert!(json.contains("\"light\""));
        assert_eq!(BindOptions::from_json_str(&json).expect("parse"), options);
    }
}
