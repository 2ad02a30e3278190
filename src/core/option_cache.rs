use super::ChartOptions;

/// Single slot holding the most recently accepted configuration.
///
/// Writes replace the previous value wholesale. Theme defaults are layered by
/// the binding at render time and never stored here.
#[derive(Debug, Clone, Default)]
pub struct OptionCache {
    slot: ChartOptions,
}

impl OptionCache {
    #[must_use]
    pub fn new(initial: ChartOptions) -> Self {
        Self { slot: initial }
    }

    #[must_use]
    pub fn get(&self) -> &ChartOptions {
        &self.slot
    }

    pub fn set(&mut self, options: ChartOptions) {
        self.slot = options;
    }
}
