mod bind_options;
mod binding;
mod binding_core;
mod state;

pub use bind_options::BindOptions;
pub use binding::ChartBinding;
pub use state::{
    BINDING_SNAPSHOT_JSON_SCHEMA_V1, BindingSnapshot, BindingSnapshotJsonContractV1,
    BindingState, SetOptionsOutcome,
};
