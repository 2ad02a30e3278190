use serde::{Deserialize, Serialize};

use crate::core::{Theme, ThemePreference};
use crate::error::{BindingError, BindingResult};

pub const BINDING_SNAPSHOT_JSON_SCHEMA_V1: u32 = 1;

/// Lifecycle state of one binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BindingState {
    Unbound,
    /// Waiting for the element reference to resolve to an attached surface.
    AwaitingElement,
    /// An engine instance exists but nothing has been rendered on it.
    Initialized,
    Rendered,
    /// Terminal.
    Disposed,
}

impl BindingState {
    #[must_use]
    pub const fn is_live(self) -> bool {
        !matches!(self, Self::Unbound | Self::Disposed)
    }
}

/// What a `set_options` call did with the new configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SetOptionsOutcome {
    /// Applied and rendered.
    Rendered,
    /// Applied to the instance; rendering waits for an explicit `render`.
    Staged,
    /// Cached only; the element is not mounted yet.
    Deferred,
}

/// Read-only view of a binding for diagnostics and host tooling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSnapshot {
    pub state: BindingState,
    pub requested_theme: ThemePreference,
    pub theme: Theme,
    pub rendered: bool,
    pub has_instance: bool,
    pub auto_resize: bool,
    pub render_immediately: bool,
    pub resize_pending: bool,
    pub init_count: u64,
    pub render_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingSnapshotJsonContractV1 {
    pub schema_version: u32,
    pub snapshot: BindingSnapshot,
}

impl BindingSnapshot {
    pub fn to_json_contract_v1_pretty(&self) -> BindingResult<String> {
        let payload = BindingSnapshotJsonContractV1 {
            schema_version: BINDING_SNAPSHOT_JSON_SCHEMA_V1,
            snapshot: self.clone(),
        };
        serde_json::to_string_pretty(&payload).map_err(|e| {
            BindingError::InvalidOptions(format!("failed to serialize snapshot contract v1: {e}"))
        })
    }

    pub fn from_json_compat_str(input: &str) -> BindingResult<Self> {
        if let Ok(snapshot) = serde_json::from_str::<BindingSnapshot>(input) {
            return Ok(snapshot);
        }
        let payload: BindingSnapshotJsonContractV1 = serde_json::from_str(input).map_err(|e| {
            BindingError::InvalidOptions(format!("failed to parse snapshot json payload: {e}"))
        })?;
        if payload.schema_version != BINDING_SNAPSHOT_JSON_SCHEMA_V1 {
            return Err(BindingError::InvalidOptions(format!(
                "unsupported snapshot schema version: {}",
                payload.schema_version
            )));
        }
        Ok(payload.snapshot)
    }
}
