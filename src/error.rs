use thiserror::Error;

pub type BindingResult<T> = Result<T, BindingError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("engine rejected initialization: {reason}")]
    EngineInit { reason: String },

    #[error("binding has been disposed")]
    Disposed,

    #[error("invalid chart options: {0}")]
    InvalidOptions(String),

    #[error("engine call failed: {0}")]
    Engine(String),

    #[error("binding is busy with another operation")]
    Busy,
}
