use thiserror::Error;

/// Errors raised while configuring a simulation run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SimError {
    #[error("malformed press `{0}`, expected <button>@<millis>")]
    MalformedPress(String),

    #[error("invalid press time in `{entry}`: {reason}")]
    InvalidTime { entry: String, reason: String },

    #[error("sketch `{sketch}` has no button `{button}` (available: {available})")]
    UnknownButton {
        sketch: &'static str,
        button: String,
        available: String,
    },

    #[error("step must be at least 1 ms")]
    ZeroStep,
}
