use thiserror::Error;

/// The one real fallible boundary in this engine: turning untrusted text
/// back into a `Pool`. Every arithmetic path elsewhere returns a value
/// (often zero) rather than an error, per the degenerate-input handling
/// the rest of the crate follows.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("snapshot is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("snapshot is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a valid decimal integer: `{value}`")]
    InvalidInteger { field: &'static str, value: String },
}
