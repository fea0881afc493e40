use thiserror::Error;

/// Errors that can occur while decoding or encoding graph JSON.
///
/// Malformed JSON is the only fatal decode case. Unknown node types, bad
/// edges and mismatched field values degrade locally and are reported
/// through the log instead.
#[derive(Error, Debug, Clone)]
pub enum CodecError {
    #[error("Failed to parse graph JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to encode graph JSON: {0}")]
    JsonEncodeError(String),
}

/// Errors that can occur while reading or writing binary ability-data packs.
#[derive(Error, Debug, Clone)]
pub enum DataError {
    #[error("Could not access data file '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Failed to decode ability data: {0}")]
    DecodeError(String),

    #[error("Failed to encode ability data: {0}")]
    EncodeError(String),
}

/// Failures surfaced by the runner loop.
///
/// Wrong-state calls (running while paused, resuming while idle) are usage
/// errors and only logged; a failed step is the one condition the runner
/// refuses to swallow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RunnerError {
    #[error("The resume context was rejected by the waiting node")]
    ResumeRejected,

    #[error("A flow step failed: {0}")]
    StepFailed(String),
}
