//! Error types for the outreach agent

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Result of a single capability invocation. Expected failures travel as
/// [`ToolFailure`] values and never abort the run.
pub type ToolResult = std::result::Result<serde_json::Value, ToolFailure>;

/// Fatal, run-level errors.
///
/// Tool-level problems are deliberately NOT represented here; they are
/// absorbed at the invocation boundary as [`ToolFailure`] values.
#[derive(Error, Debug)]
pub enum AgentError {

    // =============================
    // Core Loop Errors
    // =============================

    #[error("Planner unreachable: {0}")]
    PlannerUnreachable(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Expected failure modes of a capability invocation.
///
/// These are part of the tool contract, not exceptions: the control loop
/// records them in the reasoning trace and continues.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    /// The capability cannot run at all, typically a missing credential.
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// A retryable provider or network fault.
    #[error("transient provider error: {0}")]
    Transient(String),

    /// The call was valid but produced nothing.
    #[error("no result")]
    NoResult,
}
