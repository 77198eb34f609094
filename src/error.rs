//! Error taxonomy for the forge pipeline
//!
//! Every failure that reaches an HTTP handler is classified into exactly one
//! of these variants. Gateway parse failures are promoted to `Parse` so the
//! caller can tell "the model replied garbage" apart from "the model was
//! unreachable".

use crate::llm::GatewayError;

/// Result type for forge operations
pub type Result<T> = std::result::Result<T, ForgeError>;

/// Errors surfaced by the orchestrator boundary
#[derive(Debug, thiserror::Error)]
pub enum ForgeError {
    /// Required configuration (e.g. API credential) is missing or invalid
    #[error("configuration error: {0}")]
    Config(String),

    /// The model gateway failed after exhausting its fallback policy
    #[error("model gateway error: {0}")]
    Gateway(GatewayError),

    /// The model reply was not a well-formed bundle
    #[error("malformed model reply: {0}")]
    Parse(String),

    /// Filesystem failure during materialization
    #[error("filesystem error: {0}")]
    Io(#[from] std::io::Error),

    /// The instruction was rejected before any model call
    #[error("invalid instruction: {0}")]
    Validation(String),

    /// Archive creation failed or there is nothing to package
    #[error("packaging error: {0}")]
    Packaging(String),

    /// Browser launch helper failure
    #[error("launch error: {0}")]
    Launch(String),
}

impl From<GatewayError> for ForgeError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::Parse(msg) => ForgeError::Parse(msg),
            other => ForgeError::Gateway(other),
        }
    }
}
