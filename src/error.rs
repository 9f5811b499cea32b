//! Engine error taxonomy
//!
//! Only failures a caller can act on are variants here. Degenerate
//! normalization ranges and empty results are ordinary outcomes and never
//! reach this type.

/// Errors surfaced by the analytic operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("Missing required query parameter: {name}")]
    MissingRequiredParameter { name: &'static str },

    #[error("Invalid query parameter '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },

    #[error("Data source unavailable: {reason}")]
    UpstreamUnavailable { reason: String },
}

impl EngineError {
    /// Wrap a loading failure, keeping the whole context chain in the message
    pub fn upstream(err: anyhow::Error) -> Self {
        EngineError::UpstreamUnavailable {
            reason: format!("{:#}", err),
        }
    }

    /// True for errors caused by the request rather than the server
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            EngineError::MissingRequiredParameter { .. } | EngineError::InvalidParameter { .. }
        )
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
