use thiserror::Error;

/// Errors raised while decoding or encoding protocol payloads.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid ndjson record on line {line}: {reason}")]
    InvalidRecord { line: usize, reason: String },
}

impl From<serde_json::Error> for ProtocolError {
    fn from(err: serde_json::Error) -> Self {
        ProtocolError::Serialization(err.to_string())
    }
}
