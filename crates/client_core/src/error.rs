use std::path::PathBuf;

use thiserror::Error;

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Failures surfaced by [`crate::StudyClient`]. `Display` is the text shown to the user.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Non-2xx response; `message` is the response body, or a status fallback when empty.
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Bad JSON response")]
    Decode(#[source] serde_json::Error),
    #[error("invalid API base URL '{base}': {reason}")]
    InvalidBaseUrl { base: String, reason: String },
    #[error("failed to read {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }
}
