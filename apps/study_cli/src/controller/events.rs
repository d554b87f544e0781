//! Backend results delivered to the controller, and error modeling for display.

use std::path::PathBuf;

use client_core::ClientError;
use shared::{
    domain::{ChatMessage, SessionSummary},
    protocol::{HealthResponse, NoteId},
};

#[derive(Debug, Clone)]
pub enum UiEvent {
    Info(String),
    HealthChecked(HealthResponse),
    HealthFailed(String),
    SignedIn {
        display_name: String,
    },
    SignedOut,
    SessionsLoaded(Vec<SessionSummary>),
    SessionOpened {
        session_id: String,
        messages: Vec<ChatMessage>,
    },
    ChatAnswered {
        request_id: u64,
        answer: Option<String>,
    },
    ChatFailed {
        request_id: u64,
        error: UiError,
    },
    NoteIngested {
        note_id: NoteId,
    },
    UploadProgress(u8),
    PdfUploaded {
        note_id: NoteId,
    },
    OpenUrl(String),
    ExportSaved {
        path: PathBuf,
    },
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorCategory {
    Auth,
    Transport,
    Validation,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    Auth,
    Sessions,
    OpenSession,
    SendMessage,
    Ingest,
    Upload,
    Export,
    General,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiError {
    category: UiErrorCategory,
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_client(context: UiErrorContext, err: &ClientError) -> Self {
        let category = match err {
            ClientError::Status { .. } if err.is_unauthorized() => UiErrorCategory::Auth,
            ClientError::Status { .. } => UiErrorCategory::Unknown,
            ClientError::Transport(_) => UiErrorCategory::Transport,
            ClientError::Decode(_)
            | ClientError::InvalidBaseUrl { .. }
            | ClientError::File { .. } => UiErrorCategory::Validation,
        };
        Self {
            category,
            context,
            message: err.to_string(),
        }
    }

    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        let message = message.into();
        let lower = message.to_ascii_lowercase();
        let category = if lower.contains("401")
            || lower.contains("403")
            || lower.contains("unauthorized")
            || lower.contains("forbidden")
            || lower.contains("not signed in")
        {
            UiErrorCategory::Auth
        } else if lower.contains("network")
            || lower.contains("connection")
            || lower.contains("timed out")
            || lower.contains("unavailable")
        {
            UiErrorCategory::Transport
        } else if lower.contains("invalid")
            || lower.contains("missing")
            || lower.contains("failed to read")
        {
            UiErrorCategory::Validation
        } else {
            UiErrorCategory::Unknown
        };

        Self {
            category,
            context,
            message,
        }
    }

    pub fn requires_reauth(&self) -> bool {
        self.category == UiErrorCategory::Auth
    }

    pub fn category(&self) -> UiErrorCategory {
        self.category
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Inline text shown where the result would have gone.
    pub fn inline(&self) -> String {
        format!("Error: {}", self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_status_requires_reauth() {
        let err = ClientError::Status {
            status: 401,
            message: "login required".to_string(),
        };
        let ui = UiError::from_client(UiErrorContext::Sessions, &err);
        assert!(ui.requires_reauth());
        assert_eq!(ui.inline(), "Error: login required");
    }

    #[test]
    fn server_errors_keep_body_text() {
        let err = ClientError::Status {
            status: 500,
            message: "vector index offline".to_string(),
        };
        let ui = UiError::from_client(UiErrorContext::SendMessage, &err);
        assert_eq!(ui.category(), UiErrorCategory::Unknown);
        assert_eq!(ui.context(), UiErrorContext::SendMessage);
        assert_eq!(ui.message(), "vector index offline");
    }

    #[test]
    fn classifies_free_text_messages() {
        let cases = [
            ("403 Forbidden", UiErrorCategory::Auth),
            ("connection refused", UiErrorCategory::Transport),
            ("failed to read notes.txt: not found", UiErrorCategory::Validation),
            ("something odd", UiErrorCategory::Unknown),
        ];
        for (message, expected) in cases {
            assert_eq!(
                UiError::from_message(UiErrorContext::General, message).category(),
                expected,
                "{message}"
            );
        }
    }
}
