//! Backend commands queued from the controller to the backend worker.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteSource {
    Inline(String),
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    CheckHealth,
    CheckAuth,
    RefreshSessions,
    OpenSession {
        session_id: String,
        limit: u32,
    },
    SendChat {
        request_id: u64,
        session_id: String,
        message: String,
    },
    Ingest {
        title: String,
        source: NoteSource,
    },
    UploadPdf {
        path: PathBuf,
        title: String,
    },
    OpenLogin,
    Logout,
    SetSessionCookie {
        cookie: String,
    },
    OpenExport {
        session_id: String,
    },
    ExportMarkdown {
        session_id: String,
        destination: PathBuf,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::CheckHealth => "check_health",
            BackendCommand::CheckAuth => "check_auth",
            BackendCommand::RefreshSessions => "refresh_sessions",
            BackendCommand::OpenSession { .. } => "open_session",
            BackendCommand::SendChat { .. } => "send_chat",
            BackendCommand::Ingest { .. } => "ingest",
            BackendCommand::UploadPdf { .. } => "upload_pdf",
            BackendCommand::OpenLogin => "open_login",
            BackendCommand::Logout => "logout",
            BackendCommand::SetSessionCookie { .. } => "set_session_cookie",
            BackendCommand::OpenExport { .. } => "open_export",
            BackendCommand::ExportMarkdown { .. } => "export_markdown",
        }
    }
}
