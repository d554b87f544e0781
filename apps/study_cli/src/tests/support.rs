//! Fakes shared by the controller and worker tests.

use std::sync::Mutex;

use async_trait::async_trait;
use client_core::{ClientError, ClientResult, PdfUpload, ProgressFn, StudyBackend};
use shared::{
    domain::{ChatMessage, Mode, Role, SessionSummary, Theme},
    protocol::{ChatResponse, HealthResponse, IdentityResponse, NoteId, UserProfile},
};

use crate::ui::view::{HealthView, StatusLine, View};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewOp {
    Theme(Theme),
    Inputs(bool, String),
    Auth(String, bool),
    Health(HealthView),
    Mode(Mode),
    Sessions(Vec<String>, String),
    Clear,
    Message(Role, String),
    Thinking(u64),
    ThinkingDone(u64),
    Ingest(StatusLine),
    Pdf(StatusLine),
    Progress(Option<u8>),
    Toast(String),
    Open(String),
    Help,
}

#[derive(Debug, Default)]
pub struct RecordingView {
    pub ops: Vec<ViewOp>,
}

impl RecordingView {
    pub fn take(&mut self) -> Vec<ViewOp> {
        std::mem::take(&mut self.ops)
    }

    pub fn toasts(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                ViewOp::Toast(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn messages(&self) -> Vec<(Role, &str)> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                ViewOp::Message(role, text) => Some((*role, text.as_str())),
                _ => None,
            })
            .collect()
    }
}

impl View for RecordingView {
    fn apply_theme(&mut self, theme: Theme) {
        self.ops.push(ViewOp::Theme(theme));
    }

    fn set_inputs_enabled(&mut self, enabled: bool, placeholder: &str) {
        self.ops.push(ViewOp::Inputs(enabled, placeholder.to_string()));
    }

    fn set_auth_status(&mut self, text: &str, signed_in: bool) {
        self.ops.push(ViewOp::Auth(text.to_string(), signed_in));
    }

    fn set_health(&mut self, health: &HealthView) {
        self.ops.push(ViewOp::Health(health.clone()));
    }

    fn set_mode(&mut self, mode: Mode) {
        self.ops.push(ViewOp::Mode(mode));
    }

    fn render_sessions(&mut self, sessions: &[&SessionSummary], active: &str) {
        self.ops.push(ViewOp::Sessions(
            sessions.iter().map(|s| s.session_id.clone()).collect(),
            active.to_string(),
        ));
    }

    fn clear_chat(&mut self) {
        self.ops.push(ViewOp::Clear);
    }

    fn add_message(&mut self, role: Role, text: &str) {
        self.ops.push(ViewOp::Message(role, text.to_string()));
    }

    fn add_thinking(&mut self, request_id: u64) {
        self.ops.push(ViewOp::Thinking(request_id));
    }

    fn remove_thinking(&mut self, request_id: u64) {
        self.ops.push(ViewOp::ThinkingDone(request_id));
    }

    fn set_ingest_status(&mut self, status: &StatusLine) {
        self.ops.push(ViewOp::Ingest(status.clone()));
    }

    fn set_pdf_status(&mut self, status: &StatusLine) {
        self.ops.push(ViewOp::Pdf(status.clone()));
    }

    fn set_upload_progress(&mut self, percent: Option<u8>) {
        self.ops.push(ViewOp::Progress(percent));
    }

    fn toast(&mut self, message: &str) {
        self.ops.push(ViewOp::Toast(message.to_string()));
    }

    fn open_url(&mut self, url: &str) {
        self.ops.push(ViewOp::Open(url.to_string()));
    }

    fn show_help(&mut self, _text: &str) {
        self.ops.push(ViewOp::Help);
    }
}

fn status_error(status: u16, message: &str) -> ClientError {
    ClientError::Status {
        status,
        message: message.to_string(),
    }
}

/// In-memory backend; every call is recorded by name.
#[derive(Default)]
pub struct FakeBackend {
    pub calls: Mutex<Vec<String>>,
    pub user: Option<String>,
    pub sessions: Vec<SessionSummary>,
    pub messages: Vec<ChatMessage>,
    pub answer: Option<String>,
    pub chat_error: Option<(u16, String)>,
    pub fail_messages: bool,
    pub fail_health: bool,
    pub progress_steps: Vec<u8>,
}

impl FakeBackend {
    pub fn signed_in(name: &str) -> Self {
        Self {
            user: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().map(|calls| calls.clone()).unwrap_or_default()
    }

    fn record(&self, call: impl Into<String>) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call.into());
        }
    }
}

#[async_trait]
impl StudyBackend for FakeBackend {
    async fn health(&self) -> ClientResult<HealthResponse> {
        self.record("health");
        if self.fail_health {
            return Err(status_error(502, "bad gateway"));
        }
        Ok(HealthResponse {
            backend: Some("rayan-api".to_string()),
            ocr_enabled: true,
        })
    }

    async fn me(&self) -> ClientResult<IdentityResponse> {
        self.record("me");
        match &self.user {
            Some(name) => Ok(IdentityResponse {
                user: Some(UserProfile {
                    name: Some(name.clone()),
                    email: None,
                }),
            }),
            None => Err(status_error(401, "request failed: 401")),
        }
    }

    async fn logout(&self) -> ClientResult<()> {
        self.record("logout");
        Ok(())
    }

    async fn list_sessions(&self) -> ClientResult<Vec<SessionSummary>> {
        self.record("list_sessions");
        Ok(self.sessions.clone())
    }

    async fn session_messages(
        &self,
        session_id: &str,
        limit: u32,
    ) -> ClientResult<Vec<ChatMessage>> {
        self.record(format!("session_messages:{session_id}:{limit}"));
        if self.fail_messages {
            return Err(status_error(404, "session not found"));
        }
        Ok(self.messages.clone())
    }

    async fn chat(&self, session_id: &str, message: &str) -> ClientResult<ChatResponse> {
        self.record(format!("chat:{session_id}:{message}"));
        if let Some((status, message)) = &self.chat_error {
            return Err(status_error(*status, message));
        }
        Ok(ChatResponse {
            answer: self.answer.clone(),
        })
    }

    async fn ingest(&self, title: &str, text: &str) -> ClientResult<NoteId> {
        self.record(format!("ingest:{title}:{text}"));
        Ok(NoteId::Number(7))
    }

    async fn upload_pdf(&self, upload: PdfUpload, on_progress: ProgressFn) -> ClientResult<NoteId> {
        self.record(format!("upload_pdf:{}", upload.title));
        for step in &self.progress_steps {
            on_progress(*step);
        }
        Ok(NoteId::Text("pdf-1".to_string()))
    }

    async fn export_markdown(&self, session_id: &str) -> ClientResult<String> {
        self.record(format!("export_markdown:{session_id}"));
        Ok(format!("# {session_id}\n"))
    }

    fn set_session_cookie(&self, cookie: &str) -> ClientResult<()> {
        self.record(format!("set_session_cookie:{cookie}"));
        Ok(())
    }

    fn login_url(&self) -> String {
        "http://rayan.test/auth/login".to_string()
    }

    fn export_url(&self, session_id: &str) -> ClientResult<String> {
        Ok(format!("http://rayan.test/api/session/{session_id}/export.md"))
    }
}
