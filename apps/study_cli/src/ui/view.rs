use shared::{
    domain::{Mode, Role, SessionSummary, Theme},
    protocol::HealthResponse,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusLine {
    Pending(String),
    Ok(String),
    Failed(String),
}

impl StatusLine {
    pub fn text(&self) -> &str {
        match self {
            StatusLine::Pending(text) | StatusLine::Ok(text) | StatusLine::Failed(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthView {
    pub healthy: bool,
    pub pill: String,
    pub backend: String,
    pub ocr: String,
}

impl HealthView {
    pub fn online(health: &HealthResponse) -> Self {
        Self {
            healthy: true,
            pill: "OK".to_string(),
            backend: health
                .backend
                .clone()
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| "online".to_string()),
            ocr: format!(
                "OCR: {}",
                if health.ocr_enabled {
                    "enabled"
                } else {
                    "disabled"
                }
            ),
        }
    }

    pub fn offline() -> Self {
        Self {
            healthy: false,
            pill: "Backend offline".to_string(),
            backend: "offline".to_string(),
            ocr: "OCR: unknown".to_string(),
        }
    }
}

/// Rendering surface driven by the controller.
pub trait View {
    fn apply_theme(&mut self, theme: Theme);
    fn set_inputs_enabled(&mut self, enabled: bool, placeholder: &str);
    fn set_auth_status(&mut self, text: &str, signed_in: bool);
    fn set_health(&mut self, health: &HealthView);
    fn set_mode(&mut self, mode: Mode);
    fn render_sessions(&mut self, sessions: &[&SessionSummary], active: &str);
    fn clear_chat(&mut self);
    fn add_message(&mut self, role: Role, text: &str);
    fn add_thinking(&mut self, request_id: u64);
    fn remove_thinking(&mut self, request_id: u64);
    fn set_ingest_status(&mut self, status: &StatusLine);
    fn set_pdf_status(&mut self, status: &StatusLine);
    /// `None` hides the progress bar.
    fn set_upload_progress(&mut self, percent: Option<u8>);
    fn toast(&mut self, message: &str);
    fn open_url(&mut self, url: &str);
    fn show_help(&mut self, text: &str);
}
