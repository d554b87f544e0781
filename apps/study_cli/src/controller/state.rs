//! Controller state: what the user sees, and which backend work each action queues.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use shared::domain::{filter_sessions, Mode, Role, SessionSummary, Theme};
use tracing::{debug, warn};

use crate::backend_bridge::commands::{BackendCommand, NoteSource};
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::intent::{is_pdf_path, SessionRef, UiAction, HELP_TEXT};
use crate::settings::SettingsStore;
use crate::ui::view::{HealthView, StatusLine, View};

pub const DEFAULT_SESSION_ID: &str = "default";
pub const DEFAULT_NOTE_TITLE: &str = "Notes";
pub const SIGNED_IN_PLACEHOLDER: &str = "Ask a study question…";
pub const SIGNED_OUT_PLACEHOLDER: &str = "Sign in to start…";
pub const ATTACH_HINT: &str = "Use /pdf <path> or drop a PDF path here.";
const LOGIN_HINT: &str = "Not signed in. Use /login to sign in.";
const UPLOADING: &str = "Uploading…";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    SignedOut,
    SignedIn { display_name: String },
}

pub struct StudyController<V: View> {
    view: V,
    settings: SettingsStore,
    auth: AuthState,
    mode: Mode,
    active_session: String,
    sessions_cache: Vec<SessionSummary>,
    search_filter: String,
    theme: Theme,
    note_title: String,
    message_limit: u32,
    next_request_id: u64,
    pending: HashSet<u64>,
}

/// Session id for a fresh chat, minute resolution in UTC.
pub fn new_chat_session_id(now: DateTime<Utc>) -> String {
    format!("chat-{}", now.format("%Y-%m-%d-%H-%M"))
}

impl<V: View> StudyController<V> {
    pub fn new(view: V, settings: SettingsStore, message_limit: u32) -> Self {
        Self {
            view,
            settings,
            auth: AuthState::SignedOut,
            mode: Mode::default(),
            active_session: DEFAULT_SESSION_ID.to_string(),
            sessions_cache: Vec::new(),
            search_filter: String::new(),
            theme: Theme::default(),
            note_title: DEFAULT_NOTE_TITLE.to_string(),
            message_limit,
            next_request_id: 1,
            pending: HashSet::new(),
        }
    }

    pub fn start(&mut self, api_base_configured: bool) -> Vec<BackendCommand> {
        self.theme = self.settings.theme();
        self.view.apply_theme(self.theme);
        self.view.set_mode(self.mode);
        self.view.set_inputs_enabled(false, SIGNED_OUT_PLACEHOLDER);
        if !api_base_configured {
            self.view
                .toast("No API base configured; set RAYAN_API_BASE or --api-base.");
        }
        vec![BackendCommand::CheckHealth, BackendCommand::CheckAuth]
    }

    pub fn handle(&mut self, action: UiAction) -> Vec<BackendCommand> {
        match action {
            UiAction::Send(text) => self.send(&text),
            UiAction::SetMode(mode) => {
                self.mode = mode;
                self.view.set_mode(mode);
                Vec::new()
            }
            UiAction::NewChat => {
                let session_id = new_chat_session_id(Utc::now());
                let commands = self.open_session(session_id);
                self.view.toast("New chat created");
                commands
            }
            UiAction::OpenSession(SessionRef::Id(session_id)) => self.open_session(session_id),
            UiAction::OpenSession(SessionRef::Index(index)) => {
                let picked = index
                    .checked_sub(1)
                    .and_then(|pos| {
                        filter_sessions(&self.sessions_cache, &self.search_filter)
                            .get(pos)
                            .map(|session| session.session_id.clone())
                    });
                match picked {
                    Some(session_id) => self.open_session(session_id),
                    None => {
                        self.view.toast(&format!("No session #{index} in the list"));
                        Vec::new()
                    }
                }
            }
            UiAction::RefreshSessions => vec![BackendCommand::RefreshSessions],
            UiAction::Search(filter) => {
                self.search_filter = filter;
                self.render_sessions();
                Vec::new()
            }
            UiAction::IngestText(text) => {
                if text.trim().is_empty() {
                    return Vec::new();
                }
                self.ingest(NoteSource::Inline(text))
            }
            UiAction::IngestFile(path) => self.ingest(NoteSource::File(path)),
            UiAction::SetNoteTitle(title) => {
                self.note_title = title.trim().to_string();
                let notice = format!("Note title: {}", self.effective_note_title());
                self.view.toast(&notice);
                Vec::new()
            }
            UiAction::UploadPdf { path, title } => {
                if !self.require_signed_in() {
                    return Vec::new();
                }
                if !is_pdf_path(&path) {
                    self.view.toast("Pick a PDF");
                    return Vec::new();
                }
                let title = title
                    .map(|title| title.trim().to_string())
                    .filter(|title| !title.is_empty())
                    .or_else(|| {
                        path.file_name()
                            .map(|name| name.to_string_lossy().into_owned())
                    })
                    .unwrap_or_else(|| path.display().to_string());
                self.view.set_upload_progress(Some(0));
                self.view
                    .set_pdf_status(&StatusLine::Pending(UPLOADING.to_string()));
                vec![BackendCommand::UploadPdf { path, title }]
            }
            UiAction::Export { save_to } => {
                let session_id = if self.active_session.is_empty() {
                    DEFAULT_SESSION_ID.to_string()
                } else {
                    self.active_session.clone()
                };
                match save_to {
                    None => vec![BackendCommand::OpenExport { session_id }],
                    Some(destination) => vec![BackendCommand::ExportMarkdown {
                        session_id,
                        destination,
                    }],
                }
            }
            UiAction::ToggleTheme => {
                self.theme = self.theme.toggled();
                if let Err(err) = self.settings.save_theme(self.theme) {
                    warn!("failed to persist theme: {err:#}");
                    self.view.toast(&format!("Could not save theme: {err}"));
                }
                self.view.apply_theme(self.theme);
                Vec::new()
            }
            UiAction::Login => vec![BackendCommand::OpenLogin],
            UiAction::Logout => vec![BackendCommand::Logout],
            UiAction::SetCookie(cookie) => vec![BackendCommand::SetSessionCookie { cookie }],
            UiAction::CheckAuth => vec![BackendCommand::CheckAuth],
            UiAction::CheckHealth => vec![BackendCommand::CheckHealth],
            UiAction::Attach => {
                self.view.toast(ATTACH_HINT);
                Vec::new()
            }
            UiAction::Help => {
                self.view.show_help(HELP_TEXT);
                Vec::new()
            }
            UiAction::Quit => Vec::new(),
        }
    }

    pub fn apply_event(&mut self, event: UiEvent) -> Vec<BackendCommand> {
        match event {
            UiEvent::Info(message) => self.view.toast(&message),
            UiEvent::HealthChecked(health) => self.view.set_health(&HealthView::online(&health)),
            UiEvent::HealthFailed(reason) => {
                debug!("backend health check failed: {reason}");
                self.view.set_health(&HealthView::offline());
            }
            UiEvent::SignedIn { display_name } => {
                self.view
                    .set_auth_status(&format!("Signed in: {display_name}"), true);
                self.view.set_inputs_enabled(true, SIGNED_IN_PLACEHOLDER);
                self.auth = AuthState::SignedIn { display_name };
            }
            UiEvent::SignedOut => self.sign_out(),
            UiEvent::SessionsLoaded(sessions) => {
                self.sessions_cache = sessions;
                self.render_sessions();
            }
            UiEvent::SessionOpened {
                session_id,
                messages,
            } => {
                if session_id != self.active_session {
                    debug!(%session_id, active = %self.active_session, "ignoring stale session load");
                    return Vec::new();
                }
                self.view.clear_chat();
                for message in &messages {
                    self.view.add_message(message.role, &message.content);
                }
            }
            UiEvent::ChatAnswered { request_id, answer } => {
                self.settle_thinking(request_id);
                let answer = answer.filter(|text| !text.is_empty());
                self.view
                    .add_message(Role::Assistant, answer.as_deref().unwrap_or("No answer"));
            }
            UiEvent::ChatFailed { request_id, error } => {
                self.settle_thinking(request_id);
                self.view.add_message(Role::Assistant, &error.inline());
            }
            UiEvent::NoteIngested { note_id } => self
                .view
                .set_ingest_status(&StatusLine::Ok(format!("Added ✅ ({note_id})"))),
            UiEvent::UploadProgress(percent) => self.view.set_upload_progress(Some(percent)),
            UiEvent::PdfUploaded { note_id } => {
                self.view.set_upload_progress(None);
                self.view
                    .set_pdf_status(&StatusLine::Ok(format!("PDF added ✅ ({note_id})")));
            }
            UiEvent::OpenUrl(url) => self.view.open_url(&url),
            UiEvent::ExportSaved { path } => self
                .view
                .toast(&format!("Saved export to {}", path.display())),
            UiEvent::Error(err) => return self.show_error(err),
        }
        Vec::new()
    }

    pub fn notify(&mut self, message: &str) {
        self.view.toast(message);
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn is_signed_in(&self) -> bool {
        matches!(self.auth, AuthState::SignedIn { .. })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn active_session(&self) -> &str {
        &self.active_session
    }

    pub fn pending_requests(&self) -> usize {
        self.pending.len()
    }

    fn send(&mut self, text: &str) -> Vec<BackendCommand> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }
        if !self.require_signed_in() {
            return Vec::new();
        }

        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending.insert(request_id);

        self.view.add_message(Role::User, text);
        self.view.add_thinking(request_id);
        vec![BackendCommand::SendChat {
            request_id,
            session_id: self.active_session.clone(),
            message: self.mode.compose(text),
        }]
    }

    fn ingest(&mut self, source: NoteSource) -> Vec<BackendCommand> {
        if !self.require_signed_in() {
            return Vec::new();
        }
        self.view
            .set_ingest_status(&StatusLine::Pending(UPLOADING.to_string()));
        vec![BackendCommand::Ingest {
            title: self.effective_note_title().to_string(),
            source,
        }]
    }

    fn open_session(&mut self, session_id: String) -> Vec<BackendCommand> {
        self.active_session = session_id.clone();
        self.view.clear_chat();
        self.render_sessions();
        vec![BackendCommand::OpenSession {
            session_id,
            limit: self.message_limit,
        }]
    }

    fn effective_note_title(&self) -> &str {
        if self.note_title.is_empty() {
            DEFAULT_NOTE_TITLE
        } else {
            &self.note_title
        }
    }

    fn require_signed_in(&mut self) -> bool {
        if self.is_signed_in() {
            return true;
        }
        self.view.toast(LOGIN_HINT);
        false
    }

    fn sign_out(&mut self) {
        self.auth = AuthState::SignedOut;
        self.view.set_auth_status("Not signed in", false);
        self.view.set_inputs_enabled(false, SIGNED_OUT_PLACEHOLDER);
        self.view.toast(LOGIN_HINT);
    }

    fn settle_thinking(&mut self, request_id: u64) {
        if !self.pending.remove(&request_id) {
            debug!(request_id, "answer for unknown request");
        }
        self.view.remove_thinking(request_id);
    }

    fn render_sessions(&mut self) {
        let visible = filter_sessions(&self.sessions_cache, &self.search_filter);
        self.view.render_sessions(&visible, &self.active_session);
    }

    fn show_error(&mut self, err: UiError) -> Vec<BackendCommand> {
        match err.context() {
            UiErrorContext::Ingest => self
                .view
                .set_ingest_status(&StatusLine::Failed(err.inline())),
            UiErrorContext::Upload => {
                self.view.set_upload_progress(None);
                self.view.set_pdf_status(&StatusLine::Failed(err.inline()));
            }
            _ => self.view.toast(&err.inline()),
        }

        if err.requires_reauth() && self.is_signed_in() {
            // Re-verify the session rather than assuming it expired.
            return vec![BackendCommand::CheckAuth];
        }
        Vec::new()
    }
}

#[cfg(test)]
#[path = "../tests/state_tests.rs"]
mod tests;
