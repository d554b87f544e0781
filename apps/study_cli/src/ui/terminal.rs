//! Line-oriented terminal rendering of the study desk.

use std::{
    collections::BTreeSet,
    io::{self, BufRead, IsTerminal, Write},
    thread,
};

use chrono::Local;
use crossbeam_channel::{unbounded, Receiver};
use shared::domain::{Mode, Role, SessionSummary, Theme};
use tracing::{debug, warn};

use crate::ui::{
    theme::{palette_for, Palette, PLAIN, RESET},
    view::{HealthView, StatusLine, View},
};

const PROGRESS_WIDTH: usize = 20;

pub struct TerminalView<W: Write> {
    out: W,
    colored: bool,
    launch_browser: bool,
    theme: Theme,
    palette: Palette,
    placeholder: String,
    inputs_enabled: bool,
    mode: Mode,
    last_sessions: Option<String>,
    thinking: BTreeSet<u64>,
    progress_visible: bool,
}

impl TerminalView<io::Stdout> {
    pub fn stdout() -> Self {
        let colored = io::stdout().is_terminal();
        let mut view = Self::new(io::stdout(), colored);
        view.launch_browser = true;
        view
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, colored: bool) -> Self {
        Self {
            out,
            colored,
            launch_browser: false,
            theme: Theme::default(),
            palette: if colored {
                palette_for(Theme::default())
            } else {
                PLAIN
            },
            placeholder: String::new(),
            inputs_enabled: false,
            mode: Mode::default(),
            last_sessions: None,
            thinking: BTreeSet::new(),
            progress_visible: false,
        }
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn prompt(&mut self) {
        let label = if self.inputs_enabled {
            self.mode.as_str()
        } else {
            "signed out"
        };
        let accent = self.palette.accent;
        let reset = self.reset();
        let _ = write!(self.out, "{accent}{label}>{reset} ");
        let _ = self.out.flush();
    }

    fn reset(&self) -> &'static str {
        if self.colored {
            RESET
        } else {
            ""
        }
    }

    fn line(&mut self, color: &'static str, text: &str) {
        if self.progress_visible {
            let _ = writeln!(self.out);
            self.progress_visible = false;
        }
        let reset = self.reset();
        let _ = writeln!(self.out, "{color}{text}{reset}");
        let _ = self.out.flush();
    }

    fn status_color(&self, status: &StatusLine) -> &'static str {
        match status {
            StatusLine::Pending(_) => self.palette.muted,
            StatusLine::Ok(_) => self.palette.ok,
            StatusLine::Failed(_) => self.palette.bad,
        }
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * PROGRESS_WIDTH / 100;
    format!(
        "[{}{}]",
        "#".repeat(filled),
        ".".repeat(PROGRESS_WIDTH - filled)
    )
}

fn sessions_block(sessions: &[&SessionSummary], active: &str) -> String {
    if sessions.is_empty() {
        return "Sessions: none".to_string();
    }
    let mut block = format!("Sessions ({}):", sessions.len());
    for (idx, session) in sessions.iter().enumerate() {
        let marker = if session.session_id == active { '*' } else { ' ' };
        block.push_str(&format!(
            "\n {marker}{:>3}. {}  ({} turns)",
            idx + 1,
            session.session_id,
            session.turns
        ));
    }
    block
}

impl<W: Write> View for TerminalView<W> {
    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        if self.colored {
            self.palette = palette_for(theme);
        }
        let muted = self.palette.muted;
        self.line(muted, &format!("Theme: {}", theme.as_str()));
    }

    fn set_inputs_enabled(&mut self, enabled: bool, placeholder: &str) {
        self.inputs_enabled = enabled;
        if self.placeholder != placeholder {
            self.placeholder = placeholder.to_string();
            let muted = self.palette.muted;
            self.line(muted, placeholder);
        }
    }

    fn set_auth_status(&mut self, text: &str, signed_in: bool) {
        let color = if signed_in {
            self.palette.ok
        } else {
            self.palette.bad
        };
        self.line(color, text);
    }

    fn set_health(&mut self, health: &HealthView) {
        let color = if health.healthy {
            self.palette.ok
        } else {
            self.palette.bad
        };
        self.line(
            color,
            &format!("{} · {} · {}", health.pill, health.backend, health.ocr),
        );
    }

    fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        let accent = self.palette.accent;
        self.line(accent, mode.hint());
    }

    fn render_sessions(&mut self, sessions: &[&SessionSummary], active: &str) {
        let block = sessions_block(sessions, active);
        if self.last_sessions.as_deref() == Some(block.as_str()) {
            return;
        }
        let muted = self.palette.muted;
        self.line(muted, &block);
        self.last_sessions = Some(block);
    }

    fn clear_chat(&mut self) {
        self.thinking.clear();
        let muted = self.palette.muted;
        self.line(muted, "──────── new view ────────");
    }

    fn add_message(&mut self, role: Role, text: &str) {
        let color = match role {
            Role::User => self.palette.user,
            Role::Assistant => self.palette.assistant,
        };
        let stamp = Local::now().format("%H:%M");
        let muted = self.palette.muted;
        self.line(muted, &format!("{} · {stamp}", role.label()));
        self.line(color, text);
    }

    fn add_thinking(&mut self, request_id: u64) {
        self.thinking.insert(request_id);
        let muted = self.palette.muted;
        self.line(muted, &format!("Thinking… #{request_id}"));
    }

    fn remove_thinking(&mut self, request_id: u64) {
        if !self.thinking.remove(&request_id) {
            debug!(request_id, "thinking placeholder already gone");
            return;
        }
        let muted = self.palette.muted;
        self.line(muted, &format!("↳ reply to #{request_id}"));
    }

    fn set_ingest_status(&mut self, status: &StatusLine) {
        let color = self.status_color(status);
        self.line(color, &format!("Notes: {}", status.text()));
    }

    fn set_pdf_status(&mut self, status: &StatusLine) {
        let color = self.status_color(status);
        self.line(color, &format!("PDF: {}", status.text()));
    }

    fn set_upload_progress(&mut self, percent: Option<u8>) {
        match percent {
            Some(percent) => {
                let _ = write!(
                    self.out,
                    "\rUploading… {} {percent:>3}%",
                    progress_bar(percent)
                );
                let _ = self.out.flush();
                self.progress_visible = true;
            }
            None => {
                if self.progress_visible {
                    let _ = writeln!(self.out);
                    let _ = self.out.flush();
                    self.progress_visible = false;
                }
            }
        }
    }

    fn toast(&mut self, message: &str) {
        let accent = self.palette.accent;
        self.line(accent, &format!("» {message}"));
    }

    fn open_url(&mut self, url: &str) {
        let muted = self.palette.muted;
        self.line(muted, &format!("Opening {url}"));
        if !self.launch_browser {
            return;
        }
        if let Err(err) = open::that(url) {
            warn!("failed to open browser: {err}");
            let bad = self.palette.bad;
            self.line(bad, &format!("Could not open a browser; visit {url} manually."));
        }
    }

    fn show_help(&mut self, text: &str) {
        let muted = self.palette.muted;
        self.line(muted, text);
    }
}

/// Joins physical lines ending in `\` into one logical input.
#[derive(Debug, Default)]
pub struct LineAssembler {
    pending: Option<String>,
}

impl LineAssembler {
    pub fn push(&mut self, line: &str) -> Option<String> {
        let line = line.trim_end_matches(['\r', '\n']);
        if let Some(head) = line.strip_suffix('\\') {
            let buffer = self.pending.get_or_insert_with(String::new);
            buffer.push_str(head);
            buffer.push('\n');
            return None;
        }
        Some(match self.pending.take() {
            Some(mut buffer) => {
                buffer.push_str(line);
                buffer
            }
            None => line.to_string(),
        })
    }
}

/// Reads stdin on its own thread so the controller can wait on input and backend events together.
pub fn spawn_line_reader() -> Receiver<String> {
    let (tx, rx) = unbounded();
    thread::spawn(move || {
        let stdin = io::stdin();
        let mut assembler = LineAssembler::default();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            if let Some(input) = assembler.push(&line) {
                if tx.send(input).is_err() {
                    break;
                }
            }
        }
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(view: TerminalView<Vec<u8>>) -> String {
        String::from_utf8(view.into_inner()).expect("utf8")
    }

    #[test]
    fn assembler_joins_continued_lines() {
        let mut assembler = LineAssembler::default();
        assert_eq!(assembler.push("Explain limits \\"), None);
        assert_eq!(assembler.push("with an example\\"), None);
        assert_eq!(
            assembler.push("please"),
            Some("Explain limits \nwith an example\nplease".to_string())
        );
        assert_eq!(assembler.push("next"), Some("next".to_string()));
    }

    #[test]
    fn replies_name_the_request_they_settle() {
        let mut view = TerminalView::new(Vec::new(), false);
        view.add_thinking(1);
        view.add_thinking(2);
        view.remove_thinking(2);
        view.add_message(Role::Assistant, "second");
        view.remove_thinking(2);
        let out = rendered(view);
        assert!(out.contains("Thinking… #1"));
        assert!(out.contains("Thinking… #2"));
        assert_eq!(out.matches("↳ reply to #2").count(), 1);
        assert!(!out.contains("reply to #1"));
    }

    #[test]
    fn progress_bar_fills_proportionally() {
        assert_eq!(progress_bar(0), format!("[{}]", ".".repeat(20)));
        assert_eq!(progress_bar(50), format!("[{}{}]", "#".repeat(10), ".".repeat(10)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
    }

    #[test]
    fn sessions_render_once_per_change() {
        let mut view = TerminalView::new(Vec::new(), false);
        let a = SessionSummary {
            session_id: "default".to_string(),
            turns: 2,
        };
        view.render_sessions(&[&a], "default");
        view.render_sessions(&[&a], "default");
        let out = rendered(view);
        assert_eq!(out.matches("Sessions (1):").count(), 1);
        assert!(out.contains(" *  1. default  (2 turns)"));
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let mut view = TerminalView::new(Vec::new(), false);
        view.apply_theme(Theme::Dark);
        view.add_message(Role::User, "hello");
        view.set_upload_progress(Some(40));
        view.set_upload_progress(None);
        assert_eq!(view.theme(), Theme::Dark);
        let out = rendered(view);
        assert!(!out.contains('\x1b'));
        assert!(out.contains("You · "));
        assert!(out.contains(" 40%"));
    }

    #[test]
    fn colored_output_switches_palette_with_theme() {
        let mut view = TerminalView::new(Vec::new(), true);
        view.apply_theme(Theme::Dark);
        view.toast("hi");
        let out = rendered(view);
        assert!(out.contains(palette_for(Theme::Dark).accent));
    }
}
