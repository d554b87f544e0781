//! Maps a line of terminal input to a [`UiAction`].

use std::path::{Path, PathBuf};

use shared::domain::{Mode, UnknownMode};
use thiserror::Error;

pub const HELP_TEXT: &str = "\
Type a question and press Enter to ask it. End a line with \\ to keep typing.
  /mode <tutor|exam|summarize|flashcards>   switch study mode
  /new                                      start a fresh chat
  /sessions                                 refresh the session list
  /search <text>                            filter sessions by id
  /open <id|number>                         open a session
  /note <text>                              add text as a study note
  /note-file <path>                         add a text file as a study note
  /note-title <title>                       title used for notes
  /pdf <path> [title]                       upload a PDF (or drop its path here)
  /export [path]                            open the markdown export, or save it to path
  /theme                                    toggle light/dark
  /login  /logout  /cookie <value>  /whoami sign in and out
  /health                                   check the backend
  /quit                                     leave";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionRef {
    Id(String),
    /// 1-based position in the currently rendered list.
    Index(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiAction {
    Send(String),
    SetMode(Mode),
    NewChat,
    OpenSession(SessionRef),
    RefreshSessions,
    Search(String),
    IngestText(String),
    IngestFile(PathBuf),
    SetNoteTitle(String),
    UploadPdf {
        path: PathBuf,
        title: Option<String>,
    },
    Export {
        save_to: Option<PathBuf>,
    },
    ToggleTheme,
    Login,
    Logout,
    SetCookie(String),
    CheckAuth,
    CheckHealth,
    Attach,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IntentError {
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("unknown command '{0}'; type /help for the list")]
    UnknownCommand(String),
    #[error(transparent)]
    Mode(#[from] UnknownMode),
}

pub fn parse_input(line: &str) -> Result<UiAction, IntentError> {
    if let Some(path) = dropped_path(line) {
        return Ok(UiAction::UploadPdf { path, title: None });
    }

    let trimmed = line.trim();
    if !trimmed.starts_with('/') {
        return Ok(UiAction::Send(line.to_string()));
    }

    let (command, rest) = trimmed
        .split_once(char::is_whitespace)
        .map_or((trimmed, ""), |(command, rest)| (command, rest.trim()));

    let action = match command.to_ascii_lowercase().as_str() {
        "/mode" => UiAction::SetMode(rest.parse()?),
        "/new" => UiAction::NewChat,
        "/open" => {
            if rest.is_empty() {
                return Err(IntentError::Usage("/open <id|number>"));
            }
            match rest.parse::<usize>() {
                Ok(index) => UiAction::OpenSession(SessionRef::Index(index)),
                Err(_) => UiAction::OpenSession(SessionRef::Id(rest.to_string())),
            }
        }
        "/sessions" | "/refresh" => UiAction::RefreshSessions,
        "/search" => UiAction::Search(rest.to_string()),
        "/note" => {
            if rest.is_empty() {
                return Err(IntentError::Usage("/note <text>"));
            }
            UiAction::IngestText(rest.to_string())
        }
        "/note-file" => {
            let (path, _) = split_path_arg(rest).ok_or(IntentError::Usage("/note-file <path>"))?;
            UiAction::IngestFile(path)
        }
        "/note-title" => UiAction::SetNoteTitle(rest.to_string()),
        "/pdf" | "/upload" => {
            let (path, title) = split_path_arg(rest).ok_or(IntentError::Usage("/pdf <path> [title]"))?;
            UiAction::UploadPdf {
                path,
                title: (!title.is_empty()).then(|| title.to_string()),
            }
        }
        "/export" => UiAction::Export {
            save_to: split_path_arg(rest).map(|(path, _)| path),
        },
        "/theme" => UiAction::ToggleTheme,
        "/login" => UiAction::Login,
        "/logout" => UiAction::Logout,
        "/cookie" => {
            if rest.is_empty() {
                return Err(IntentError::Usage("/cookie <value>"));
            }
            UiAction::SetCookie(rest.to_string())
        }
        "/whoami" => UiAction::CheckAuth,
        "/health" => UiAction::CheckHealth,
        "/attach" => UiAction::Attach,
        "/help" | "/?" => UiAction::Help,
        "/quit" | "/exit" => UiAction::Quit,
        other => return Err(IntentError::UnknownCommand(other.to_string())),
    };
    Ok(action)
}

/// A line that is nothing but the path of an existing file, as terminals paste
/// when a file is dragged onto them. Bare words are chat even if a file matches.
pub fn dropped_path(line: &str) -> Option<PathBuf> {
    let line = line.trim();
    if !looks_like_pasted_path(line) {
        return None;
    }
    let (path, rest) = split_path_arg(line)?;
    if !rest.is_empty() {
        return None;
    }
    path.is_file().then_some(path)
}

fn looks_like_pasted_path(line: &str) -> bool {
    line.starts_with('\'')
        || line.starts_with('"')
        || line.starts_with("file://")
        || line.contains('/')
        || line.contains('\\')
}

pub fn is_pdf_path(path: &Path) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().to_lowercase().ends_with(".pdf"))
        .unwrap_or(false)
}

/// Splits a leading path (quoted, backslash-escaped, or `file://`) from the rest.
fn split_path_arg(input: &str) -> Option<(PathBuf, &str)> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }

    let (raw, rest) = match input.chars().next() {
        Some(quote @ ('\'' | '"')) => {
            let body = &input[1..];
            let end = body.find(quote)?;
            (body[..end].to_string(), body[end + 1..].trim())
        }
        _ => {
            let mut raw = String::new();
            let mut escaped = false;
            let mut end = input.len();
            for (idx, ch) in input.char_indices() {
                if escaped {
                    raw.push(ch);
                    escaped = false;
                } else if ch == '\\' {
                    escaped = true;
                } else if ch.is_whitespace() {
                    end = idx;
                    break;
                } else {
                    raw.push(ch);
                }
            }
            (raw, input[end..].trim())
        }
    };

    let raw = raw.strip_prefix("file://").map(str::to_string).unwrap_or(raw);
    if raw.is_empty() {
        return None;
    }
    Some((PathBuf::from(raw), rest))
}
