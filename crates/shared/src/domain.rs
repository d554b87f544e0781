use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    #[serde(default)]
    pub turns: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    // Anything the backend labels other than `user` renders as the assistant.
    #[serde(other)]
    Assistant,
}

impl Role {
    pub fn label(self) -> &'static str {
        match self {
            Role::User => "You",
            Role::Assistant => "RayanAI",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    #[serde(default)]
    pub content: String,
}

/// Prompt-augmentation template picked before sending a message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Tutor,
    Exam,
    Summarize,
    Flashcards,
}

impl Mode {
    pub const ALL: [Mode; 4] = [Mode::Tutor, Mode::Exam, Mode::Summarize, Mode::Flashcards];

    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Tutor => "tutor",
            Mode::Exam => "exam",
            Mode::Summarize => "summarize",
            Mode::Flashcards => "flashcards",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            Mode::Tutor => "Tutor mode: clear explanations + practice.",
            Mode::Exam => "Exam mode: exam-style guidance + marking scheme.",
            Mode::Summarize => "Summarize mode: key points + what to memorize.",
            Mode::Flashcards => "Flashcards mode: Q/A pairs.",
        }
    }

    pub fn prefix(self) -> &'static str {
        match self {
            Mode::Tutor => "Act as a rigorous university tutor. Explain clearly, then give a worked example and 3 practice questions.\n\n",
            Mode::Exam => "Help me prepare for an exam. Provide exam-style guidance, common mistakes, and a short marking scheme.\n\n",
            Mode::Summarize => "Summarize into key points, definitions, and what to memorize. Keep it structured.\n\n",
            Mode::Flashcards => "Create flashcards as concise Q/A pairs. Keep them exam-focused.\n\n",
        }
    }

    /// Message text as sent to the chat endpoint.
    pub fn compose(self, text: &str) -> String {
        format!("{}{text}", self.prefix())
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMode(pub String);

impl fmt::Display for UnknownMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown mode '{}' (expected tutor, exam, summarize or flashcards)",
            self.0
        )
    }
}

impl std::error::Error for UnknownMode {}

impl FromStr for Mode {
    type Err = UnknownMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.as_str() == wanted)
            .ok_or_else(|| UnknownMode(s.trim().to_string()))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Sessions whose id contains `filter`, ignoring case and surrounding whitespace.
pub fn filter_sessions<'a>(sessions: &'a [SessionSummary], filter: &str) -> Vec<&'a SessionSummary> {
    let needle = filter.trim().to_lowercase();
    sessions
        .iter()
        .filter(|session| needle.is_empty() || session.session_id.to_lowercase().contains(&needle))
        .collect()
}
