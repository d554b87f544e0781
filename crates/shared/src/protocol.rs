use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{ChatMessage, SessionSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub session_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub answer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestRequest {
    pub title: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoteResponse {
    pub note_id: NoteId,
}

/// Backend note identifiers arrive either as integers or strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NoteId {
    Number(i64),
    Text(String),
}

impl fmt::Display for NoteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NoteId::Number(id) => write!(f, "{id}"),
            NoteId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionsResponse {
    #[serde(default)]
    pub sessions: Vec<SessionSummary>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessagesResponse {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HealthResponse {
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub ocr_enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityResponse {
    #[serde(default)]
    pub user: Option<UserProfile>,
}

impl IdentityResponse {
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .and_then(|user| {
                user.name
                    .as_deref()
                    .filter(|name| !name.is_empty())
                    .or(user.email.as_deref().filter(|email| !email.is_empty()))
            })
            .unwrap_or("student")
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;

    #[test]
    fn note_ids_accept_numbers_and_strings() {
        let numeric: NoteResponse = serde_json::from_str(r#"{"note_id": 42}"#).expect("numeric");
        assert_eq!(numeric.note_id.to_string(), "42");
        let text: NoteResponse =
            serde_json::from_str(r#"{"note_id": "n-7f3a"}"#).expect("text");
        assert_eq!(text.note_id, NoteId::Text("n-7f3a".to_string()));
    }

    #[test]
    fn missing_lists_default_to_empty() {
        let sessions: SessionsResponse = serde_json::from_str("{}").expect("sessions");
        assert!(sessions.sessions.is_empty());
        let messages: MessagesResponse = serde_json::from_str("{}").expect("messages");
        assert!(messages.messages.is_empty());
    }

    #[test]
    fn messages_keep_backend_order() {
        let body = r#"{"messages":[
            {"role":"user","content":"what is a limit?"},
            {"role":"assistant","content":"A limit describes..."}
        ]}"#;
        let parsed: MessagesResponse = serde_json::from_str(body).expect("messages");
        let roles: Vec<Role> = parsed.messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant]);
    }

    #[test]
    fn health_defaults_to_ocr_disabled() {
        let health: HealthResponse =
            serde_json::from_str(r#"{"backend":"rayan-api"}"#).expect("health");
        assert_eq!(health.backend.as_deref(), Some("rayan-api"));
        assert!(!health.ocr_enabled);
    }

    #[test]
    fn identity_display_name_falls_back() {
        let named: IdentityResponse =
            serde_json::from_str(r#"{"user":{"name":"Sara","email":"s@uni.edu"}}"#).expect("me");
        assert_eq!(named.display_name(), "Sara");

        let email_only: IdentityResponse =
            serde_json::from_str(r#"{"user":{"email":"s@uni.edu"}}"#).expect("me");
        assert_eq!(email_only.display_name(), "s@uni.edu");

        let anonymous: IdentityResponse = serde_json::from_str("{}").expect("me");
        assert_eq!(anonymous.display_name(), "student");
    }

    #[test]
    fn chat_request_uses_backend_field_names() {
        let value = serde_json::to_value(ChatRequest {
            session_id: "default".to_string(),
            message: "hi".to_string(),
        })
        .expect("json");
        assert_eq!(value, serde_json::json!({"session_id": "default", "message": "hi"}));
    }
}
