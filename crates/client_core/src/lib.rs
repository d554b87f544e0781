//! HTTP client for the RayanAI study backend.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use reqwest::{
    cookie::Jar,
    multipart::{Form, Part},
    Client, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use shared::{
    domain::{ChatMessage, SessionSummary},
    protocol::{
        ChatRequest, ChatResponse, HealthResponse, IdentityResponse, IngestRequest,
        MessagesResponse, NoteId, NoteResponse, SessionsResponse,
    },
};
use tracing::{debug, warn};
use url::Url;

pub mod error;
mod upload;

pub use error::{ClientError, ClientResult};
pub use upload::progress_percent;

/// Receives upload progress as a whole percentage.
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

pub const DEFAULT_MESSAGE_LIMIT: u32 = 200;
const DEFAULT_COOKIE_NAME: &str = "session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfUpload {
    pub path: PathBuf,
    pub title: String,
}

#[async_trait]
pub trait StudyBackend: Send + Sync {
    async fn health(&self) -> ClientResult<HealthResponse>;
    async fn me(&self) -> ClientResult<IdentityResponse>;
    async fn logout(&self) -> ClientResult<()>;
    async fn list_sessions(&self) -> ClientResult<Vec<SessionSummary>>;
    async fn session_messages(&self, session_id: &str, limit: u32)
        -> ClientResult<Vec<ChatMessage>>;
    async fn chat(&self, session_id: &str, message: &str) -> ClientResult<ChatResponse>;
    async fn ingest(&self, title: &str, text: &str) -> ClientResult<NoteId>;
    async fn upload_pdf(&self, upload: PdfUpload, on_progress: ProgressFn) -> ClientResult<NoteId>;
    async fn export_markdown(&self, session_id: &str) -> ClientResult<String>;
    fn set_session_cookie(&self, cookie: &str) -> ClientResult<()>;
    fn login_url(&self) -> String;
    fn export_url(&self, session_id: &str) -> ClientResult<String>;
}

pub struct StudyClient {
    http: Client,
    base_url: String,
    cookies: Arc<Jar>,
}

impl StudyClient {
    pub fn new(base_url: impl Into<String>) -> ClientResult<Self> {
        let base_url = base_url.into().trim().trim_end_matches('/').to_string();
        let cookies = Arc::new(Jar::default());
        let http = Client::builder()
            .cookie_provider(Arc::clone(&cookies))
            .build()?;
        Ok(Self {
            http,
            base_url,
            cookies,
        })
    }

    pub fn with_session_cookie(base_url: impl Into<String>, cookie: Option<&str>) -> ClientResult<Self> {
        let client = Self::new(base_url)?;
        if let Some(cookie) = cookie.filter(|c| !c.trim().is_empty()) {
            client.install_cookie(cookie)?;
        }
        Ok(client)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn parsed_base(&self) -> ClientResult<Url> {
        Url::parse(&self.base_url).map_err(|err| ClientError::InvalidBaseUrl {
            base: self.base_url.clone(),
            reason: err.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// `<base>/api/session/<id>/<tail...>` with the id encoded as a single segment.
    fn session_url(&self, session_id: &str, tail: &[&str]) -> ClientResult<Url> {
        let mut url = self.parsed_base()?;
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidBaseUrl {
                base: self.base_url.clone(),
                reason: "base URL cannot carry a path".to_string(),
            })?
            .pop_if_empty()
            .extend(["api", "session", session_id])
            .extend(tail);
        Ok(url)
    }

    fn install_cookie(&self, cookie: &str) -> ClientResult<()> {
        let cookie = cookie.trim();
        let raw = if cookie.contains('=') {
            cookie.to_string()
        } else {
            format!("{DEFAULT_COOKIE_NAME}={cookie}")
        };
        let url = self.parsed_base()?;
        self.cookies.add_cookie_str(&raw, &url);
        debug!(host = url.host_str().unwrap_or_default(), "installed session cookie");
        Ok(())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: impl reqwest::IntoUrl) -> ClientResult<T> {
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response, request_failed).await?;
        decode_json(response).await
    }

    async fn post_json<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        debug!(path, "POST study api");
        let response = self.http.post(self.endpoint(path)).json(body).send().await?;
        let response = ensure_success(response, request_failed).await?;
        decode_json(response).await
    }
}

fn request_failed(status: StatusCode) -> String {
    format!("request failed: {}", status.as_u16())
}

fn upload_failed(status: StatusCode) -> String {
    format!("Upload failed: {}", status.as_u16())
}

async fn ensure_success(
    response: Response,
    fallback: fn(StatusCode) -> String,
) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    warn!(status = status.as_u16(), "study api returned an error status");
    let message = if body.trim().is_empty() {
        fallback(status)
    } else {
        body
    };
    Err(ClientError::Status {
        status: status.as_u16(),
        message,
    })
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(ClientError::Decode)
}

fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload.pdf".to_string())
}

#[async_trait]
impl StudyBackend for StudyClient {
    async fn health(&self) -> ClientResult<HealthResponse> {
        self.get_json(self.endpoint("/health")).await
    }

    async fn me(&self) -> ClientResult<IdentityResponse> {
        self.get_json(self.endpoint("/auth/me")).await
    }

    async fn logout(&self) -> ClientResult<()> {
        let response = self
            .http
            .post(self.endpoint("/auth/logout"))
            .json(&serde_json::json!({}))
            .send()
            .await?;
        ensure_success(response, request_failed).await?;
        Ok(())
    }

    async fn list_sessions(&self) -> ClientResult<Vec<SessionSummary>> {
        let body: SessionsResponse = self.get_json(self.endpoint("/api/sessions")).await?;
        Ok(body.sessions)
    }

    async fn session_messages(
        &self,
        session_id: &str,
        limit: u32,
    ) -> ClientResult<Vec<ChatMessage>> {
        let mut url = self.session_url(session_id, &["messages"])?;
        url.query_pairs_mut()
            .append_pair("limit", &limit.to_string());
        debug!(session_id, limit, "fetching session messages");
        let body: MessagesResponse = self.get_json(url).await?;
        Ok(body.messages)
    }

    async fn chat(&self, session_id: &str, message: &str) -> ClientResult<ChatResponse> {
        self.post_json(
            "/api/chat",
            &ChatRequest {
                session_id: session_id.to_string(),
                message: message.to_string(),
            },
        )
        .await
    }

    async fn ingest(&self, title: &str, text: &str) -> ClientResult<NoteId> {
        let body: NoteResponse = self
            .post_json(
                "/api/ingest",
                &IngestRequest {
                    title: title.to_string(),
                    text: text.to_string(),
                },
            )
            .await?;
        Ok(body.note_id)
    }

    async fn upload_pdf(&self, upload: PdfUpload, on_progress: ProgressFn) -> ClientResult<NoteId> {
        let bytes = tokio::fs::read(&upload.path)
            .await
            .map_err(|source| ClientError::File {
                path: upload.path.clone(),
                source,
            })?;
        let total = bytes.len() as u64;
        debug!(path = %upload.path.display(), total, "uploading pdf");

        let part = Part::stream_with_length(upload::progress_body(bytes, on_progress), total)
            .file_name(upload_file_name(&upload.path))
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part).text("title", upload.title);

        let response = self
            .http
            .post(self.endpoint("/api/upload_pdf"))
            .multipart(form)
            .send()
            .await?;
        let response = ensure_success(response, upload_failed).await?;
        let body: NoteResponse = decode_json(response).await?;
        Ok(body.note_id)
    }

    async fn export_markdown(&self, session_id: &str) -> ClientResult<String> {
        let url = self.session_url(session_id, &["export.md"])?;
        let response = self.http.get(url).send().await?;
        let response = ensure_success(response, request_failed).await?;
        Ok(response.text().await?)
    }

    fn set_session_cookie(&self, cookie: &str) -> ClientResult<()> {
        self.install_cookie(cookie)
    }

    fn login_url(&self) -> String {
        self.endpoint("/auth/login")
    }

    fn export_url(&self, session_id: &str) -> ClientResult<String> {
        Ok(self.session_url(session_id, &["export.md"])?.to_string())
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
