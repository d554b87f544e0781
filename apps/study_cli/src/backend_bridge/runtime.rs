//! Backend worker: owns the tokio runtime and turns commands into [`UiEvent`]s.

use std::{sync::Arc, thread};

use client_core::{PdfUpload, ProgressFn, StudyBackend};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, error, warn};

use crate::backend_bridge::commands::{BackendCommand, NoteSource};
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

const LOGIN_FOLLOW_UP: &str =
    "Finish signing in with the browser, then paste the session cookie with /cookie <value>.";

pub fn launch(
    backend: Arc<dyn StudyBackend>,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                error!("failed to build backend runtime: {err}");
                emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_message(
                        UiErrorContext::General,
                        format!("backend worker startup failure: {err}"),
                    )),
                );
                return;
            }
        };

        runtime.block_on(async move {
            // Each command runs as its own task, so overlapping sends resolve in completion order.
            while let Ok(cmd) = cmd_rx.recv() {
                debug!(command = cmd.name(), "backend worker received command");
                tokio::spawn(execute(Arc::clone(&backend), cmd, ui_tx.clone()));
            }
            debug!("command queue closed; backend worker stopping");
        });
    })
}

/// Results and errors wait for room in the UI queue; they are never dropped.
pub(crate) fn emit(ui_tx: &Sender<UiEvent>, event: UiEvent) {
    if ui_tx.send(event).is_err() {
        debug!("ui event queue disconnected");
    }
}

/// Progress ticks are superseded by the next one, so a full queue drops them.
fn emit_progress(ui_tx: &Sender<UiEvent>, percent: u8) {
    match ui_tx.try_send(UiEvent::UploadProgress(percent)) {
        Ok(()) => {}
        Err(TrySendError::Full(_)) => debug!(percent, "ui event queue is full; skipping progress tick"),
        Err(TrySendError::Disconnected(_)) => debug!("ui event queue disconnected"),
    }
}

pub async fn execute(backend: Arc<dyn StudyBackend>, cmd: BackendCommand, ui_tx: Sender<UiEvent>) {
    let backend = backend.as_ref();
    match cmd {
        BackendCommand::CheckHealth => match backend.health().await {
            Ok(health) => emit(&ui_tx, UiEvent::HealthChecked(health)),
            Err(err) => {
                warn!("health check failed: {err}");
                emit(&ui_tx, UiEvent::HealthFailed(err.to_string()));
            }
        },
        BackendCommand::CheckAuth => check_auth(backend, &ui_tx).await,
        BackendCommand::RefreshSessions => refresh_sessions(backend, &ui_tx).await,
        BackendCommand::OpenSession { session_id, limit } => {
            match backend.session_messages(&session_id, limit).await {
                Ok(messages) => {
                    emit(
                        &ui_tx,
                        UiEvent::SessionOpened {
                            session_id,
                            messages,
                        },
                    );
                    refresh_sessions(backend, &ui_tx).await;
                }
                Err(err) => emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_client(UiErrorContext::OpenSession, &err)),
                ),
            }
        }
        BackendCommand::SendChat {
            request_id,
            session_id,
            message,
        } => {
            match backend.chat(&session_id, &message).await {
                Ok(response) => emit(
                    &ui_tx,
                    UiEvent::ChatAnswered {
                        request_id,
                        answer: response.answer,
                    },
                ),
                Err(err) => {
                    warn!(request_id, "chat request failed: {err}");
                    emit(
                        &ui_tx,
                        UiEvent::ChatFailed {
                            request_id,
                            error: UiError::from_client(UiErrorContext::SendMessage, &err),
                        },
                    );
                }
            }
            refresh_sessions(backend, &ui_tx).await;
        }
        BackendCommand::Ingest { title, source } => {
            let text = match source {
                NoteSource::Inline(text) => text,
                NoteSource::File(path) => match tokio::fs::read_to_string(&path).await {
                    Ok(text) => text,
                    Err(err) => {
                        emit(
                            &ui_tx,
                            UiEvent::Error(UiError::from_message(
                                UiErrorContext::Ingest,
                                format!("failed to read {}: {err}", path.display()),
                            )),
                        );
                        return;
                    }
                },
            };
            match backend.ingest(&title, &text).await {
                Ok(note_id) => emit(&ui_tx, UiEvent::NoteIngested { note_id }),
                Err(err) => emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_client(UiErrorContext::Ingest, &err)),
                ),
            }
        }
        BackendCommand::UploadPdf { path, title } => {
            let progress_tx = ui_tx.clone();
            let on_progress: ProgressFn =
                Arc::new(move |pct| emit_progress(&progress_tx, pct));
            match backend.upload_pdf(PdfUpload { path, title }, on_progress).await {
                Ok(note_id) => emit(&ui_tx, UiEvent::PdfUploaded { note_id }),
                Err(err) => {
                    warn!("pdf upload failed: {err}");
                    emit(
                        &ui_tx,
                        UiEvent::Error(UiError::from_client(UiErrorContext::Upload, &err)),
                    );
                }
            }
        }
        BackendCommand::OpenLogin => {
            emit(&ui_tx, UiEvent::OpenUrl(backend.login_url()));
            emit(&ui_tx, UiEvent::Info(LOGIN_FOLLOW_UP.to_string()));
        }
        BackendCommand::Logout => match backend.logout().await {
            Ok(()) => check_auth(backend, &ui_tx).await,
            Err(err) => emit(
                &ui_tx,
                UiEvent::Error(UiError::from_client(UiErrorContext::Auth, &err)),
            ),
        },
        BackendCommand::SetSessionCookie { cookie } => match backend.set_session_cookie(&cookie) {
            Ok(()) => check_auth(backend, &ui_tx).await,
            Err(err) => emit(
                &ui_tx,
                UiEvent::Error(UiError::from_client(UiErrorContext::Auth, &err)),
            ),
        },
        BackendCommand::OpenExport { session_id } => match backend.export_url(&session_id) {
            Ok(url) => emit(&ui_tx, UiEvent::OpenUrl(url)),
            Err(err) => emit(
                &ui_tx,
                UiEvent::Error(UiError::from_client(UiErrorContext::Export, &err)),
            ),
        },
        BackendCommand::ExportMarkdown {
            session_id,
            destination,
        } => {
            let markdown = match backend.export_markdown(&session_id).await {
                Ok(markdown) => markdown,
                Err(err) => {
                    emit(
                        &ui_tx,
                        UiEvent::Error(UiError::from_client(UiErrorContext::Export, &err)),
                    );
                    return;
                }
            };
            match tokio::fs::write(&destination, markdown).await {
                Ok(()) => emit(&ui_tx, UiEvent::ExportSaved { path: destination }),
                Err(err) => emit(
                    &ui_tx,
                    UiEvent::Error(UiError::from_message(
                        UiErrorContext::Export,
                        format!("failed to write {}: {err}", destination.display()),
                    )),
                ),
            }
        }
    }
}

async fn check_auth(backend: &dyn StudyBackend, ui_tx: &Sender<UiEvent>) {
    match backend.me().await {
        Ok(identity) => {
            emit(
                ui_tx,
                UiEvent::SignedIn {
                    display_name: identity.display_name(),
                },
            );
            refresh_sessions(backend, ui_tx).await;
        }
        Err(err) => {
            debug!("auth check failed: {err}");
            emit(ui_tx, UiEvent::SignedOut);
        }
    }
}

async fn refresh_sessions(backend: &dyn StudyBackend, ui_tx: &Sender<UiEvent>) {
    match backend.list_sessions().await {
        Ok(sessions) => emit(ui_tx, UiEvent::SessionsLoaded(sessions)),
        Err(err) => emit(
            ui_tx,
            UiEvent::Error(UiError::from_client(UiErrorContext::Sessions, &err)),
        ),
    }
}

#[cfg(test)]
#[path = "../tests/runtime_tests.rs"]
mod tests;
