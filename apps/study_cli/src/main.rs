use std::{path::PathBuf, sync::Arc};

mod backend_bridge;
mod config;
mod controller;
mod settings;
mod ui;

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{StudyBackend, StudyClient};
use crossbeam_channel::{bounded, select};
use shared::domain::Mode;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::runtime;
use crate::config::{load_settings, Overrides};
use crate::controller::{
    intent::{parse_input, UiAction},
    orchestration::dispatch_backend_command,
    StudyController,
};
use crate::settings::SettingsStore;
use crate::ui::{terminal::spawn_line_reader, TerminalView};

const COMMAND_QUEUE_CAPACITY: usize = 256;
const EVENT_QUEUE_CAPACITY: usize = 1024;

/// Terminal study desk for the RayanAI backend.
#[derive(Parser, Debug)]
#[command(name = "rayan", version)]
struct Args {
    /// TOML config file (defaults to ./rayan.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    api_base: Option<String>,
    /// Session cookie value, or a full `name=value` pair.
    #[arg(long)]
    session_cookie: Option<String>,
    #[arg(long)]
    data_dir: Option<PathBuf>,
    #[arg(long)]
    message_limit: Option<u32>,
    #[arg(long)]
    log_filter: Option<String>,
    /// Study mode to start in.
    #[arg(long)]
    mode: Option<Mode>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings(Overrides {
        config_path: args.config,
        api_base: args.api_base,
        session_cookie: args.session_cookie,
        data_dir: args.data_dir,
        log_filter: args.log_filter.clone(),
    })?;
    if let Some(limit) = args.message_limit.filter(|limit| *limit > 0) {
        settings.message_limit = limit;
    }

    let filter = match args.log_filter {
        Some(filter) => EnvFilter::try_new(filter).context("invalid --log-filter")?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&settings.log_filter))
            .context("invalid log filter")?,
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!(api_base = %settings.api_base, data_dir = %settings.data_dir.display(), "starting rayan");

    let client = match StudyClient::with_session_cookie(
        settings.api_base.clone(),
        settings.session_cookie.as_deref(),
    ) {
        Ok(client) => client,
        Err(err) => {
            warn!("ignoring configured session cookie: {err}");
            StudyClient::new(settings.api_base.clone()).context("failed to build HTTP client")?
        }
    };
    let backend: Arc<dyn StudyBackend> = Arc::new(client);

    let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE_CAPACITY);
    let (ui_tx, ui_rx) = bounded(EVENT_QUEUE_CAPACITY);
    let worker = runtime::launch(backend, cmd_rx, ui_tx);

    let store = SettingsStore::in_dir(&settings.data_dir);
    let mut controller =
        StudyController::new(TerminalView::stdout(), store, settings.message_limit);
    let mut status = String::new();

    let mut queue = controller.start(!settings.api_base.is_empty());
    if let Some(mode) = args.mode {
        queue.extend(controller.handle(UiAction::SetMode(mode)));
    }
    for cmd in queue {
        dispatch_backend_command(&cmd_tx, cmd, &mut status);
    }

    let input_rx = spawn_line_reader();
    controller.view_mut().prompt();

    loop {
        let commands = select! {
            recv(input_rx) -> line => {
                let Ok(line) = line else {
                    break;
                };
                match parse_input(&line) {
                    Ok(UiAction::Quit) => break,
                    Ok(action) => controller.handle(action),
                    Err(err) => {
                        controller.notify(&err.to_string());
                        Vec::new()
                    }
                }
            }
            recv(ui_rx) -> event => {
                let Ok(event) = event else {
                    warn!("backend worker exited");
                    break;
                };
                controller.apply_event(event)
            }
        };

        for cmd in commands {
            dispatch_backend_command(&cmd_tx, cmd, &mut status);
        }
        if !status.is_empty() {
            controller.notify(&status);
            status.clear();
        }
        controller.view_mut().prompt();
    }

    drop(cmd_tx);
    // Unblocks any task still waiting for room in the event queue.
    drop(ui_rx);
    if worker.join().is_err() {
        warn!("backend worker panicked");
    }
    Ok(())
}
