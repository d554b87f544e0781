//! Command orchestration from controller actions to the backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    status: &mut String,
) {
    let cmd_name = cmd.name();

    match cmd_tx.try_send(cmd) {
        Ok(()) => tracing::debug!(command = cmd_name, "queued ui->backend command"),
        Err(TrySendError::Full(_)) => {
            *status = "Command queue is full; please retry".to_string();
        }
        Err(TrySendError::Disconnected(_)) => {
            *status = "Backend worker stopped (possible startup failure); restart rayan".to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use crossbeam_channel::bounded;

    use super::*;

    #[test]
    fn queues_commands_in_order() {
        let (tx, rx) = bounded(4);
        let mut status = String::new();
        dispatch_backend_command(&tx, BackendCommand::CheckHealth, &mut status);
        dispatch_backend_command(&tx, BackendCommand::CheckAuth, &mut status);

        assert!(status.is_empty());
        let queued: Vec<_> = rx.try_iter().collect();
        assert_eq!(queued, vec![BackendCommand::CheckHealth, BackendCommand::CheckAuth]);
    }

    #[test]
    fn reports_full_and_disconnected_queues() {
        let (tx, rx) = bounded(1);
        let mut status = String::new();
        dispatch_backend_command(&tx, BackendCommand::RefreshSessions, &mut status);
        dispatch_backend_command(&tx, BackendCommand::RefreshSessions, &mut status);
        assert!(status.contains("full"));

        drop(rx);
        status.clear();
        dispatch_backend_command(&tx, BackendCommand::CheckAuth, &mut status);
        assert!(status.contains("stopped"));
    }
}
