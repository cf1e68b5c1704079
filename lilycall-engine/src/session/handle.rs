use tokio::sync::mpsc;
use tracing::debug;

use super::command::SessionCommand;

/// Cloneable control surface of a running session.
///
/// Every method is safe to call after the session ended; commands to a dead
/// loop are dropped, which is what makes hang-up idempotent across an
/// unmount effect and an explicit button.
#[derive(Clone)]
pub struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
}

impl SessionHandle {
    pub(crate) fn new(commands: mpsc::Sender<SessionCommand>) -> Self {
        Self { commands }
    }

    pub async fn toggle_audio(&self) {
        self.send(SessionCommand::ToggleAudio).await;
    }

    pub async fn toggle_video(&self) {
        self.send(SessionCommand::ToggleVideo).await;
    }

    pub async fn start_screen_share(&self) {
        self.send(SessionCommand::StartScreenShare).await;
    }

    pub async fn stop_screen_share(&self) {
        self.send(SessionCommand::StopScreenShare).await;
    }

    pub async fn hang_up(&self) {
        self.send(SessionCommand::HangUp).await;
    }

    async fn send(&self, command: SessionCommand) {
        if self.commands.send(command).await.is_err() {
            debug!(?command, "session already closed, command dropped");
        }
    }
}
