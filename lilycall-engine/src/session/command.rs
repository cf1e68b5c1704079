/// Commands a [`super::SessionHandle`] feeds into the running session loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionCommand {
    ToggleAudio,
    ToggleVideo,
    StartScreenShare,
    StopScreenShare,
    HangUp,
}
