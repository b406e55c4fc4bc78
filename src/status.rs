/// Label shown when play is pressed mid-download.
pub const BUSY_LABEL: &str = "Chill It's downloading";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchStatus {
    Ready,
    Failed,
    DownloadingGame,
    DownloadingUpdate,
}

impl LaunchStatus {
    pub fn label(self) -> &'static str {
        match self {
            LaunchStatus::Ready => "Play",
            LaunchStatus::Failed => "Update Failed - Retry",
            LaunchStatus::DownloadingGame => "Downloading Game",
            LaunchStatus::DownloadingUpdate => "Downloading Update",
        }
    }

    pub fn is_downloading(self) -> bool {
        matches!(
            self,
            LaunchStatus::DownloadingGame | LaunchStatus::DownloadingUpdate
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    Fresh,
    Update,
}

impl InstallKind {
    pub fn status(self) -> LaunchStatus {
        match self {
            InstallKind::Fresh => LaunchStatus::DownloadingGame,
            InstallKind::Update => LaunchStatus::DownloadingUpdate,
        }
    }
}

/// Messages surfaced to the user when a step fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    CheckFailed,
    InstallFailed,
    FinishFailed,
    LaunchFailed,
    Cancelled,
}

impl Notice {
    pub fn message(self) -> &'static str {
        match self {
            Notice::CheckFailed => "Error checking for game updates",
            Notice::InstallFailed => "Error installing game files",
            Notice::FinishFailed => "Error finishing download",
            Notice::LaunchFailed => "Error starting the game",
            Notice::Cancelled => "Download cancelled",
        }
    }
}
