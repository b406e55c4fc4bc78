//! Update-check, install and play workflow.
//!
//! The [`Launcher`] owns every piece of mutable state (status, installed
//! version, retry budget, the in-flight download). Only the download itself
//! runs elsewhere; its result is fed back through [`Launcher::complete_download`]
//! on the owning thread.

use anyhow::{Context, Result};
use std::{path::Path, sync::Arc};

use crate::{
    config::LauncherConfig,
    download::{DownloadOutcome, DownloadTask},
    installer, logging, process,
    remote::{ProgressSink, RemoteSource},
    status::{InstallKind, LaunchStatus, Notice, BUSY_LABEL},
    version::Version,
    version_store,
};

/// Completion failures counted across retries. Reset on success and when
/// the user asks for a retry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryBudget {
    failures: u32,
    allowed: u32,
}

impl RetryBudget {
    pub fn new(allowed: u32) -> Self {
        Self {
            failures: 0,
            allowed: allowed.max(1),
        }
    }

    /// Counts a failure; `true` once the budget is spent.
    pub fn record_failure(&mut self) -> bool {
        self.failures += 1;
        self.failures >= self.allowed
    }

    pub fn reset(&mut self) {
        self.failures = 0;
    }

    pub fn failures(&self) -> u32 {
        self.failures
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    /// The game was started; the front end should exit.
    Launched,
    /// A download is running; only the button text changed.
    Busy,
    /// The update check was started again after a failure.
    Retrying,
    /// Ready but the executable is missing, nothing to do.
    Missing,
    /// Starting the game failed.
    Failed,
}

pub struct Launcher<R: RemoteSource + ?Sized + 'static> {
    config: LauncherConfig,
    remote: Arc<R>,
    status: LaunchStatus,
    label_override: Option<&'static str>,
    current: Option<Version>,
    retries: RetryBudget,
    pending: Option<DownloadTask>,
    progress: Option<ProgressSink>,
    notice: Option<Notice>,
}

impl<R: RemoteSource + ?Sized + 'static> Launcher<R> {
    /// Starts out `Ready` with no known version; call
    /// [`Launcher::check_for_updates`] before offering play.
    pub fn new(config: LauncherConfig, remote: Arc<R>) -> Self {
        let retries = RetryBudget::new(config.allowed_retries);
        Self {
            config,
            remote,
            status: LaunchStatus::Ready,
            label_override: None,
            current: None,
            retries,
            pending: None,
            progress: None,
            notice: None,
        }
    }

    pub fn with_progress(mut self, progress: ProgressSink) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn status(&self) -> LaunchStatus {
        self.status
    }

    pub fn button_label(&self) -> &'static str {
        self.label_override.unwrap_or_else(|| self.status.label())
    }

    /// Installed version as last read from disk or written by an install.
    pub fn current_version(&self) -> Option<Version> {
        self.current
    }

    /// Most recent user-facing failure message, if any.
    pub fn notice(&self) -> Option<Notice> {
        self.notice
    }

    pub fn retry_budget(&self) -> RetryBudget {
        self.retries
    }

    pub fn is_downloading(&self) -> bool {
        self.pending.is_some()
    }

    fn set_status(&mut self, status: LaunchStatus) {
        self.status = status;
        self.label_override = None;
        if status != LaunchStatus::Failed {
            self.notice = None;
        }
    }

    fn fail(&mut self, notice: Notice, err: anyhow::Error) {
        log::error!("{}: {err:#}", notice.message());
        match logging::write_debug_file(&self.config.error_log_path(), &err) {
            Ok(path) => log::info!("wrote {}", path.display()),
            Err(log_err) => log::warn!("could not write debug file: {log_err:#}"),
        }
        self.set_status(LaunchStatus::Failed);
        self.notice = Some(notice);
    }

    fn fetch_remote_version(&self) -> Result<Version> {
        let raw = self.remote.fetch_version().context("fetch remote version")?;
        Version::parse(&raw).context("parse remote version")
    }

    /// Compares the installed version against the remote one and starts an
    /// install when needed. Without a version file the install is started
    /// straight away.
    pub fn check_for_updates(&mut self) {
        if self.pending.is_some() {
            log::warn!("update check skipped, a download is already running");
            return;
        }
        let version_file = self.config.version_file_path();
        let local = match version_store::read(&version_file) {
            Ok(Some(local)) => local,
            Ok(None) => {
                log::info!("no {} found, installing game", version_file.display());
                self.install_game_files(InstallKind::Fresh, None);
                return;
            }
            Err(err) => {
                self.fail(Notice::CheckFailed, err);
                return;
            }
        };
        self.current = Some(local);

        match self.fetch_remote_version() {
            Ok(remote) if remote.differs(&local) => {
                log::info!("update available: {local} -> {remote}");
                self.install_game_files(InstallKind::Update, Some(remote));
            }
            Ok(_) => {
                log::info!("version {local} is up to date");
                self.retries.reset();
                self.set_status(LaunchStatus::Ready);
            }
            Err(err) => self.fail(Notice::CheckFailed, err),
        }
    }

    /// Starts downloading the archive. A fresh install looks up the remote
    /// version itself.
    pub fn install_game_files(&mut self, kind: InstallKind, target: Option<Version>) {
        if self.pending.is_some() {
            log::warn!("install skipped, a download is already running");
            return;
        }
        self.set_status(kind.status());
        let target = match target {
            Some(v) => v,
            None => match self.fetch_remote_version() {
                Ok(v) => v,
                Err(err) => {
                    self.fail(Notice::InstallFailed, err);
                    return;
                }
            },
        };
        self.pending = Some(DownloadTask::spawn(
            self.remote.clone(),
            self.config.archive_path(),
            target,
            self.progress.clone(),
        ));
    }

    /// Handles a finished download. A failure re-runs the whole update check
    /// until the retry budget runs out.
    pub fn complete_download(&mut self, outcome: DownloadOutcome) {
        let DownloadOutcome {
            target,
            cancelled,
            result,
        } = outcome;

        if cancelled {
            log::warn!("download of {target} cancelled");
            self.set_status(LaunchStatus::Failed);
            self.notice = Some(Notice::Cancelled);
            return;
        }

        let result = result.context("download game archive").and_then(|()| {
            installer::finish_install(
                &self.config.archive_path(),
                &self.config.root,
                &self.config.version_file_path(),
                &target,
            )
        });

        match result {
            Ok(()) => {
                self.current = Some(target);
                self.retries.reset();
                self.set_status(LaunchStatus::Ready);
            }
            Err(err) => {
                if self.retries.record_failure() {
                    self.fail(Notice::FinishFailed, err);
                } else {
                    log::warn!(
                        "install of {target} failed (attempt {}), checking again: {err:#}",
                        self.retries.failures()
                    );
                    self.check_for_updates();
                }
            }
        }
    }

    /// Waits for the in-flight download, if any, and runs its completion.
    /// Returns `false` when nothing was pending.
    pub fn wait_for_download(&mut self) -> bool {
        let Some(task) = self.pending.take() else {
            return false;
        };
        let outcome = task.wait();
        self.complete_download(outcome);
        true
    }

    /// Non-blocking variant for front ends with their own event loop: runs
    /// completion only if the download already ended.
    pub fn poll_download(&mut self) -> bool {
        if !self.pending.as_ref().is_some_and(DownloadTask::is_finished) {
            return false;
        }
        self.wait_for_download()
    }

    /// Drives downloads (and the retries they trigger) until none is left.
    pub fn run_until_idle(&mut self) {
        while self.wait_for_download() {}
    }

    /// Asks the running download to stop. Returns `false` if none runs.
    pub fn cancel_download(&self) -> bool {
        match &self.pending {
            Some(task) => {
                task.cancel();
                true
            }
            None => false,
        }
    }

    /// The primary action.
    pub fn play(&mut self) -> PlayOutcome {
        self.play_with(|exe, dir| process::spawn_game(exe, dir).map(|_| ()))
    }

    pub fn play_with(&mut self, launch: impl FnOnce(&Path, &Path) -> Result<()>) -> PlayOutcome {
        match self.status {
            LaunchStatus::DownloadingGame | LaunchStatus::DownloadingUpdate => {
                self.label_override = Some(BUSY_LABEL);
                PlayOutcome::Busy
            }
            LaunchStatus::Failed => {
                self.retries.reset();
                self.check_for_updates();
                PlayOutcome::Retrying
            }
            LaunchStatus::Ready => {
                let exe = self.config.game_exe_path();
                if !exe.exists() {
                    log::warn!("{} not found", exe.display());
                    return PlayOutcome::Missing;
                }
                match launch(&exe, &self.config.game_dir()) {
                    Ok(()) => PlayOutcome::Launched,
                    Err(err) => {
                        self.fail(Notice::LaunchFailed, err);
                        PlayOutcome::Failed
                    }
                }
            }
        }
    }
}
