use anyhow::{anyhow, Result};
use std::{
    path::PathBuf,
    sync::Arc,
    thread::{self, JoinHandle},
};

use crate::{
    fs_ops,
    remote::{ProgressSink, RemoteSource, TransferControl},
    version::Version,
};

/// What the completion step receives once a download task ends.
#[derive(Debug)]
pub struct DownloadOutcome {
    /// The version the archive is expected to install.
    pub target: Version,
    pub cancelled: bool,
    pub result: Result<()>,
}

/// A single in-flight archive download running on its own thread.
pub struct DownloadTask {
    target: Version,
    ctl: TransferControl,
    handle: JoinHandle<Result<()>>,
}

impl DownloadTask {
    pub fn spawn<R>(
        remote: Arc<R>,
        dest: PathBuf,
        target: Version,
        progress: Option<ProgressSink>,
    ) -> Self
    where
        R: RemoteSource + ?Sized + 'static,
    {
        let ctl = TransferControl::new(progress);
        let worker_ctl = ctl.clone();
        let handle = thread::spawn(move || {
            let result = remote.download_archive(&dest, &worker_ctl);
            if result.is_err() && worker_ctl.is_cancelled() {
                if let Err(err) = fs_ops::remove_file_with_retry(&dest, 3) {
                    log::warn!("failed to remove partial archive: {err:#}");
                }
            }
            result
        });
        log::info!("download of {target} started");
        Self {
            target,
            ctl,
            handle,
        }
    }

    pub fn target(&self) -> Version {
        self.target
    }

    pub fn cancel(&self) {
        self.ctl.cancel();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Blocks until the transfer ends.
    pub fn wait(self) -> DownloadOutcome {
        let result = self
            .handle
            .join()
            .unwrap_or_else(|_| Err(anyhow!("download thread panicked")));
        DownloadOutcome {
            target: self.target,
            cancelled: result.is_err() && self.ctl.is_cancelled(),
            result,
        }
    }
}
