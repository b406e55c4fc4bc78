use anyhow::{bail, Context, Result};
use std::{
    fs,
    io::{Read, Write},
    path::Path,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::config::{self, LauncherConfig};

const CHUNK_SIZE: usize = 64 * 1024;

/// Receives `(bytes_so_far, total_if_known)` while an archive downloads.
pub type ProgressSink = Arc<dyn Fn(u64, Option<u64>) + Send + Sync>;

/// Where version strings and game archives come from.
pub trait RemoteSource: Send + Sync {
    fn fetch_version(&self) -> Result<String>;

    /// Writes the archive to `dest`. Implementations should call
    /// [`TransferControl::checkpoint`] between chunks.
    fn download_archive(&self, dest: &Path, ctl: &TransferControl) -> Result<()>;
}

/// Cancellation and progress shared between a download and its owner.
#[derive(Clone, Default)]
pub struct TransferControl {
    cancelled: Arc<AtomicBool>,
    progress: Option<ProgressSink>,
}

impl TransferControl {
    pub fn new(progress: Option<ProgressSink>) -> Self {
        Self {
            cancelled: Arc::new(AtomicBool::new(false)),
            progress,
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Reports progress and fails once cancellation was requested.
    pub fn checkpoint(&self, done: u64, total: Option<u64>) -> Result<()> {
        if self.is_cancelled() {
            bail!("download cancelled");
        }
        if let Some(progress) = &self.progress {
            progress(done, total);
        }
        Ok(())
    }
}

pub struct HttpRemote {
    client: reqwest::blocking::Client,
    version_url: String,
    archive_url: String,
}

impl HttpRemote {
    pub fn new(cfg: &LauncherConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(format!("{}/{}", config::NAME, config::VERSION))
            .timeout(cfg.request_timeout())
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            version_url: cfg.version_url.clone(),
            archive_url: cfg.game_download_url.clone(),
        })
    }

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response> {
        self.client
            .get(url)
            .send()
            .with_context(|| format!("http GET {url}"))?
            .error_for_status()
            .with_context(|| format!("request failed for {url}"))
    }
}

impl RemoteSource for HttpRemote {
    fn fetch_version(&self) -> Result<String> {
        let resp = self.get(&self.version_url)?;
        resp.text().context("read version body")
    }

    fn download_archive(&self, dest: &Path, ctl: &TransferControl) -> Result<()> {
        let resp = self.get(&self.archive_url)?;
        let total = resp.content_length();
        let file = fs::File::create(dest).with_context(|| format!("create {}", dest.display()))?;
        copy_with_control(resp, file, total, ctl)
            .with_context(|| format!("write {}", dest.display()))
    }
}

/// Streams `reader` into `writer` in chunks, honouring cancellation.
pub fn copy_with_control(
    mut reader: impl Read,
    mut writer: impl Write,
    total: Option<u64>,
    ctl: &TransferControl,
) -> Result<()> {
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut done = 0u64;
    ctl.checkpoint(done, total)?;
    loop {
        let read = reader.read(&mut buf).context("read body")?;
        if read == 0 {
            break;
        }
        writer.write_all(&buf[..read]).context("write chunk")?;
        done += read as u64;
        ctl.checkpoint(done, total)?;
    }
    writer.flush().context("flush")?;
    Ok(())
}
