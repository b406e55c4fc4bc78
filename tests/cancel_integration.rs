use anyhow::Result;
use game_launcher::{
    config::LauncherConfig,
    remote::{RemoteSource, TransferControl},
    LaunchStatus, Launcher, Notice,
};
use std::{fs, path::Path, sync::Arc, time::Duration};

/// Trickles bytes until cancelled.
struct SlowRemote;

impl RemoteSource for SlowRemote {
    fn fetch_version(&self) -> Result<String> {
        Ok("3.1.4".to_string())
    }

    fn download_archive(&self, dest: &Path, ctl: &TransferControl) -> Result<()> {
        let mut done = 0u64;
        loop {
            fs::write(dest, vec![0u8; done as usize])?;
            ctl.checkpoint(done, None)?;
            done += 1;
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

#[test]
fn cancelled_download_fails_without_retry() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = LauncherConfig::for_root(tmp.path());
    let mut launcher = Launcher::new(cfg.clone(), Arc::new(SlowRemote));

    assert!(!launcher.cancel_download());
    launcher.check_for_updates();
    assert_eq!(launcher.status(), LaunchStatus::DownloadingGame);

    assert!(launcher.cancel_download());
    launcher.run_until_idle();

    assert_eq!(launcher.status(), LaunchStatus::Failed);
    assert_eq!(launcher.notice(), Some(Notice::Cancelled));
    assert_eq!(launcher.retry_budget().failures(), 0);
    assert!(!cfg.archive_path().exists());
    assert!(!cfg.version_file_path().exists());
    assert!(!cfg.error_log_path().exists());
}
