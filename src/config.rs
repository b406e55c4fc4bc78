use anyhow::{Context, Result};
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

include!(concat!(env!("OUT_DIR"), "/launcher_config.rs"));

/// Optional per-install override file, read from the install root.
pub const OVERRIDE_FILE_NAME: &str = "launcher.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LauncherConfig {
    pub root: PathBuf,
    pub version_url: String,
    pub game_download_url: String,
    pub build_dir: String,
    pub game_exe: String,
    pub version_file: String,
    pub archive_name: String,
    pub error_log_dir: String,
    pub shortcut_name: String,
    pub shortcut_description: String,
    pub allowed_retries: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct Overrides {
    version_url: Option<String>,
    game_download_url: Option<String>,
    build_dir: Option<String>,
    game_exe: Option<String>,
    version_file: Option<String>,
    archive_name: Option<String>,
    error_log_dir: Option<String>,
    shortcut_name: Option<String>,
    shortcut_description: Option<String>,
    allowed_retries: Option<u32>,
    request_timeout_secs: Option<u64>,
}

impl LauncherConfig {
    /// Built-in values from `config.toml`, rooted at `root`.
    pub fn for_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            version_url: VERSION_URL.to_string(),
            game_download_url: GAME_DOWNLOAD_URL.to_string(),
            build_dir: BUILD_DIR.to_string(),
            game_exe: GAME_EXE.to_string(),
            version_file: VERSION_FILE.to_string(),
            archive_name: ARCHIVE_NAME.to_string(),
            error_log_dir: ERROR_LOG_DIR.to_string(),
            shortcut_name: SHORTCUT_NAME.to_string(),
            shortcut_description: SHORTCUT_DESCRIPTION.to_string(),
            allowed_retries: ALLOWED_RETRIES,
            request_timeout_secs: REQUEST_TIMEOUT_SECS,
        }
    }

    /// Built-in values with `<root>/launcher.toml` applied on top, if present.
    pub fn load(root: &Path) -> Result<Self> {
        let mut cfg = Self::for_root(root);
        let path = root.join(OVERRIDE_FILE_NAME);
        if !path.exists() {
            return Ok(cfg);
        }
        let contents =
            fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
        let overrides: Overrides =
            toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
        cfg.apply(overrides);
        log::info!("applied config overrides from {}", path.display());
        Ok(cfg)
    }

    fn apply(&mut self, o: Overrides) {
        let set = |slot: &mut String, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                *slot = v;
            }
        };
        set(&mut self.version_url, o.version_url);
        set(&mut self.game_download_url, o.game_download_url);
        set(&mut self.build_dir, o.build_dir);
        set(&mut self.game_exe, o.game_exe);
        set(&mut self.version_file, o.version_file);
        set(&mut self.archive_name, o.archive_name);
        set(&mut self.error_log_dir, o.error_log_dir);
        set(&mut self.shortcut_name, o.shortcut_name);
        set(&mut self.shortcut_description, o.shortcut_description);
        if let Some(n) = o.allowed_retries {
            self.allowed_retries = n;
        }
        if let Some(secs) = o.request_timeout_secs {
            self.request_timeout_secs = secs;
        }
    }

    pub fn version_file_path(&self) -> PathBuf {
        self.root.join(&self.version_file)
    }

    pub fn archive_path(&self) -> PathBuf {
        self.root.join(&self.archive_name)
    }

    pub fn game_dir(&self) -> PathBuf {
        self.root.join(&self.build_dir)
    }

    pub fn game_exe_path(&self) -> PathBuf {
        self.game_dir().join(&self.game_exe)
    }

    pub fn error_log_path(&self) -> PathBuf {
        self.root.join(&self.error_log_dir)
    }

    /// `None` means no client timeout at all.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_rooted() {
        let cfg = LauncherConfig::for_root("/games/city");
        let root = PathBuf::from("/games/city");
        assert_eq!(cfg.version_file_path(), root.join(VERSION_FILE));
        assert_eq!(cfg.archive_path(), root.join(ARCHIVE_NAME));
        assert_eq!(cfg.game_exe_path(), root.join(BUILD_DIR).join(GAME_EXE));
        assert_eq!(cfg.error_log_path(), root.join(ERROR_LOG_DIR));
    }

    #[test]
    fn load_without_override_uses_builtins() {
        let tmp = tempfile::tempdir().unwrap();
        let cfg = LauncherConfig::load(tmp.path()).unwrap();
        assert_eq!(cfg, LauncherConfig::for_root(tmp.path()));
    }

    #[test]
    fn load_applies_override_file() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(
            tmp.path().join(OVERRIDE_FILE_NAME),
            "version_url = \"http://localhost/version.txt\"\nallowed_retries = 4\nbuild_dir = \"\"\n",
        )
        .unwrap();
        let cfg = LauncherConfig::load(tmp.path()).unwrap();
        assert_eq!(cfg.version_url, "http://localhost/version.txt");
        assert_eq!(cfg.allowed_retries, 4);
        assert_eq!(cfg.build_dir, BUILD_DIR);
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(OVERRIDE_FILE_NAME), "versoin_url = \"x\"\n").unwrap();
        assert!(LauncherConfig::load(tmp.path()).is_err());
    }

    #[test]
    fn zero_timeout_means_none() {
        let mut cfg = LauncherConfig::for_root("/x");
        cfg.request_timeout_secs = 0;
        assert_eq!(cfg.request_timeout(), None);
        cfg.request_timeout_secs = 15;
        assert_eq!(cfg.request_timeout(), Some(Duration::from_secs(15)));
    }
}
