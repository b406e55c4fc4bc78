use anyhow::{Context, Result};
use std::path::PathBuf;

pub const ROOT_ENV: &str = "GAME_LAUNCHER_ROOT";

pub fn self_path() -> Result<PathBuf> {
    std::env::current_exe().context("current_exe")
}

/// Install root: `$GAME_LAUNCHER_ROOT` when set, else the working directory.
pub fn root_dir() -> Result<PathBuf> {
    if let Ok(dev_root) = std::env::var(ROOT_ENV) {
        if !dev_root.trim().is_empty() {
            return Ok(PathBuf::from(dev_root));
        }
    }
    std::env::current_dir().context("current_dir")
}

pub fn desktop_dir() -> Result<PathBuf> {
    dirs::desktop_dir().context("desktop directory not available")
}
