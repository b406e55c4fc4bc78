use anyhow::{Context, Result};
use std::{fs, path::Path};

use crate::{fs_ops, version::Version};

/// Reads the installed version. `Ok(None)` means nothing is installed yet.
pub fn read(path: &Path) -> Result<Option<Version>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents =
        fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let line = contents.lines().next().unwrap_or("");
    let version = Version::parse(line)
        .with_context(|| format!("parse version file {}", path.display()))?;
    Ok(Some(version))
}

pub fn write(path: &Path, version: &Version) -> Result<()> {
    fs_ops::write_bytes_with_retry(path, version.to_string().as_bytes(), 5)
        .with_context(|| format!("write version file {}", path.display()))
}
