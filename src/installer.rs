use anyhow::{bail, Context, Result};
use std::{
    fs, io,
    path::{Component, Path},
};

use crate::{fs_ops, version::Version, version_store};

/// Completion step of an install: unpack, drop the archive, record the version.
pub fn finish_install(
    archive: &Path,
    install_root: &Path,
    version_file: &Path,
    version: &Version,
) -> Result<()> {
    extract_archive(archive, install_root)
        .with_context(|| format!("extract {}", archive.display()))?;
    fs_ops::remove_file_with_retry(archive, 5)?;
    version_store::write(version_file, version)?;
    log::info!("installed version {version} into {}", install_root.display());
    Ok(())
}

/// Extracts every entry of `archive` under `dest_root`, overwriting files
/// that already exist.
pub fn extract_archive(archive: &Path, dest_root: &Path) -> Result<()> {
    let file = fs::File::open(archive).context("open zip")?;
    let mut zip = zip::ZipArchive::new(file).context("read zip")?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let name = entry.name().to_owned();
        let path = Path::new(&name);
        if path.is_absolute()
            || path
                .components()
                .any(|c| matches!(c, Component::ParentDir | Component::Prefix(_) | Component::RootDir))
        {
            bail!("invalid path in game archive: {name}");
        }

        let out_path = dest_root.join(path);
        if entry.is_dir() {
            fs::create_dir_all(&out_path)
                .with_context(|| format!("create {}", out_path.display()))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
        }

        let mut out_file = fs::File::create(&out_path)
            .with_context(|| format!("create {}", out_path.display()))?;
        io::copy(&mut entry, &mut out_file)
            .with_context(|| format!("write {}", out_path.display()))?;
    }
    Ok(())
}
