#![allow(dead_code)]

use anyhow::{bail, Result};
use game_launcher::remote::{RemoteSource, TransferControl};
use std::{
    collections::VecDeque,
    fs,
    io::{Cursor, Write},
    path::Path,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    },
};

#[derive(Clone)]
pub enum Archive {
    Zip(Vec<u8>),
    Corrupt,
    Unreachable,
}

/// In-memory stand-in for the update and archive endpoints.
pub struct FakeRemote {
    version: Mutex<Option<String>>,
    archives: Mutex<VecDeque<Archive>>,
    pub version_calls: AtomicUsize,
    pub download_calls: AtomicUsize,
}

impl FakeRemote {
    pub fn new(version: &str, archive: Archive) -> Self {
        Self::sequence(version, vec![archive])
    }

    /// Serves `archives` in order; the last one repeats.
    pub fn sequence(version: &str, archives: Vec<Archive>) -> Self {
        Self {
            version: Mutex::new(Some(version.to_string())),
            archives: Mutex::new(archives.into()),
            version_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    pub fn offline() -> Self {
        Self {
            version: Mutex::new(None),
            archives: Mutex::new(VecDeque::from([Archive::Unreachable])),
            version_calls: AtomicUsize::new(0),
            download_calls: AtomicUsize::new(0),
        }
    }

    pub fn set_version(&self, version: &str) {
        *self.version.lock().unwrap() = Some(version.to_string());
    }

    pub fn set_archive(&self, archive: Archive) {
        *self.archives.lock().unwrap() = VecDeque::from([archive]);
    }

    fn next_archive(&self) -> Archive {
        let mut archives = self.archives.lock().unwrap();
        if archives.len() > 1 {
            archives.pop_front().unwrap()
        } else {
            archives.front().cloned().unwrap_or(Archive::Unreachable)
        }
    }

    pub fn downloads(&self) -> usize {
        self.download_calls.load(Ordering::SeqCst)
    }

    pub fn version_fetches(&self) -> usize {
        self.version_calls.load(Ordering::SeqCst)
    }
}

impl RemoteSource for FakeRemote {
    fn fetch_version(&self) -> Result<String> {
        self.version_calls.fetch_add(1, Ordering::SeqCst);
        match self.version.lock().unwrap().clone() {
            Some(v) => Ok(v),
            None => bail!("connection refused"),
        }
    }

    fn download_archive(&self, dest: &Path, ctl: &TransferControl) -> Result<()> {
        self.download_calls.fetch_add(1, Ordering::SeqCst);
        let bytes = match self.next_archive() {
            Archive::Zip(bytes) => bytes,
            Archive::Corrupt => b"<html>quota exceeded</html>".to_vec(),
            Archive::Unreachable => bail!("connection refused"),
        };
        ctl.checkpoint(0, Some(bytes.len() as u64))?;
        fs::write(dest, &bytes)?;
        ctl.checkpoint(bytes.len() as u64, Some(bytes.len() as u64))?;
        Ok(())
    }
}

/// Builds a zip holding `entries` in memory.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::FileOptions::default();
    for (name, data) in entries {
        zip.start_file(*name, options).unwrap();
        zip.write_all(data.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn game_zip(exe_rel: &str) -> Vec<u8> {
    zip_bytes(&[(exe_rel, "game binary"), ("Build/Data/level1.dat", "level")])
}
