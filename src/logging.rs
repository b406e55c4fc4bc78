use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

const FILE_STAMP_FORMAT: &str = "%m_%d_%Y__%H-%M-%S";
const LINE_STAMP_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Sets up console logging and makes sure the debug-file directory exists.
pub fn init(error_log_dir: &Path) -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();
    fs::create_dir_all(error_log_dir)
        .with_context(|| format!("create {}", error_log_dir.display()))?;
    Ok(())
}

pub fn debug_file_name(at: &DateTime<Local>) -> String {
    format!("{}.txt", at.format(FILE_STAMP_FORMAT))
}

/// Records one failure as `<dir>/MM_dd_yyyy__HH-mm-ss.txt`.
pub fn write_debug_file(error_log_dir: &Path, err: &anyhow::Error) -> Result<PathBuf> {
    write_debug_file_at(error_log_dir, err, &Local::now())
}

pub fn write_debug_file_at(
    error_log_dir: &Path,
    err: &anyhow::Error,
    at: &DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(error_log_dir)
        .with_context(|| format!("create {}", error_log_dir.display()))?;
    let path = error_log_dir.join(debug_file_name(at));
    let mut file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .with_context(|| format!("open {}", path.display()))?;
    writeln!(file, "{}: {err:?}", at.format(LINE_STAMP_FORMAT))
        .with_context(|| format!("write {}", path.display()))?;
    file.flush()
        .with_context(|| format!("flush {}", path.display()))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 2).unwrap()
    }

    #[test]
    fn file_name_uses_timestamp_pattern() {
        assert_eq!(debug_file_name(&fixed_time()), "03_07_2024__09-05-02.txt");
    }

    #[test]
    fn debug_file_holds_timestamp_and_error_chain() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("ErrorLog");
        let err = anyhow!("connection reset").context("fetch remote version");

        let path = write_debug_file_at(&dir, &err, &fixed_time()).unwrap();

        assert_eq!(path, dir.join("03_07_2024__09-05-02.txt"));
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("03/07/2024 09:05:02: "));
        assert!(text.contains("fetch remote version"));
        assert!(text.contains("connection reset"));
    }

    #[test]
    fn same_second_failures_share_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let at = fixed_time();
        write_debug_file_at(tmp.path(), &anyhow!("first"), &at).unwrap();
        let path = write_debug_file_at(tmp.path(), &anyhow!("second"), &at).unwrap();
        let text = fs::read_to_string(path).unwrap();
        let entries = text
            .lines()
            .filter(|line| line.starts_with("03/07/2024 09:05:02: "))
            .count();
        assert_eq!(entries, 2);
        assert!(text.contains("first"));
        assert!(text.contains("second"));
    }

    #[test]
    fn init_creates_error_log_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("ErrorLog");
        init(&dir).unwrap();
        assert!(dir.is_dir());
    }
}
