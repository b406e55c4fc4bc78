use anyhow::{Context, Result};
use std::{
    path::Path,
    process::{Child, Command, Stdio},
};

fn game_command(exe: &Path, working_dir: &Path) -> Command {
    let mut cmd = Command::new(exe);
    cmd.current_dir(working_dir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null());
    cmd
}

/// Starts the game and returns without waiting on it.
pub fn spawn_game(exe: &Path, working_dir: &Path) -> Result<Child> {
    let child = game_command(exe, working_dir)
        .spawn()
        .with_context(|| format!("launch {}", exe.display()))?;
    log::info!("started {} (pid {})", exe.display(), child.id());
    Ok(child)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn command_uses_working_dir() {
        let exe = PathBuf::from("/games/city/Build/game.exe");
        let dir = PathBuf::from("/games/city/Build");
        let cmd = game_command(&exe, &dir);
        assert_eq!(cmd.get_program(), exe.as_os_str());
        assert_eq!(cmd.get_current_dir(), Some(dir.as_path()));
        assert_eq!(cmd.get_args().count(), 0);
    }

    #[test]
    fn spawn_missing_exe_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let err = spawn_game(&tmp.path().join("missing.exe"), tmp.path()).unwrap_err();
        assert!(err.to_string().contains("launch"));
    }
}
