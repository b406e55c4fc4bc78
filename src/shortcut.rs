use anyhow::{bail, Context, Result};
use std::{
    fs,
    path::{Path, PathBuf},
    process::Command,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutSpec {
    pub name: String,
    pub description: String,
    pub target: PathBuf,
    pub working_dir: Option<PathBuf>,
}

/// Places a shell shortcut to the launcher somewhere the user can click it.
pub trait ShortcutInstaller {
    fn shortcut_path(&self, name: &str) -> Result<PathBuf>;

    fn install(&self, spec: &ShortcutSpec) -> Result<PathBuf>;
}

fn checked_file_name(name: &str, ext: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        bail!("shortcut name is empty");
    }
    if name.contains(['/', '\\']) {
        bail!("shortcut name contains a path separator: {name}");
    }
    Ok(format!("{name}.{ext}"))
}

/// `.lnk` files written through the `WScript.Shell` COM object.
pub struct WindowsShellShortcut {
    dir: PathBuf,
}

impl WindowsShellShortcut {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn script(lnk: &Path, spec: &ShortcutSpec) -> String {
        let lnk = ps_quote(&lnk.display().to_string());
        let tgt = ps_quote(&spec.target.display().to_string());
        let mut script = format!(
            "$WshShell = New-Object -ComObject WScript.Shell; \
             $Shortcut = $WshShell.CreateShortcut({lnk}); \
             $Shortcut.TargetPath = {tgt}; "
        );
        if !spec.description.is_empty() {
            let desc = ps_quote(&spec.description);
            script.push_str(&format!("$Shortcut.Description = {desc}; "));
        }
        if let Some(dir) = &spec.working_dir {
            let dir = ps_quote(&dir.display().to_string());
            script.push_str(&format!("$Shortcut.WorkingDirectory = {dir}; "));
        }
        script.push_str("$Shortcut.Save();");
        script
    }
}

impl ShortcutInstaller for WindowsShellShortcut {
    fn shortcut_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.dir.join(checked_file_name(name, "lnk")?))
    }

    fn install(&self, spec: &ShortcutSpec) -> Result<PathBuf> {
        let lnk_path = self.shortcut_path(&spec.name)?;
        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;

        let status = Command::new("powershell")
            .arg("-NoProfile")
            .arg("-Command")
            .arg(Self::script(&lnk_path, spec))
            .status()
            .context("run powershell")?;
        if !status.success() {
            bail!("failed to create shortcut (exit {:?})", status.code());
        }
        Ok(lnk_path)
    }
}

fn ps_quote(value: &str) -> String {
    let escaped = value.replace('\'', "''");
    format!("'{}'", escaped)
}

/// freedesktop.org `.desktop` entries.
pub struct DesktopEntryShortcut {
    dir: PathBuf,
}

impl DesktopEntryShortcut {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn entry(spec: &ShortcutSpec) -> String {
        let mut out = String::from("[Desktop Entry]\nType=Application\n");
        out.push_str(&format!("Name={}\n", spec.name.trim()));
        if !spec.description.is_empty() {
            out.push_str(&format!("Comment={}\n", spec.description));
        }
        out.push_str(&format!("Exec={}\n", desktop_quote(&spec.target.display().to_string())));
        if let Some(dir) = &spec.working_dir {
            out.push_str(&format!("Path={}\n", dir.display()));
        }
        out.push_str("Terminal=false\n");
        out
    }
}

impl ShortcutInstaller for DesktopEntryShortcut {
    fn shortcut_path(&self, name: &str) -> Result<PathBuf> {
        Ok(self.dir.join(checked_file_name(name, "desktop")?))
    }

    fn install(&self, spec: &ShortcutSpec) -> Result<PathBuf> {
        let path = self.shortcut_path(&spec.name)?;
        fs::create_dir_all(&self.dir).with_context(|| format!("create {}", self.dir.display()))?;
        fs::write(&path, Self::entry(spec)).with_context(|| format!("write {}", path.display()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
                .with_context(|| format!("chmod {}", path.display()))?;
        }
        Ok(path)
    }
}

fn desktop_quote(value: &str) -> String {
    if !value.contains([' ', '"', '\\', '\'', '$', '`']) {
        return value.to_string();
    }
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('$', "\\$")
        .replace('`', "\\`");
    format!("\"{escaped}\"")
}

/// The installer for the platform this binary was built for.
pub fn platform_default(dir: impl Into<PathBuf>) -> Box<dyn ShortcutInstaller> {
    if cfg!(windows) {
        Box::new(WindowsShellShortcut::new(dir))
    } else {
        Box::new(DesktopEntryShortcut::new(dir))
    }
}
