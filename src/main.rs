use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
};

use game_launcher::{
    config::{self, LauncherConfig},
    logging, paths,
    remote::{HttpRemote, ProgressSink},
    shortcut::{self, ShortcutSpec},
    version_store, LaunchStatus, Launcher, PlayOutcome,
};

#[derive(Parser)]
#[command(name = "game-launcher")]
#[command(about = "Keeps the game up to date and starts it", long_about = None)]
#[command(version = config::VERSION)]
struct Cli {
    /// Install root (overrides $GAME_LAUNCHER_ROOT and the working directory)
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Defaults to `play`
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check for updates, install if needed, then start the game
    Play,
    /// Check for updates and install, without starting the game
    Check,
    /// Show the installed version
    Status,
    /// Create a desktop shortcut to this launcher
    Shortcut {
        /// Directory to place the shortcut in (defaults to the desktop)
        #[arg(long)]
        dir: Option<PathBuf>,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => paths::root_dir()?,
    };
    let cfg = LauncherConfig::load(&root)?;
    logging::init(&cfg.error_log_path())?;

    match cli.command.unwrap_or(Commands::Play) {
        Commands::Play => run_workflow(cfg, true),
        Commands::Check => run_workflow(cfg, false),
        Commands::Status => show_status(&cfg),
        Commands::Shortcut { dir } => create_shortcut(&cfg, dir),
    }
}

fn run_workflow(cfg: LauncherConfig, launch: bool) -> Result<ExitCode> {
    let _single_instance = acquire_single_instance();
    if _single_instance.is_none() {
        eprintln!("another launcher is already running");
        return Ok(ExitCode::FAILURE);
    }

    let bar = progress_bar();
    let remote = Arc::new(HttpRemote::new(&cfg)?);
    let mut launcher = Launcher::new(cfg, remote).with_progress(progress_sink(&bar));
    launcher.check_for_updates();

    loop {
        if launcher.is_downloading() {
            bar.reset();
            bar.set_message(launcher.button_label().to_string());
        }
        launcher.run_until_idle();
        bar.finish_and_clear();

        match launcher.status() {
            LaunchStatus::Ready => {
                if let Some(v) = launcher.current_version() {
                    println!("Version {v}");
                }
                if !launch {
                    println!("{}", launcher.button_label());
                    return Ok(ExitCode::SUCCESS);
                }
                match launcher.play() {
                    PlayOutcome::Launched => return Ok(ExitCode::SUCCESS),
                    PlayOutcome::Missing => bail!(
                        "game executable not found at {}",
                        launcher.config().game_exe_path().display()
                    ),
                    _ => continue,
                }
            }
            LaunchStatus::Failed => {
                if let Some(notice) = launcher.notice() {
                    eprintln!("{}", notice.message());
                }
                if !prompt_retry(launcher.button_label())? {
                    return Ok(ExitCode::FAILURE);
                }
                launcher.play();
            }
            LaunchStatus::DownloadingGame | LaunchStatus::DownloadingUpdate => {}
        }
    }
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    let style = ProgressStyle::default_bar()
        .template("{msg} [{bar:40}] {bytes}/{total_bytes}")
        .map(|s| s.progress_chars("=> "));
    if let Ok(style) = style {
        bar.set_style(style);
    }
    bar
}

fn progress_sink(bar: &ProgressBar) -> ProgressSink {
    let bar = bar.clone();
    Arc::new(move |done, total| {
        if let Some(total) = total {
            bar.set_length(total);
        }
        bar.set_position(done);
    })
}

fn prompt_retry(label: &str) -> Result<bool> {
    print!("{label} [Enter to retry, q to quit]: ");
    io::stdout().flush().context("flush stdout")?;
    let mut line = String::new();
    let read = io::stdin()
        .lock()
        .read_line(&mut line)
        .context("read stdin")?;
    Ok(read > 0 && !line.trim().eq_ignore_ascii_case("q"))
}

fn show_status(cfg: &LauncherConfig) -> Result<ExitCode> {
    match version_store::read(&cfg.version_file_path())? {
        Some(v) => println!("installed: {v}"),
        None => println!("not installed"),
    }
    println!("root: {}", cfg.root.display());
    Ok(ExitCode::SUCCESS)
}

fn create_shortcut(cfg: &LauncherConfig, dir: Option<PathBuf>) -> Result<ExitCode> {
    let dir = match dir {
        Some(dir) => dir,
        None => paths::desktop_dir()?,
    };
    let spec = ShortcutSpec {
        name: cfg.shortcut_name.clone(),
        description: cfg.shortcut_description.clone(),
        target: paths::self_path()?,
        working_dir: Some(cfg.root.clone()),
    };
    let path = shortcut::platform_default(dir).install(&spec)?;
    println!("created {}", path.display());
    Ok(ExitCode::SUCCESS)
}

#[cfg(windows)]
fn acquire_single_instance() -> Option<SingleInstanceGuard> {
    use std::ffi::OsStr;
    use std::iter::once;
    use std::os::windows::ffi::OsStrExt;
    use windows_sys::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS};
    use windows_sys::Win32::System::Threading::CreateMutexW;

    let name = mutex_name();
    let wide: Vec<u16> = OsStr::new(&name).encode_wide().chain(once(0)).collect();
    let handle = unsafe { CreateMutexW(std::ptr::null(), 0, wide.as_ptr()) };
    if handle == 0 {
        return Some(SingleInstanceGuard { handle });
    }
    let last_error = unsafe { GetLastError() };
    if last_error == ERROR_ALREADY_EXISTS {
        unsafe { CloseHandle(handle) };
        return None;
    }
    Some(SingleInstanceGuard { handle })
}

#[cfg(not(windows))]
fn acquire_single_instance() -> Option<SingleInstanceGuard> {
    Some(SingleInstanceGuard {})
}

#[cfg(windows)]
fn mutex_name() -> String {
    let id = config::APP_ID.trim();
    let base = if id.is_empty() { config::NAME } else { id };
    let cleaned: String = base
        .chars()
        .map(|ch| if ch.is_ascii_alphanumeric() || ch == '.' || ch == '-' { ch } else { '_' })
        .collect();
    format!("Local\\GameLauncher-{}", cleaned)
}

#[cfg(windows)]
struct SingleInstanceGuard {
    handle: isize,
}

#[cfg(windows)]
impl Drop for SingleInstanceGuard {
    fn drop(&mut self) {
        if self.handle != 0 {
            unsafe { windows_sys::Win32::Foundation::CloseHandle(self.handle) };
        }
    }
}

#[cfg(not(windows))]
struct SingleInstanceGuard {}
