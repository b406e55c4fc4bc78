use serde::Deserialize;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

#[derive(Debug, Deserialize)]
struct Config {
    app_id: String,
    name: String,
    product_name: String,
    company: String,
    description: String,
    version: String,
    #[serde(default)]
    icon: String,
    version_url: String,
    game_download_url: String,
    build_dir: String,
    game_exe: String,
    version_file: String,
    archive_name: String,
    error_log_dir: String,
    shortcut_name: String,
    #[serde(default)]
    shortcut_description: String,
    #[serde(default = "default_allowed_retries")]
    allowed_retries: u32,
    #[serde(default)]
    request_timeout_secs: u64,
}

fn default_allowed_retries() -> u32 {
    2
}

fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("CARGO_MANIFEST_DIR not set");
    let repo_root = PathBuf::from(manifest_dir);
    let config = load_config(&repo_root).unwrap_or_else(|err| {
        panic!("failed to load config.toml: {err}");
    });

    let target_os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_default();
    if target_os == "windows" {
        if let Err(err) = embed_resources(&repo_root, &config) {
            panic!("failed to embed resources: {err}");
        }
    }

    let out_dir = PathBuf::from(std::env::var("OUT_DIR").expect("OUT_DIR not set"));
    if let Err(err) = write_config_rs(&out_dir, &config) {
        panic!("failed to write config: {err}");
    }
}

fn load_config(repo_root: &Path) -> io::Result<Config> {
    let config_path = repo_root.join("config.toml");
    println!("cargo:rerun-if-changed={}", config_path.display());
    let contents = fs::read_to_string(&config_path)?;
    toml::from_str(&contents).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
}

fn embed_resources(repo_root: &Path, config: &Config) -> io::Result<()> {
    let mut res = winres::WindowsResource::new();
    if !config.icon.is_empty() {
        let icon_path = repo_root.join(&config.icon);
        if icon_path.exists() {
            res.set_icon(icon_path.to_string_lossy().as_ref());
        }
    }
    if !config.product_name.is_empty() {
        res.set("ProductName", &config.product_name);
    }
    if !config.description.is_empty() {
        res.set("FileDescription", &config.description);
    }
    if !config.company.is_empty() {
        res.set("CompanyName", &config.company);
    }
    if !config.version.is_empty() {
        res.set("FileVersion", &config.version);
        res.set("ProductVersion", &config.version);
    }
    if !config.app_id.is_empty() {
        res.set("InternalName", &config.app_id);
    }
    res.compile()
}

fn write_config_rs(out_dir: &Path, config: &Config) -> io::Result<()> {
    let out_path = out_dir.join("launcher_config.rs");
    let mut file = fs::File::create(&out_path)?;
    writeln!(file, "pub const APP_ID: &str = {:?};", config.app_id)?;
    writeln!(file, "pub const NAME: &str = {:?};", config.name)?;
    writeln!(file, "pub const PRODUCT_NAME: &str = {:?};", config.product_name)?;
    writeln!(file, "pub const VERSION: &str = {:?};", config.version)?;
    writeln!(file, "pub const VERSION_URL: &str = {:?};", config.version_url)?;
    writeln!(file, "pub const GAME_DOWNLOAD_URL: &str = {:?};", config.game_download_url)?;
    writeln!(file, "pub const BUILD_DIR: &str = {:?};", config.build_dir)?;
    writeln!(file, "pub const GAME_EXE: &str = {:?};", config.game_exe)?;
    writeln!(file, "pub const VERSION_FILE: &str = {:?};", config.version_file)?;
    writeln!(file, "pub const ARCHIVE_NAME: &str = {:?};", config.archive_name)?;
    writeln!(file, "pub const ERROR_LOG_DIR: &str = {:?};", config.error_log_dir)?;
    writeln!(file, "pub const SHORTCUT_NAME: &str = {:?};", config.shortcut_name)?;
    writeln!(
        file,
        "pub const SHORTCUT_DESCRIPTION: &str = {:?};",
        config.shortcut_description
    )?;
    writeln!(file, "pub const ALLOWED_RETRIES: u32 = {};", config.allowed_retries)?;
    writeln!(
        file,
        "pub const REQUEST_TIMEOUT_SECS: u64 = {};",
        config.request_timeout_secs
    )?;
    Ok(())
}
