pub mod config;
pub mod download;
pub mod fs_ops;
pub mod installer;
pub mod launcher;
pub mod logging;
pub mod paths;
pub mod process;
pub mod remote;
pub mod shortcut;
pub mod status;
pub mod version;
pub mod version_store;

pub use launcher::{Launcher, PlayOutcome};
pub use status::{LaunchStatus, Notice};
pub use version::Version;
