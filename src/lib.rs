// Xeldar FFXIV Configs - deploys bundled FFXIV configuration assets
//
// This is the library crate containing the installer core: install-root
// discovery, backup-aware deployment and the step orchestrator.
// The binary crate (main.rs) provides the command-line front end.

pub mod config;
pub mod logging;
pub mod models;
pub mod progress;
pub mod services;
pub mod worker;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{
    AssetCategory, DeploymentOutcome, InstallRoot, InstallerSettings, Selection, SourceRequirement,
    Summary,
};
pub use progress::{InstallEvent, LogLevel, ProgressSink, RunPhase};
pub use services::{InstallError, InstallOrchestrator, PathProbe};
pub use worker::{InstallHandle, spawn_installation};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
