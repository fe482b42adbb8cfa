//! Data models for the installer.
//!
//! - [`AssetCategory`] / [`Selection`]: which bundles to deploy, in canonical order
//! - [`InstallRoot`]: a validated (or explicitly supplied) FFXIV installation directory
//! - [`DeploymentOutcome`] / [`Summary`]: per-category results of a run
//! - [`InstallerSettings`]: user settings loaded from `Installer Settings.yaml`
//!
//! Outcomes and roots are created fresh for each run and never persisted.

pub mod category;
pub mod config;
pub mod install_root;
pub mod outcome;

pub use category::{AssetCategory, Selection, SourceRequirement};
pub use config::InstallerSettings;
pub use install_root::{GAME_MARKER_DIR, InstallRoot};
pub use outcome::{CopyStats, DeploymentOutcome, Summary};
