//! Services module - installation logic with no presentation dependencies.
//!
//! # Components
//!
//! - [`PathProbe`]: Locates the FFXIV install root through an ordered chain of
//!   [`DiscoveryStrategy`] implementations:
//!   - Steam and SquareEnix uninstall registry records ([`RegistryStrategy`])
//!   - A static list of conventional install locations ([`StaticPathsStrategy`])
//!
//! - [`BackupStore`]: Copies a bundled tree into place after moving any existing
//!   destination to a single `<destination>.backup` slot.
//!
//! - [`InstallationStep`]: Source subtree and destination rule for one
//!   [`AssetCategory`](crate::models::AssetCategory).
//!
//! - [`InstallOrchestrator`]: Resolves the install root when needed, runs the
//!   selected steps in canonical order and produces a [`Summary`](crate::models::Summary).
//!
//! # Execution Model
//!
//! Everything here is blocking. The orchestrator is meant to run on a background
//! worker (see [`crate::worker`]) while the presentation layer drains the
//! progress channel.
//!
//! # Usage Example
//!
//! ```ignore
//! use xiv_config_installer::models::Selection;
//! use xiv_config_installer::progress::RecordingSink;
//! use xiv_config_installer::services::{InstallOrchestrator, PathProbe, ProfileDirs};
//!
//! let orchestrator = InstallOrchestrator::new(
//!     "C:/Tools/XeldarConfigs",
//!     ProfileDirs::detect(None, None),
//!     PathProbe::with_default_strategies(),
//! );
//!
//! let sink = RecordingSink::new();
//! let summary = orchestrator.run_installation(&Selection::all(), None, &sink)?;
//! assert!(summary.is_success());
//! ```

pub mod backup;
pub mod orchestrator;
pub mod path_probe;
pub mod steps;

pub use backup::{BACKUP_SUFFIX, BackupStore, DeployError, backup_path_for};
pub use orchestrator::{InstallError, InstallOrchestrator};
pub use path_probe::{
    DEFAULT_CANDIDATE_PATHS, DiscoveryStrategy, PathProbe, RegistryReader, RegistryStrategy,
    StaticPathsStrategy, SystemRegistry,
};
pub use steps::{DestinationRule, InstallationStep, ProfileDirs, StepError, source_subpath};
