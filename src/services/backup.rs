//! Copy-with-single-backup primitive used by every deployment step.
//!
//! Deploying `source` to `destination` moves any existing destination aside
//! to `<destination>.backup` (dropping an older backup first) and then copies
//! the whole source tree into place. There is never more than one backup
//! generation per destination.

use crate::models::CopyStats;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::io;
use thiserror::Error;
use walkdir::WalkDir;

/// Suffix appended to a destination to form its backup slot
pub const BACKUP_SUFFIX: &str = ".backup";

/// Errors raised while deploying a tree
#[derive(Error, Debug)]
pub enum DeployError {
    #[error("Source directory not found: {0}")]
    SourceMissing(Utf8PathBuf),

    #[error("Failed to remove previous backup {path}: {source}")]
    RemoveBackup {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to move {from} to {to}: {source}")]
    MoveAside {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to copy {from} to {to}: {source}")]
    Copy {
        from: Utf8PathBuf,
        to: Utf8PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read {path}: {source}")]
    Walk {
        path: Utf8PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(String),
}

/// `<destination>.backup`, as a sibling of `destination`.
pub fn backup_path_for(destination: &Utf8Path) -> Utf8PathBuf {
    Utf8PathBuf::from(format!("{}{}", destination, BACKUP_SUFFIX))
}

/// Filesystem deployment with one rotating backup slot per destination.
#[derive(Debug, Clone, Copy, Default)]
pub struct BackupStore;

impl BackupStore {
    pub fn new() -> Self {
        Self
    }

    /// Replace `destination` with a full copy of `source`.
    ///
    /// An existing destination is renamed to its backup slot first. The
    /// caller is expected to have checked that `source` is a directory; a
    /// missing source is still reported as [`DeployError::SourceMissing`]
    /// before anything is touched.
    pub fn deploy_with_backup(
        &self,
        source: &Utf8Path,
        destination: &Utf8Path,
    ) -> Result<CopyStats, DeployError> {
        if !source.is_dir() {
            return Err(DeployError::SourceMissing(source.to_path_buf()));
        }

        let backed_up = self.rotate_backup(destination)?;
        let mut stats = copy_tree(source, destination)?;
        stats.backed_up = backed_up;

        tracing::debug!(
            "Deployed {} -> {} ({} files, {} bytes, backup: {})",
            source,
            destination,
            stats.files,
            stats.bytes,
            backed_up
        );

        Ok(stats)
    }

    /// Move an existing destination into its backup slot.
    ///
    /// Returns whether a backup was made.
    pub fn rotate_backup(&self, destination: &Utf8Path) -> Result<bool, DeployError> {
        // symlink_metadata so a dangling link at the destination still counts
        if fs::symlink_metadata(destination).is_err() {
            return Ok(false);
        }

        let backup = backup_path_for(destination);
        if let Ok(meta) = fs::symlink_metadata(&backup) {
            let removed = if meta.is_dir() {
                fs::remove_dir_all(&backup)
            } else {
                fs::remove_file(&backup)
            };
            removed.map_err(|source| DeployError::RemoveBackup {
                path: backup.clone(),
                source,
            })?;
            tracing::debug!("Removed previous backup: {}", backup);
        }

        fs::rename(destination, &backup).map_err(|source| DeployError::MoveAside {
            from: destination.to_path_buf(),
            to: backup.clone(),
            source,
        })?;

        tracing::info!("Moved {} to backup slot {}", destination, backup);
        Ok(true)
    }
}

/// Recursively copy `source` into `destination`, creating parents as needed.
fn copy_tree(source: &Utf8Path, destination: &Utf8Path) -> Result<CopyStats, DeployError> {
    let mut stats = CopyStats::default();

    create_dir_all(destination)?;

    for entry in WalkDir::new(source).follow_links(true).min_depth(1) {
        let entry = entry.map_err(|source_err| DeployError::Walk {
            path: source.to_path_buf(),
            source: source_err,
        })?;

        let from = Utf8Path::from_path(entry.path())
            .ok_or_else(|| DeployError::NonUtf8Path(entry.path().display().to_string()))?;
        let relative = from
            .strip_prefix(source)
            .map_err(|_| DeployError::NonUtf8Path(from.to_string()))?;
        let to = destination.join(relative);

        if entry.file_type().is_dir() {
            create_dir_all(&to)?;
            continue;
        }

        let bytes = fs::copy(from, &to).map_err(|source_err| DeployError::Copy {
            from: from.to_path_buf(),
            to: to.clone(),
            source: source_err,
        })?;
        stats.files += 1;
        stats.bytes += bytes;
    }

    Ok(stats)
}

fn create_dir_all(path: &Utf8Path) -> Result<(), DeployError> {
    fs::create_dir_all(path).map_err(|source| DeployError::CreateDir {
        path: path.to_path_buf(),
        source,
    })
}
