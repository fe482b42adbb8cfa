use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;

/// Name of the subdirectory that marks a real FFXIV installation.
pub const GAME_MARKER_DIR: &str = "game";

/// The target application's installation directory.
///
/// Roots produced by discovery are always validated; roots supplied by the
/// user are wrapped as-is and may lack the marker (see [`InstallRoot::has_marker`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallRoot(Utf8PathBuf);

impl InstallRoot {
    /// Accept `path` only if it exists and contains the `game` marker directory.
    pub fn validate(path: impl Into<Utf8PathBuf>) -> Option<Self> {
        let root = Self(path.into());
        if root.0.exists() && root.has_marker() {
            Some(root)
        } else {
            None
        }
    }

    /// Wrap an explicitly supplied path without validation.
    pub fn explicit(path: impl Into<Utf8PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Utf8Path {
        &self.0
    }

    pub fn has_marker(&self) -> bool {
        self.0.join(GAME_MARKER_DIR).is_dir()
    }

    /// `<root>/game` when present, otherwise the root itself.
    pub fn game_dir(&self) -> Utf8PathBuf {
        let game = self.0.join(GAME_MARKER_DIR);
        if game.is_dir() { game } else { self.0.clone() }
    }
}

impl fmt::Display for InstallRoot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
