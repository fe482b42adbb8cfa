use super::category::{AssetCategory, Selection};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

/// Installer settings from `Installer Settings.yaml`
///
/// Every field is optional; environment variables prefixed `XIVCONF_`
/// override the file (see [`crate::config::ConfigManager::load_settings`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerSettings {
    /// Root of the bundled asset tree. Defaults to the executable's directory.
    pub resource_root: Option<Utf8PathBuf>,

    /// Explicit FFXIV installation directory; skips auto-detection when set.
    pub game_path: Option<Utf8PathBuf>,

    /// Override for the user's Documents folder
    pub documents_dir: Option<Utf8PathBuf>,

    /// Override for the roaming application data folder
    pub app_data_dir: Option<Utf8PathBuf>,

    /// Categories installed when none are given on the command line
    pub categories: Vec<AssetCategory>,

    pub debug_mode: bool,

    pub log_dir: Utf8PathBuf,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            resource_root: None,
            game_path: None,
            documents_dir: None,
            app_data_dir: None,
            categories: AssetCategory::ALL.to_vec(),
            debug_mode: false,
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("logs")
}

impl InstallerSettings {
    /// The configured default selection, if it is non-empty
    pub fn default_selection(&self) -> Option<Selection> {
        Selection::new(self.categories.iter().copied())
    }
}
