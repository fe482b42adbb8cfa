use crate::models::InstallerSettings;
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// File name of the installer settings inside the configuration directory
pub const SETTINGS_FILE: &str = "Installer Settings.yaml";

/// Prefix of environment variables that override settings (`XIVCONF_GAME_PATH`, ...)
pub const ENV_PREFIX: &str = "XIVCONF";

/// Configuration manager for loading and saving the installer settings.
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager with the specified configuration directory.
    ///
    /// The directory is created if it doesn't exist.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            config_dir,
        })
    }

    /// Load settings from the YAML file with environment overrides on top.
    ///
    /// A missing file is not an error; defaults fill every absent field.
    /// Runs before logging is set up, so the caller reports the result.
    pub fn load_settings(&self) -> Result<InstallerSettings> {
        let settings = config::Config::builder()
            .add_source(
                config::File::from(self.settings_path.as_std_path())
                    .format(config::FileFormat::Yaml)
                    .required(false),
            )
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?
            .try_deserialize::<InstallerSettings>()
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        Ok(settings)
    }

    /// Save settings as YAML, replacing the existing file.
    pub fn save_settings(&self, settings: &InstallerSettings) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(settings).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }
}
