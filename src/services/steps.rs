//! Per-category installation steps.
//!
//! Each [`AssetCategory`] maps to one bundled source subtree (relative to the
//! resource root) and one destination rule. Rules either hang off the
//! install root or off fixed per-user profile folders.

use crate::models::{AssetCategory, DeploymentOutcome, InstallRoot, SourceRequirement};
use crate::progress::ProgressSink;
use crate::services::backup::{BackupStore, backup_path_for};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use thiserror::Error;

/// Folder name of the game settings, both bundled and under `My Games`
pub const APP_SETTINGS_DIR: &str = "FINAL FANTASY XIV - A Realm Reborn";

/// Errors computing a step's destination
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepError {
    #[error("FFXIV installation directory is required for {0}")]
    InstallRootRequired(AssetCategory),

    #[error("Could not determine the user's {0} folder")]
    ProfileDirUnavailable(&'static str),
}

/// Where a category is deployed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationRule {
    /// `<root>/<name>`
    InstallRoot(&'static str),
    /// `<root>/game/<name>`, or `<root>/<name>` when there is no `game` folder
    GameDir(&'static str),
    /// `<documents>/My Games/<name>`
    Documents(&'static str),
    /// `<app data>/XIVLauncher/<name>`
    AppData(&'static str),
}

impl DestinationRule {
    pub fn for_category(category: AssetCategory) -> Self {
        match category {
            AssetCategory::Skills => DestinationRule::InstallRoot("Skills"),
            AssetCategory::VisualPresets => DestinationRule::GameDir("reshade-presets"),
            AssetCategory::VisualShaders => DestinationRule::GameDir("reshade-shaders"),
            AssetCategory::AppSettings => DestinationRule::Documents(APP_SETTINGS_DIR),
            AssetCategory::PluginConfigs => DestinationRule::AppData("pluginConfigs"),
        }
    }
}

/// Bundled source subtree of a category, relative to the resource root
pub fn source_subpath(category: AssetCategory) -> Utf8PathBuf {
    let parts: &[&str] = match category {
        AssetCategory::Skills => &["Mods Configs", "Skills"],
        AssetCategory::VisualPresets => &["ReShade Configs", "reshade-presets"],
        AssetCategory::VisualShaders => &["ReShade Configs", "reshade-shaders"],
        AssetCategory::AppSettings => &["FFXIV Configs", APP_SETTINGS_DIR],
        AssetCategory::PluginConfigs => &["XIVLauncher Configs", "Plugins", "pluginConfigs"],
    };
    parts.iter().collect()
}

/// Per-user folders that some destinations hang off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileDirs {
    /// The user's Documents folder
    pub documents: Option<Utf8PathBuf>,
    /// The roaming application data folder (`%APPDATA%` on Windows)
    pub app_data: Option<Utf8PathBuf>,
}

impl ProfileDirs {
    /// Resolve profile folders for the current user, preferring overrides.
    pub fn detect(documents: Option<Utf8PathBuf>, app_data: Option<Utf8PathBuf>) -> Self {
        let documents = documents.or_else(|| {
            dirs::document_dir()
                .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
                .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
        });
        let app_data =
            app_data.or_else(|| dirs::config_dir().and_then(|p| Utf8PathBuf::from_path_buf(p).ok()));

        tracing::debug!(
            "Profile folders: documents={:?}, app_data={:?}",
            documents,
            app_data
        );

        Self {
            documents,
            app_data,
        }
    }

    pub fn my_games(&self) -> Option<Utf8PathBuf> {
        self.documents.as_ref().map(|d| d.join("My Games"))
    }

    pub fn xivlauncher(&self) -> Option<Utf8PathBuf> {
        self.app_data.as_ref().map(|d| d.join("XIVLauncher"))
    }
}

/// Deployment of one asset category.
#[derive(Debug, Clone)]
pub struct InstallationStep {
    pub category: AssetCategory,
    pub source: Utf8PathBuf,
    pub rule: DestinationRule,
}

impl InstallationStep {
    pub fn new(category: AssetCategory, resource_root: &Utf8Path) -> Self {
        Self {
            category,
            source: resource_root.join(source_subpath(category)),
            rule: DestinationRule::for_category(category),
        }
    }

    /// Compute this step's destination.
    pub fn destination(
        &self,
        root: Option<&InstallRoot>,
        profile: &ProfileDirs,
    ) -> Result<Utf8PathBuf, StepError> {
        let root_required = || StepError::InstallRootRequired(self.category);
        match self.rule {
            DestinationRule::InstallRoot(name) => Ok(root.ok_or_else(root_required)?.path().join(name)),
            DestinationRule::GameDir(name) => Ok(root.ok_or_else(root_required)?.game_dir().join(name)),
            DestinationRule::Documents(name) => profile
                .my_games()
                .map(|dir| dir.join(name))
                .ok_or(StepError::ProfileDirUnavailable("Documents")),
            DestinationRule::AppData(name) => profile
                .xivlauncher()
                .map(|dir| dir.join(name))
                .ok_or(StepError::ProfileDirUnavailable("AppData")),
        }
    }

    /// Deploy this category and report exactly one terminal log line.
    pub fn run(
        &self,
        root: Option<&InstallRoot>,
        profile: &ProfileDirs,
        store: &BackupStore,
        sink: &dyn ProgressSink,
    ) -> DeploymentOutcome {
        let label = self.category.label();
        sink.progress(&format!("Installing {}...", label));

        if !self.source.is_dir() {
            let requirement = self.category.requirement();
            let message = format!("{} source not found: {}", label, self.source);
            match requirement {
                SourceRequirement::Essential => sink.error(&message),
                SourceRequirement::Optional => sink.warning(&message),
            }
            return DeploymentOutcome::SkippedSourceMissing {
                source: self.source.clone(),
                requirement,
            };
        }

        let destination = match self.destination(root, profile) {
            Ok(destination) => destination,
            Err(e) => return failed(sink, label, e.to_string()),
        };

        // A dangling link at the destination is still moved aside
        if fs::symlink_metadata(&destination).is_ok() {
            sink.info(&format!(
                "Backing up existing {} to: {}",
                label,
                backup_path_for(&destination)
            ));
        }

        match store.deploy_with_backup(&self.source, &destination) {
            Ok(stats) => {
                sink.success(&format!("{} copied to: {}", label, destination));
                DeploymentOutcome::Succeeded { destination, stats }
            }
            Err(e) => failed(sink, label, e.to_string()),
        }
    }
}

fn failed(sink: &dyn ProgressSink, label: &str, reason: String) -> DeploymentOutcome {
    sink.error(&format!("Failed to install {}: {}", label, reason));
    DeploymentOutcome::Failed { reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::{LogLevel, RecordingSink};
    use tempfile::TempDir;

    struct Fixture {
        _temp_dir: TempDir,
        resources: Utf8PathBuf,
        root: InstallRoot,
        profile: ProfileDirs,
    }

    fn fixture() -> Fixture {
        let temp_dir = TempDir::new().unwrap();
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let game = base.join("ffxiv");
        fs::create_dir_all(game.join("game")).unwrap();

        Fixture {
            resources: base.join("resources"),
            root: InstallRoot::validate(game).unwrap(),
            profile: ProfileDirs {
                documents: Some(base.join("Documents")),
                app_data: Some(base.join("AppData")),
            },
            _temp_dir: temp_dir,
        }
    }

    #[test]
    fn test_source_layout() {
        assert_eq!(
            source_subpath(AssetCategory::PluginConfigs),
            Utf8PathBuf::from("XIVLauncher Configs/Plugins/pluginConfigs")
        );
        assert_eq!(
            source_subpath(AssetCategory::VisualShaders),
            Utf8PathBuf::from("ReShade Configs/reshade-shaders")
        );
    }

    #[test]
    fn test_destinations() {
        let f = fixture();
        let dest = |category| {
            InstallationStep::new(category, &f.resources)
                .destination(Some(&f.root), &f.profile)
                .unwrap()
        };

        assert_eq!(dest(AssetCategory::Skills), f.root.path().join("Skills"));
        assert_eq!(
            dest(AssetCategory::VisualPresets),
            f.root.path().join("game/reshade-presets")
        );
        assert_eq!(
            dest(AssetCategory::AppSettings),
            f.profile
                .documents
                .clone()
                .unwrap()
                .join("My Games")
                .join(APP_SETTINGS_DIR)
        );
        assert_eq!(
            dest(AssetCategory::PluginConfigs),
            f.profile.app_data.clone().unwrap().join("XIVLauncher/pluginConfigs")
        );
    }

    #[test]
    fn test_root_destination_requires_root() {
        let f = fixture();
        let step = InstallationStep::new(AssetCategory::Skills, &f.resources);
        assert_eq!(
            step.destination(None, &f.profile),
            Err(StepError::InstallRootRequired(AssetCategory::Skills))
        );
    }

    #[test]
    fn test_missing_profile_dir_fails_step() {
        let f = fixture();
        let source = f.resources.join(source_subpath(AssetCategory::AppSettings));
        fs::create_dir_all(&source).unwrap();

        let sink = RecordingSink::new();
        let step = InstallationStep::new(AssetCategory::AppSettings, &f.resources);
        let outcome = step.run(None, &ProfileDirs::default(), &BackupStore::new(), &sink);

        assert!(outcome.is_failure());
        assert_eq!(sink.messages(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_optional_missing_source_warns() {
        let f = fixture();
        let sink = RecordingSink::new();
        let step = InstallationStep::new(AssetCategory::VisualPresets, &f.resources);

        let outcome = step.run(Some(&f.root), &f.profile, &BackupStore::new(), &sink);

        assert!(matches!(
            outcome,
            DeploymentOutcome::SkippedSourceMissing {
                requirement: SourceRequirement::Optional,
                ..
            }
        ));
        assert_eq!(sink.messages(LogLevel::Warning).len(), 1);
        assert!(sink.messages(LogLevel::Error).is_empty());
    }

    #[test]
    fn test_essential_missing_source_errors() {
        let f = fixture();
        let sink = RecordingSink::new();
        let step = InstallationStep::new(AssetCategory::Skills, &f.resources);

        let outcome = step.run(Some(&f.root), &f.profile, &BackupStore::new(), &sink);

        assert!(outcome.is_skip());
        assert_eq!(sink.messages(LogLevel::Error).len(), 1);
        assert!(!f.root.path().join("Skills").exists());
    }

    #[test]
    fn test_run_announces_backup() {
        let f = fixture();
        let source = f.resources.join(source_subpath(AssetCategory::Skills));
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("skill.pmp"), "mod").unwrap();
        fs::create_dir_all(f.root.path().join("Skills")).unwrap();

        let sink = RecordingSink::new();
        let step = InstallationStep::new(AssetCategory::Skills, &f.resources);
        let outcome = step.run(Some(&f.root), &f.profile, &BackupStore::new(), &sink);

        assert!(outcome.is_success());
        assert!(
            sink.messages(LogLevel::Info)
                .iter()
                .any(|m| m.starts_with("Backing up existing Skill Mods"))
        );
        assert_eq!(sink.messages(LogLevel::Success).len(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_run_announces_backup_of_dangling_link() {
        let f = fixture();
        let source = f.resources.join(source_subpath(AssetCategory::PluginConfigs));
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("Penumbra.json"), "{}").unwrap();

        let launcher = f.profile.xivlauncher().unwrap();
        fs::create_dir_all(&launcher).unwrap();
        let destination = launcher.join("pluginConfigs");
        std::os::unix::fs::symlink(launcher.join("gone"), &destination).unwrap();

        let sink = RecordingSink::new();
        let step = InstallationStep::new(AssetCategory::PluginConfigs, &f.resources);
        let outcome = step.run(None, &f.profile, &BackupStore::new(), &sink);

        assert!(matches!(
            outcome,
            DeploymentOutcome::Succeeded { ref stats, .. } if stats.backed_up
        ));
        assert_eq!(
            sink.messages(LogLevel::Info),
            vec![format!(
                "Backing up existing XIVLauncher plugin configs to: {}",
                backup_path_for(&destination)
            )]
        );
        assert!(destination.join("Penumbra.json").is_file());
    }

    #[test]
    fn test_io_failure_reason_is_reported_verbatim() {
        let f = fixture();
        let source = f.resources.join(source_subpath(AssetCategory::PluginConfigs));
        fs::create_dir_all(&source).unwrap();
        fs::write(source.join("Penumbra.json"), "{}").unwrap();

        // A regular file where the application data folder should be
        let app_data = f.profile.app_data.clone().unwrap();
        fs::write(&app_data, "not a folder").unwrap();

        let sink = RecordingSink::new();
        let step = InstallationStep::new(AssetCategory::PluginConfigs, &f.resources);
        let outcome = step.run(None, &f.profile, &BackupStore::new(), &sink);

        let DeploymentOutcome::Failed { reason } = outcome else {
            panic!("expected a failed outcome, got {:?}", outcome);
        };
        assert!(reason.starts_with("Failed to create directory"));
        assert!(reason.contains("XIVLauncher"));

        let errors = sink.messages(LogLevel::Error);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].ends_with(&reason));
        assert_eq!(fs::read_to_string(&app_data).unwrap(), "not a folder");
    }
}
