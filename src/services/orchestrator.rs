use crate::models::{InstallRoot, Selection, Summary};
use crate::progress::{InstallEvent, ProgressSink, RunPhase};
use crate::services::backup::BackupStore;
use crate::services::path_probe::PathProbe;
use crate::services::steps::{InstallationStep, ProfileDirs};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use std::time::Instant;
use thiserror::Error;

const SEPARATOR: &str = "--------------------------------------------------";

/// Errors that abort a run before any filesystem change
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InstallError {
    #[error("FFXIV installation not found. Please select the game directory manually.")]
    RootNotFound,

    #[error("The selected path does not exist: {0}")]
    ExplicitRootMissing(Utf8PathBuf),

    #[error("Installation worker failed: {0}")]
    Worker(String),
}

/// Runs the selected installation steps in canonical order.
///
/// Steps run sequentially on the caller's thread. A failed or skipped step
/// never stops the ones after it; only install-root resolution can abort a
/// run, and it does so before anything is written.
pub struct InstallOrchestrator {
    resource_root: Utf8PathBuf,
    profile: ProfileDirs,
    probe: PathProbe,
    store: BackupStore,
}

impl InstallOrchestrator {
    pub fn new(resource_root: impl Into<Utf8PathBuf>, profile: ProfileDirs, probe: PathProbe) -> Self {
        Self {
            resource_root: resource_root.into(),
            profile,
            probe,
            store: BackupStore::new(),
        }
    }


    /// Deploy every selected category and return the per-category summary.
    ///
    /// `explicit_root` bypasses discovery entirely. Discovery only happens
    /// when a selected category needs the install root.
    pub fn run_installation(
        &self,
        selection: &Selection,
        explicit_root: Option<&Utf8Path>,
        sink: &dyn ProgressSink,
    ) -> Result<Summary, InstallError> {
        let started = Instant::now();
        sink.emit(InstallEvent::PhaseChanged(RunPhase::Idle));
        sink.emit(InstallEvent::Progress(0.0));

        let root = match self.resolve_root(selection, explicit_root, sink) {
            Ok(root) => root,
            Err(e) => {
                sink.error(&e.to_string());
                sink.emit(InstallEvent::PhaseChanged(RunPhase::Aborted));
                return Err(e);
            }
        };

        sink.emit(InstallEvent::PhaseChanged(RunPhase::RunningSteps));
        sink.info("Starting installation process...");
        if let Some(root) = &root {
            sink.info(&format!("Game directory: {}", root));
        }
        sink.info(SEPARATOR);

        let total = selection.len();
        let mut outcomes = IndexMap::with_capacity(total);

        for (index, category) in selection.iter().enumerate() {
            let step = InstallationStep::new(category, &self.resource_root);
            let outcome = step.run(root.as_ref(), &self.profile, &self.store, sink);
            tracing::info!("{} finished: {}", category, outcome.status());
            outcomes.insert(category, outcome);

            sink.emit(InstallEvent::Progress((index + 1) as f32 / total as f32));
        }

        let summary = Summary {
            outcomes,
            install_root: root.map(|r| r.path().to_path_buf()),
            duration: started.elapsed(),
        };

        self.report(&summary, sink);
        sink.emit(InstallEvent::PhaseChanged(RunPhase::Completed));
        sink.emit(InstallEvent::Finished(summary.clone()));

        Ok(summary)
    }

    fn resolve_root(
        &self,
        selection: &Selection,
        explicit_root: Option<&Utf8Path>,
        sink: &dyn ProgressSink,
    ) -> Result<Option<InstallRoot>, InstallError> {
        if let Some(path) = explicit_root {
            if !path.exists() {
                return Err(InstallError::ExplicitRootMissing(path.to_path_buf()));
            }
            let root = InstallRoot::explicit(path);
            if !root.has_marker() {
                sink.warning(&format!(
                    "'game' subfolder not found at {} - may not be a valid FFXIV path",
                    root
                ));
            }
            return Ok(Some(root));
        }

        if !selection.requires_install_root() {
            return Ok(None);
        }

        sink.emit(InstallEvent::PhaseChanged(RunPhase::ResolvingRoot));
        sink.progress("Searching for FFXIV installation...");

        match self.probe.resolve() {
            Some(root) => {
                sink.success(&format!("Found FFXIV at: {}", root));
                Ok(Some(root))
            }
            None => Err(InstallError::RootNotFound),
        }
    }

    fn report(&self, summary: &Summary, sink: &dyn ProgressSink) {
        sink.info(SEPARATOR);

        let totals = format!(
            "{} succeeded, {} skipped, {} failed ({} files, {} bytes in {:.1?})",
            summary.succeeded(),
            summary.skipped(),
            summary.failed(),
            summary.files_copied(),
            summary.bytes_copied(),
            summary.duration
        );

        if summary.is_success() {
            sink.success(&format!("Installation completed: {}", totals));
        } else {
            sink.error(&format!("Installation completed with errors: {}", totals));
        }

        let next_steps = summary.next_steps();
        if !next_steps.is_empty() {
            sink.info("Next steps:");
            for step in next_steps {
                sink.info(&format!("  • {}", step));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AssetCategory;
    use crate::progress::{LogLevel, RecordingSink};
    use crate::services::path_probe::MockDiscoveryStrategy;
    use crate::services::steps::source_subpath;
    use std::fs;
    use tempfile::TempDir;

    fn untouchable_probe() -> PathProbe {
        let mut strategy = MockDiscoveryStrategy::new();
        strategy.expect_name().return_const("untouchable");
        strategy.expect_try_resolve().times(0);
        PathProbe::new(vec![Box::new(strategy)])
    }

    fn empty_probe() -> PathProbe {
        let mut strategy = MockDiscoveryStrategy::new();
        strategy.expect_name().return_const("empty");
        strategy
            .expect_try_resolve()
            .times(1)
            .return_const(None::<InstallRoot>);
        PathProbe::new(vec![Box::new(strategy)])
    }

    fn setup() -> (TempDir, Utf8PathBuf, ProfileDirs) {
        let temp_dir = TempDir::new().unwrap();
        let base = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
        let profile = ProfileDirs {
            documents: Some(base.join("Documents")),
            app_data: Some(base.join("AppData")),
        };
        (temp_dir, base, profile)
    }

    #[test]
    fn test_explicit_root_skips_discovery() {
        let (_t, base, profile) = setup();
        let resources = base.join("resources");
        let skills = resources.join(source_subpath(AssetCategory::Skills));
        fs::create_dir_all(&skills).unwrap();
        fs::write(skills.join("skill.pmp"), "mod").unwrap();
        let game = base.join("ffxiv");
        fs::create_dir_all(game.join("game")).unwrap();

        let orchestrator = InstallOrchestrator::new(&resources, profile, untouchable_probe());
        let sink = RecordingSink::new();
        let selection = Selection::new([AssetCategory::Skills]).unwrap();

        let summary = orchestrator
            .run_installation(&selection, Some(game.as_path()), &sink)
            .unwrap();

        assert!(summary.is_success());
        assert!(game.join("Skills/skill.pmp").exists());
        assert!(!sink.phases().contains(&RunPhase::ResolvingRoot));
    }

    #[test]
    fn test_root_not_found_aborts_before_mutation() {
        let (_t, base, profile) = setup();
        let resources = base.join("resources");
        let settings = resources.join(source_subpath(AssetCategory::AppSettings));
        fs::create_dir_all(&settings).unwrap();

        let orchestrator = InstallOrchestrator::new(&resources, profile.clone(), empty_probe());
        let sink = RecordingSink::new();
        let selection =
            Selection::new([AssetCategory::Skills, AssetCategory::AppSettings]).unwrap();

        let err = orchestrator
            .run_installation(&selection, None, &sink)
            .unwrap_err();

        assert_eq!(err, InstallError::RootNotFound);
        assert_eq!(sink.phases().last(), Some(&RunPhase::Aborted));
        assert_eq!(sink.messages(LogLevel::Error).len(), 1);
        assert!(!profile.documents.unwrap().exists());
    }

    #[test]
    fn test_missing_explicit_root_aborts() {
        let (_t, base, profile) = setup();
        let orchestrator = InstallOrchestrator::new(base.join("resources"), profile, untouchable_probe());
        let sink = RecordingSink::new();

        let missing = base.join("nowhere");
        let err = orchestrator
            .run_installation(&Selection::all(), Some(missing.as_path()), &sink)
            .unwrap_err();

        assert_eq!(err, InstallError::ExplicitRootMissing(missing));
    }

    #[test]
    fn test_explicit_root_without_marker_warns() {
        let (_t, base, profile) = setup();
        let game = base.join("ffxiv");
        fs::create_dir_all(&game).unwrap();

        let orchestrator = InstallOrchestrator::new(base.join("resources"), profile, untouchable_probe());
        let sink = RecordingSink::new();
        let selection = Selection::new([AssetCategory::VisualPresets]).unwrap();

        let summary = orchestrator
            .run_installation(&selection, Some(game.as_path()), &sink)
            .unwrap();

        assert!(summary.outcome(AssetCategory::VisualPresets).unwrap().is_skip());
        // Marker warning plus missing optional source
        assert_eq!(sink.messages(LogLevel::Warning).len(), 2);
    }

    #[test]
    fn test_profile_only_selection_never_probes() {
        let (_t, base, profile) = setup();
        let orchestrator = InstallOrchestrator::new(base.join("resources"), profile, untouchable_probe());
        let sink = RecordingSink::new();
        let selection = Selection::new([AssetCategory::PluginConfigs]).unwrap();

        let summary = orchestrator.run_installation(&selection, None, &sink).unwrap();

        assert!(summary.install_root.is_none());
        assert_eq!(sink.fractions(), vec![0.0, 1.0]);
    }
}
