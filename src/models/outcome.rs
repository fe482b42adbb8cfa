use super::category::{AssetCategory, SourceRequirement};
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use std::time::Duration;

/// Result of deploying a single asset category
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentOutcome {
    Succeeded {
        destination: Utf8PathBuf,
        stats: CopyStats,
    },
    SkippedSourceMissing {
        source: Utf8PathBuf,
        requirement: SourceRequirement,
    },
    Failed {
        reason: String,
    },
}

impl DeploymentOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, DeploymentOutcome::Failed { .. })
    }

    pub fn is_skip(&self) -> bool {
        matches!(self, DeploymentOutcome::SkippedSourceMissing { .. })
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DeploymentOutcome::Succeeded { .. })
    }

    /// Short status word used in summaries
    pub fn status(&self) -> &'static str {
        match self {
            DeploymentOutcome::Succeeded { .. } => "Succeeded",
            DeploymentOutcome::SkippedSourceMissing { .. } => "SkippedSourceMissing",
            DeploymentOutcome::Failed { .. } => "Failed",
        }
    }
}

/// Counts gathered while copying a source tree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyStats {
    pub files: usize,
    pub bytes: u64,
    /// True when an existing destination was moved into the backup slot
    pub backed_up: bool,
}

/// Authoritative record of one installation run.
#[derive(Debug, Clone)]
pub struct Summary {
    /// Outcomes keyed by category, in the order the steps ran
    pub outcomes: IndexMap<AssetCategory, DeploymentOutcome>,
    pub install_root: Option<Utf8PathBuf>,
    pub duration: Duration,
}

impl Summary {
    /// A run succeeds when no category failed; skips are not failures.
    pub fn is_success(&self) -> bool {
        !self.outcomes.values().any(DeploymentOutcome::is_failure)
    }

    pub fn outcome(&self, category: AssetCategory) -> Option<&DeploymentOutcome> {
        self.outcomes.get(&category)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    pub fn skipped(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_skip()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_failure()).count()
    }

    pub fn files_copied(&self) -> usize {
        self.stats().map(|s| s.files).sum()
    }

    pub fn bytes_copied(&self) -> u64 {
        self.stats().map(|s| s.bytes).sum()
    }

    fn stats(&self) -> impl Iterator<Item = &CopyStats> {
        self.outcomes.values().filter_map(|o| match o {
            DeploymentOutcome::Succeeded { stats, .. } => Some(stats),
            _ => None,
        })
    }

    /// Follow-up hints for the user, based on what was deployed.
    pub fn next_steps(&self) -> Vec<&'static str> {
        let deployed = |category| {
            self.outcome(category)
                .is_some_and(DeploymentOutcome::is_success)
        };

        let mut steps = Vec::new();
        if deployed(AssetCategory::Skills) {
            steps.push("Open Penumbra and import the skill mods");
        }
        if AssetCategory::VISUAL.into_iter().any(deployed) {
            steps.push("Configure ReShade to use the installed presets");
        }
        steps
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(outcomes: Vec<(AssetCategory, DeploymentOutcome)>) -> Summary {
        Summary {
            outcomes: outcomes.into_iter().collect(),
            install_root: None,
            duration: Duration::ZERO,
        }
    }

    fn succeeded(files: usize, bytes: u64) -> DeploymentOutcome {
        DeploymentOutcome::Succeeded {
            destination: Utf8PathBuf::from("dest"),
            stats: CopyStats {
                files,
                bytes,
                backed_up: false,
            },
        }
    }

    #[test]
    fn test_skips_do_not_fail_the_run() {
        let summary = summary(vec![
            (
                AssetCategory::Skills,
                DeploymentOutcome::SkippedSourceMissing {
                    source: Utf8PathBuf::from("Mods Configs/Skills"),
                    requirement: SourceRequirement::Essential,
                },
            ),
            (AssetCategory::PluginConfigs, succeeded(2, 10)),
        ]);

        assert!(summary.is_success());
        assert_eq!(summary.skipped(), 1);
        assert_eq!(summary.succeeded(), 1);
    }

    #[test]
    fn test_failure_fails_the_run() {
        let summary = summary(vec![
            (AssetCategory::AppSettings, succeeded(1, 1)),
            (
                AssetCategory::PluginConfigs,
                DeploymentOutcome::Failed {
                    reason: "Permission denied".to_string(),
                },
            ),
        ]);

        assert!(!summary.is_success());
        assert_eq!(summary.failed(), 1);
    }

    #[test]
    fn test_copy_totals() {
        let summary = summary(vec![
            (AssetCategory::Skills, succeeded(3, 300)),
            (AssetCategory::AppSettings, succeeded(2, 20)),
        ]);

        assert_eq!(summary.files_copied(), 5);
        assert_eq!(summary.bytes_copied(), 320);
    }

    #[test]
    fn test_next_steps() {
        let summary = summary(vec![
            (AssetCategory::Skills, succeeded(1, 1)),
            (AssetCategory::VisualShaders, succeeded(1, 1)),
        ]);
        assert_eq!(summary.next_steps().len(), 2);

        let settings_only = Summary {
            outcomes: [(AssetCategory::AppSettings, succeeded(1, 1))]
                .into_iter()
                .collect(),
            install_root: None,
            duration: Duration::ZERO,
        };
        assert!(settings_only.next_steps().is_empty());
    }
}
