use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// One independently deployable bundle of configuration assets.
///
/// Variants are declared in canonical run order; the derived `Ord` is what
/// [`Selection`] relies on to iterate categories in that order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetCategory {
    Skills,
    VisualPresets,
    VisualShaders,
    AppSettings,
    PluginConfigs,
}

/// How a missing bundled source is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceRequirement {
    /// Missing source is reported at error level
    Essential,
    /// Missing source is reported as a warning
    Optional,
}

impl AssetCategory {
    /// All categories in canonical order.
    pub const ALL: [AssetCategory; 5] = [
        AssetCategory::Skills,
        AssetCategory::VisualPresets,
        AssetCategory::VisualShaders,
        AssetCategory::AppSettings,
        AssetCategory::PluginConfigs,
    ];

    /// The two ReShade categories, selected together by the `--reshade` option.
    pub const VISUAL: [AssetCategory; 2] =
        [AssetCategory::VisualPresets, AssetCategory::VisualShaders];

    /// Human readable label used in log lines
    pub fn label(self) -> &'static str {
        match self {
            AssetCategory::Skills => "Skill Mods",
            AssetCategory::VisualPresets => "ReShade presets",
            AssetCategory::VisualShaders => "ReShade shaders",
            AssetCategory::AppSettings => "FFXIV configuration",
            AssetCategory::PluginConfigs => "XIVLauncher plugin configs",
        }
    }

    pub fn requirement(self) -> SourceRequirement {
        match self {
            AssetCategory::VisualPresets | AssetCategory::VisualShaders => {
                SourceRequirement::Optional
            }
            AssetCategory::Skills | AssetCategory::AppSettings | AssetCategory::PluginConfigs => {
                SourceRequirement::Essential
            }
        }
    }

    /// Whether the destination of this category is computed from the install root.
    pub fn requires_install_root(self) -> bool {
        matches!(
            self,
            AssetCategory::Skills | AssetCategory::VisualPresets | AssetCategory::VisualShaders
        )
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetCategory::Skills => "Skills",
            AssetCategory::VisualPresets => "VisualPresets",
            AssetCategory::VisualShaders => "VisualShaders",
            AssetCategory::AppSettings => "AppSettings",
            AssetCategory::PluginConfigs => "PluginConfigs",
        };
        f.write_str(name)
    }
}

/// A non-empty set of categories to deploy, iterated in canonical order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection(BTreeSet<AssetCategory>);

impl Selection {
    /// Build a selection, returning `None` when no category is given.
    pub fn new<I>(categories: I) -> Option<Self>
    where
        I: IntoIterator<Item = AssetCategory>,
    {
        let set: BTreeSet<_> = categories.into_iter().collect();
        if set.is_empty() { None } else { Some(Self(set)) }
    }

    pub fn all() -> Self {
        Self(AssetCategory::ALL.into_iter().collect())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, category: AssetCategory) -> bool {
        self.0.contains(&category)
    }

    /// Categories in canonical run order
    pub fn iter(&self) -> impl Iterator<Item = AssetCategory> + '_ {
        self.0.iter().copied()
    }

    pub fn requires_install_root(&self) -> bool {
        self.iter().any(AssetCategory::requires_install_root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_rejected() {
        assert!(Selection::new(Vec::new()).is_none());
    }

    #[test]
    fn test_selection_iterates_in_canonical_order() {
        let selection = Selection::new([
            AssetCategory::PluginConfigs,
            AssetCategory::Skills,
            AssetCategory::VisualShaders,
            AssetCategory::Skills,
        ])
        .unwrap();

        let order: Vec<_> = selection.iter().collect();
        assert_eq!(
            order,
            vec![
                AssetCategory::Skills,
                AssetCategory::VisualShaders,
                AssetCategory::PluginConfigs,
            ]
        );
        assert_eq!(selection.len(), 3);
    }

    #[test]
    fn test_install_root_requirement() {
        let profile_only =
            Selection::new([AssetCategory::AppSettings, AssetCategory::PluginConfigs]).unwrap();
        assert!(!profile_only.requires_install_root());

        let with_skills = Selection::new([AssetCategory::Skills]).unwrap();
        assert!(with_skills.requires_install_root());
    }

    #[test]
    fn test_visual_categories_are_optional() {
        for category in AssetCategory::VISUAL {
            assert_eq!(category.requirement(), SourceRequirement::Optional);
        }
        assert_eq!(
            AssetCategory::Skills.requirement(),
            SourceRequirement::Essential
        );
    }
}
