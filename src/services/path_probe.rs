//! FFXIV installation discovery.
//!
//! [`PathProbe`] walks an ordered list of [`DiscoveryStrategy`] values and
//! returns the first root that validates (exists and contains `game/`):
//!
//! 1. Steam uninstall registry record (`Steam App 39210`)
//! 2. SquareEnix installer registry record (MSI-style product GUID)
//! 3. A static list of conventional install locations
//!
//! Probing is read-only and can be repeated freely.
//!
//! # Examples
//!
//! ```ignore
//! use xiv_config_installer::services::PathProbe;
//!
//! match PathProbe::with_default_strategies().resolve() {
//!     Some(root) => println!("Found FFXIV at {root}"),
//!     None => println!("FFXIV not found, pass --game-path"),
//! }
//! ```

use crate::models::InstallRoot;
use camino::Utf8PathBuf;

/// Uninstall key written by Steam for the FFXIV Online package
pub const STEAM_UNINSTALL_KEY: &str =
    r"SOFTWARE\Microsoft\Windows\CurrentVersion\Uninstall\Steam App 39210";

/// Uninstall key written by the standalone SquareEnix installer
pub const SQEX_UNINSTALL_KEY: &str = r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall\{2B41E132-07DF-4925-A3D3-F2D1765CBER7}_is1";

/// Registry value holding the install directory
pub const INSTALL_LOCATION_VALUE: &str = "InstallLocation";

/// Conventional install locations, checked in order.
pub const DEFAULT_CANDIDATE_PATHS: [&str; 11] = [
    r"C:\Program Files (x86)\SquareEnix\FINAL FANTASY XIV - A Realm Reborn",
    r"C:\Program Files\SquareEnix\FINAL FANTASY XIV - A Realm Reborn",
    r"D:\Games\SquareEnix\FINAL FANTASY XIV - A Realm Reborn",
    r"D:\SquareEnix\FINAL FANTASY XIV - A Realm Reborn",
    r"E:\Games\SquareEnix\FINAL FANTASY XIV - A Realm Reborn",
    r"C:\Games\SquareEnix\FINAL FANTASY XIV - A Realm Reborn",
    r"C:\Program Files (x86)\Steam\steamapps\common\FINAL FANTASY XIV Online",
    r"C:\Program Files\Steam\steamapps\common\FINAL FANTASY XIV Online",
    r"D:\Steam\steamapps\common\FINAL FANTASY XIV Online",
    r"D:\SteamLibrary\steamapps\common\FINAL FANTASY XIV Online",
    r"E:\SteamLibrary\steamapps\common\FINAL FANTASY XIV Online",
];

/// One way of locating the install root.
#[cfg_attr(test, mockall::automock)]
pub trait DiscoveryStrategy: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// A validated root, or `None` if this strategy found nothing usable
    fn try_resolve(&self) -> Option<InstallRoot>;
}

/// Read access to `HKEY_LOCAL_MACHINE` install-location values.
#[cfg_attr(test, mockall::automock)]
pub trait RegistryReader: Send + Sync {
    fn install_location(&self, subkey: &str) -> Option<String>;
}

/// The host's registry. Always empty outside Windows.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRegistry;

#[cfg(windows)]
impl RegistryReader for SystemRegistry {
    fn install_location(&self, subkey: &str) -> Option<String> {
        use winreg::RegKey;
        use winreg::enums::HKEY_LOCAL_MACHINE;

        let hklm = RegKey::predef(HKEY_LOCAL_MACHINE);
        let key = match hklm.open_subkey(subkey) {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!("Registry key {} not readable: {}", subkey, e);
                return None;
            }
        };
        key.get_value::<String, _>(INSTALL_LOCATION_VALUE).ok()
    }
}

#[cfg(not(windows))]
impl RegistryReader for SystemRegistry {
    fn install_location(&self, _subkey: &str) -> Option<String> {
        None
    }
}

/// Looks up an uninstall record and validates its `InstallLocation`.
pub struct RegistryStrategy<R = SystemRegistry> {
    name: &'static str,
    subkey: &'static str,
    registry: R,
}

impl RegistryStrategy<SystemRegistry> {
    pub fn steam() -> Self {
        Self::new("steam-registry", STEAM_UNINSTALL_KEY, SystemRegistry)
    }

    pub fn square_enix() -> Self {
        Self::new("sqex-registry", SQEX_UNINSTALL_KEY, SystemRegistry)
    }
}

impl<R: RegistryReader> RegistryStrategy<R> {
    pub fn new(name: &'static str, subkey: &'static str, registry: R) -> Self {
        Self {
            name,
            subkey,
            registry,
        }
    }
}

impl<R: RegistryReader> DiscoveryStrategy for RegistryStrategy<R> {
    fn name(&self) -> &'static str {
        self.name
    }

    fn try_resolve(&self) -> Option<InstallRoot> {
        let location = self.registry.install_location(self.subkey)?;
        let location = location.trim().trim_end_matches(['\\', '/']);
        if location.is_empty() {
            return None;
        }

        let root = InstallRoot::validate(location);
        if root.is_none() {
            tracing::debug!("Ignoring stale registry location: {}", location);
        }
        root
    }
}

/// Checks a fixed list of candidate directories in order.
pub struct StaticPathsStrategy {
    candidates: Vec<Utf8PathBuf>,
}

impl StaticPathsStrategy {
    pub fn new<I, P>(candidates: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Utf8PathBuf>,
    {
        Self {
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    pub fn candidates(&self) -> &[Utf8PathBuf] {
        &self.candidates
    }
}

impl Default for StaticPathsStrategy {
    fn default() -> Self {
        Self::new(DEFAULT_CANDIDATE_PATHS)
    }
}

impl DiscoveryStrategy for StaticPathsStrategy {
    fn name(&self) -> &'static str {
        "common-paths"
    }

    fn try_resolve(&self) -> Option<InstallRoot> {
        self.candidates
            .iter()
            .find_map(|candidate| InstallRoot::validate(candidate.clone()))
    }
}

/// Ordered chain of discovery strategies; the first hit wins.
pub struct PathProbe {
    strategies: Vec<Box<dyn DiscoveryStrategy>>,
}

impl PathProbe {
    pub fn new(strategies: Vec<Box<dyn DiscoveryStrategy>>) -> Self {
        Self { strategies }
    }

    /// Steam registry, SquareEnix registry, then the conventional paths.
    pub fn with_default_strategies() -> Self {
        Self::new(vec![
            Box::new(RegistryStrategy::steam()),
            Box::new(RegistryStrategy::square_enix()),
            Box::new(StaticPathsStrategy::default()),
        ])
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }

    /// Find the install root, or `None` when every strategy misses.
    pub fn resolve(&self) -> Option<InstallRoot> {
        for strategy in &self.strategies {
            match strategy.try_resolve() {
                Some(root) => {
                    tracing::info!("Found FFXIV installation via {}: {}", strategy.name(), root);
                    return Some(root);
                }
                None => tracing::debug!("Discovery strategy {} found nothing", strategy.name()),
            }
        }

        tracing::warn!("Could not locate an FFXIV installation");
        None
    }
}

impl Default for PathProbe {
    fn default() -> Self {
        Self::with_default_strategies()
    }
}
