//! Xeldar FFXIV Configs - command-line installer
//!
//! # Overview
//!
//! This binary is the presentation layer around the installer core. It:
//! - Loads `Installer Settings.yaml` (plus `XIVCONF_*` environment overrides)
//! - Initializes logging (rotating file, optional console)
//! - Starts a tokio runtime and runs the installation on its blocking pool
//! - Renders progress events as log lines and a progress bar
//!
//! # Execution Flow
//!
//! 1. Parse arguments and load settings from `Installer Data/`
//! 2. Initialize logging → logs/xiv-config-installer.<date>
//! 3. Build the selection (flags, else configured categories)
//! 4. Spawn the worker and drain its event channel until it closes
//! 5. Exit non-zero if the run aborted or any category failed
//!
//! # Bundled Assets
//!
//! Expected under the resource root (default: the executable's directory):
//! - `Mods Configs/Skills`
//! - `ReShade Configs/reshade-presets`, `ReShade Configs/reshade-shaders`
//! - `FFXIV Configs/FINAL FANTASY XIV - A Realm Reborn`
//! - `XIVLauncher Configs/Plugins/pluginConfigs`

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;
use std::sync::Arc;
use xiv_config_installer::services::{PathProbe, ProfileDirs};
use xiv_config_installer::{
    APP_NAME, AssetCategory, ConfigManager, InstallEvent, InstallOrchestrator, InstallerSettings,
    LogLevel, Selection, VERSION, spawn_installation,
};

#[derive(Parser, Debug)]
#[command(
    name = "xiv-config-installer",
    version,
    about = "Automate FFXIV configuration setup",
    args_conflicts_with_subcommands = true
)]
struct Cli {
    /// Directory holding `Installer Settings.yaml`
    #[arg(long, default_value = "Installer Data", global = true)]
    config_dir: Utf8PathBuf,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Also write log records to the console
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    install: InstallArgs,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Install the selected configuration bundles (default)
    Install(InstallArgs),
    /// Locate the FFXIV installation and print it
    Detect,
}

#[derive(Args, Debug)]
struct InstallArgs {
    /// FFXIV game directory; skips auto-detection
    #[arg(long)]
    game_path: Option<Utf8PathBuf>,

    /// Root of the bundled configuration folders
    #[arg(long)]
    resources: Option<Utf8PathBuf>,

    /// Install skill mods into the game directory (for Penumbra)
    #[arg(long)]
    skills: bool,

    /// Install ReShade presets and shaders
    #[arg(long)]
    reshade: bool,

    /// Install ReShade presets only
    #[arg(long)]
    presets: bool,

    /// Install ReShade shaders only
    #[arg(long)]
    shaders: bool,

    /// Install FFXIV settings into Documents\My Games
    #[arg(long)]
    settings: bool,

    /// Install XIVLauncher plugin configs into AppData
    #[arg(long)]
    plugins: bool,

    /// Remember the game path and category selection in the settings file
    #[arg(long)]
    save: bool,
}

impl InstallArgs {
    fn flagged_categories(&self) -> Vec<AssetCategory> {
        let flags = [
            (self.skills, AssetCategory::Skills),
            (self.reshade || self.presets, AssetCategory::VisualPresets),
            (self.reshade || self.shaders, AssetCategory::VisualShaders),
            (self.settings, AssetCategory::AppSettings),
            (self.plugins, AssetCategory::PluginConfigs),
        ];
        flags
            .into_iter()
            .filter_map(|(on, category)| on.then_some(category))
            .collect()
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let settings_found = config_manager.settings_path().exists();
    let settings = config_manager.load_settings()?;

    let _guard = xiv_config_installer::logging::setup_logging(
        &settings.log_dir,
        APP_NAME,
        cli.debug || settings.debug_mode,
        cli.verbose,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);
    if settings_found {
        tracing::info!("Loaded settings from {}", config_manager.settings_path());
    } else {
        tracing::warn!(
            "Settings file not found at {}, using defaults",
            config_manager.settings_path()
        );
    }

    match cli.command {
        Some(Command::Detect) => detect(),
        Some(Command::Install(args)) => install(args, settings, &config_manager),
        None => install(cli.install, settings, &config_manager),
    }
}

fn detect() -> Result<ExitCode> {
    println!("⏳ Searching for FFXIV installation...");
    match PathProbe::with_default_strategies().resolve() {
        Some(root) => {
            println!("✅ Found FFXIV at: {}", root);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("⚠️ Could not auto-detect FFXIV. Please pass --game-path.");
            Ok(ExitCode::FAILURE)
        }
    }
}

fn install(
    args: InstallArgs,
    mut settings: InstallerSettings,
    config_manager: &ConfigManager,
) -> Result<ExitCode> {
    let flagged = args.flagged_categories();
    let selection = if flagged.is_empty() {
        settings.default_selection()
    } else {
        Selection::new(flagged.iter().copied())
    };
    let Some(selection) = selection else {
        bail!("Please select at least one installation option.");
    };

    let explicit_root = args.game_path.clone().or_else(|| settings.game_path.clone());
    let resource_root = match args.resources.clone().or_else(|| settings.resource_root.clone()) {
        Some(root) => root,
        None => default_resource_root()?,
    };

    if args.save {
        settings.game_path = explicit_root.clone();
        settings.categories = selection.iter().collect();
        config_manager.save_settings(&settings)?;
    }

    tracing::info!(
        "Resource root: {}, categories: {:?}",
        resource_root,
        selection.iter().collect::<Vec<_>>()
    );

    let orchestrator = Arc::new(InstallOrchestrator::new(
        resource_root,
        ProfileDirs::detect(settings.documents_dir.clone(), settings.app_data_dir.clone()),
        PathProbe::with_default_strategies(),
    ));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(1)
        .thread_name("xiv-installer-worker")
        .build()?;

    let result = runtime.block_on(async {
        let mut handle = spawn_installation(
            runtime.handle(),
            orchestrator,
            selection,
            explicit_root,
        );
        render_events(&mut handle.events).await;
        handle.join().await
    });

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));

    match result {
        Ok(summary) if summary.is_success() => Ok(ExitCode::SUCCESS),
        Ok(summary) => {
            tracing::warn!("{} categories failed", summary.failed());
            Ok(ExitCode::FAILURE)
        }
        Err(e) => {
            tracing::error!("Installation aborted: {}", e);
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Render events until the worker closes the channel.
async fn render_events(events: &mut tokio::sync::mpsc::UnboundedReceiver<InstallEvent>) {
    let bar = ProgressBar::new(100);
    bar.set_style(
        ProgressStyle::with_template("[{bar:40}] {percent:>3}%")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );

    while let Some(event) = events.recv().await {
        match event {
            InstallEvent::Log { level, message } => {
                bar.println(format!("{}{}", prefix(level), message));
            }
            InstallEvent::Progress(fraction) => {
                bar.set_position((fraction * 100.0).round() as u64);
            }
            InstallEvent::PhaseChanged(phase) => {
                tracing::debug!("Run phase: {:?}", phase);
            }
            InstallEvent::Finished(summary) => {
                for (category, outcome) in &summary.outcomes {
                    bar.println(format!("   {}: {}", category, outcome.status()));
                }
            }
        }
    }

    bar.finish();
}

fn prefix(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Info => "ℹ️  ",
        LogLevel::Success => "✅ ",
        LogLevel::Error => "❌ ",
        LogLevel::Warning => "⚠️  ",
        LogLevel::Progress => "⏳ ",
    }
}

/// Directory containing the running executable
fn default_resource_root() -> Result<Utf8PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the running executable")?;
    let dir = exe
        .parent()
        .context("Executable has no parent directory")?
        .to_path_buf();
    Utf8PathBuf::from_path_buf(dir)
        .map_err(|p| anyhow::anyhow!("Executable path is not valid UTF-8: {}", p.display()))
}
