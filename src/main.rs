//! ModInstaller - mod pack scan, install, backup and restore
//!
//! Command line front end for the installation engine.
//!
//! # Overview
//!
//! Initializes:
//! - Configuration loading ([`ConfigManager`]) from `ModInstaller Data/`
//! - Logging infrastructure (file rotation + stderr output)
//! - Tokio runtime; the filesystem work itself runs on its blocking pool
//! - State management ([`StateManager`]) fed by the running operation
//!
//! # Commands
//!
//! - `status`: game location, backup presence, library size
//! - `scan <dir>`: detect and measure a mod pack without copying it
//! - `import <dir>`: copy a mod pack into the library
//! - `list`: show the library
//! - `install <dir|id> [--backup] [--dry-run]`: install a pack folder or a library entry
//! - `backup`, `restore`, `delete-backup`: manage the snapshot of the game's folders
//!
//! # Configuration Files
//!
//! Expected in `ModInstaller Data/` (or `--config-dir`):
//! - `ModInstaller Settings.yaml`: game root, version, backup folder, mapping table
//! - `ModInstaller Library.yaml`: imported mod packs

use anyhow::{Context, Result, bail};
use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use modinstaller::config::DEFAULT_CONFIG_DIR;
use modinstaller::models::{InstallerSettings, ModPack, Operation, format_size};
use modinstaller::services::backup::BackupOutcome;
use modinstaller::services::scanner::ScanOptions;
use modinstaller::services::tasks::{self, ProgressStream};
use modinstaller::services::{
    CopyOptions, FixedGameLocator, GameLocator, InstallOrchestrator, ModLibrary,
    ResourcesGameLocator,
};
use modinstaller::{APP_NAME, ConfigManager, InstallerConfig, ModPackScanner, StateManager, VERSION};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Parser)]
#[command(name = "modinstaller", version, about = "Install game mod packs with backup and restore")]
struct Cli {
    /// Directory holding the settings and library files
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_DIR)]
    config_dir: Utf8PathBuf,

    /// Game data root containing Resources/<version> (overrides the settings)
    #[arg(long, global = true)]
    game_root: Option<Utf8PathBuf>,

    /// Game version directory to use as-is (overrides --game-root)
    #[arg(long, global = true)]
    game_dir: Option<Utf8PathBuf>,

    /// Log at debug level
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show game location, backup and library status
    Status,
    /// Detect and measure a mod pack folder
    Scan { path: Utf8PathBuf },
    /// Copy a mod pack folder into the library
    Import { path: Utf8PathBuf },
    /// List the library
    List,
    /// Install a mod pack folder or library entry (by id)
    Install {
        target: String,
        /// Create the backup first if there is none
        #[arg(long)]
        backup: bool,
        /// Report what would be copied without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// Snapshot the game folders the mappings touch
    Backup,
    /// Put the snapshot back over the game folders
    Restore,
    /// Remove the snapshot
    DeleteBackup,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_manager = ConfigManager::new(&cli.config_dir)?;
    let config = config_manager.load_settings()?;
    let debug_mode = cli.debug || config.settings.debug_mode;

    let _guard = modinstaller::logging::setup_logging_with_console(
        "logs",
        "modinstaller",
        debug_mode,
        debug_mode,
    )?;

    tracing::info!("Starting {} v{}", APP_NAME, VERSION);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .worker_threads(2)
        .thread_name("modinstaller-worker")
        .build()?;

    let app = App::new(&cli, config_manager, config);
    let result = runtime.block_on(app.run(cli.command));

    runtime.shutdown_timeout(std::time::Duration::from_secs(5));
    tracing::info!("Shutdown complete");

    result.inspect_err(|e| tracing::error!("Command failed: {:#}", e))
}

struct App {
    config: ConfigManager,
    settings: InstallerSettings,
    state: StateManager,
    scanner: ModPackScanner,
    orchestrator: InstallOrchestrator,
    library: ModLibrary,
}

impl App {
    fn new(cli: &Cli, config: ConfigManager, installer_config: InstallerConfig) -> Self {
        let settings = installer_config.settings;

        let locator: Arc<dyn GameLocator> = match (&cli.game_dir, &cli.game_root) {
            (Some(dir), _) => Arc::new(FixedGameLocator::new(dir.clone())),
            (None, Some(root)) => Arc::new(ResourcesGameLocator::new(
                root.clone(),
                Some(settings.game_version.as_str()),
            )),
            (None, None) => match &settings.game_root {
                Some(root) => Arc::new(ResourcesGameLocator::new(
                    root.clone(),
                    Some(settings.game_version.as_str()),
                )),
                None => {
                    tracing::warn!("No game root configured");
                    Arc::new(FixedGameLocator::none())
                }
            },
        };

        let scanner = ModPackScanner::with_options(
            settings.mappings.clone(),
            ScanOptions {
                max_depth: settings.max_scan_depth,
                default_version: settings.game_version.clone(),
            },
        );
        let library = ModLibrary::new(config.library_dir(&settings));
        let orchestrator = InstallOrchestrator::from_settings(locator, &settings);

        Self {
            config,
            settings,
            state: StateManager::new(),
            scanner,
            orchestrator,
            library,
        }
    }

    async fn run(&self, command: Command) -> Result<()> {
        self.refresh_game_state();

        match command {
            Command::Status => self.status(),
            Command::Scan { path } => self.scan(path).await,
            Command::Import { path } => self.import(path).await,
            Command::List => self.list(),
            Command::Install {
                target,
                backup,
                dry_run,
            } => self.install(&target, backup, dry_run).await,
            Command::Backup => self.backup().await,
            Command::Restore => self.restore().await,
            Command::DeleteBackup => self.delete_backup(),
        }
    }

    fn refresh_game_state(&self) {
        let version_dir = self.orchestrator.game_version_dir().ok();
        self.state
            .set_game_location(version_dir, self.orchestrator.has_backup());
    }

    fn status(&self) -> Result<()> {
        let state = self.state.snapshot();
        match &state.game_version_dir {
            Some(dir) => println!("Game:    {}", dir),
            None => println!("Game:    not found"),
        }
        println!(
            "Backup:  {}",
            if state.has_backup { "present" } else { "none" }
        );

        let library = self.config.load_library()?;
        println!("Library: {} mod packs in {}", library.len(), self.library.dir());
        Ok(())
    }

    async fn scan(&self, path: Utf8PathBuf) -> Result<()> {
        let pack = tasks::scan_in_background(self.scanner.clone(), path.clone())
            .await
            .with_context(|| format!("Failed to scan {}", path))?;
        print_pack(&pack);
        Ok(())
    }

    async fn import(&self, path: Utf8PathBuf) -> Result<()> {
        let library = self.library.clone();
        let scanner = self.scanner.clone();
        let source = path.clone();
        let pack = ProgressStream::<(), ModPack>::spawn(move |_| library.import(&source, &scanner))
            .finish()
            .await
            .with_context(|| format!("Failed to import {}", path))?;

        let mut index = self.config.load_library()?;
        index.upsert(pack.clone());
        self.config.save_library(&index)?;
        self.state.add_mod_pack(pack.clone());

        println!("Imported:");
        print_pack(&pack);
        Ok(())
    }

    fn list(&self) -> Result<()> {
        let mut index = self.config.load_library()?;
        if index.is_empty() {
            // Index lost or never written: rebuild it from the library folder
            for pack in self.library.scan_all(&self.scanner) {
                index.insert(pack);
            }
            if index.is_empty() {
                println!("Library is empty");
                return Ok(());
            }
            self.config.save_library(&index)?;
        }
        self.state.load_library(&index);

        for pack in index.packs.values() {
            println!(
                "{}  {}  v{}  by {}  {} files  {}{}",
                pack.id,
                pack.name,
                pack.version,
                pack.author,
                pack.file_count,
                pack.size_formatted(),
                if pack.installed { "  [installed]" } else { "" }
            );
        }
        Ok(())
    }

    /// A library id selects the stored pack; anything else is scanned as a folder.
    async fn resolve_pack(&self, target: &str) -> Result<(ModPack, bool)> {
        if let Ok(id) = Uuid::parse_str(target) {
            let index = self.config.load_library()?;
            self.state.load_library(&index);
            self.state.select_pack(Some(id));
            let Some(pack) = self.state.read(|s| s.selected().cloned()) else {
                bail!("No mod pack with id {} in the library", id);
            };
            return Ok((pack, true));
        }

        let path = Utf8PathBuf::from(target);
        let pack = tasks::scan_in_background(self.scanner.clone(), path)
            .await
            .with_context(|| format!("Failed to scan {}", target))?;
        Ok((pack, false))
    }

    async fn install(&self, target: &str, backup: bool, dry_run: bool) -> Result<()> {
        let (pack, from_library) = self.resolve_pack(target).await?;

        if backup && !dry_run {
            self.backup().await?;
        }

        let orchestrator = self.orchestrator.clone().with_copy_options(CopyOptions {
            max_depth: self.settings.max_copy_depth,
            dry_run,
        });

        self.state.start_operation(Operation::Install);
        println!(
            "{} '{}' ({} files, {})",
            if dry_run { "Dry run of" } else { "Installing" },
            pack.name,
            pack.file_count,
            format_size(pack.size_bytes)
        );

        let mut stream = tasks::spawn_install(orchestrator, pack.clone());
        while let Some(progress) = stream.next().await {
            self.state.update_progress(&progress);
            if !progress.is_complete && progress.error.is_none() {
                println!(
                    "[{}/{}] {}",
                    progress.files_processed, progress.total_files, progress.current_file
                );
            }
        }

        let result = stream.finish().await;
        self.state
            .finish_operation(result.as_ref().err().map(|e| e.to_string()));
        let progress = result.with_context(|| format!("Failed to install '{}'", pack.name))?;

        if from_library && !dry_run {
            let mut index = self.config.load_library()?;
            index.mark_installed(&pack.id);
            self.config.save_library(&index)?;
            self.state.mark_installed(pack.id);
        }

        println!(
            "{} {} files",
            if dry_run { "Would copy" } else { "Copied" },
            progress.files_processed
        );
        Ok(())
    }

    async fn backup(&self) -> Result<()> {
        self.state.start_operation(Operation::Backup);
        let mut stream = tasks::spawn_backup(self.orchestrator.clone());
        while let Some(message) = stream.next().await {
            println!("{}", message);
            self.state.set_status(message);
        }

        let result = stream.finish().await;
        self.state
            .finish_operation(result.as_ref().err().map(|e| e.to_string()));

        match result.context("Backup failed")? {
            BackupOutcome::Created { folders } => {
                println!("Backed up {} folders", folders.len());
                self.state.set_has_backup(true);
            }
            BackupOutcome::AlreadyExists => println!("Backup already exists, keeping it"),
        }
        Ok(())
    }

    async fn restore(&self) -> Result<()> {
        self.state.start_operation(Operation::Restore);
        let mut stream = tasks::spawn_restore(self.orchestrator.clone());
        while let Some(message) = stream.next().await {
            println!("{}", message);
            self.state.set_status(message);
        }

        let result = stream.finish().await;
        self.state
            .finish_operation(result.as_ref().err().map(|e| e.to_string()));

        let restored = result.context("Restore failed")?;
        println!("Restored {} folders", restored.len());
        Ok(())
    }

    fn delete_backup(&self) -> Result<()> {
        if self.orchestrator.delete_backup()? {
            self.state.set_has_backup(false);
            println!("Backup deleted");
        } else {
            println!("No backup to delete");
        }
        Ok(())
    }
}

fn print_pack(pack: &ModPack) {
    println!("  Name:    {}", pack.name);
    println!("  Version: {}", pack.version);
    println!("  Author:  {}", pack.author);
    println!("  Files:   {}", pack.file_count);
    println!("  Size:    {}", pack.size_formatted());
    println!("  Root:    {}", pack.root_path);
    println!("  Id:      {}", pack.id);
}
