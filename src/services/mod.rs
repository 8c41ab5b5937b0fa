//! Services module - the mod installation engine.
//!
//! Everything here works on plain directories and is independent of how the result is
//! presented. Operations are synchronous, sequential filesystem traversals that report
//! through caller-supplied closures; [`tasks`] wraps them for async callers.
//!
//! # Components
//!
//! - [`ModPackScanner`]: finds the real root of a mod pack folder and measures it. Handles:
//!   - Packs with asset folders at the top level
//!   - Packs nested under a version folder (`Pack/1.60.1/...`)
//!   - Packs nested deeper (`Pack/Resources/1.60.1/...`)
//!   - Version and author detection from folder names
//!
//! - [`CopyEngine`]: copies each mapped folder of a pack over the game's version directory,
//!   overwriting existing files and reporting an [`InstallProgress`](crate::models::InstallProgress)
//!   snapshot after every file.
//!
//! - [`BackupManager`]: one-generation snapshot of the mapped game folders, stored next to
//!   the version directory. Create is a no-op when a snapshot exists.
//!
//! - [`InstallOrchestrator`]: resolves the game directory through a [`GameLocator`] and
//!   drives install, backup and restore.
//!
//! - [`ModLibrary`]: imports pack folders into a local library.
//!
//! # Failure model
//!
//! Every failure is an [`InstallError`] and ends the operation. Nothing is rolled back: a
//! failed install leaves the files copied so far in place. Users who need a clean game
//! directory restore the backup.
//!
//! Installs that must be all-or-nothing can copy into a staging directory and swap it in
//! once the copy succeeds. The engine does not do this itself.
//!
//! # Usage Example
//!
//! ```ignore
//! use modinstaller::models::MappingTable;
//! use modinstaller::services::{InstallOrchestrator, ModPackScanner, ResourcesGameLocator};
//! use std::sync::Arc;
//!
//! let scanner = ModPackScanner::new(MappingTable::default());
//! let pack = scanner.scan("Downloads/Skin Pack by Someone".into())?;
//!
//! let locator = Arc::new(ResourcesGameLocator::new(game_root, Some("1.60.1")));
//! let orchestrator = InstallOrchestrator::new(locator, MappingTable::default());
//!
//! orchestrator.create_backup(|message| println!("{message}"))?;
//! orchestrator.install_mod(&pack, |progress| {
//!     println!("{}/{} {}", progress.files_processed, progress.total_files, progress.current_file);
//! })?;
//! ```

pub mod backup;
pub mod copy;
pub mod error;
pub mod game_detection;
pub mod install;
pub mod library;
pub mod patterns;
pub mod scanner;
pub mod tasks;

pub use backup::{BackupManager, BackupOutcome};
pub use copy::{CopyEngine, CopyOptions, copy_tree};
pub use error::InstallError;
pub use game_detection::{FixedGameLocator, GameLocator, ResourcesGameLocator};
pub use install::InstallOrchestrator;
pub use library::ModLibrary;
pub use scanner::{DetectedRoot, ModPackScanner, RootStrategy, ScanOptions};
pub use tasks::ProgressStream;
