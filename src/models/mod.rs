//! Data models for the mod installer.
//!
//! - [`ModPack`]: metadata about a scanned mod pack (root, counts, author, version)
//! - [`FileMapping`] / [`MappingTable`]: which mod pack folders replace which game folders
//! - [`InstallProgress`]: snapshot streamed to callers while an install runs
//! - [`AppState`]: session state held by [`StateManager`](crate::state::StateManager)
//! - [`InstallerConfig`] / [`LibraryIndex`]: YAML-backed settings and imported packs

pub mod app_state;
pub mod config;
pub mod mapping;
pub mod mod_pack;
pub mod progress;

pub use app_state::{AppState, Operation};
pub use config::{
    DEFAULT_BACKUP_FOLDER_NAME, DEFAULT_GAME_VERSION, InstallerConfig, InstallerSettings,
    LibraryIndex,
};
pub use mapping::{FileMapping, MappingTable};
pub use mod_pack::{ModPack, UNKNOWN_AUTHOR, format_size};
pub use progress::{InstallPhase, InstallProgress};
