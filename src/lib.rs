// ModInstaller - mod pack scan, install, backup and restore engine
//
// This is the library crate containing the installation engine and data structures.
// The binary crate (main.rs) provides the command line front end.

pub mod config;
pub mod logging;
pub mod models;
pub mod services;
pub mod state;

// Re-export commonly used types for convenience
pub use config::ConfigManager;
pub use models::{AppState, InstallProgress, InstallerConfig, LibraryIndex, MappingTable, ModPack};
pub use services::{InstallError, InstallOrchestrator, ModPackScanner};
pub use state::{StateChange, StateManager};

/// Application version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
