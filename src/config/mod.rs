use crate::models::{InstallerConfig, InstallerSettings, LibraryIndex};
use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// Default configuration directory, relative to the working directory.
pub const DEFAULT_CONFIG_DIR: &str = "ModInstaller Data";

const SETTINGS_FILE: &str = "ModInstaller Settings.yaml";
const LIBRARY_FILE: &str = "ModInstaller Library.yaml";

/// Configuration manager for loading and saving YAML configuration files.
///
/// Manages two files:
/// - Settings (`ModInstaller Settings.yaml`): game location, backup folder, mapping table
/// - Library (`ModInstaller Library.yaml`): the imported mod packs
#[derive(Debug, Clone)]
pub struct ConfigManager {
    config_dir: Utf8PathBuf,
    settings_path: Utf8PathBuf,
    library_path: Utf8PathBuf,
}

impl ConfigManager {
    /// Create a new ConfigManager, creating `config_dir` when missing.
    pub fn new<P: AsRef<Utf8Path>>(config_dir: P) -> Result<Self> {
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .with_context(|| format!("Failed to create config directory: {}", config_dir))?;
        }

        Ok(Self {
            settings_path: config_dir.join(SETTINGS_FILE),
            library_path: config_dir.join(LIBRARY_FILE),
            config_dir,
        })
    }

    /// Load the settings file, or defaults if it doesn't exist.
    pub fn load_settings(&self) -> Result<InstallerConfig> {
        if !self.settings_path.exists() {
            tracing::warn!(
                "Settings file not found at {}, using defaults",
                self.settings_path
            );
            return Ok(InstallerConfig::default());
        }

        let file_contents = fs::read_to_string(&self.settings_path)
            .with_context(|| format!("Failed to read settings: {}", self.settings_path))?;

        let config: InstallerConfig = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse settings: {}", self.settings_path))?;

        if config.settings.mappings.is_empty() {
            tracing::warn!("Settings define no mappings, nothing will be installed");
        }

        tracing::info!("Loaded settings from {}", self.settings_path);
        Ok(config)
    }

    pub fn save_settings(&self, config: &InstallerConfig) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(config).context("Failed to serialize settings to YAML")?;

        fs::write(&self.settings_path, yaml_string)
            .with_context(|| format!("Failed to write settings: {}", self.settings_path))?;

        tracing::info!("Saved settings to {}", self.settings_path);
        Ok(())
    }

    /// Load the library index, or an empty one if it doesn't exist.
    pub fn load_library(&self) -> Result<LibraryIndex> {
        if !self.library_path.exists() {
            tracing::debug!("No library index at {}", self.library_path);
            return Ok(LibraryIndex::default());
        }

        let file_contents = fs::read_to_string(&self.library_path)
            .with_context(|| format!("Failed to read library: {}", self.library_path))?;

        let library: LibraryIndex = serde_yaml_ng::from_str(&file_contents)
            .with_context(|| format!("Failed to parse library: {}", self.library_path))?;

        tracing::info!(
            "Loaded {} mod packs from {}",
            library.len(),
            self.library_path
        );
        Ok(library)
    }

    pub fn save_library(&self, library: &LibraryIndex) -> Result<()> {
        let yaml_string =
            serde_yaml_ng::to_string(library).context("Failed to serialize library to YAML")?;

        fs::write(&self.library_path, yaml_string)
            .with_context(|| format!("Failed to write library: {}", self.library_path))?;

        tracing::info!("Saved library to {}", self.library_path);
        Ok(())
    }

    /// Library folder from the settings; relative paths live under the config directory.
    pub fn library_dir(&self, settings: &InstallerSettings) -> Utf8PathBuf {
        let dir = &settings.library_dir;
        if dir.is_absolute() {
            dir.clone()
        } else {
            self.config_dir.join(dir)
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir(&self) -> &Utf8Path {
        &self.config_dir
    }

    pub fn settings_path(&self) -> &Utf8Path {
        &self.settings_path
    }

    pub fn library_path(&self) -> &Utf8Path {
        &self.library_path
    }
}
