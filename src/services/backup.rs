//! One-generation snapshot of the game's mapped folders.
//!
//! The snapshot lives next to the version directory (`Resources/.ModInstaller_Backup` for
//! `Resources/1.60.1`) and mirrors each mapping's target folder. Its existence is the only
//! "has backup" flag; no manifest is written.

use crate::models::{DEFAULT_BACKUP_FOLDER_NAME, MappingTable};
use crate::services::InstallError;
use crate::services::copy::copy_tree;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

/// What [`BackupManager::create_backup`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackupOutcome {
    /// A new snapshot was written holding these target folders
    Created { folders: Vec<String> },
    /// A snapshot already existed and was left untouched
    AlreadyExists,
}

#[derive(Debug, Clone)]
pub struct BackupManager {
    mappings: MappingTable,
    folder_name: String,
}

impl BackupManager {
    pub fn new(mappings: MappingTable) -> Self {
        Self::with_folder_name(mappings, DEFAULT_BACKUP_FOLDER_NAME)
    }

    pub fn with_folder_name(mappings: MappingTable, folder_name: impl Into<String>) -> Self {
        Self {
            mappings,
            folder_name: folder_name.into(),
        }
    }

    /// Snapshot location for a given version directory.
    pub fn backup_dir(&self, game_version_root: &Utf8Path) -> Utf8PathBuf {
        game_version_root
            .parent()
            .unwrap_or(game_version_root)
            .join(&self.folder_name)
    }

    pub fn has_backup(&self, game_version_root: &Utf8Path) -> bool {
        self.backup_dir(game_version_root).is_dir()
    }

    /// Copy every existing mapped target folder into a fresh snapshot.
    ///
    /// An existing snapshot is never overwritten: the call returns
    /// [`BackupOutcome::AlreadyExists`] without touching it, so the first captured state is
    /// the one that gets restored until the snapshot is deleted.
    pub fn create_backup<F>(
        &self,
        game_version_root: &Utf8Path,
        mut on_message: F,
    ) -> Result<BackupOutcome, InstallError>
    where
        F: FnMut(&str),
    {
        ensure_game_dir(game_version_root)?;

        let backup_dir = self.backup_dir(game_version_root);
        if backup_dir.exists() {
            tracing::info!("Backup already exists at {}", backup_dir);
            return Ok(BackupOutcome::AlreadyExists);
        }

        on_message("Creating backup...");
        fs::create_dir_all(&backup_dir).map_err(|e| {
            InstallError::io(format!("Failed to create backup directory {}", backup_dir), e)
        })?;

        let mut folders = Vec::new();
        for mapping in &self.mappings {
            let source = game_version_root.join(&mapping.target_folder);
            if !source.is_dir() {
                tracing::debug!("Nothing to back up for {}", mapping.target_folder);
                continue;
            }

            on_message(&format!("Backing up {}...", mapping.target_folder));
            let copied = copy_tree(&source, &backup_dir.join(&mapping.target_folder))?;
            tracing::info!("Backed up {} ({} files)", mapping.target_folder, copied);
            folders.push(mapping.target_folder.clone());
        }

        on_message("Backup completed!");
        Ok(BackupOutcome::Created { folders })
    }

    /// Replace every backed-up target folder with its snapshot copy.
    ///
    /// Folders missing from the snapshot are left alone. The snapshot itself is kept.
    pub fn restore_backup<F>(
        &self,
        game_version_root: &Utf8Path,
        mut on_message: F,
    ) -> Result<Vec<String>, InstallError>
    where
        F: FnMut(&str),
    {
        ensure_game_dir(game_version_root)?;

        let backup_dir = self.backup_dir(game_version_root);
        if !backup_dir.is_dir() {
            return Err(InstallError::BackupNotFound);
        }

        on_message("Restoring backup...");

        let mut restored = Vec::new();
        for mapping in &self.mappings {
            let saved = backup_dir.join(&mapping.target_folder);
            if !saved.is_dir() {
                continue;
            }

            on_message(&format!("Restoring {}...", mapping.target_folder));

            let target = game_version_root.join(&mapping.target_folder);
            if target.exists() {
                remove_path(&target).map_err(|e| {
                    InstallError::copy_failed(mapping.target_folder.as_str(), e)
                })?;
            }
            copy_tree(&saved, &target)?;

            tracing::info!("Restored {}", mapping.target_folder);
            restored.push(mapping.target_folder.clone());
        }

        on_message("Restore completed!");
        Ok(restored)
    }

    /// Remove the snapshot. Returns whether there was one.
    pub fn delete_backup(&self, game_version_root: &Utf8Path) -> Result<bool, InstallError> {
        ensure_game_dir(game_version_root)?;

        let backup_dir = self.backup_dir(game_version_root);
        if !backup_dir.exists() {
            return Ok(false);
        }

        fs::remove_dir_all(&backup_dir).map_err(|e| {
            InstallError::io(format!("Failed to delete backup {}", backup_dir), e)
        })?;
        tracing::info!("Deleted backup at {}", backup_dir);
        Ok(true)
    }
}

fn ensure_game_dir(game_version_root: &Utf8Path) -> Result<(), InstallError> {
    if game_version_root.is_dir() {
        Ok(())
    } else {
        tracing::warn!("Game version directory missing: {}", game_version_root);
        Err(InstallError::GameNotFound)
    }
}

fn remove_path(path: &Utf8Path) -> std::io::Result<()> {
    if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}
