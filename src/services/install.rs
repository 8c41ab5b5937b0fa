//! Install, backup and restore against the located game directory.

use crate::models::{InstallProgress, InstallerSettings, MappingTable, ModPack};
use crate::services::InstallError;
use crate::services::backup::{BackupManager, BackupOutcome};
use crate::services::copy::{CopyEngine, CopyOptions};
use crate::services::game_detection::GameLocator;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use std::sync::Arc;

/// Entry point for every operation that touches the game directory.
///
/// Cheap to clone: the locator is shared and the mapping table is small.
#[derive(Clone)]
pub struct InstallOrchestrator {
    locator: Arc<dyn GameLocator>,
    mappings: MappingTable,
    copy: CopyEngine,
    backup: BackupManager,
}

impl std::fmt::Debug for InstallOrchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstallOrchestrator")
            .field("mappings", &self.mappings.len())
            .field("copy", &self.copy)
            .field("backup", &self.backup)
            .finish_non_exhaustive()
    }
}

impl InstallOrchestrator {
    pub fn new(locator: Arc<dyn GameLocator>, mappings: MappingTable) -> Self {
        Self {
            locator,
            backup: BackupManager::new(mappings.clone()),
            copy: CopyEngine::new(),
            mappings,
        }
    }

    /// Build from loaded settings: mapping table, backup folder name and copy depth.
    pub fn from_settings(locator: Arc<dyn GameLocator>, settings: &InstallerSettings) -> Self {
        Self {
            locator,
            backup: BackupManager::with_folder_name(
                settings.mappings.clone(),
                settings.backup_folder_name.clone(),
            ),
            copy: CopyEngine::with_options(CopyOptions {
                max_depth: settings.max_copy_depth,
                dry_run: false,
            }),
            mappings: settings.mappings.clone(),
        }
    }

    pub fn with_copy_options(mut self, options: CopyOptions) -> Self {
        self.copy = CopyEngine::with_options(options);
        self
    }

    pub fn mappings(&self) -> &MappingTable {
        &self.mappings
    }

    pub fn backup_manager(&self) -> &BackupManager {
        &self.backup
    }

    pub fn is_dry_run(&self) -> bool {
        self.copy.options().dry_run
    }

    /// Resolve the game's version directory.
    pub fn game_version_dir(&self) -> Result<Utf8PathBuf, InstallError> {
        self.locator.version_directory().ok_or_else(|| {
            tracing::warn!("Game version directory could not be located");
            InstallError::GameNotFound
        })
    }

    /// Copy `pack` into the located game directory.
    ///
    /// Every snapshot from the copy engine is forwarded unchanged. When the game cannot be
    /// located nothing is emitted.
    pub fn install_mod<F>(
        &self,
        pack: &ModPack,
        on_progress: F,
    ) -> Result<InstallProgress, InstallError>
    where
        F: FnMut(&InstallProgress),
    {
        let game_root = self.game_version_dir()?;
        self.install_mod_into(pack, &game_root, on_progress)
    }

    /// Copy `pack` into an explicit version directory.
    pub fn install_mod_into<F>(
        &self,
        pack: &ModPack,
        game_root: &Utf8Path,
        on_progress: F,
    ) -> Result<InstallProgress, InstallError>
    where
        F: FnMut(&InstallProgress),
    {
        if !game_root.is_dir() {
            tracing::warn!("Game version directory missing: {}", game_root);
            return Err(InstallError::GameNotFound);
        }

        // Copying a folder over itself deletes each target before reading it.
        if overlaps(&pack.root_path, game_root) {
            tracing::error!(
                "Refusing to install '{}': {} overlaps {}",
                pack.name,
                pack.root_path,
                game_root
            );
            return Err(InstallError::PackOverlapsGame(pack.root_path.clone()));
        }

        tracing::info!(
            "Installing '{}' ({} files) into {}",
            pack.name,
            pack.file_count,
            game_root
        );

        let progress = self.copy.copy_mapped(
            &pack.root_path,
            game_root,
            &self.mappings,
            pack.file_count,
            on_progress,
        )?;

        tracing::info!("Installed '{}'", pack.name);
        Ok(progress)
    }

    pub fn create_backup<F>(&self, on_message: F) -> Result<BackupOutcome, InstallError>
    where
        F: FnMut(&str),
    {
        let game_root = self.game_version_dir()?;
        self.backup.create_backup(&game_root, on_message)
    }

    pub fn restore_backup<F>(&self, on_message: F) -> Result<Vec<String>, InstallError>
    where
        F: FnMut(&str),
    {
        let game_root = self.game_version_dir()?;
        self.backup.restore_backup(&game_root, on_message)
    }

    pub fn delete_backup(&self) -> Result<bool, InstallError> {
        let game_root = self.game_version_dir()?;
        self.backup.delete_backup(&game_root)
    }

    /// `false` when the game cannot be located.
    pub fn has_backup(&self) -> bool {
        self.locator
            .version_directory()
            .is_some_and(|root| self.backup.has_backup(&root))
    }
}

/// True when one path resolves to the other or to a folder inside it.
fn overlaps(a: &Utf8Path, b: &Utf8Path) -> bool {
    match (fs::canonicalize(a), fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a.starts_with(&b) || b.starts_with(&a),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InstallPhase;
    use crate::services::game_detection::MockGameLocator;
    use std::fs;
    use tempfile::TempDir;

    fn utf8(temp_dir: &TempDir) -> Utf8PathBuf {
        Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap()
    }

    fn locator_for(dir: Option<Utf8PathBuf>) -> Arc<dyn GameLocator> {
        let mut locator = MockGameLocator::new();
        locator
            .expect_version_directory()
            .returning(move || dir.clone());
        Arc::new(locator)
    }

    fn pack_at(root: &Utf8Path, file_count: usize) -> ModPack {
        ModPack::new("Test Pack", "1.60.1", "Unknown", root, file_count, 0)
    }

    #[test]
    fn test_install_without_game() {
        let pack_dir = TempDir::new().unwrap();
        let orchestrator = InstallOrchestrator::new(locator_for(None), MappingTable::default());

        let mut snapshots = 0;
        let result = orchestrator.install_mod(&pack_at(&utf8(&pack_dir), 1), |_| snapshots += 1);

        assert!(matches!(result, Err(InstallError::GameNotFound)));
        assert_eq!(snapshots, 0);
        assert!(!orchestrator.has_backup());
        assert!(matches!(
            orchestrator.delete_backup(),
            Err(InstallError::GameNotFound)
        ));
    }

    #[test]
    fn test_install_forwards_snapshots() {
        let pack_dir = TempDir::new().unwrap();
        let game_dir = TempDir::new().unwrap();
        let pack_root = utf8(&pack_dir);
        let game_root = utf8(&game_dir);

        fs::create_dir_all(pack_root.join("assetbundle")).unwrap();
        fs::write(pack_root.join("assetbundle/a.bytes"), "a").unwrap();
        fs::write(pack_root.join("readme.txt"), "not mapped").unwrap();

        let orchestrator = InstallOrchestrator::new(
            locator_for(Some(game_root.clone())),
            MappingTable::default(),
        );

        let mut snapshots = Vec::new();
        let final_progress = orchestrator
            .install_mod(&pack_at(&pack_root, 2), |p| snapshots.push(p.clone()))
            .unwrap();

        assert_eq!(final_progress.phase(), InstallPhase::Complete);
        assert_eq!(final_progress.total_files, 2);
        assert_eq!(final_progress.files_processed, 1);
        assert_eq!(snapshots.last(), Some(&final_progress));
        assert_eq!(snapshots[0].current_file, "assetbundle");
        assert!(game_root.join("assetbundle/a.bytes").is_file());
        assert!(!game_root.join("readme.txt").exists());
    }

    #[test]
    fn test_dry_run_leaves_game_untouched() {
        let pack_dir = TempDir::new().unwrap();
        let game_dir = TempDir::new().unwrap();
        let pack_root = utf8(&pack_dir);
        let game_root = utf8(&game_dir);

        fs::create_dir_all(pack_root.join("Databin/Client")).unwrap();
        fs::write(pack_root.join("Databin/Client/db.bytes"), "db").unwrap();

        let orchestrator = InstallOrchestrator::new(
            locator_for(Some(game_root.clone())),
            MappingTable::default(),
        )
        .with_copy_options(CopyOptions {
            dry_run: true,
            ..CopyOptions::default()
        });

        assert!(orchestrator.is_dry_run());
        let progress = orchestrator
            .install_mod(&pack_at(&pack_root, 1), |_| {})
            .unwrap();
        assert_eq!(progress.files_processed, 1);
        assert!(!game_root.join("Databin").exists());
    }

    #[test]
    fn test_backup_facade() {
        let temp_dir = TempDir::new().unwrap();
        let version_dir = utf8(&temp_dir).join("Resources/1.60.1");
        fs::create_dir_all(version_dir.join("assetbundle")).unwrap();
        fs::write(version_dir.join("assetbundle/a.bytes"), "original").unwrap();

        let orchestrator = InstallOrchestrator::new(
            locator_for(Some(version_dir.clone())),
            MappingTable::default(),
        );

        assert!(!orchestrator.has_backup());
        assert!(matches!(
            orchestrator.restore_backup(|_| {}),
            Err(InstallError::BackupNotFound)
        ));

        let outcome = orchestrator.create_backup(|_| {}).unwrap();
        assert_eq!(
            outcome,
            BackupOutcome::Created {
                folders: vec!["assetbundle".to_string()]
            }
        );
        assert!(orchestrator.has_backup());

        fs::write(version_dir.join("assetbundle/a.bytes"), "modded").unwrap();
        let restored = orchestrator.restore_backup(|_| {}).unwrap();
        assert_eq!(restored, vec!["assetbundle".to_string()]);
        assert_eq!(
            fs::read_to_string(version_dir.join("assetbundle/a.bytes")).unwrap(),
            "original"
        );

        assert!(orchestrator.delete_backup().unwrap());
        assert!(!orchestrator.has_backup());
    }

    #[test]
    fn test_from_settings_uses_backup_folder() {
        let temp_dir = TempDir::new().unwrap();
        let version_dir = utf8(&temp_dir).join("Resources/1.60.1");
        fs::create_dir_all(&version_dir).unwrap();

        let settings = InstallerSettings {
            backup_folder_name: ".stock".to_string(),
            ..InstallerSettings::default()
        };
        let orchestrator =
            InstallOrchestrator::from_settings(locator_for(Some(version_dir.clone())), &settings);

        orchestrator.create_backup(|_| {}).unwrap();
        assert!(utf8(&temp_dir).join("Resources/.stock").is_dir());
    }
}
