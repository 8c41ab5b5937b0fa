use crate::models::{MappingTable, ModPack};
use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version folder assumed when a mod pack carries no version-like folder name.
pub const DEFAULT_GAME_VERSION: &str = "1.60.1";

/// Name of the backup directory placed next to the game's version directory.
pub const DEFAULT_BACKUP_FOLDER_NAME: &str = ".ModInstaller_Backup";

/// Settings file `ModInstaller Settings.yaml`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InstallerConfig {
    #[serde(rename = "ModInstaller_Settings", default)]
    pub settings: InstallerSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InstallerSettings {
    /// Game data root containing `Resources/<version>`
    #[serde(rename = "Game Root", default)]
    pub game_root: Option<Utf8PathBuf>,

    #[serde(rename = "Game Version", default = "default_game_version")]
    pub game_version: String,

    #[serde(rename = "Backup Folder", default = "default_backup_folder_name")]
    pub backup_folder_name: String,

    /// Where imported mod packs are copied to
    #[serde(rename = "Library Folder", default = "default_library_dir")]
    pub library_dir: Utf8PathBuf,

    #[serde(rename = "Max Scan Depth", default = "default_max_scan_depth")]
    pub max_scan_depth: usize,

    #[serde(rename = "Max Copy Depth", default = "default_max_copy_depth")]
    pub max_copy_depth: usize,

    #[serde(rename = "Debug Mode", default)]
    pub debug_mode: bool,

    #[serde(rename = "Mappings", default)]
    pub mappings: MappingTable,
}

impl Default for InstallerSettings {
    fn default() -> Self {
        Self {
            game_root: None,
            game_version: default_game_version(),
            backup_folder_name: default_backup_folder_name(),
            library_dir: default_library_dir(),
            max_scan_depth: default_max_scan_depth(),
            max_copy_depth: default_max_copy_depth(),
            debug_mode: false,
            mappings: MappingTable::default(),
        }
    }
}

fn default_game_version() -> String {
    DEFAULT_GAME_VERSION.to_string()
}

fn default_backup_folder_name() -> String {
    DEFAULT_BACKUP_FOLDER_NAME.to_string()
}

fn default_library_dir() -> Utf8PathBuf {
    Utf8PathBuf::from("ModPacks")
}

fn default_max_scan_depth() -> usize {
    32
}

fn default_max_copy_depth() -> usize {
    64
}

/// Imported mod packs from `ModInstaller Library.yaml`, in import order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryIndex {
    #[serde(rename = "Mod_Packs", default)]
    pub packs: IndexMap<Uuid, ModPack>,
}

impl LibraryIndex {
    /// Add a pack unless one with the same root path is already listed.
    ///
    /// Returns `false` when the pack was a duplicate.
    pub fn insert(&mut self, pack: ModPack) -> bool {
        if self.find_by_root(&pack.root_path).is_some() {
            return false;
        }
        self.packs.insert(pack.id, pack);
        true
    }

    pub fn get(&self, id: &Uuid) -> Option<&ModPack> {
        self.packs.get(id)
    }

    pub fn find_by_root(&self, root: &Utf8Path) -> Option<&ModPack> {
        self.packs.values().find(|p| p.root_path == root)
    }

    /// Replace an existing entry with the same root path, or append.
    pub fn upsert(&mut self, pack: ModPack) {
        let existing = self
            .packs
            .iter()
            .find(|(_, p)| p.root_path == pack.root_path)
            .map(|(id, _)| *id);
        if let Some(id) = existing {
            self.packs.shift_remove(&id);
        }
        self.packs.insert(pack.id, pack);
    }

    pub fn mark_installed(&mut self, id: &Uuid) -> bool {
        match self.packs.get_mut(id) {
            Some(pack) => {
                pack.installed = true;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &Uuid) -> Option<ModPack> {
        self.packs.shift_remove(id)
    }

    pub fn len(&self) -> usize {
        self.packs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installer_settings_defaults() {
        let settings = InstallerSettings::default();
        assert_eq!(settings.game_version, "1.60.1");
        assert_eq!(settings.backup_folder_name, ".ModInstaller_Backup");
        assert_eq!(settings.library_dir, Utf8PathBuf::from("ModPacks"));
        assert_eq!(settings.mappings.len(), 6);
        assert!(settings.game_root.is_none());
        assert!(!settings.debug_mode);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let yaml = "ModInstaller_Settings:\n  Game Root: /games/aov\n  Debug Mode: true\n";
        let config: InstallerConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(
            config.settings.game_root,
            Some(Utf8PathBuf::from("/games/aov"))
        );
        assert!(config.settings.debug_mode);
        assert_eq!(config.settings.max_scan_depth, 32);
        assert_eq!(config.settings.mappings.len(), 6);
    }

    #[test]
    fn test_library_index_deduplicates_by_root() {
        let mut index = LibraryIndex::default();
        assert!(index.insert(ModPack::new("A", "1.0", "x", "/packs/a", 1, 1)));
        assert!(!index.insert(ModPack::new("A again", "1.0", "x", "/packs/a", 1, 1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_library_index_upsert_replaces() {
        let mut index = LibraryIndex::default();
        let first = ModPack::new("A", "1.0", "x", "/packs/a", 1, 1);
        let first_id = first.id;
        index.insert(first);
        index.insert(ModPack::new("B", "1.0", "x", "/packs/b", 1, 1));

        let second = ModPack::new("A", "1.0", "x", "/packs/a", 2, 2);
        let second_id = second.id;
        index.upsert(second);

        assert_eq!(index.len(), 2);
        assert!(index.get(&first_id).is_none());
        assert_eq!(index.get(&second_id).unwrap().file_count, 2);
    }

    #[test]
    fn test_mark_installed() {
        let mut index = LibraryIndex::default();
        let pack = ModPack::new("A", "1.0", "x", "/packs/a", 1, 1);
        let id = pack.id;
        index.insert(pack);

        assert!(index.mark_installed(&id));
        assert!(index.get(&id).unwrap().installed);
        assert!(!index.mark_installed(&Uuid::new_v4()));
    }
}
