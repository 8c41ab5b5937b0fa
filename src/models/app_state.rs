use crate::models::{InstallProgress, ModPack};
use camino::Utf8PathBuf;
use indexmap::IndexMap;
use uuid::Uuid;

/// Long-running operation currently owning the game directory.
///
/// Only one operation runs at a time; the game directory is not locked, so callers must
/// not start a second one while `AppState::operation` is `Some`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    Install,
    Backup,
    Restore,
}

impl Operation {
    pub fn label(&self) -> &'static str {
        match self {
            Operation::Install => "install",
            Operation::Backup => "backup",
            Operation::Restore => "restore",
        }
    }
}

/// Single source of truth for the interactive session.
///
/// Wrapped in `Arc<RwLock<AppState>>` by [`crate::state::StateManager`]; never mutate it
/// directly, go through [`update()`](crate::state::StateManager::update) so change events
/// get emitted.
#[derive(Clone, Debug, Default)]
pub struct AppState {
    // Game location
    pub game_version_dir: Option<Utf8PathBuf>,
    pub has_backup: bool,

    // Library
    pub mod_packs: IndexMap<Uuid, ModPack>,
    pub selected_pack: Option<Uuid>,

    // Runtime state
    pub operation: Option<Operation>,
    pub progress: InstallProgress,
    pub status_message: String,
    pub last_error: Option<String>,
}

impl AppState {
    pub fn is_game_found(&self) -> bool {
        self.game_version_dir.is_some()
    }

    pub fn is_busy(&self) -> bool {
        self.operation.is_some()
    }

    pub fn selected(&self) -> Option<&ModPack> {
        self.selected_pack.and_then(|id| self.mod_packs.get(&id))
    }

    /// Add a pack unless one with the same root path is already listed.
    pub fn add_mod_pack(&mut self, pack: ModPack) -> bool {
        if self
            .mod_packs
            .values()
            .any(|existing| existing.root_path == pack.root_path)
        {
            return false;
        }
        self.mod_packs.insert(pack.id, pack);
        true
    }

    /// Reset per-operation fields. Library and game location are kept.
    pub fn reset_operation_state(&mut self) {
        self.operation = None;
        self.progress = InstallProgress::default();
        self.status_message.clear();
        self.last_error = None;
    }
}
