// State management module
//
// This module provides the StateManager which wraps AppState with thread-safe access
// using Arc<RwLock<T>> and emits change events for front ends.

use crate::models::{AppState, InstallProgress, LibraryIndex, ModPack, Operation};
use camino::Utf8PathBuf;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Change events emitted when state is modified
#[derive(Clone, Debug, PartialEq)]
pub enum StateChange {
    /// Game location or backup presence changed
    GameDetected {
        version_dir: Option<Utf8PathBuf>,
        has_backup: bool,
    },

    /// A pack was added to the library
    ModPackAdded { id: Uuid, name: String },

    /// A pack was removed from the library
    ModPackRemoved { id: Uuid },

    /// A pack's installed flag changed
    ModPackInstalled { id: Uuid },

    SelectionChanged { selected: Option<Uuid> },

    OperationStarted { operation: Operation },

    /// Progress has been updated during an install
    ProgressUpdated {
        files_processed: usize,
        total_files: usize,
        current_file: String,
    },

    OperationFinished {
        operation: Operation,
        error: Option<String>,
    },

    StatusChanged { message: String },

    /// Per-operation state has been reset
    StateReset,
}

/// Thread-safe state manager with event emission
///
/// - Provides thread-safe access to [`AppState`] via `Arc<RwLock<T>>`
/// - Detects state changes and emits [`StateChange`] events
/// - Supports subscribing to state changes via tokio broadcast channels
///
/// Use [`read()`](Self::read) for queries, [`update()`](Self::update) for mutations and
/// [`subscribe()`](Self::subscribe) to listen.
#[derive(Clone)]
pub struct StateManager {
    state: Arc<RwLock<AppState>>,
    state_tx: broadcast::Sender<StateChange>,
}

impl StateManager {
    /// Create a new StateManager with default state and a 100 event buffer
    pub fn new() -> Self {
        let (state_tx, _) = broadcast::channel(100);
        Self {
            state: Arc::new(RwLock::new(AppState::default())),
            state_tx,
        }
    }

    /// Clone of the current state, safe to hold without locks
    pub fn snapshot(&self) -> AppState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Execute a function with read access to the state
    ///
    /// # Example
    /// ```ignore
    /// let busy = state_manager.read(|state| state.is_busy());
    /// ```
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&AppState) -> R,
    {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Mutate the state and emit an event for everything that changed
    ///
    /// Returns the emitted events.
    pub fn update<F>(&self, update_fn: F) -> Vec<StateChange>
    where
        F: FnOnce(&mut AppState),
    {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        let old_state = state.clone();

        update_fn(&mut state);

        let changes = detect_changes(&old_state, &state);
        for change in &changes {
            // No subscribers is fine
            let _ = self.state_tx.send(change.clone());
        }

        changes
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    fn emit(&self, changes: &mut Vec<StateChange>, event: StateChange) {
        let _ = self.state_tx.send(event.clone());
        changes.push(event);
    }

    // Convenience methods for common state updates

    pub fn set_game_location(
        &self,
        version_dir: Option<Utf8PathBuf>,
        has_backup: bool,
    ) -> Vec<StateChange> {
        self.update(|state| {
            state.has_backup = version_dir.is_some() && has_backup;
            state.game_version_dir = version_dir;
        })
    }

    pub fn set_has_backup(&self, has_backup: bool) -> Vec<StateChange> {
        self.update(|state| state.has_backup = has_backup)
    }

    /// Add a scanned pack. A pack whose root is already listed is ignored.
    pub fn add_mod_pack(&self, pack: ModPack) -> Vec<StateChange> {
        self.update(|state| {
            if !state.add_mod_pack(pack) {
                tracing::debug!("Mod pack already in library, not adding");
            }
        })
    }

    /// Replace the library with the persisted index
    pub fn load_library(&self, library: &LibraryIndex) -> Vec<StateChange> {
        self.update(|state| {
            state.mod_packs = library.packs.clone();
            if state
                .selected_pack
                .is_some_and(|id| !state.mod_packs.contains_key(&id))
            {
                state.selected_pack = None;
            }
            tracing::info!("Loaded {} mod packs into library", state.mod_packs.len());
        })
    }

    /// Select a pack. Unknown ids clear the selection.
    pub fn select_pack(&self, id: Option<Uuid>) -> Vec<StateChange> {
        self.update(|state| {
            state.selected_pack = id.filter(|id| state.mod_packs.contains_key(id));
        })
    }

    pub fn mark_installed(&self, id: Uuid) -> Vec<StateChange> {
        self.update(|state| {
            if let Some(pack) = state.mod_packs.get_mut(&id) {
                pack.installed = true;
            }
        })
    }

    /// Start an operation. Refused (no events) while another one is running.
    pub fn start_operation(&self, operation: Operation) -> Vec<StateChange> {
        self.update(|state| {
            if state.is_busy() {
                tracing::warn!(
                    "Cannot start {} while another operation is running",
                    operation.label()
                );
                return;
            }
            state.operation = Some(operation);
            state.progress = InstallProgress::default();
            state.last_error = None;
            state.status_message = format!("Starting {}...", operation.label());
        })
    }

    pub fn update_progress(&self, progress: &InstallProgress) -> Vec<StateChange> {
        self.update(|state| {
            state.progress = progress.clone();
            state.status_message = progress.current_file.clone();
        })
    }

    pub fn set_status(&self, message: impl Into<String>) -> Vec<StateChange> {
        let message = message.into();
        self.update(|state| state.status_message = message)
    }

    /// End the running operation, recording its error if it failed
    pub fn finish_operation(&self, error: Option<String>) -> Vec<StateChange> {
        self.update(|state| {
            if let Some(operation) = state.operation.take() {
                state.status_message = match &error {
                    Some(e) => format!("Error: {}", e),
                    None => format!("{} completed", capitalize(operation.label())),
                };
            }
            state.last_error = error;
        })
    }

    /// Reset all per-operation state
    pub fn reset_operation_state(&self) -> Vec<StateChange> {
        let mut changes = self.update(AppState::reset_operation_state);
        self.emit(&mut changes, StateChange::StateReset);
        changes
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Events for every difference between `old` and `new`, in a fixed order
fn detect_changes(old: &AppState, new: &AppState) -> Vec<StateChange> {
    let mut changes = Vec::new();

    if old.game_version_dir != new.game_version_dir || old.has_backup != new.has_backup {
        changes.push(StateChange::GameDetected {
            version_dir: new.game_version_dir.clone(),
            has_backup: new.has_backup,
        });
    }

    for (id, pack) in &new.mod_packs {
        match old.mod_packs.get(id) {
            None => changes.push(StateChange::ModPackAdded {
                id: *id,
                name: pack.name.clone(),
            }),
            Some(previous) if !previous.installed && pack.installed => {
                changes.push(StateChange::ModPackInstalled { id: *id })
            }
            Some(_) => {}
        }
    }
    for id in old.mod_packs.keys() {
        if !new.mod_packs.contains_key(id) {
            changes.push(StateChange::ModPackRemoved { id: *id });
        }
    }

    if old.selected_pack != new.selected_pack {
        changes.push(StateChange::SelectionChanged {
            selected: new.selected_pack,
        });
    }

    match (old.operation, new.operation) {
        (None, Some(operation)) => changes.push(StateChange::OperationStarted { operation }),
        (Some(operation), None) => changes.push(StateChange::OperationFinished {
            operation,
            error: new.last_error.clone(),
        }),
        (Some(previous), Some(current)) if previous != current => {
            changes.push(StateChange::OperationFinished {
                operation: previous,
                error: new.last_error.clone(),
            });
            changes.push(StateChange::OperationStarted { operation: current });
        }
        _ => {}
    }

    if old.progress != new.progress {
        changes.push(StateChange::ProgressUpdated {
            files_processed: new.progress.files_processed,
            total_files: new.progress.total_files,
            current_file: new.progress.current_file.clone(),
        });
    }

    if old.status_message != new.status_message {
        changes.push(StateChange::StatusChanged {
            message: new.status_message.clone(),
        });
    }

    changes
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
