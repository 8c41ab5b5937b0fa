/// Lifecycle of an install run. `Complete` and `Failed` are final.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallPhase {
    NotStarted,
    InProgress,
    Complete,
    Failed,
}

/// Snapshot of an install run.
///
/// Created fresh for every install with `total_files` taken from the mod pack's
/// `file_count`. The copy engine only walks mapped sub-trees, so `files_processed` can end
/// below `total_files`; that is expected and not an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallProgress {
    pub current_file: String,
    pub files_processed: usize,
    pub total_files: usize,
    pub is_complete: bool,
    pub error: Option<String>,
}

impl InstallProgress {
    pub fn new(total_files: usize) -> Self {
        Self {
            total_files,
            ..Self::default()
        }
    }

    /// Fraction of `total_files` processed so far, in `0.0..=1.0` for well-formed runs.
    pub fn percentage(&self) -> f64 {
        if self.total_files == 0 {
            return 0.0;
        }
        self.files_processed as f64 / self.total_files as f64
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn phase(&self) -> InstallPhase {
        if self.error.is_some() {
            InstallPhase::Failed
        } else if self.is_complete {
            InstallPhase::Complete
        } else if self.files_processed == 0 && self.current_file.is_empty() {
            InstallPhase::NotStarted
        } else {
            InstallPhase::InProgress
        }
    }
}
