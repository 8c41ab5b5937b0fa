use camino::Utf8PathBuf;
use thiserror::Error;

/// Errors raised by scan, install, backup and restore.
///
/// Every variant is terminal for the operation that produced it. Files already copied
/// before the failure stay in place; restoring the backup is the recovery path.
#[derive(Error, Debug)]
pub enum InstallError {
    #[error("Game version directory not found. Install the game and run it at least once.")]
    GameNotFound,

    #[error("No backup found. Create a backup before restoring.")]
    BackupNotFound,

    #[error("Invalid mod pack at {0}: no recognizable asset folders found")]
    InvalidModPack(Utf8PathBuf),

    #[error("Failed to copy {item}: {source}")]
    CopyFailed {
        item: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Mod pack at {0} overlaps the game directory, select a pack outside the game")]
    PackOverlapsGame(Utf8PathBuf),

    #[error("Archives are not supported, extract {0} first and select the folder")]
    UnsupportedArchive(Utf8PathBuf),

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Operation interrupted: {0}")]
    Interrupted(String),
}

impl InstallError {
    pub(crate) fn copy_failed(item: impl Into<String>, source: std::io::Error) -> Self {
        InstallError::CopyFailed {
            item: item.into(),
            source,
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        InstallError::Io {
            context: context.into(),
            source,
        }
    }
}
