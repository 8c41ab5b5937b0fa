use camino::{Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Author reported when the folder name carries no recognizable credit.
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// Metadata about a scanned mod pack.
///
/// Produced by [`ModPackScanner`](crate::services::ModPackScanner) and consumed by the
/// install orchestrator. `file_count` and `size_bytes` are a snapshot taken at scan time
/// and are not refreshed if the folder changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModPack {
    pub id: Uuid,
    pub name: String,
    pub version: String,
    pub author: String,
    pub root_path: Utf8PathBuf,
    pub file_count: usize,
    pub size_bytes: u64,
    #[serde(default)]
    pub installed: bool,
}

impl ModPack {
    /// Create a record with a fresh id. `installed` starts out false.
    pub fn new(
        name: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
        root_path: impl AsRef<Utf8Path>,
        file_count: usize,
        size_bytes: u64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            version: version.into(),
            author: author.into(),
            root_path: root_path.as_ref().to_path_buf(),
            file_count,
            size_bytes,
            installed: false,
        }
    }

    /// Human readable size, e.g. `"1.50 MB"`.
    pub fn size_formatted(&self) -> String {
        format_size(self.size_bytes)
    }
}

/// Format a byte count with 1024-based units and two decimals.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    let mut size = bytes as f64;
    for unit in UNITS {
        if size < 1024.0 {
            return format!("{:.2} {}", size, unit);
        }
        size /= 1024.0;
    }
    format!("{:.2} TB", size)
}
