//! Mod pack detection and measurement.
//!
//! Users rarely point the installer at the exact folder that holds the asset trees. Packs
//! ship as `Pack/1.60.1/...`, `Pack/Resources/1.60.1/...` or with the asset folders at the
//! top level. [`ModPackScanner::scan`] finds the real root and measures it.

use crate::models::{DEFAULT_GAME_VERSION, MappingTable, ModPack, UNKNOWN_AUTHOR};
use crate::services::InstallError;
use crate::services::patterns::{
    is_hidden, is_signature_folder, looks_like_version, required_signature_count, version_rank,
};
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;
use walkdir::WalkDir;

/// How the mod pack root was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootStrategy {
    /// The selected folder holds the asset folders itself
    Direct,
    /// A version-named child of the selected folder holds them
    VersionChild,
    /// Found by walking the whole tree
    Descendant,
}

/// Result of root detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectedRoot {
    pub root: Utf8PathBuf,
    /// Version-like path segment seen while detecting, if any
    pub version: Option<String>,
    pub strategy: RootStrategy,
}

#[derive(Debug, Clone)]
pub struct ScanOptions {
    /// Maximum depth of the whole-tree search below the selected folder
    pub max_depth: usize,
    /// Version reported when no version-like folder name was found
    pub default_version: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_depth: 32,
            default_version: DEFAULT_GAME_VERSION.to_string(),
        }
    }
}

/// Locates and measures mod packs. Never copies anything.
#[derive(Debug, Clone)]
pub struct ModPackScanner {
    mappings: MappingTable,
    options: ScanOptions,
}

impl ModPackScanner {
    pub fn new(mappings: MappingTable) -> Self {
        Self::with_options(mappings, ScanOptions::default())
    }

    pub fn with_options(mappings: MappingTable, options: ScanOptions) -> Self {
        Self { mappings, options }
    }

    /// Scan `candidate` and build a [`ModPack`] record.
    ///
    /// # Errors
    ///
    /// [`InstallError::InvalidModPack`] when the folder does not exist or no directory in
    /// its tree holds enough signature folders.
    pub fn scan(&self, candidate: &Utf8Path) -> Result<ModPack, InstallError> {
        if !candidate.is_dir() {
            tracing::warn!("Mod pack folder does not exist: {}", candidate);
            return Err(InstallError::InvalidModPack(candidate.to_path_buf()));
        }

        let candidate = absolute(candidate);
        tracing::info!("Scanning mod pack: {}", candidate);

        let Some(detected) = self.find_mod_root(&candidate) else {
            tracing::warn!("No mod pack root found under {}", candidate);
            return Err(InstallError::InvalidModPack(candidate));
        };

        tracing::debug!(
            "Mod pack root {} detected via {:?}",
            detected.root,
            detected.strategy
        );

        let (file_count, size_bytes) = measure(&detected.root);
        let name = display_name(&candidate);
        let author = extract_author(&name);
        let version = detected
            .version
            .unwrap_or_else(|| self.options.default_version.clone());

        let pack = ModPack::new(name, version, author, &detected.root, file_count, size_bytes);

        tracing::info!(
            "Scanned mod pack '{}' by {}: {} files, {} at {}",
            pack.name,
            pack.author,
            pack.file_count,
            pack.size_formatted(),
            pack.root_path
        );

        Ok(pack)
    }

    /// Find the directory holding the mapped asset folders.
    ///
    /// Checks, in order: the candidate itself, its version-named children (three-part names
    /// first), then every directory in the tree depth-first. Hidden directories and symlinks
    /// are not descended into and the walk stops at `max_depth`.
    pub fn find_mod_root(&self, candidate: &Utf8Path) -> Option<DetectedRoot> {
        let signatures = self.mappings.signature_folders();

        if self.is_mod_root(candidate, &signatures) {
            return Some(DetectedRoot {
                root: candidate.to_path_buf(),
                version: candidate
                    .file_name()
                    .filter(|n| looks_like_version(n))
                    .map(str::to_string),
                strategy: RootStrategy::Direct,
            });
        }

        for child in version_children(candidate) {
            if self.is_mod_root(&child, &signatures) {
                let version = child.file_name().map(str::to_string);
                return Some(DetectedRoot {
                    root: child,
                    version,
                    strategy: RootStrategy::VersionChild,
                });
            }
        }

        let walker = WalkDir::new(candidate)
            .min_depth(1)
            .max_depth(self.options.max_depth)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_hidden(&e.file_name().to_string_lossy()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry during scan: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_dir() {
                continue;
            }
            let Some(dir) = Utf8Path::from_path(entry.path()) else {
                continue;
            };
            if self.is_mod_root(dir, &signatures) {
                return Some(DetectedRoot {
                    root: dir.to_path_buf(),
                    version: nearest_version_segment(candidate, dir),
                    strategy: RootStrategy::Descendant,
                });
            }
        }

        None
    }

    fn is_mod_root(&self, dir: &Utf8Path, signatures: &[&str]) -> bool {
        let required = required_signature_count(signatures);
        if required == 0 {
            return false;
        }

        let Ok(entries) = fs::read_dir(dir) else {
            return false;
        };

        let found = entries
            .filter_map(|e| e.ok())
            .filter(|e| e.path().is_dir())
            .filter(|e| {
                e.file_name()
                    .to_str()
                    .is_some_and(|name| is_signature_folder(name, signatures))
            })
            .count();

        found >= required
    }
}

/// Count regular files under `root` and sum their sizes in one walk.
///
/// Symlinks are not followed. Unreadable entries are skipped.
pub fn measure(root: &Utf8Path) -> (usize, u64) {
    let mut count = 0usize;
    let mut size = 0u64;

    for entry in WalkDir::new(root).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry while measuring {}: {}", root, e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        count += 1;
        if let Ok(metadata) = entry.metadata() {
            size += metadata.len();
        }
    }

    (count, size)
}

/// Best-effort author credit from a folder name.
///
/// `"[Mod] Skin Pack by Someone"` gives `"Someone"`, `"Pack Youtube KHAM-PHA"` gives
/// `"Youtube KHAM-PHA"`, anything else gives `"Unknown"`.
pub fn extract_author(name: &str) -> String {
    if let Some(idx) = name.rfind("by ") {
        return name[idx + "by ".len()..].trim().to_string();
    }
    if let Some(idx) = name.rfind("Youtube") {
        return format!("Youtube{}", &name[idx + "Youtube".len()..]);
    }
    UNKNOWN_AUTHOR.to_string()
}

fn display_name(path: &Utf8Path) -> String {
    path.file_name()
        .map(str::to_string)
        .unwrap_or_else(|| path.to_string())
}

fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    std::path::absolute(path)
        .ok()
        .and_then(|p| Utf8PathBuf::from_path_buf(p).ok())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Version-named child directories, three-part names first, then by name.
fn version_children(dir: &Utf8Path) -> Vec<Utf8PathBuf> {
    let Ok(entries) = dir.read_dir_utf8() else {
        return Vec::new();
    };

    let mut children: Vec<(usize, Utf8PathBuf)> = entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| version_rank(e.file_name()).map(|rank| (rank, e.path().to_path_buf())))
        .collect();

    children.sort_by(|(rank_a, a), (rank_b, b)| rank_b.cmp(rank_a).then_with(|| a.cmp(b)));
    children.into_iter().map(|(_, path)| path).collect()
}

/// Closest version-like segment walking from `root` back up to `candidate`.
fn nearest_version_segment(candidate: &Utf8Path, root: &Utf8Path) -> Option<String> {
    let relative = root.strip_prefix(candidate).ok()?;
    relative
        .components()
        .rev()
        .map(|c| c.as_str())
        .chain(candidate.file_name())
        .find(|segment| looks_like_version(segment))
        .map(str::to_string)
}
