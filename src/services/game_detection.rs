//! Locating the game's version directory.
//!
//! Finding the game's own install on a device is platform specific and lives outside this
//! crate. The engine only sees the [`GameLocator`] trait, which answers with a version
//! directory or `None`.
//!
//! Two implementations ship here:
//! - [`FixedGameLocator`]: an explicitly configured version directory
//! - [`ResourcesGameLocator`]: a game data root laid out as `Resources/<version>/`
//!
//! # Examples
//!
//! ```ignore
//! use modinstaller::services::{GameLocator, ResourcesGameLocator};
//!
//! let locator = ResourcesGameLocator::new("/var/mobile/.../Documents", Some("1.60.1"));
//! if let Some(dir) = locator.version_directory() {
//!     println!("Game found at {dir}");
//! }
//! ```

use crate::services::patterns::{looks_like_version, version_key, version_rank};
use camino::{Utf8Path, Utf8PathBuf};

/// Folder under the game data root holding one directory per release version.
pub const RESOURCES_DIR: &str = "Resources";

/// Resolves the game's version directory.
#[cfg_attr(test, mockall::automock)]
pub trait GameLocator: Send + Sync {
    /// The version directory, or `None` when the game cannot be found.
    fn version_directory(&self) -> Option<Utf8PathBuf>;
}

/// Always answers with the same directory, if it exists.
#[derive(Debug, Clone)]
pub struct FixedGameLocator {
    version_dir: Option<Utf8PathBuf>,
}

impl FixedGameLocator {
    pub fn new(version_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            version_dir: Some(version_dir.into()),
        }
    }

    /// A locator that never finds the game.
    pub fn none() -> Self {
        Self { version_dir: None }
    }
}

impl GameLocator for FixedGameLocator {
    fn version_directory(&self) -> Option<Utf8PathBuf> {
        self.version_dir.clone().filter(|dir| dir.is_dir())
    }
}

/// Finds `<game_root>/Resources/<version>`.
///
/// Tries the preferred version first, then the best version-named folder under `Resources`
/// (three-part names before two-part, highest name last wins). A `game_root` that already is
/// a version directory is returned as-is.
#[derive(Debug, Clone)]
pub struct ResourcesGameLocator {
    game_root: Utf8PathBuf,
    preferred_version: Option<String>,
}

impl ResourcesGameLocator {
    pub fn new(game_root: impl Into<Utf8PathBuf>, preferred_version: Option<&str>) -> Self {
        Self {
            game_root: game_root.into(),
            preferred_version: preferred_version.map(str::to_string),
        }
    }

    pub fn game_root(&self) -> &Utf8Path {
        &self.game_root
    }
}

impl GameLocator for ResourcesGameLocator {
    fn version_directory(&self) -> Option<Utf8PathBuf> {
        if !self.game_root.is_dir() {
            tracing::debug!("Game root does not exist: {}", self.game_root);
            return None;
        }

        if self.game_root.file_name().is_some_and(looks_like_version) {
            tracing::info!("Game root is a version directory: {}", self.game_root);
            return Some(self.game_root.clone());
        }

        let resources = self.game_root.join(RESOURCES_DIR);
        if !resources.is_dir() {
            tracing::debug!("No {} folder under {}", RESOURCES_DIR, self.game_root);
            return None;
        }

        if let Some(version) = &self.preferred_version {
            let preferred = resources.join(version);
            if preferred.is_dir() {
                tracing::info!("Detected game version directory: {}", preferred);
                return Some(preferred);
            }
            tracing::debug!("Preferred version {} not installed", version);
        }

        let detected = detect_version_dir(&resources);
        match &detected {
            Some(dir) => tracing::info!("Detected game version directory: {}", dir),
            None => tracing::debug!("No version directory under {}", resources),
        }
        detected
    }
}

/// Best version-named directory directly under `resources`.
///
/// Three-part names win over two-part ones, then the numerically highest version.
pub fn detect_version_dir(resources: &Utf8Path) -> Option<Utf8PathBuf> {
    let entries = resources.read_dir_utf8().ok()?;

    entries
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_dir())
        .filter_map(|e| {
            let rank = version_rank(e.file_name())?;
            let key = version_key(e.file_name())?;
            Some(((rank, key), e.path().to_path_buf()))
        })
        .max_by(|(key_a, a), (key_b, b)| key_a.cmp(key_b).then_with(|| a.cmp(b)))
        .map(|(_, path)| path)
}
