//! The local mod pack library: a folder holding one copy of every imported pack.

use crate::models::ModPack;
use crate::services::InstallError;
use crate::services::copy::copy_tree;
use crate::services::patterns::is_hidden;
use crate::services::scanner::ModPackScanner;
use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

const ARCHIVE_EXTENSION: &str = "zip";

#[derive(Debug, Clone)]
pub struct ModLibrary {
    dir: Utf8PathBuf,
}

impl ModLibrary {
    pub fn new(dir: impl Into<Utf8PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Utf8Path {
        &self.dir
    }

    /// Copy a mod pack folder into the library and scan the copy.
    ///
    /// An earlier copy with the same folder name is replaced. Archives are rejected; they
    /// have to be extracted first.
    ///
    /// # Errors
    ///
    /// - [`InstallError::UnsupportedArchive`] for `.zip` files
    /// - [`InstallError::InvalidModPack`] when `source` holds no recognizable pack
    /// - [`InstallError::CopyFailed`] / [`InstallError::Io`] when the copy fails
    pub fn import(
        &self,
        source: &Utf8Path,
        scanner: &ModPackScanner,
    ) -> Result<ModPack, InstallError> {
        if is_archive(source) {
            tracing::warn!("Refusing to import archive {}", source);
            return Err(InstallError::UnsupportedArchive(source.to_path_buf()));
        }

        if !source.is_dir() || scanner.find_mod_root(source).is_none() {
            return Err(InstallError::InvalidModPack(source.to_path_buf()));
        }

        let Some(name) = source.file_name() else {
            return Err(InstallError::InvalidModPack(source.to_path_buf()));
        };
        let destination = self.dir.join(name);

        if same_location(source, &destination) {
            tracing::debug!("{} is already in the library", source);
            return scanner.scan(&destination);
        }

        fs::create_dir_all(&self.dir).map_err(|e| {
            InstallError::io(format!("Failed to create library folder {}", self.dir), e)
        })?;

        if destination.exists() {
            tracing::info!("Replacing existing library copy {}", destination);
            fs::remove_dir_all(&destination).map_err(|e| {
                InstallError::io(format!("Failed to remove old copy {}", destination), e)
            })?;
        }

        let copied = copy_tree(source, &destination)?;
        tracing::info!("Imported {} into library ({} files)", name, copied);

        scanner.scan(&destination)
    }

    /// Scan every pack folder in the library. Folders that are not packs are skipped.
    pub fn scan_all(&self, scanner: &ModPackScanner) -> Vec<ModPack> {
        let Ok(entries) = self.dir.read_dir_utf8() else {
            tracing::debug!("Library folder {} not readable", self.dir);
            return Vec::new();
        };

        let mut folders: Vec<Utf8PathBuf> = entries
            .filter_map(|e| e.ok())
            .filter(|e| !is_hidden(e.file_name()) && e.path().is_dir())
            .map(|e| e.path().to_path_buf())
            .collect();
        folders.sort();

        folders
            .iter()
            .filter_map(|folder| match scanner.scan(folder) {
                Ok(pack) => Some(pack),
                Err(e) => {
                    tracing::warn!("Skipping library folder {}: {}", folder, e);
                    None
                }
            })
            .collect()
    }
}

fn is_archive(path: &Utf8Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case(ARCHIVE_EXTENSION))
}

fn same_location(a: &Utf8Path, b: &Utf8Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
