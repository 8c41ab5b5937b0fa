//! Mapped, recursive, overwriting copy from a mod pack into the game directory.

use crate::models::{InstallProgress, MappingTable};
use crate::services::InstallError;
use crate::services::patterns::is_hidden;
use camino::{Utf8DirEntry, Utf8Path};
use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct CopyOptions {
    /// Directories nested deeper than this below a mapping's source folder are skipped
    pub max_depth: usize,
    /// Report what would be copied without writing to the destination
    pub dry_run: bool,
}

impl Default for CopyOptions {
    fn default() -> Self {
        Self {
            max_depth: 64,
            dry_run: false,
        }
    }
}

/// Copies every mapped folder of a mod pack over the game's version directory.
///
/// Entries are processed one at a time, in mapping order and then by name. The progress
/// callback runs inline after every copied file, once when each mapping starts and once at
/// completion, so a slow callback stalls the copy.
///
/// The copy is not transactional: when a file fails, everything copied before it stays.
#[derive(Debug, Clone, Default)]
pub struct CopyEngine {
    options: CopyOptions,
}

impl CopyEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CopyOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &CopyOptions {
        &self.options
    }

    /// Copy `mod_root/<source>` to `game_root/<target>` for every mapping.
    ///
    /// Mappings whose source folder is missing are skipped. `total_files` only seeds the
    /// progress snapshot; it usually counts the whole pack, so `files_processed` may finish
    /// below it.
    ///
    /// # Errors
    ///
    /// [`InstallError::CopyFailed`] naming the entry that failed. The last snapshot passed to
    /// `on_progress` carries the same message in its `error` field.
    pub fn copy_mapped<F>(
        &self,
        mod_root: &Utf8Path,
        game_root: &Utf8Path,
        mappings: &MappingTable,
        total_files: usize,
        mut on_progress: F,
    ) -> Result<InstallProgress, InstallError>
    where
        F: FnMut(&InstallProgress),
    {
        let mut progress = InstallProgress::new(total_files);

        for mapping in mappings {
            let source = mod_root.join(&mapping.source_folder);
            let target = game_root.join(&mapping.target_folder);

            if !source.is_dir() {
                tracing::warn!(
                    "Skipping {} - not found in mod pack",
                    mapping.source_folder
                );
                continue;
            }

            tracing::info!(
                "{} {} -> {}",
                if self.options.dry_run { "Would copy" } else { "Copying" },
                mapping.source_folder,
                mapping.target_folder
            );

            progress.current_file = mapping.source_folder.clone();
            on_progress(&progress);

            let mut ancestors = HashSet::new();
            let result = self.copy_dir(
                &source,
                &target,
                mapping.recursive,
                0,
                &mut ancestors,
                &mut progress,
                &mut on_progress,
            );

            if let Err(e) = result {
                tracing::error!("Copy of {} failed: {}", mapping.source_folder, e);
                progress.error = Some(e.to_string());
                on_progress(&progress);
                return Err(e);
            }
        }

        progress.is_complete = true;
        on_progress(&progress);

        tracing::info!(
            "Copy complete: {} files processed (pack total {})",
            progress.files_processed,
            progress.total_files
        );

        Ok(progress)
    }

    #[allow(clippy::too_many_arguments)]
    fn copy_dir<F>(
        &self,
        source: &Utf8Path,
        target: &Utf8Path,
        recursive: bool,
        depth: usize,
        ancestors: &mut HashSet<PathBuf>,
        progress: &mut InstallProgress,
        on_progress: &mut F,
    ) -> Result<(), InstallError>
    where
        F: FnMut(&InstallProgress),
    {
        if depth > self.options.max_depth {
            tracing::warn!("Skipping {}: deeper than {} levels", source, self.options.max_depth);
            return Ok(());
        }

        // `ancestors` holds the canonical directories on the current path only. A symlink back
        // up the tree is a cycle; two links to the same sibling directory are not.
        let real =
            fs::canonicalize(source).map_err(|e| InstallError::copy_failed(source.as_str(), e))?;
        if !ancestors.insert(real.clone()) {
            tracing::warn!("Skipping {}: symlink cycle back to {}", source, real.display());
            return Ok(());
        }

        let result =
            self.copy_entries(source, target, recursive, depth, ancestors, progress, on_progress);
        ancestors.remove(&real);
        result
    }

    #[allow(clippy::too_many_arguments)]
    fn copy_entries<F>(
        &self,
        source: &Utf8Path,
        target: &Utf8Path,
        recursive: bool,
        depth: usize,
        ancestors: &mut HashSet<PathBuf>,
        progress: &mut InstallProgress,
        on_progress: &mut F,
    ) -> Result<(), InstallError>
    where
        F: FnMut(&InstallProgress),
    {
        if !self.options.dry_run {
            fs::create_dir_all(target)
                .map_err(|e| InstallError::copy_failed(target.as_str(), e))?;
        }

        for entry in sorted_entries(source)? {
            let name = entry.file_name();
            if is_hidden(name) {
                tracing::debug!("Skipping hidden entry {}", entry.path());
                continue;
            }

            let target_item = target.join(name);
            let metadata =
                fs::metadata(entry.path()).map_err(|e| InstallError::copy_failed(name, e))?;

            if metadata.is_file() {
                if !self.options.dry_run {
                    replace_file(entry.path(), &target_item)
                        .map_err(|e| InstallError::copy_failed(name, e))?;
                }
                tracing::debug!("Copied {} -> {}", entry.path(), target_item);

                progress.current_file = name.to_string();
                progress.files_processed += 1;
                on_progress(progress);
            } else if metadata.is_dir() && recursive {
                self.copy_dir(
                    entry.path(),
                    &target_item,
                    true,
                    depth + 1,
                    ancestors,
                    progress,
                    on_progress,
                )?;
            }
        }

        Ok(())
    }
}

fn sorted_entries(dir: &Utf8Path) -> Result<Vec<Utf8DirEntry>, InstallError> {
    let mut entries = dir
        .read_dir_utf8()
        .and_then(|entries| entries.collect::<io::Result<Vec<_>>>())
        .map_err(|e| InstallError::copy_failed(dir.as_str(), e))?;
    entries.sort_by(|a, b| a.file_name().cmp(b.file_name()));
    Ok(entries)
}

/// Full overwrite: whatever sits at `dst` is removed before copying.
fn replace_file(src: &Utf8Path, dst: &Utf8Path) -> io::Result<()> {
    match fs::symlink_metadata(dst) {
        Ok(meta) if meta.is_dir() => fs::remove_dir_all(dst)?,
        Ok(_) => fs::remove_file(dst)?,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => return Err(e),
    }
    fs::copy(src, dst)?;
    Ok(())
}

/// Copy a whole directory tree, hidden entries included. Returns the number of files copied.
///
/// Used for backup snapshots, where the folder must be mirrored as-is. Symlinks are recreated
/// as links rather than followed.
pub fn copy_tree(src: &Utf8Path, dst: &Utf8Path) -> Result<usize, InstallError> {
    fs::create_dir_all(dst).map_err(|e| InstallError::copy_failed(dst.as_str(), e))?;

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| {
            let item = e
                .path()
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| src.to_string());
            InstallError::copy_failed(item, io::Error::other(e))
        })?;

        let Some(src_path) = Utf8Path::from_path(entry.path()) else {
            tracing::warn!("Skipping non UTF-8 path {}", entry.path().display());
            continue;
        };
        let Ok(rel_path) = src_path.strip_prefix(src) else {
            continue;
        };
        let dst_path = dst.join(rel_path);

        let failed = |e| InstallError::copy_failed(rel_path.as_str(), e);

        if entry.file_type().is_symlink() {
            if let Some(parent) = dst_path.parent() {
                fs::create_dir_all(parent).map_err(failed)?;
            }
            copy_symlink(src_path, &dst_path).map_err(failed)?;
        } else if entry.file_type().is_dir() {
            fs::create_dir_all(&dst_path).map_err(failed)?;
        } else if src_path.is_file() {
            if let Some(parent) = dst_path.parent() {
                fs::create_dir_all(parent).map_err(failed)?;
            }
            fs::copy(src_path, &dst_path).map_err(failed)?;
            copied += 1;
        } else {
            tracing::debug!("Skipping {}: not a regular file", src_path);
        }
    }

    Ok(copied)
}

#[cfg(unix)]
fn copy_symlink(src: &Utf8Path, dst: &Utf8Path) -> io::Result<()> {
    let link_target = fs::read_link(src)?;
    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink(link_target, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Utf8Path, dst: &Utf8Path) -> io::Result<()> {
    if src.is_file() {
        fs::copy(src, dst)?;
    } else {
        tracing::warn!("Symlink {} not preserved, it will be missing after restore", src);
    }
    Ok(())
}
