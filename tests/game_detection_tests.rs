//! Integration tests for locating the game's version directory
//!
//! These tests verify:
//! - `Resources/<version>` lookup with and without a preferred version
//! - Backup folders and non-version folders are never picked
//! - Locators plugged into the orchestrator

use camino::Utf8PathBuf;
use modinstaller::models::MappingTable;
use modinstaller::services::game_detection::detect_version_dir;
use modinstaller::services::{
    FixedGameLocator, GameLocator, InstallError, InstallOrchestrator, ResourcesGameLocator,
};
use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

#[test]
fn test_detects_only_version_folders() {
    let (_guard, root) = temp_root();
    let resources = root.join("Resources");
    fs::create_dir_all(resources.join(".ModInstaller_Backup")).unwrap();
    fs::create_dir_all(resources.join("Shared")).unwrap();
    fs::write(resources.join("9.9.9"), "a file, not a folder").unwrap();

    assert_eq!(detect_version_dir(&resources), None);

    fs::create_dir_all(resources.join("1.60")).unwrap();
    assert_eq!(detect_version_dir(&resources), Some(resources.join("1.60")));

    fs::create_dir_all(resources.join("1.59.3")).unwrap();
    assert_eq!(
        detect_version_dir(&resources),
        Some(resources.join("1.59.3"))
    );
}

#[test]
fn test_locator_without_preferred_version() {
    let (_guard, root) = temp_root();
    fs::create_dir_all(root.join("Resources/1.60.1")).unwrap();

    let locator = ResourcesGameLocator::new(root.clone(), None);
    assert_eq!(locator.game_root(), root);
    assert_eq!(
        locator.version_directory(),
        Some(root.join("Resources/1.60.1"))
    );
}

#[test]
fn test_missing_game_root() {
    let (_guard, root) = temp_root();
    let locator = ResourcesGameLocator::new(root.join("not-installed"), Some("1.60.1"));
    assert_eq!(locator.version_directory(), None);
}

#[test]
fn test_orchestrator_follows_locator() {
    let (_guard, root) = temp_root();
    let version_dir = root.join("Resources/1.60.1");
    fs::create_dir_all(version_dir.join("assetbundle")).unwrap();

    let orchestrator = InstallOrchestrator::new(
        Arc::new(ResourcesGameLocator::new(root.clone(), Some("1.60.1"))),
        MappingTable::default(),
    );
    assert_eq!(orchestrator.game_version_dir().unwrap(), version_dir);

    orchestrator.create_backup(|_| {}).unwrap();
    assert!(root.join("Resources/.ModInstaller_Backup/assetbundle").is_dir());

    // The backup folder next to the version folder is never mistaken for a version
    let locator = ResourcesGameLocator::new(root.clone(), Some("2.0.0"));
    assert_eq!(locator.version_directory(), Some(version_dir));
}

#[test]
fn test_unlocated_game_fails_every_operation() {
    let orchestrator =
        InstallOrchestrator::new(Arc::new(FixedGameLocator::none()), MappingTable::default());

    assert!(matches!(
        orchestrator.game_version_dir(),
        Err(InstallError::GameNotFound)
    ));
    assert!(matches!(
        orchestrator.create_backup(|_| {}),
        Err(InstallError::GameNotFound)
    ));
    assert!(matches!(
        orchestrator.restore_backup(|_| {}),
        Err(InstallError::GameNotFound)
    ));
    assert!(!orchestrator.has_backup());
}
