//! Integration tests for ModPackScanner
//!
//! These tests verify:
//! - Root detection for top-level, version-nested and deeply nested packs
//! - Rejection of folders without signature folders
//! - Exact file count and size measurement
//! - Name, author and version derivation

use camino::{Utf8Path, Utf8PathBuf};
use modinstaller::models::{FileMapping, MappingTable};
use modinstaller::services::{InstallError, ModPackScanner, RootStrategy};
use std::fs;
use tempfile::TempDir;

fn temp_root() -> (TempDir, Utf8PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let path = Utf8PathBuf::try_from(temp_dir.path().to_path_buf()).unwrap();
    (temp_dir, path)
}

fn write_file(path: &Utf8Path, len: usize) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, vec![b'x'; len]).unwrap();
}

fn scanner() -> ModPackScanner {
    ModPackScanner::new(MappingTable::default())
}

#[test]
fn test_signature_folders_at_top_level() {
    let (_guard, root) = temp_root();
    let pack = root.join("Skin Pack by Tester");
    fs::create_dir_all(pack.join("assetbundle")).unwrap();
    fs::create_dir_all(pack.join("Prefab_Characters")).unwrap();

    let result = scanner().scan(&pack).unwrap();

    assert_eq!(result.root_path, pack);
    assert_eq!(result.name, "Skin Pack by Tester");
    assert_eq!(result.author, "Tester");
    assert_eq!(result.version, "1.60.1");
    assert!(!result.installed);
}

#[test]
fn test_version_child_depth_one() {
    let (_guard, root) = temp_root();
    let pack = root.join("Pack");
    let version_dir = pack.join("1.59.2");
    fs::create_dir_all(version_dir.join("Databin/Client")).unwrap();
    fs::create_dir_all(version_dir.join("Languages/VN_Garena_VN")).unwrap();

    let detected = scanner().find_mod_root(&pack).unwrap();
    assert_eq!(detected.strategy, RootStrategy::VersionChild);

    let result = scanner().scan(&pack).unwrap();
    assert_eq!(result.root_path, version_dir);
    assert_eq!(result.version, "1.59.2");
    assert_eq!(result.name, "Pack");
}

#[test]
fn test_version_child_depth_two() {
    let (_guard, root) = temp_root();
    let pack = root.join("Pack");
    let version_dir = pack.join("Resources/1.60.1");
    fs::create_dir_all(version_dir.join("assetbundle")).unwrap();
    fs::create_dir_all(version_dir.join("AssetRefs/Hero")).unwrap();

    let result = scanner().scan(&pack).unwrap();
    assert_eq!(result.root_path, version_dir);
    assert_eq!(result.version, "1.60.1");
}

#[test]
fn test_selected_version_folder_names_the_version() {
    let (_guard, root) = temp_root();
    let version_dir = root.join("1.58");
    fs::create_dir_all(version_dir.join("assetbundle")).unwrap();
    fs::create_dir_all(version_dir.join("Ages")).unwrap();

    let result = scanner().scan(&version_dir).unwrap();
    assert_eq!(result.root_path, version_dir);
    assert_eq!(result.version, "1.58");
}

#[test]
fn test_no_signature_folders_is_invalid() {
    let (_guard, root) = temp_root();
    let pack = root.join("Holiday Photos");
    write_file(&pack.join("2024/beach.jpg"), 10);
    write_file(&pack.join("1.60.1/notes.txt"), 10);

    let result = scanner().scan(&pack);
    assert!(matches!(result, Err(InstallError::InvalidModPack(_))));
}

#[test]
fn test_single_signature_folder_is_not_enough() {
    let (_guard, root) = temp_root();
    let pack = root.join("Pack");
    fs::create_dir_all(pack.join("assetbundle")).unwrap();

    assert!(matches!(
        scanner().scan(&pack),
        Err(InstallError::InvalidModPack(_))
    ));
}

#[test]
fn test_single_mapping_table_needs_one_signature() {
    let (_guard, root) = temp_root();
    let pack = root.join("Pack");
    fs::create_dir_all(pack.join("assetbundle")).unwrap();

    let scanner = ModPackScanner::new(MappingTable::new(vec![FileMapping::same_path(
        "assetbundle",
        true,
    )]));
    assert_eq!(scanner.scan(&pack).unwrap().root_path, pack);
}

#[test]
fn test_measures_exact_count_and_size() {
    let (_guard, root) = temp_root();
    let pack = root.join("Pack");
    write_file(&pack.join("assetbundle/a.bytes"), 100);
    write_file(&pack.join("assetbundle/nested/b.bytes"), 200);
    write_file(&pack.join("Databin/Client/c.bytes"), 300);

    let result = scanner().scan(&pack).unwrap();
    assert_eq!(result.file_count, 3);
    assert_eq!(result.size_bytes, 600);
    assert_eq!(result.size_formatted(), "600.00 B");
}

#[test]
fn test_measure_counts_whole_root_not_just_mapped_folders() {
    let (_guard, root) = temp_root();
    let pack = root.join("Pack");
    write_file(&pack.join("assetbundle/a.bytes"), 10);
    write_file(&pack.join("Prefab_Characters/b.bytes"), 10);
    write_file(&pack.join("readme.txt"), 5);

    let result = scanner().scan(&pack).unwrap();
    assert_eq!(result.file_count, 3);
    assert_eq!(result.size_bytes, 25);
}

#[test]
fn test_scans_get_distinct_ids() {
    let (_guard, root) = temp_root();
    let pack = root.join("Pack");
    fs::create_dir_all(pack.join("assetbundle")).unwrap();
    fs::create_dir_all(pack.join("Databin")).unwrap();

    let first = scanner().scan(&pack).unwrap();
    let second = scanner().scan(&pack).unwrap();
    assert_ne!(first.id, second.id);
    assert_eq!(first.root_path, second.root_path);
}
