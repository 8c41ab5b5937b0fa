use serde::{Deserialize, Serialize};

/// A single moddable unit: a folder inside a mod pack and the folder it replaces
/// inside the game's version directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMapping {
    /// Path relative to the mod pack root
    pub source_folder: String,

    /// Path relative to the game's version directory
    pub target_folder: String,

    /// Whether nested directories below the source folder are copied
    #[serde(default = "default_recursive")]
    pub recursive: bool,
}

fn default_recursive() -> bool {
    true
}

impl FileMapping {
    /// Mapping whose source and target share the same relative path.
    pub fn same_path(folder: &str, recursive: bool) -> Self {
        Self {
            source_folder: folder.to_string(),
            target_folder: folder.to_string(),
            recursive,
        }
    }

    /// First path component of the source folder.
    ///
    /// This is the name looked for when deciding whether a directory is a mod pack root.
    pub fn signature_folder(&self) -> &str {
        self.source_folder
            .split(['/', '\\'])
            .find(|part| !part.is_empty())
            .unwrap_or(&self.source_folder)
    }
}

/// Ordered list of mappings. The order is the install order.
///
/// Target folders are expected to be disjoint; overlapping targets are not checked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingTable {
    mappings: Vec<FileMapping>,
}

impl MappingTable {
    pub fn new(mappings: Vec<FileMapping>) -> Self {
        Self { mappings }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FileMapping> {
        self.mappings.iter()
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }

    /// Distinct signature folder names, in table order.
    pub fn signature_folders(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::with_capacity(self.mappings.len());
        for mapping in &self.mappings {
            let name = mapping.signature_folder();
            if !names.contains(&name) {
                names.push(name);
            }
        }
        names
    }
}

impl Default for MappingTable {
    /// The six asset trees the game lets mods replace.
    fn default() -> Self {
        Self::new(vec![
            FileMapping::same_path("AssetRefs/Hero", true),
            FileMapping::same_path("Prefab_Characters", true),
            FileMapping::same_path("assetbundle", true),
            FileMapping::same_path("Databin/Client", true),
            FileMapping::same_path("Ages/Prefab_Characters/Prefab_Hero", true),
            FileMapping::same_path("Languages/VN_Garena_VN", true),
        ])
    }
}

impl<'a> IntoIterator for &'a MappingTable {
    type Item = &'a FileMapping;
    type IntoIter = std::slice::Iter<'a, FileMapping>;

    fn into_iter(self) -> Self::IntoIter {
        self.mappings.iter()
    }
}

impl From<Vec<FileMapping>> for MappingTable {
    fn from(mappings: Vec<FileMapping>) -> Self {
        Self::new(mappings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_order() {
        let table = MappingTable::default();
        let sources: Vec<&str> = table.iter().map(|m| m.source_folder.as_str()).collect();
        assert_eq!(
            sources,
            vec![
                "AssetRefs/Hero",
                "Prefab_Characters",
                "assetbundle",
                "Databin/Client",
                "Ages/Prefab_Characters/Prefab_Hero",
                "Languages/VN_Garena_VN",
            ]
        );
        assert!(table.iter().all(|m| m.recursive));
        assert!(table.iter().all(|m| m.source_folder == m.target_folder));
    }

    #[test]
    fn test_signature_folders() {
        let table = MappingTable::default();
        assert_eq!(
            table.signature_folders(),
            vec![
                "AssetRefs",
                "Prefab_Characters",
                "assetbundle",
                "Databin",
                "Ages",
                "Languages",
            ]
        );
    }

    #[test]
    fn test_signature_folders_deduplicated() {
        let table = MappingTable::new(vec![
            FileMapping::same_path("Databin/Client", true),
            FileMapping::same_path("Databin/Server", false),
        ]);
        assert_eq!(table.signature_folders(), vec!["Databin"]);
    }

    #[test]
    fn test_recursive_defaults_to_true_in_yaml() {
        let yaml = "- source_folder: assetbundle\n  target_folder: assetbundle\n";
        let table: MappingTable = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(table.len(), 1);
        assert!(table.iter().next().unwrap().recursive);
    }
}
