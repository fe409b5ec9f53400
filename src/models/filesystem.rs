//! Filesystem browsing DTOs for the directory picker.
//!
//! - `FileSystemEntry`: one node of a listing, or the synthetic `..` entry
//! - `DirectoryListing`: listing of one directory, parent entry first
//! - `RootsResponse`: platform roots (drive letters, or `/`)
//! - `PathValidation`: result of checking a manually typed path
//!
//! Used by: DirectoryNavigator and the `ls`/`roots`/`validate` commands

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileSystemEntry {
    pub path: String,
    pub name: String,
    pub directory: bool,
    #[serde(default)]
    pub parent: bool,
    #[serde(default)]
    pub readable: bool,
    #[serde(default)]
    pub writable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    /// Epoch milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<i64>,
}

impl FileSystemEntry {
    /// Whether activating this entry should navigate into it.
    pub fn is_navigable(&self) -> bool {
        self.directory && self.readable
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectoryListing {
    pub current_path: String,
    #[serde(default)]
    pub entries: Vec<FileSystemEntry>,
}

impl DirectoryListing {
    /// At most one parent entry, and it comes first.
    pub fn parent_entry_is_well_placed(&self) -> bool {
        let parents = self.entries.iter().filter(|e| e.parent).count();
        match parents {
            0 => true,
            1 => self.entries[0].parent,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomeResponse {
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootsResponse {
    #[serde(default)]
    pub roots: Vec<FileSystemEntry>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PathValidation {
    pub exists: bool,
    pub is_directory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_file: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_read: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub can_write: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_path: Option<String>,
}

impl PathValidation {
    pub fn is_valid_directory(&self) -> bool {
        self.exists && self.is_directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_deserializes_backend_json() {
        let json = r#"{"path":"/home/user/a.txt","name":"a.txt","directory":false,
            "parent":false,"readable":true,"writable":false,"size":12,"lastModified":1700000000000}"#;
        let entry: FileSystemEntry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.size, Some(12));
        assert_eq!(entry.last_modified, Some(1_700_000_000_000));
        assert!(!entry.is_navigable());
    }

    #[test]
    fn test_root_entry_without_parent_flag() {
        // Root entries from /filesystem/roots omit size and may omit parent
        let json = r#"{"path":"/","name":"/","directory":true,"readable":true,"writable":false}"#;
        let entry: FileSystemEntry = serde_json::from_str(json).unwrap();
        assert!(!entry.parent);
        assert!(entry.is_navigable());
    }

    #[test]
    fn test_parent_placement_check() {
        let mk = |name: &str, parent: bool| FileSystemEntry {
            path: format!("/{name}"),
            name: name.to_string(),
            directory: true,
            parent,
            readable: true,
            writable: true,
            size: None,
            last_modified: None,
        };
        let good = DirectoryListing {
            current_path: "/a".into(),
            entries: vec![mk("..", true), mk("b", false)],
        };
        let bad = DirectoryListing {
            current_path: "/a".into(),
            entries: vec![mk("b", false), mk("..", true)],
        };
        assert!(good.parent_entry_is_well_placed());
        assert!(!bad.parent_entry_is_well_placed());
    }
}
