//! Navigator state and the row view model.

use crate::models::FileSystemEntry;

use super::breadcrumb::{Breadcrumb, breadcrumbs};

/// Result of checking the manually typed path.
///
/// `Unknown` covers both "not checked yet" and "empty input": neither shows
/// the invalid hint and neither can be submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathValidity {
    #[default]
    Unknown,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NavigatorState {
    /// Empty string means the virtual roots view
    pub current_path: String,
    /// Server order, parent entry first when present
    pub entries: Vec<FileSystemEntry>,
    pub loading: bool,
    pub error: Option<String>,
    pub manual_path_input: String,
    pub manual_path_validity: PathValidity,
}

impl NavigatorState {
    pub fn is_roots_view(&self) -> bool {
        self.current_path.is_empty()
    }

    /// Roots are not directories, so nothing can be selected there.
    pub fn can_select(&self) -> bool {
        !self.is_roots_view() && !self.loading
    }

    pub fn can_submit_manual_path(&self) -> bool {
        self.manual_path_validity == PathValidity::Valid && !self.manual_path_input.trim().is_empty()
    }

    /// Hint shown under the manual path input, if any.
    pub fn manual_path_hint(&self) -> Option<&'static str> {
        match self.manual_path_validity {
            PathValidity::Invalid => Some("Path does not exist or is not a directory"),
            _ => None,
        }
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        breadcrumbs(&self.current_path)
    }

    pub fn rows(&self) -> Vec<EntryRow> {
        self.entries.iter().map(EntryRow::from_entry).collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryIcon {
    Parent,
    Folder,
    File,
}

impl EntryIcon {
    pub fn glyph(self) -> &'static str {
        match self {
            EntryIcon::Parent => "↰",
            EntryIcon::Folder => "📁",
            EntryIcon::File => "📄",
        }
    }
}

/// How one entry is displayed. Unreadable entries stay in the list, marked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryRow {
    pub label: String,
    pub path: String,
    pub icon: EntryIcon,
    pub clickable: bool,
    pub read_only: bool,
    pub inaccessible: bool,
}

impl EntryRow {
    pub fn from_entry(entry: &FileSystemEntry) -> Self {
        let icon = if entry.parent {
            EntryIcon::Parent
        } else if entry.directory {
            EntryIcon::Folder
        } else {
            EntryIcon::File
        };
        Self {
            label: entry.name.clone(),
            path: entry.path.clone(),
            icon,
            clickable: entry.is_navigable(),
            read_only: !entry.parent && entry.readable && !entry.writable,
            inaccessible: !entry.readable,
        }
    }
}
