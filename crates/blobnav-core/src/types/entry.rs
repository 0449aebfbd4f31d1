//! A single listed item.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// One listed item: either a virtual directory or a blob.
///
/// `path` is always relative to the container root and never carries the
/// credential query. Directory paths keep their trailing delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    /// Display name (last path segment).
    pub name: String,
    /// Whether the entry is a virtual directory (group marker).
    pub is_directory: bool,
    /// Size in bytes; files only.
    pub size: Option<u64>,
    /// Last modification time; files only.
    pub last_modified: Option<Timestamp>,
    /// Full key or prefix relative to the container root.
    pub path: String,
    /// Direct object URL for files, navigation URL for directories.
    pub url: String,
}

impl Entry {
    /// Creates a directory entry.
    pub fn directory(
        name: impl Into<String>,
        path: impl Into<String>,
        url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            is_directory: true,
            size: None,
            last_modified: None,
            path: path.into(),
            url: url.into(),
        }
    }

    /// Creates a file entry.
    pub fn file(
        name: impl Into<String>,
        path: impl Into<String>,
        url: impl Into<String>,
        size: Option<u64>,
        last_modified: Option<Timestamp>,
    ) -> Self {
        Self {
            name: name.into(),
            is_directory: false,
            size,
            last_modified,
            path: path.into(),
            url: url.into(),
        }
    }
}
