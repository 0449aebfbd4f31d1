//! Breadcrumb navigation trail.

use serde::{Deserialize, Serialize};

use crate::path::{DELIMITER, navigation_url};

/// Label of the first breadcrumb of every trail.
pub const ROOT_LABEL: &str = "root";

/// One step of the navigation trail from the container root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breadcrumb {
    /// Display label (path segment, or `root`).
    #[serde(rename = "name")]
    pub label: String,
    /// Accumulated virtual path, delimiter-terminated; empty for the root.
    pub path: String,
    /// Navigation URL that lists this path.
    pub url: String,
}

impl Breadcrumb {
    /// Returns the root breadcrumb `("root", "", "/")`.
    pub fn root() -> Self {
        Self {
            label: ROOT_LABEL.to_owned(),
            path: String::new(),
            url: navigation_url(""),
        }
    }

    /// Builds the trail for a normalized prefix, root first.
    ///
    /// The trail holds one breadcrumb per delimiter-separated segment of the
    /// prefix, plus the root.
    pub fn trail(prefix: &str) -> Vec<Self> {
        let mut breadcrumbs = vec![Self::root()];
        let mut accumulated = String::new();

        for segment in prefix.split(DELIMITER).filter(|s| !s.is_empty()) {
            accumulated.push_str(segment);
            accumulated.push(DELIMITER);
            breadcrumbs.push(Self {
                label: segment.to_owned(),
                path: accumulated.clone(),
                url: navigation_url(&accumulated),
            });
        }

        breadcrumbs
    }
}
