//! Path exclusion and hidden-entry checks
use std::collections::HashSet;
use std::path::{Component, Path};

/// Decides whether a directory should be skipped during enumeration.
///
/// A directory is excluded when any segment of its path matches a name in
/// the exclusion set. The check is pure and never fails on nonexistent
/// paths.
#[derive(Debug, Clone)]
pub struct PathFilter {
    excluded: HashSet<String>,
}

impl PathFilter {
    pub fn new<I, S>(excluded: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            excluded: excluded.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true when any path segment matches an excluded name.
    pub fn is_excluded_dir(&self, path: &Path) -> bool {
        path.components().any(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .is_some_and(|name| self.excluded.contains(name)),
            _ => false,
        })
    }
}

/// Whether a file or directory is hidden.
///
/// On Windows this is the filesystem hidden-attribute bit; elsewhere a
/// leading `.` in the base name.
#[cfg(windows)]
pub fn is_hidden(path: &Path) -> bool {
    use std::os::windows::fs::MetadataExt;
    const FILE_ATTRIBUTE_HIDDEN: u32 = 0x2;

    std::fs::metadata(path)
        .map(|meta| meta.file_attributes() & FILE_ATTRIBUTE_HIDDEN != 0)
        .unwrap_or(false)
}

#[cfg(not(windows))]
pub fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}
