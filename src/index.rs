//! Rendered-line to source-location mapping
use std::path::{Path, PathBuf};

/// Append-only map from rendered line number to (file path, line in file).
///
/// Header lines are recorded with line 0 so navigation opens the file at its
/// top. Entries are inserted in render order and cleared wholesale at the
/// start of the next run or when a run is cancelled.
#[derive(Debug, Default)]
pub struct ResultIndex {
    entries: Vec<(PathBuf, usize)>,
}

impl ResultIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn push(&mut self, path: PathBuf, line_in_file: usize) {
        self.entries.push((path, line_in_file));
    }

    /// Source location for a rendered line, if one was recorded.
    pub fn lookup(&self, rendered_line: usize) -> Option<(&Path, usize)> {
        self.entries
            .get(rendered_line)
            .map(|(path, line)| (path.as_path(), *line))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_hits_and_misses() {
        let mut index = ResultIndex::new();
        index.push(PathBuf::from("/tmp/a.txt"), 0);
        index.push(PathBuf::from("/tmp/a.txt"), 41);

        assert_eq!(index.len(), 2);
        let (path, line) = index.lookup(1).unwrap();
        assert_eq!(path, Path::new("/tmp/a.txt"));
        assert_eq!(line, 41);
        assert!(index.lookup(2).is_none());
    }

    #[test]
    fn clear_removes_everything() {
        let mut index = ResultIndex::new();
        index.push(PathBuf::from("x"), 1);
        index.clear();
        assert!(index.is_empty());
        assert!(index.lookup(0).is_none());
    }
}
