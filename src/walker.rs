//! Lazy depth-first enumeration of candidate files
use crate::filter::{self, PathFilter};
use crate::host::Ticker;
use log::debug;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Depth-first, pre-order walk yielding absolute file paths under a root.
///
/// Hidden directories and directories with an excluded path segment are
/// pruned without visiting their contents. Per-entry errors (permission
/// denied, vanished path, filesystem loops) skip that entry and continue
/// with its siblings. Construct a new walker per run; it is not restartable.
///
/// Symlinks are followed; walkdir's ancestor check turns a symlink cycle
/// into a per-entry error, which is skipped like any other.
pub struct DirectoryWalker<'a> {
    inner: walkdir::IntoIter,
    filter: &'a PathFilter,
    ticker: &'a dyn Ticker,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(root: &Path, filter: &'a PathFilter, ticker: &'a dyn Ticker) -> Self {
        Self {
            inner: WalkDir::new(root).follow_links(true).into_iter(),
            filter,
            ticker,
        }
    }
}

impl Iterator for DirectoryWalker<'_> {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        loop {
            let entry = match self.inner.next()? {
                Ok(entry) => entry,
                Err(e) => {
                    debug!("skipping unreadable entry: {e}");
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                // One scheduling checkpoint per directory visited.
                self.ticker.tick();

                let hidden = entry.depth() > 0 && filter::is_hidden(entry.path());
                if hidden || self.filter.is_excluded_dir(entry.path()) {
                    debug!("pruning directory {}", entry.path().display());
                    self.inner.skip_current_dir();
                }
                continue;
            }

            if entry.file_type().is_file() {
                return Some(entry.into_path());
            }
            // Sockets, fifos and the like are not searchable.
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::NullTicker;
    use std::cell::Cell;
    use std::fs;
    use tempfile::TempDir;

    struct CountingTicker {
        ticks: Cell<usize>,
    }

    impl Ticker for CountingTicker {
        fn tick(&self) {
            self.ticks.set(self.ticks.get() + 1);
        }
    }

    fn collect(root: &Path, filter: &PathFilter) -> Vec<PathBuf> {
        let mut files: Vec<_> = DirectoryWalker::new(root, filter, &NullTicker).collect();
        files.sort();
        files
    }

    #[test]
    fn yields_files_depth_first() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/b.txt"), "b").unwrap();

        let filter = PathFilter::new([".git"]);
        let files = collect(dir.path(), &filter);
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.ends_with("a.txt")));
        assert!(files.iter().any(|f| f.ends_with("sub/b.txt")));
    }

    #[test]
    fn excluded_directory_contributes_nothing() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".git/objects")).unwrap();
        fs::write(dir.path().join(".git/objects/deep.txt"), "hit").unwrap();
        fs::write(dir.path().join("kept.txt"), "hit").unwrap();

        let filter = PathFilter::new([".git"]);
        let files = collect(dir.path(), &filter);
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("kept.txt"));
    }

    #[cfg(not(windows))]
    #[test]
    fn hidden_directory_is_pruned_but_hidden_file_is_yielded() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".cache")).unwrap();
        fs::write(dir.path().join(".cache/inside.txt"), "x").unwrap();
        // Hidden files are the scanner's concern, not the walker's.
        fs::write(dir.path().join(".hidden_file"), "x").unwrap();
        fs::write(dir.path().join("plain.txt"), "x").unwrap();

        let filter = PathFilter::new([".git"]);
        let files = collect(dir.path(), &filter);
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|f| f.ends_with(".hidden_file")));
        assert!(files.iter().any(|f| f.ends_with("plain.txt")));
    }

    #[test]
    fn excluded_root_yields_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("__trash");
        fs::create_dir(&root).unwrap();
        fs::write(root.join("junk.txt"), "x").unwrap();

        let filter = PathFilter::new(["__trash"]);
        assert!(collect(&root, &filter).is_empty());
    }

    #[test]
    fn nonexistent_root_yields_nothing() {
        let filter = PathFilter::new([".git"]);
        let files = collect(Path::new("/definitely/not/here"), &filter);
        assert!(files.is_empty());
    }

    #[test]
    fn ticks_once_per_directory() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("one")).unwrap();
        fs::create_dir(dir.path().join("two")).unwrap();
        fs::write(dir.path().join("one/f.txt"), "x").unwrap();

        let filter = PathFilter::new([".git"]);
        let ticker = CountingTicker { ticks: Cell::new(0) };
        let _: Vec<_> = DirectoryWalker::new(dir.path(), &filter, &ticker).collect();
        // root + two subdirectories
        assert_eq!(ticker.ticks.get(), 3);
    }
}
