//! Per-file streaming scan for query matches
use crate::filter;
use crate::host::Ticker;
use log::debug;
use memchr::memmem::Finder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const UTF8_BOM: &[u8] = b"\xef\xbb\xbf";

/// Lazy iterator of `(zero_based_line, raw_line_text)` matches in one file.
///
/// Yields nothing when the file is oversized, hidden, or cannot be opened.
/// Any read or decode error ends this file's scan silently; the overall run
/// is never aborted by a single file. The yielded text keeps its trailing
/// line terminator. Matching is a case-insensitive substring test.
pub struct FileScanner {
    reader: Option<BufReader<File>>,
    needle: Finder<'static>,
    line_no: usize,
}

impl FileScanner {
    pub fn new(path: &Path, query: &str, max_size_bytes: u64, ticker: &dyn Ticker) -> Self {
        // One scheduling checkpoint per file opened.
        ticker.tick();

        let needle = Finder::new(query.to_lowercase().as_bytes()).into_owned();
        Self {
            reader: open_gated(path, max_size_bytes),
            needle,
            line_no: 0,
        }
    }
}

/// Opens the file if it passes the size and hidden gates, positioned past
/// any UTF-8 byte-order mark.
fn open_gated(path: &Path, max_size_bytes: u64) -> Option<BufReader<File>> {
    let meta = std::fs::metadata(path).ok()?;
    if meta.len() > max_size_bytes {
        debug!("skipping oversized file {} ({} bytes)", path.display(), meta.len());
        return None;
    }
    if filter::is_hidden(path) {
        return None;
    }

    let mut reader = BufReader::new(File::open(path).ok()?);
    let starts_with_bom = reader.fill_buf().ok()?.starts_with(UTF8_BOM);
    if starts_with_bom {
        reader.consume(UTF8_BOM.len());
    }
    Some(reader)
}

impl Iterator for FileScanner {
    type Item = (usize, String);

    fn next(&mut self) -> Option<(usize, String)> {
        let reader = self.reader.as_mut()?;
        loop {
            let mut line = String::new();
            match reader.read_line(&mut line) {
                Ok(0) => {
                    self.reader = None;
                    return None;
                }
                Ok(_) => {
                    let current = self.line_no;
                    self.line_no += 1;
                    if self.needle.find(line.to_lowercase().as_bytes()).is_some() {
                        return Some((current, line));
                    }
                }
                Err(e) => {
                    // Invalid UTF-8 or I/O failure: stop scanning this file.
                    debug!("scan aborted: {e}");
                    self.reader = None;
                    return None;
                }
            }
        }
    }
}
