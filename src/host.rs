//! Host collaborator seams: result view, file opening, cooperative yielding
use crate::highlight::HighlightSpan;
use std::io;
use std::path::Path;

/// Cooperative-scheduling checkpoint.
///
/// The walker calls this once per directory visited and the scanner once per
/// file opened so a single-threaded host event loop stays responsive. It is
/// a scheduling hook only; it produces no data.
pub trait Ticker {
    fn tick(&self);
}

/// No-op ticker for hosts without an event loop (CLI, tests).
pub struct NullTicker;

impl Ticker for NullTicker {
    fn tick(&self) {}
}

/// Opens a file and places the cursor, on behalf of navigation.
pub trait FileOpener {
    fn open_file(&mut self, path: &Path) -> io::Result<()>;
    fn set_cursor(&mut self, line: usize);
}

/// The line-addressable widget search output is streamed into.
///
/// Mirrors the surface of the host editor control: append-only text lines,
/// a caret, a read-only toggle and a one-line status display.
pub trait ResultView {
    fn line_count(&self) -> usize;
    fn clear(&mut self);
    fn append_line(&mut self, text: &str);
    fn set_line(&mut self, index: usize, text: &str);
    fn caret(&self) -> (usize, usize);
    /// (column, row), both zero-based.
    fn set_caret(&mut self, col: usize, row: usize);
    fn set_read_only(&mut self, read_only: bool);
    fn focus(&mut self);
    fn set_status(&mut self, text: &str);
    /// Paint color spans onto an already-appended line. Optional.
    fn paint(&mut self, _line: usize, _spans: &[HighlightSpan]) {}
}

/// In-memory [`ResultView`] used by the CLI and by tests.
#[derive(Debug, Default)]
pub struct BufferView {
    lines: Vec<String>,
    status: String,
    caret: (usize, usize),
    read_only: bool,
    focused: bool,
    paints: Vec<(usize, Vec<HighlightSpan>)>,
}

impl BufferView {
    pub fn new() -> Self {
        Self {
            status: "READY".to_string(),
            ..Self::default()
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn paints(&self) -> &[(usize, Vec<HighlightSpan>)] {
        &self.paints
    }
}

impl ResultView for BufferView {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn clear(&mut self) {
        self.lines.clear();
        self.paints.clear();
        self.caret = (0, 0);
    }

    fn append_line(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }

    fn set_line(&mut self, index: usize, text: &str) {
        if let Some(line) = self.lines.get_mut(index) {
            *line = text.to_string();
        }
    }

    fn caret(&self) -> (usize, usize) {
        self.caret
    }

    fn set_caret(&mut self, col: usize, row: usize) {
        self.caret = (col, row);
    }

    fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    fn focus(&mut self) {
        self.focused = true;
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn paint(&mut self, line: usize, spans: &[HighlightSpan]) {
        self.paints.push((line, spans.to_vec()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_view_starts_ready() {
        let view = BufferView::new();
        assert_eq!(view.status(), "READY");
        assert_eq!(view.line_count(), 0);
    }

    #[test]
    fn append_and_set_line() {
        let mut view = BufferView::new();
        view.append_line("first");
        view.append_line("second");
        view.set_line(1, "changed");
        assert_eq!(view.lines(), &["first", "changed"]);
        // out-of-range set is a no-op
        view.set_line(9, "nope");
        assert_eq!(view.line_count(), 2);
    }

    #[test]
    fn clear_resets_lines_and_caret() {
        let mut view = BufferView::new();
        view.append_line("x");
        view.set_caret(3, 1);
        view.clear();
        assert_eq!(view.line_count(), 0);
        assert_eq!(view.caret(), (0, 0));
    }
}
