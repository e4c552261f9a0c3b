//! Search orchestration: one cancelable run at a time
use crate::config::Config;
use crate::filter::PathFilter;
use crate::highlight::LineHighlighter;
use crate::host::{FileOpener, ResultView, Ticker};
use crate::index::ResultIndex;
use crate::scanner::FileScanner;
use crate::walker::DirectoryWalker;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::time::Duration;

/// An immutable query: non-empty text plus a root path expanded from user
/// shorthand and normalized to end with a separator.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    pub text: String,
    root: PathBuf,
    root_display: String,
}

impl SearchQuery {
    pub fn new(text: &str, root: &str) -> Self {
        let expanded = expand_home(root);
        let mut root_display = expanded.to_string_lossy().into_owned();
        if !root_display.ends_with(std::path::MAIN_SEPARATOR) {
            root_display.push(std::path::MAIN_SEPARATOR);
        }
        Self {
            text: text.to_string(),
            root: expanded,
            root_display,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path with the root prefix trimmed, for display.
    pub fn relative_display(&self, file: &Path) -> String {
        let full = file.to_string_lossy();
        full.strip_prefix(&self.root_display)
            .unwrap_or(&full)
            .to_string()
    }
}

/// Expands a leading `~` to the user's home directory.
fn expand_home(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix('~') {
        if let Some(home) = dirs::home_dir() {
            if rest.is_empty() {
                return home;
            }
            if let Some(tail) = rest.strip_prefix(['/', '\\']) {
                return home.join(tail);
            }
        }
    }
    PathBuf::from(path)
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// The walker was exhausted; all output kept.
    Completed,
    /// The rendered-line cap was reached; output so far kept.
    Capped,
    /// Cancellation was observed; all output discarded.
    Cancelled,
}

/// Result of asking the session to start a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// Input was empty; a status message was shown and no run started.
    Rejected,
    /// A run is in flight. It has been asked to cancel; retry after the
    /// given delay so it can observe cancellation at its next checkpoint.
    Deferred(Duration),
    Finished(RunOutcome),
}

/// Ordered events describing one run's output stream.
///
/// A `FileHeader` always precedes the `MatchLine`s of its file; files appear
/// in enumeration order, lines in ascending order. `Done` is always last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultEvent {
    FileHeader { relative_path: String },
    MatchLine { line_in_file: usize, text: String },
    Status { message: String },
    Done { reason: RunOutcome },
}

impl ResultEvent {
    /// The exact text appended to the result view, if this event renders.
    pub fn rendered_line(&self) -> Option<String> {
        match self {
            ResultEvent::FileHeader { relative_path } => Some(format!("<{relative_path}>:")),
            ResultEvent::MatchLine { line_in_file, text } => {
                Some(format!(" <{}>: {}", line_in_file + 1, text.trim_end()))
            }
            _ => None,
        }
    }
}

/// Cloneable handle shared with host callbacks (cancel button, dialog
/// close, supersession). Cancellation is advisory: the run polls it at its
/// checkpoints and exits at the next one.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    cancel: Arc<AtomicBool>,
    running: Arc<AtomicBool>,
}

impl SessionHandle {
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.load(Ordering::Relaxed)
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    fn begin(&self) {
        self.cancel.store(false, Ordering::Relaxed);
        self.running.store(true, Ordering::Relaxed);
    }

    fn finish(&self) {
        self.running.store(false, Ordering::Relaxed);
    }
}

/// Orchestrates walker and scanner into a single cancelable run, enforcing
/// the rendered-line cap and owning the result view and index.
///
/// State machine: Idle -> Running -> {Completed, Capped, Cancelled} -> Idle.
/// At most one run produces output at a time; a request arriving mid-run
/// cancels the current run and is deferred.
pub struct SearchSession<V: ResultView> {
    config: Config,
    filter: PathFilter,
    view: V,
    index: ResultIndex,
    highlighter: Option<LineHighlighter>,
    handle: SessionHandle,
    events: Option<Sender<ResultEvent>>,
}

impl<V: ResultView> SearchSession<V> {
    pub fn new(config: Config, view: V) -> Self {
        let filter = PathFilter::new(config.ignore.excluded_dirs.iter().cloned());
        Self {
            config,
            filter,
            view,
            index: ResultIndex::new(),
            highlighter: None,
            handle: SessionHandle::default(),
            events: None,
        }
    }

    pub fn with_highlighter(mut self, highlighter: LineHighlighter) -> Self {
        self.highlighter = Some(highlighter);
        self
    }

    /// Subscribes an observer to the run's ordered event stream.
    pub fn set_event_sink(&mut self, sink: Sender<ResultEvent>) {
        self.events = Some(sink);
    }

    /// Handle for host-side cancellation (cancel button, dialog close).
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn index(&self) -> &ResultIndex {
        &self.index
    }

    /// Asks for a search. Empty input is rejected with a status message; a
    /// request while a run is in flight cancels it and defers the new one.
    pub fn request(&mut self, text: &str, root: &str, ticker: &dyn Ticker) -> StartOutcome {
        let text = text.trim();
        let root = root.trim();
        if text.is_empty() || root.is_empty() {
            self.view.set_status("Please enter something");
            self.handle.cancel();
            return StartOutcome::Rejected;
        }

        if self.handle.is_running() {
            self.handle.cancel();
            debug!("search in flight; deferring restart");
            return StartOutcome::Deferred(self.config.search.restart_delay());
        }

        let query = SearchQuery::new(text, root);
        StartOutcome::Finished(self.run(&query, ticker))
    }

    fn run(&mut self, query: &SearchQuery, ticker: &dyn Ticker) -> RunOutcome {
        info!(
            "search started: {:?} under {}",
            query.text,
            query.root().display()
        );
        self.handle.begin();
        self.view.set_read_only(false);
        self.view.clear();
        self.index.clear();

        let outcome = self.scan_loop(query, ticker);

        match outcome {
            RunOutcome::Completed => self.emit_status("FINISHED"),
            RunOutcome::Capped => {
                let cap = self.config.search.max_result_lines;
                self.emit_status(&format!("FINISHED, showing only {cap} lines"));
            }
            RunOutcome::Cancelled => {
                // A cancelled run leaves no trace.
                self.index.clear();
                self.view.clear();
            }
        }
        self.send_event(ResultEvent::Done { reason: outcome });

        self.view.set_read_only(true);
        self.handle.finish();
        info!("search ended: {outcome:?}, {} lines", self.view.line_count());
        outcome
    }

    fn scan_loop(&mut self, query: &SearchQuery, ticker: &dyn Ticker) -> RunOutcome {
        let cap = self.config.search.max_result_lines;
        let max_bytes = self.config.ignore.max_file_size_bytes();
        let filter = self.filter.clone();

        for file in DirectoryWalker::new(query.root(), &filter, ticker) {
            if self.handle.is_cancelled() {
                return RunOutcome::Cancelled;
            }

            let relative = query.relative_display(&file);
            self.emit_status(&format!("SEARCHING.. {relative}"));

            let mut header_emitted = false;
            for (line_in_file, text) in FileScanner::new(&file, &query.text, max_bytes, ticker) {
                if self.handle.is_cancelled() {
                    return RunOutcome::Cancelled;
                }

                // A match costs one line, plus one for its header if that
                // is still pending. Stop before any append that would push
                // past the cap, so no dangling header is ever rendered.
                let needed = if header_emitted { 1 } else { 2 };
                if self.view.line_count() + needed > cap {
                    return RunOutcome::Capped;
                }

                if !header_emitted {
                    self.append(
                        &file,
                        0,
                        ResultEvent::FileHeader {
                            relative_path: relative.clone(),
                        },
                    );
                    header_emitted = true;
                }
                self.append(&file, line_in_file, ResultEvent::MatchLine { line_in_file, text });
            }
        }

        RunOutcome::Completed
    }

    /// Renders one event, records its index entry and paints it.
    fn append(&mut self, file: &Path, line_in_file: usize, event: ResultEvent) {
        let rendered = match event.rendered_line() {
            Some(rendered) => rendered,
            None => return,
        };
        let is_match_line = matches!(event, ResultEvent::MatchLine { .. });

        self.view.append_line(&rendered);
        self.index.push(file.to_path_buf(), line_in_file);
        self.send_event(event);

        let row = self.view.line_count() - 1;
        if is_match_line {
            // First match line of the run: park the caret right after the
            // ": " prefix so the host can edit or navigate immediately.
            if row == 1 {
                if let Some(colon) = rendered.find(':') {
                    self.view.set_caret(colon + 2, 1);
                }
            }
            if let Some(highlighter) = self.highlighter.as_ref() {
                let spans = highlighter.highlight(&rendered, file);
                if !spans.is_empty() {
                    self.view.paint(row, &spans);
                }
            }
        }
    }

    fn emit_status(&mut self, message: &str) {
        self.view.set_status(message);
        self.send_event(ResultEvent::Status {
            message: message.to_string(),
        });
    }

    fn send_event(&self, event: ResultEvent) {
        if let Some(sink) = &self.events {
            let _ = sink.send(event);
        }
    }

    /// Opens the source location recorded for a rendered line. A miss (no
    /// entry for that line) is a no-op, as is a collaborator failure.
    pub fn navigate(&mut self, rendered_line: usize, opener: &mut dyn FileOpener) {
        let (path, line) = match self.index.lookup(rendered_line) {
            Some((path, line)) => (path.to_path_buf(), line),
            None => return,
        };

        if let Err(e) = opener.open_file(&path) {
            debug!("navigation to {} failed: {e}", path.display());
            return;
        }
        opener.set_cursor(line);
        self.view.focus();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{BufferView, NullTicker};

    fn session() -> SearchSession<BufferView> {
        SearchSession::new(Config::default(), BufferView::new())
    }

    #[test]
    fn empty_input_is_rejected_with_status() {
        let mut s = session();
        assert_eq!(s.request("", "/tmp", &NullTicker), StartOutcome::Rejected);
        assert_eq!(s.view().status(), "Please enter something");

        let mut s = session();
        assert_eq!(s.request("foo", "   ", &NullTicker), StartOutcome::Rejected);
    }

    #[test]
    fn request_during_a_run_cancels_and_defers() {
        let mut s = session();
        let handle = s.handle();
        handle.begin();

        let outcome = s.request("foo", "/tmp", &NullTicker);
        assert_eq!(outcome, StartOutcome::Deferred(Duration::from_millis(50)));
        assert!(handle.is_cancelled());

        // once the old run finishes, the retry goes through
        handle.finish();
        assert!(matches!(
            s.request("foo", "/nonexistent-root", &NullTicker),
            StartOutcome::Finished(RunOutcome::Completed)
        ));
    }

    #[test]
    fn rendered_line_grammar() {
        let header = ResultEvent::FileHeader {
            relative_path: "src/a.txt".to_string(),
        };
        assert_eq!(header.rendered_line().unwrap(), "<src/a.txt>:");

        let matched = ResultEvent::MatchLine {
            line_in_file: 41,
            text: "foo bar  \n".to_string(),
        };
        assert_eq!(matched.rendered_line().unwrap(), " <42>: foo bar");

        assert!(ResultEvent::Status { message: "x".into() }.rendered_line().is_none());
    }

    #[test]
    fn query_root_gets_trailing_separator() {
        let query = SearchQuery::new("x", "/tmp/root");
        let rel = query.relative_display(Path::new("/tmp/root/sub/file.txt"));
        assert_eq!(rel, "sub/file.txt");
        // unrelated paths are displayed as-is
        let other = query.relative_display(Path::new("/elsewhere/file.txt"));
        assert_eq!(other, "/elsewhere/file.txt");
    }

    #[test]
    fn tilde_expands_to_home() {
        if let Some(home) = dirs::home_dir() {
            let query = SearchQuery::new("x", "~/projects");
            assert_eq!(query.root(), home.join("projects"));
            let bare = SearchQuery::new("x", "~");
            assert_eq!(bare.root(), home);
        }
    }
}
