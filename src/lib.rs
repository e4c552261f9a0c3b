pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod highlight;
pub mod host;
pub mod index;
pub mod scanner;
pub mod session;
pub mod walker;

pub use crate::config::Config;
pub use crate::error::{Result, SearchLiteError};
pub use crate::filter::PathFilter;
pub use crate::highlight::{
    HighlightMode, HighlightSpan, Lexer, LineHighlighter, SyntectLexer,
};
pub use crate::host::{BufferView, FileOpener, NullTicker, ResultView, Ticker};
pub use crate::index::ResultIndex;
pub use crate::scanner::FileScanner;
pub use crate::session::{
    ResultEvent, RunOutcome, SearchQuery, SearchSession, SessionHandle, StartOutcome,
};
pub use crate::walker::DirectoryWalker;
