use clap::{Parser, ValueEnum};
use std::fmt;
use std::path::PathBuf;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    /// Text to search for (plain substring, case-insensitive)
    pub pattern: String,

    /// Root directory to scan; `~` is expanded
    #[clap(default_value = ".")]
    pub path: String,

    /// Write the log to a file instead of stderr
    #[clap(long, value_parser)]
    pub log: Option<PathBuf>,

    /// Cap on rendered result lines
    #[clap(long, value_parser)]
    pub max_lines: Option<usize>,

    /// Skip files larger than this many MiB
    #[clap(long, value_parser)]
    pub max_size: Option<u64>,

    /// Syntax coloring of match lines
    #[clap(long, value_parser)]
    pub highlight: Option<HighlightArg>,

    /// Directory names to exclude, comma separated
    #[clap(long, value_parser, use_value_delimiter = true)]
    pub exclude: Option<Vec<String>>,
}

#[derive(ValueEnum, Clone, Debug, Default, PartialEq, Eq)]
pub enum HighlightArg {
    #[default]
    Off,
    /// Pick a lexer per file from its extension
    Detect,
}

impl fmt::Display for HighlightArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HighlightArg::Off => write!(f, "off"),
            HighlightArg::Detect => write!(f, "detect"),
        }
    }
}
