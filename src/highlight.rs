//! Optional per-token color styling of rendered result lines
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;
use syntect::easy::HighlightLines;
use syntect::highlighting::{Theme, ThemeSet};
use syntect::parsing::SyntaxSet;

pub type StyleId = u16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

/// One colored region of a rendered line. `column` and `len` are byte
/// offsets within the full rendered line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightSpan {
    pub column: usize,
    pub len: usize,
    pub color: Color,
}

/// A lexed token: byte offset and length within the tokenized text, plus a
/// style id resolvable through [`Lexer::style_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub start_column: usize,
    pub len: usize,
    pub style: StyleId,
}

/// External lexical analyzer, consumed as pure lookups.
pub trait Lexer {
    /// Lexer identifier for a file path, if one can be determined.
    fn detect_lexer(&self, path: &Path) -> Option<String>;
    fn tokenize(&self, text: &str, lexer: &str) -> Vec<Token>;
    fn style_table(&self, lexer: &str) -> HashMap<StyleId, Color>;
}

/// How the lexer for a result line is chosen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HighlightMode {
    #[default]
    Off,
    /// Always use one lexer, regardless of the file.
    Fixed(String),
    /// Detect the lexer from each file's path; detection failure means no
    /// highlighting for that line.
    Detect,
}

/// Computes color spans for rendered match lines.
pub struct LineHighlighter {
    lexer: Box<dyn Lexer>,
    mode: HighlightMode,
}

impl LineHighlighter {
    pub fn new(lexer: Box<dyn Lexer>, mode: HighlightMode) -> Self {
        Self { lexer, mode }
    }

    /// Spans for one rendered line; empty when highlighting is off or the
    /// lexer cannot be determined. Never fails.
    pub fn highlight(&self, rendered_line: &str, file: &Path) -> Vec<HighlightSpan> {
        let lexer_id = match &self.mode {
            HighlightMode::Off => return Vec::new(),
            HighlightMode::Fixed(id) => id.clone(),
            HighlightMode::Detect => match self.lexer.detect_lexer(file) {
                Some(id) => id,
                None => {
                    debug!("no lexer for {}", file.display());
                    return Vec::new();
                }
            },
        };
        highlight_line(rendered_line, &lexer_id, self.lexer.as_ref())
    }
}

/// Tokenizes the content of a rendered line (the part after the first `:`
/// plus one space) and shifts token offsets to full-line columns.
pub fn highlight_line(rendered: &str, lexer_id: &str, lexer: &dyn Lexer) -> Vec<HighlightSpan> {
    let Some(colon) = rendered.find(':') else {
        return Vec::new();
    };
    let content_start = colon + 2;
    if content_start >= rendered.len() || !rendered.is_char_boundary(content_start) {
        return Vec::new();
    }
    let content = &rendered[content_start..];

    let tokens = lexer.tokenize(content, lexer_id);
    let styles = lexer.style_table(lexer_id);
    tokens
        .into_iter()
        .filter_map(|token| {
            let color = *styles.get(&token.style)?;
            Some(HighlightSpan {
                column: content_start + token.start_column,
                len: token.len,
                color,
            })
        })
        .collect()
}

/// Syntect-backed [`Lexer`]: default syntax definitions, one fixed theme,
/// foreground colors interned into stable style ids.
pub struct SyntectLexer {
    syntaxes: SyntaxSet,
    theme: Theme,
    interner: Mutex<StyleInterner>,
}

#[derive(Default)]
struct StyleInterner {
    by_color: HashMap<(u8, u8, u8), StyleId>,
    table: HashMap<StyleId, Color>,
}

impl StyleInterner {
    fn intern(&mut self, fg: syntect::highlighting::Color) -> StyleId {
        let key = (fg.r, fg.g, fg.b);
        if let Some(&id) = self.by_color.get(&key) {
            return id;
        }
        let id = self.table.len() as StyleId;
        self.by_color.insert(key, id);
        self.table.insert(
            id,
            Color {
                r: fg.r,
                g: fg.g,
                b: fg.b,
            },
        );
        id
    }
}

impl SyntectLexer {
    pub fn new() -> Self {
        let themes = ThemeSet::load_defaults();
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            theme: themes.themes["base16-ocean.dark"].clone(),
            interner: Mutex::new(StyleInterner::default()),
        }
    }

    /// Lexer id for plain, uncolored text; always resolvable.
    pub fn plain_text_id(&self) -> String {
        self.syntaxes.find_syntax_plain_text().name.clone()
    }
}

impl Default for SyntectLexer {
    fn default() -> Self {
        Self::new()
    }
}

impl Lexer for SyntectLexer {
    fn detect_lexer(&self, path: &Path) -> Option<String> {
        let ext = path.extension()?.to_str()?;
        self.syntaxes
            .find_syntax_by_extension(ext)
            .map(|syntax| syntax.name.clone())
    }

    fn tokenize(&self, text: &str, lexer: &str) -> Vec<Token> {
        let Some(syntax) = self.syntaxes.find_syntax_by_name(lexer) else {
            return Vec::new();
        };
        let mut highlighter = HighlightLines::new(syntax, &self.theme);
        let Ok(regions) = highlighter.highlight_line(text, &self.syntaxes) else {
            return Vec::new();
        };

        let mut interner = self.interner.lock().unwrap();
        let mut tokens = Vec::with_capacity(regions.len());
        let mut column = 0;
        for (style, piece) in regions {
            tokens.push(Token {
                start_column: column,
                len: piece.len(),
                style: interner.intern(style.foreground),
            });
            column += piece.len();
        }
        tokens
    }

    fn style_table(&self, _lexer: &str) -> HashMap<StyleId, Color> {
        self.interner.lock().unwrap().table.clone()
    }
}
