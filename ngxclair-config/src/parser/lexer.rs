//! Lexer for nginx configuration
//!
//! Turns source text into a flat token list. Follows nginx's own rules:
//! - Whitespace separates words, `{` `}` `;` are tokens of their own
//! - `#` at the start of a word begins a comment running to end of line
//! - A backslash escapes the next character; both are kept verbatim
//! - `"..."` and `'...'` spans become one quoted token
//! - `${...}` is kept whole, braces and all
//!
//! Directives whose argument is an embedded script (see [`SubLexer`]) hand
//! the character stream to a registered sub-lexer right after their name.

use crate::error::{ConfigError, ErrorKind};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub text: String,
    pub line: usize,
    /// The token came from a quoted span, so `{`, `}`, `;` and `#` in it are
    /// plain text
    pub is_quoted: bool,
}

impl Token {
    pub fn new(text: impl Into<String>, line: usize, is_quoted: bool) -> Self {
        Self {
            text: text.into(),
            line,
            is_quoted,
        }
    }

    /// Unquoted `{`
    pub fn is_block_open(&self) -> bool {
        !self.is_quoted && self.text == "{"
    }

    /// Unquoted `}`
    pub fn is_block_close(&self) -> bool {
        !self.is_quoted && self.text == "}"
    }

    /// Unquoted `{`, `}` or `;`
    pub fn is_terminator(&self) -> bool {
        !self.is_quoted && matches!(self.text.as_str(), "{" | "}" | ";")
    }

    /// Unquoted word starting with `#`
    pub fn is_comment(&self) -> bool {
        !self.is_quoted && self.text.starts_with('#')
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_quoted {
            write!(f, "{:?}", self.text)
        } else {
            write!(f, "{}", self.text)
        }
    }
}

/// Lexer failure, before it is tagged with a file name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct LexError {
    pub kind: ErrorKind,
    pub reason: String,
    pub line: usize,
}

impl LexError {
    pub fn new(kind: ErrorKind, reason: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            reason: reason.into(),
            line,
        }
    }

    pub fn into_config_error(self, file: &str) -> ConfigError {
        ConfigError::new(self.kind, self.reason, file, self.line)
    }
}

// ============================================================
// Character stream
// ============================================================

/// One lexical character: a plain char, or a backslash and the char it escapes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Char(char),
    Escaped(char),
}

impl Glyph {
    pub fn is_whitespace(self) -> bool {
        matches!(self, Glyph::Char(c) if c.is_whitespace())
    }

    /// Whether the glyph ends a line (an escaped newline does too)
    pub fn is_newline(self) -> bool {
        matches!(self, Glyph::Char('\n') | Glyph::Escaped('\n'))
    }

    pub fn push_to(self, out: &mut String) {
        match self {
            Glyph::Char(c) => out.push(c),
            Glyph::Escaped(c) => {
                out.push('\\');
                out.push(c);
            }
        }
    }
}

/// Character cursor with line tracking, shared with sub-lexers
///
/// The line reported with a glyph is the line *after* it has been consumed,
/// so a newline glyph already reports the following line.
#[derive(Debug)]
pub struct CharStream<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    last: Option<(usize, usize)>,
}

impl<'a> CharStream<'a> {
    pub fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            line: 1,
            last: None,
        }
    }

    /// Current line
    pub fn line(&self) -> usize {
        self.line
    }

    /// Unconsumed input
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    /// Consume `n` bytes of [`CharStream::rest`], counting newlines.
    /// `n` must fall on a char boundary.
    pub fn advance(&mut self, n: usize) {
        let end = (self.pos + n).min(self.src.len());
        self.line += self.src[self.pos..end].matches('\n').count();
        self.last = None;
        self.pos = end;
    }

    /// Step back over the glyph last returned by [`CharStream::next_glyph`]
    pub fn unread(&mut self) {
        if let Some((pos, line)) = self.last.take() {
            self.pos = pos;
            self.line = line;
        }
    }

    /// Next glyph and the line it leaves the stream on
    pub fn next_glyph(&mut self) -> Option<(Glyph, usize)> {
        let start = self.pos;
        let mut chars = self.src[start..].chars();
        let first = chars.next()?;
        let glyph = match first {
            '\\' => match chars.next() {
                Some(escaped) => Glyph::Escaped(escaped),
                None => Glyph::Char('\\'),
            },
            c => Glyph::Char(c),
        };

        self.last = Some((start, self.line));
        self.pos += match glyph {
            Glyph::Char(c) => c.len_utf8(),
            Glyph::Escaped(c) => 1 + c.len_utf8(),
        };
        if glyph.is_newline() {
            self.line += 1;
        }
        Some((glyph, self.line))
    }

    /// Skip whitespace glyphs and return the first other one
    pub fn next_non_whitespace(&mut self) -> Option<(Glyph, usize)> {
        loop {
            let (glyph, line) = self.next_glyph()?;
            if !glyph.is_whitespace() {
                return Some((glyph, line));
            }
        }
    }
}

// ============================================================
// Sub-lexers
// ============================================================

/// Takes over lexing for directives whose argument is an embedded script
///
/// Called right after the directive name has been emitted, with the stream
/// positioned just past it. Returns the tokens that stand in for the block,
/// ending with a `;` terminator.
pub trait SubLexer: Send + Sync {
    fn lex(&self, stream: &mut CharStream<'_>, directive: &str) -> Result<Vec<Token>, LexError>;
}

/// Lexer settings: the sub-lexer registry
#[derive(Clone)]
pub struct LexOptions {
    sub_lexers: HashMap<String, Arc<dyn SubLexer>>,
}

impl LexOptions {
    /// No sub-lexers; every block is lexed as nginx syntax
    pub fn empty() -> Self {
        Self {
            sub_lexers: HashMap::new(),
        }
    }

    /// Route `names` to `lexer`
    pub fn register<I, S>(&mut self, names: I, lexer: Arc<dyn SubLexer>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.sub_lexers.insert(name.into(), lexer.clone());
        }
    }

    pub fn sub_lexer(&self, name: &str) -> Option<&Arc<dyn SubLexer>> {
        self.sub_lexers.get(name)
    }
}

impl Default for LexOptions {
    /// Registers the Lua block sub-lexer
    fn default() -> Self {
        let mut options = Self::empty();
        options.register(
            crate::parser::lua::LUA_BLOCK_DIRECTIVES.iter().copied(),
            Arc::new(crate::parser::lua::LuaBlockLexer),
        );
        options
    }
}

impl fmt::Debug for LexOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.sub_lexers.keys().collect();
        names.sort();
        f.debug_struct("LexOptions").field("sub_lexers", &names).finish()
    }
}

// ============================================================
// Lexer
// ============================================================

struct Lexer<'a, 'o> {
    stream: CharStream<'a>,
    options: &'o LexOptions,
    tokens: Vec<Token>,
    word: String,
    word_line: usize,
    /// Inside `${...}`
    expanding: bool,
    next_is_directive: bool,
}

impl<'a, 'o> Lexer<'a, 'o> {
    fn new(source: &'a str, options: &'o LexOptions) -> Self {
        Self {
            stream: CharStream::new(source),
            options,
            tokens: Vec::new(),
            word: String::new(),
            word_line: 1,
            expanding: false,
            next_is_directive: true,
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some((glyph, line)) = self.stream.next_glyph() {
            self.step(glyph, line)?;
        }
        self.flush_word()?;
        Ok(self.tokens)
    }

    fn step(&mut self, glyph: Glyph, line: usize) -> Result<(), LexError> {
        if self.expanding {
            glyph.push_to(&mut self.word);
            if glyph == Glyph::Char('}') {
                self.expanding = false;
            }
            return Ok(());
        }

        if glyph.is_whitespace() {
            return self.flush_word();
        }

        if self.word.is_empty() && glyph == Glyph::Char('#') {
            self.lex_comment(line);
            return Ok(());
        }

        if self.word.is_empty() {
            self.word_line = line;
        }

        if glyph == Glyph::Char('{') && self.word.ends_with('$') {
            self.next_is_directive = false;
            self.expanding = true;
            self.word.push('{');
            return Ok(());
        }

        match glyph {
            Glyph::Char(quote @ ('"' | '\'')) => {
                // a quote inside a word is an ordinary character
                if !self.word.is_empty() {
                    self.word.push(quote);
                    return Ok(());
                }
                let text = self.lex_quoted(quote, line)?;
                self.tokens.push(Token::new(text.clone(), line, true));
                self.after_word(&text)
            }
            Glyph::Char(c @ ('{' | '}' | ';')) => {
                if !self.word.is_empty() {
                    if c == '{' && self.pending_sub_lexer() {
                        // `name{` with no space: let the sub-lexer see the brace
                        self.stream.unread();
                        return self.flush_word();
                    }
                    self.flush_plain();
                }
                self.tokens.push(Token::new(c.to_string(), line, false));
                self.next_is_directive = true;
                Ok(())
            }
            _ => {
                glyph.push_to(&mut self.word);
                Ok(())
            }
        }
    }

    fn lex_comment(&mut self, line: usize) {
        let mut text = String::from("#");
        while let Some((glyph, _)) = self.stream.next_glyph() {
            if glyph.is_newline() {
                break;
            }
            glyph.push_to(&mut text);
        }
        if text.ends_with('\r') {
            text.pop();
        }
        self.tokens.push(Token::new(text, line, false));
    }

    fn lex_quoted(&mut self, quote: char, start_line: usize) -> Result<String, LexError> {
        let mut text = String::new();
        loop {
            match self.stream.next_glyph() {
                None => {
                    return Err(LexError::new(
                        ErrorKind::Unterminated,
                        format!("unexpected end of file, expecting closing {}", quote),
                        start_line,
                    ));
                }
                Some((Glyph::Char(c), _)) if c == quote => return Ok(text),
                Some((Glyph::Escaped(c), _)) if c == quote => text.push(c),
                Some((glyph, _)) => glyph.push_to(&mut text),
            }
        }
    }

    fn pending_sub_lexer(&self) -> bool {
        self.next_is_directive && self.options.sub_lexer(&self.word).is_some()
    }

    /// Emit the pending word without sub-lexer dispatch
    fn flush_plain(&mut self) {
        let text = std::mem::take(&mut self.word);
        self.tokens.push(Token::new(text, self.word_line, false));
    }

    /// Emit the pending word, then hand over to a sub-lexer if it names one
    fn flush_word(&mut self) -> Result<(), LexError> {
        if self.word.is_empty() {
            return Ok(());
        }
        let text = std::mem::take(&mut self.word);
        self.tokens.push(Token::new(text.clone(), self.word_line, false));
        self.after_word(&text)
    }

    fn after_word(&mut self, text: &str) -> Result<(), LexError> {
        if self.next_is_directive {
            if let Some(sub) = self.options.sub_lexer(text).cloned() {
                let produced = sub.lex(&mut self.stream, text)?;
                self.tokens.extend(produced);
                self.next_is_directive = true;
                return Ok(());
            }
        }
        self.next_is_directive = false;
        Ok(())
    }
}

/// Fail on a `}` with no matching `{`, or on an unclosed `{`
pub fn check_balance(tokens: &[Token]) -> Result<(), LexError> {
    let mut depth: usize = 0;
    for token in tokens {
        if token.is_block_open() {
            depth += 1;
        } else if token.is_block_close() {
            if depth == 0 {
                return Err(LexError::new(
                    ErrorKind::UnbalancedBraces,
                    "unexpected \"}\"",
                    token.line,
                ));
            }
            depth -= 1;
        }
    }

    if depth > 0 {
        let line = tokens.last().map(|t| t.line).unwrap_or(1);
        return Err(LexError::new(
            ErrorKind::UnbalancedBraces,
            "unexpected end of file, expecting \"}\"",
            line,
        ));
    }
    Ok(())
}

/// Tokenize nginx configuration source
pub fn tokenize(source: &str, options: &LexOptions) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source, options).run()?;
    check_balance(&tokens)?;
    tracing::trace!(count = tokens.len(), "tokenized");
    Ok(tokens)
}

/// Tokenize and tag any failure with `file`
pub fn tokenize_file(source: &str, file: &str, options: &LexOptions) -> Result<Vec<Token>, ConfigError> {
    tokenize(source, options).map_err(|e| e.into_config_error(file))
}
