//! Configuration builder
//!
//! Turns a parsed tree back into nginx syntax. Arguments are quoted only when
//! they would not survive a re-parse unquoted. Comments that shared a line
//! with the preceding statement stay on that line.

use crate::parser::ast::{Node, NodeId, Tree};
use crate::parser::lua::{LuaBlockBuilder, LUA_BLOCK_DIRECTIVES};
use ngxclair_core::settings::FormatSettings;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Banner emitted before built output when [`BuildOptions::header`] is set
pub const HEADER: &str = concat!(
    "# This config was built by ngxclair ",
    env!("CARGO_PKG_VERSION"),
    ".\n",
    "# It was generated from a parsed payload; comments may have been dropped.\n",
    "# Edit the source payload rather than this file.\n",
    "\n",
);

/// Renders statements whose argument is not nginx syntax
pub trait ExternalBuilder: Send + Sync {
    /// The complete statement text, without indentation
    fn build(&self, node: &Node) -> String;
}

/// Output layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// Spaces per nesting level
    pub indent: usize,
    /// One tab per level instead of spaces
    pub tabs: bool,
    /// Prefix the output with [`HEADER`]
    pub header: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            indent: 4,
            tabs: false,
            header: false,
        }
    }
}

impl BuildOptions {
    pub fn from_settings(settings: &FormatSettings) -> Self {
        Self {
            indent: settings.indent,
            tabs: settings.tabs,
            header: settings.header,
        }
    }

    fn padding(&self) -> String {
        if self.tabs {
            "\t".to_string()
        } else {
            " ".repeat(self.indent)
        }
    }
}

// ========================================
// Quoting
// ========================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unit {
    Char(char),
    /// Backslash and the character after it
    Escaped(char),
    /// `${`
    ExpandOpen,
    /// `$` not followed by `{`
    Dollar,
}

fn units(arg: &str) -> Vec<Unit> {
    let mut out = Vec::with_capacity(arg.len());
    let mut chars = arg.chars().peekable();
    while let Some(c) = chars.next() {
        let unit = match c {
            '\\' => match chars.next() {
                Some(next) => Unit::Escaped(next),
                None => Unit::Char('\\'),
            },
            '$' if chars.peek() == Some(&'{') => {
                chars.next();
                Unit::ExpandOpen
            }
            '$' => Unit::Dollar,
            c => Unit::Char(c),
        };
        out.push(unit);
    }
    out
}

/// Whether `arg` must be quoted to lex back as the same single argument
pub fn needs_quote(arg: &str) -> bool {
    let units = units(arg);
    let Some((first, rest)) = units.split_first() else {
        return true;
    };

    match first {
        Unit::Char(c) if c.is_whitespace() || matches!(c, '{' | '}' | ';' | '"' | '\'' | '#') => {
            return true;
        }
        // an argument cannot start with a variable expansion
        Unit::ExpandOpen => return true,
        _ => {}
    }

    let mut expanding = false;
    for unit in rest {
        match unit {
            Unit::Char(c) if c.is_whitespace() || matches!(c, '{' | ';' | '"' | '\'') => return true,
            Unit::ExpandOpen if expanding => return true,
            Unit::ExpandOpen => expanding = true,
            Unit::Char('}') if expanding => expanding = false,
            Unit::Char('}') => return true,
            _ => {}
        }
    }

    expanding || matches!(units.last(), Some(Unit::Char('\\') | Unit::Dollar))
}

/// `arg` as it should appear in built output
///
/// Quoted arguments are wrapped in double quotes with bare `"` and a
/// trailing lone `\` escaped. Existing escape sequences are passed through.
pub fn enquote(arg: &str) -> String {
    if !needs_quote(arg) {
        return arg.to_string();
    }
    let mut out = String::with_capacity(arg.len() + 2);
    out.push('"');
    for unit in units(arg) {
        match unit {
            Unit::Char('"') => out.push_str("\\\""),
            // a trailing lone backslash would escape the closing quote
            Unit::Char('\\') => out.push_str("\\\\"),
            Unit::Char(c) => out.push(c),
            Unit::Escaped(c) => {
                out.push('\\');
                out.push(c);
            }
            Unit::ExpandOpen => out.push_str("${"),
            Unit::Dollar => out.push('$'),
        }
    }
    out.push('"');
    out
}

// ========================================
// Builder
// ========================================

/// Builds nginx text from a [`Tree`]
#[derive(Clone)]
pub struct Builder {
    options: BuildOptions,
    externals: HashMap<String, Arc<dyn ExternalBuilder>>,
}

impl fmt::Debug for Builder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&String> = self.externals.keys().collect();
        names.sort();
        f.debug_struct("Builder")
            .field("options", &self.options)
            .field("externals", &names)
            .finish()
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new(BuildOptions::default())
    }
}

impl Builder {
    /// Builder with the Lua block renderer registered
    pub fn new(options: BuildOptions) -> Self {
        let mut builder = Self::without_externals(options);
        builder.register(LUA_BLOCK_DIRECTIVES.iter().copied(), Arc::new(LuaBlockBuilder));
        builder
    }

    pub fn without_externals(options: BuildOptions) -> Self {
        Self {
            options,
            externals: HashMap::new(),
        }
    }

    /// Route `names` to `builder`
    pub fn register<I, S>(&mut self, names: I, builder: Arc<dyn ExternalBuilder>)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for name in names {
            self.externals.insert(name.into(), builder.clone());
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Indented nginx text for `roots`. No trailing newline.
    pub fn build(&self, tree: &Tree, roots: &[NodeId]) -> String {
        let mut output = String::new();
        self.build_block(&mut output, tree, roots, 0, None, &self.options.padding());
        if self.options.header {
            format!("{}{}", HEADER, output)
        } else {
            output
        }
    }

    fn build_block(
        &self,
        output: &mut String,
        tree: &Tree,
        ids: &[NodeId],
        depth: usize,
        mut last_line: Option<usize>,
        padding: &str,
    ) {
        let margin = padding.repeat(depth);
        for id in ids {
            let node = tree.get(*id);
            let comment = node.comment.as_deref().unwrap_or_default();

            if node.is_comment() && last_line == Some(node.line) {
                output.push_str(" #");
                output.push_str(comment);
                continue;
            }

            let built = if node.is_comment() {
                format!("#{}", comment)
            } else if let Some(external) = self.externals.get(&node.name) {
                external.build(node)
            } else {
                let head = statement_head(node);
                match &node.block {
                    None => format!("{};", head),
                    Some(block) => {
                        push_line(output, &margin, &format!("{} {{", head));
                        self.build_block(output, tree, block, depth + 1, Some(node.line), padding);
                        "}".to_string()
                    }
                }
            };

            push_line(output, &margin, &built);
            last_line = Some(node.line);
        }
    }

    /// Single-line nginx text for `roots`, comments dropped
    pub fn minify(&self, tree: &Tree, roots: &[NodeId]) -> String {
        let mut output = String::new();
        self.minify_block(&mut output, tree, roots);
        output
    }

    fn minify_block(&self, output: &mut String, tree: &Tree, ids: &[NodeId]) {
        for id in ids {
            let node = tree.get(*id);
            if node.is_comment() {
                continue;
            }
            if let Some(external) = self.externals.get(&node.name) {
                output.push_str(&external.build(node));
                continue;
            }
            output.push_str(&statement_head(node));
            match &node.block {
                Some(block) => {
                    output.push('{');
                    self.minify_block(output, tree, block);
                    output.push('}');
                }
                None => output.push(';'),
            }
        }
    }
}

/// `name args...`, with `if` conditions parenthesized
fn statement_head(node: &Node) -> String {
    let name = enquote(&node.name);
    let args: Vec<String> = node.args.iter().map(|a| enquote(a)).collect();
    if node.name == "if" {
        format!("{} ({})", name, args.join(" "))
    } else if args.is_empty() {
        name
    } else {
        format!("{} {}", name, args.join(" "))
    }
}

fn push_line(output: &mut String, margin: &str, text: &str) {
    if !output.is_empty() {
        output.push('\n');
    }
    output.push_str(margin);
    output.push_str(text);
}

/// Build `roots` with the default external builders
pub fn build(tree: &Tree, roots: &[NodeId], options: &BuildOptions) -> String {
    Builder::new(options.clone()).build(tree, roots)
}

/// Minify `roots` with the default external builders
pub fn minify(tree: &Tree, roots: &[NodeId]) -> String {
    Builder::default().minify(tree, roots)
}
