//! OpenResty `*_by_lua_block` support
//!
//! The body of these directives is Lua, not nginx syntax. The sub-lexer
//! grabs it as a single quoted token followed by a synthetic `;`, so the
//! parser sees `content_by_lua_block "<lua>";`. Braces inside Lua strings and
//! comments do not count toward nesting.

use crate::builder::ExternalBuilder;
use crate::error::ErrorKind;
use crate::parser::ast::Node;
use crate::parser::lexer::{CharStream, Glyph, LexError, SubLexer, Token};
use logos::Logos;

/// Directives whose block is Lua source
pub const LUA_BLOCK_DIRECTIVES: &[&str] = &[
    "access_by_lua_block",
    "balancer_by_lua_block",
    "body_filter_by_lua_block",
    "content_by_lua_block",
    "exit_worker_by_lua_block",
    "header_filter_by_lua_block",
    "init_by_lua_block",
    "init_worker_by_lua_block",
    "log_by_lua_block",
    "rewrite_by_lua_block",
    "server_rewrite_by_lua_block",
    "set_by_lua_block",
    "ssl_certificate_by_lua_block",
    "ssl_client_hello_by_lua_block",
    "ssl_session_fetch_by_lua_block",
    "ssl_session_store_by_lua_block",
];

/// Lua tokens that matter for brace matching
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
enum LuaToken {
    #[token("{")]
    Open,

    #[token("}")]
    Close,

    #[regex(r"--\[\[([^\]]|\][^\]])*\]\]", priority = 20)]
    LongComment,

    #[regex(r"--[^\n]*")]
    LineComment,

    #[regex(r"\[\[([^\]]|\][^\]])*\]\]")]
    LongString,

    #[regex(r#""([^"\\]|\\(.|\n))*""#)]
    DoubleQuoted,

    #[regex(r"'([^'\\]|\\(.|\n))*'")]
    SingleQuoted,

    #[regex(r#"[^{}"'\-\[]+"#)]
    Code,

    #[regex(r"[\-\[]")]
    Punct,
}

/// Sub-lexer for the Lua block directives
#[derive(Debug, Default, Clone, Copy)]
pub struct LuaBlockLexer;

impl LuaBlockLexer {
    /// `set_by_lua_block $res { ... }` carries one word before the block
    fn lex_result_variable(stream: &mut CharStream<'_>) -> Result<Token, LexError> {
        let (first, line) = stream.next_non_whitespace().ok_or_else(|| {
            LexError::new(
                ErrorKind::ScriptBlock,
                "unexpected end of file, expecting variable",
                stream.line(),
            )
        })?;

        let mut word = String::new();
        first.push_to(&mut word);
        while let Some((glyph, _)) = stream.next_glyph() {
            if glyph.is_whitespace() || glyph == Glyph::Char('{') {
                stream.unread();
                break;
            }
            glyph.push_to(&mut word);
        }
        Ok(Token::new(word, line, false))
    }
}

impl SubLexer for LuaBlockLexer {
    fn lex(&self, stream: &mut CharStream<'_>, directive: &str) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::with_capacity(3);
        if directive == "set_by_lua_block" {
            tokens.push(Self::lex_result_variable(stream)?);
        }

        match stream.next_non_whitespace() {
            Some((Glyph::Char('{'), _)) => {}
            Some((_, line)) => {
                return Err(LexError::new(
                    ErrorKind::ScriptBlock,
                    "expected \"{\" to start Lua block",
                    line,
                ));
            }
            None => {
                return Err(LexError::new(
                    ErrorKind::ScriptBlock,
                    "unexpected end of file, expecting \"{\" to start Lua block",
                    stream.line(),
                ));
            }
        }

        let rest = stream.rest();
        let mut depth = 1usize;
        let mut lexer = LuaToken::lexer(rest);
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            match result {
                Ok(LuaToken::Open) => depth += 1,
                Ok(LuaToken::Close) => {
                    depth -= 1;
                    if depth == 0 {
                        let body = rest[..span.start].to_string();
                        stream.advance(span.end);
                        let line = stream.line();
                        tokens.push(Token::new(body, line, true));
                        tokens.push(Token::new(";", line, false));
                        return Ok(tokens);
                    }
                }
                Ok(_) => {}
                Err(()) => {
                    stream.advance(span.start);
                    return Err(LexError::new(
                        ErrorKind::ScriptBlock,
                        "unterminated string in Lua block",
                        stream.line(),
                    ));
                }
            }
        }

        stream.advance(rest.len());
        Err(LexError::new(
            ErrorKind::ScriptBlock,
            "unexpected end of file, expecting \"}\" to close Lua block",
            stream.line(),
        ))
    }
}

/// Renders a Lua block directive back as `name [args] {body}`
#[derive(Debug, Default, Clone, Copy)]
pub struct LuaBlockBuilder;

impl ExternalBuilder for LuaBlockBuilder {
    fn build(&self, node: &Node) -> String {
        match node.args.split_last() {
            Some((body, [])) => format!("{} {{{}}}", node.name, body),
            Some((body, leading)) => {
                format!("{} {} {{{}}}", node.name, leading.join(" "), body)
            }
            None => format!("{} {{}}", node.name),
        }
    }
}
