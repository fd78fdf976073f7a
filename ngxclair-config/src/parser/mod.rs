//! Parser module for nginx configuration
//!
//! This module provides the lexer, directive tables, validator and the
//! include-aware parser.

pub mod ast;
pub mod context;
pub mod directives;
pub mod fs;
pub mod lexer;
pub mod lua;
pub mod parser;
pub mod semantic;

pub use ast::{FileConfig, FileId, Node, NodeId, Outline, ParseOutput, Status, Tree};
pub use context::{enter_block, Context, ContextSet};
pub use directives::{lookup, Arity, DirectiveSpec};
pub use fs::{FileSystem, LocalFileSystem, MemoryFileSystem};
pub use lexer::{tokenize, tokenize_file, LexError, LexOptions, SubLexer, Token};
pub use parser::{combine, parse_file, parse_str, ParseOptions, Parser};
pub use semantic::{analyze, Checks, Statement, Terminator};
