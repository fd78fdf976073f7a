//! ngxclair Configuration Front End
//!
//! This crate lexes, parses, validates and rebuilds nginx configuration, and
//! compiles a parsed tree into the typed proxy model.
//!
//! # Example
//!
//! ```rust
//! use ngxclair_config::{build, BuildOptions, MemoryFileSystem, ParseOptions, Parser};
//!
//! let fs = MemoryFileSystem::new().with_file(
//!     "nginx.conf",
//!     "events {} http { server { listen 80; location / { return 200 ok; } } }",
//! );
//! let output = Parser::new(&fs, ParseOptions::default()).parse_file("nginx.conf");
//! assert!(output.is_ok());
//!
//! let text = build(&output.tree, output.roots(), &BuildOptions::default());
//! assert!(text.starts_with("events {\n}\nhttp {"));
//! ```

pub mod adapter;
pub mod builder;
pub mod compiler;
pub mod error;
pub mod parser;

pub use adapter::{JsonAdapter, Payload};
pub use builder::{build, enquote, minify, needs_quote, BuildOptions, Builder, ExternalBuilder};
pub use compiler::{compile_output, compile_tree, CompileError};
pub use error::{ConfigError, ErrorKind};
pub use parser::{
    combine, parse_file, parse_str, tokenize, LexOptions, LocalFileSystem, MemoryFileSystem, ParseOptions,
    ParseOutput, Parser, Token, Tree,
};

use ngxclair_core::config::ProxyConfig;
use std::path::Path;

/// Full pipeline: file on disk -> combined parse -> [`ProxyConfig`]
///
/// Every parse error is reported, not only the first.
pub fn compile_file(path: impl AsRef<Path>, options: ParseOptions) -> Result<ProxyConfig, FullCompileError> {
    let path = path.as_ref().to_string_lossy();
    let output = parse_file(&path, ParseOptions { combine: true, ..options });
    if !output.is_ok() {
        return Err(FullCompileError::Parse(output.errors));
    }
    Ok(compile_output(&output)?)
}

/// Full compilation error
#[derive(Debug, thiserror::Error)]
pub enum FullCompileError {
    #[error("{}", render_errors(.0))]
    Parse(Vec<ConfigError>),

    #[error("Compile error: {0}")]
    Compile(#[from] CompileError),
}

fn render_errors(errors: &[ConfigError]) -> String {
    errors.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
}
