//! nginx configuration parser
//!
//! Recursive descent over the token list, one call per block. Each statement
//! is validated as it is built; problems are collected per file and parsing
//! carries on with the next statement. `include` targets are queued and
//! parsed as files of their own, and [`combine`] can splice them back into a
//! single tree.

use crate::error::{ConfigError, ErrorKind};
use crate::parser::ast::{FileConfig, FileId, Node, NodeId, ParseOutput, Status, Tree};
use crate::parser::context::enter_block;
use crate::parser::fs::{self, FileSystem, LocalFileSystem};
use crate::parser::lexer::{tokenize_file, LexOptions, Token};
use crate::parser::semantic::{analyze, Checks, Statement, Terminator};
use ngxclair_core::settings::ParseSettings;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Parser settings
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Unknown directives are errors
    pub strict: bool,
    pub check_ctx: bool,
    pub check_args: bool,
    /// Keep comments as `#` nodes
    pub comments: bool,
    /// Leave `include` unresolved
    pub single_file: bool,
    /// Splice included files into the root tree
    pub combine: bool,
    /// Record errors and keep going; otherwise stop the file at the first one
    pub catch_errors: bool,
    /// Directives dropped from the tree, block and all
    pub ignore: HashSet<String>,
    pub lex: LexOptions,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            strict: false,
            check_ctx: true,
            check_args: true,
            comments: false,
            single_file: false,
            combine: false,
            catch_errors: true,
            ignore: HashSet::new(),
            lex: LexOptions::default(),
        }
    }
}

impl ParseOptions {
    pub fn from_settings(settings: &ParseSettings) -> Self {
        Self {
            strict: settings.strict,
            check_ctx: settings.check_ctx,
            check_args: settings.check_args,
            comments: settings.comments,
            single_file: settings.single_file,
            combine: settings.combine,
            ignore: settings.ignore.iter().cloned().collect(),
            ..Self::default()
        }
    }

    fn checks(&self) -> Checks {
        Checks {
            strict: self.strict,
            check_ctx: self.check_ctx,
            check_args: self.check_args,
        }
    }
}

/// Parses a root file and everything it includes
pub struct Parser<'f> {
    fs: &'f dyn FileSystem,
    options: ParseOptions,
}

impl<'f> Parser<'f> {
    pub fn new(fs: &'f dyn FileSystem, options: ParseOptions) -> Self {
        Self { fs, options }
    }

    pub fn options(&self) -> &ParseOptions {
        &self.options
    }

    /// Parse the file at `path`
    pub fn parse_file(&self, path: &str) -> ParseOutput {
        self.run(path, None)
    }

    /// Parse `source` as if it were the file `path`. Includes are still read
    /// through the file system.
    pub fn parse_str(&self, source: &str, path: &str) -> ParseOutput {
        self.run(path, Some(source))
    }

    fn run(&self, path: &str, source: Option<&str>) -> ParseOutput {
        let config_dir = Path::new(path).parent().map(Path::to_path_buf).unwrap_or_default();
        let mut session = Session {
            fs: self.fs,
            options: &self.options,
            config_dir,
            tree: Tree::new(),
            pending: vec![Pending {
                file: path.to_string(),
                ctx: Vec::new(),
            }],
            included: HashMap::from([(path.to_string(), FileId::ROOT)]),
        };

        let mut files = Vec::new();
        let mut index = 0;
        while index < session.pending.len() {
            let Pending { file, ctx } = session.pending[index].clone();
            let text = match (index, source) {
                (0, Some(text)) => Ok(text.to_string()),
                _ => self.fs.open(&file),
            };
            let parsed = match text {
                Ok(text) => session.parse_source(&file, &text, &ctx),
                Err(e) => {
                    let mut failed = FileConfig::new(&file);
                    failed.push_error(ConfigError::unlocated(
                        ErrorKind::Io,
                        format!("open() \"{}\" failed ({})", file, e),
                        &file,
                    ));
                    failed
                }
            };
            files.push(parsed);
            index += 1;
        }

        let errors: Vec<ConfigError> = files.iter().flat_map(|f| f.errors.iter().cloned()).collect();
        let output = ParseOutput {
            status: if errors.is_empty() { Status::Ok } else { Status::Failed },
            errors,
            tree: session.tree,
            files,
            combined: false,
        };

        tracing::debug!(
            root = path,
            files = output.files.len(),
            errors = output.errors.len(),
            "parsed configuration"
        );

        if self.options.combine {
            combine(&output)
        } else {
            output
        }
    }
}

/// Parse `path` from the local disk
pub fn parse_file(path: &str, options: ParseOptions) -> ParseOutput {
    Parser::new(&LocalFileSystem, options).parse_file(path)
}

/// Parse a source string; includes are resolved on the local disk relative
/// to `path`
pub fn parse_str(source: &str, path: &str, options: ParseOptions) -> ParseOutput {
    Parser::new(&LocalFileSystem, options).parse_str(source, path)
}

// ========================================
// Session
// ========================================

#[derive(Debug, Clone)]
struct Pending {
    file: String,
    /// Block path of the first `include` that named the file
    ctx: Vec<String>,
}

struct Session<'a> {
    fs: &'a dyn FileSystem,
    options: &'a ParseOptions,
    config_dir: PathBuf,
    tree: Tree,
    pending: Vec<Pending>,
    included: HashMap<String, FileId>,
}

/// Cursor and results for the file being parsed
struct FileState<'t> {
    config: FileConfig,
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> FileState<'t> {
    fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    fn last_line(&self) -> usize {
        self.tokens.last().map(|t| t.line).unwrap_or(1)
    }
}

impl<'a> Session<'a> {
    fn parse_source(&mut self, file: &str, text: &str, ctx: &[String]) -> FileConfig {
        tracing::debug!(file, "parsing file");
        let mut config = FileConfig::new(file);
        let tokens = match tokenize_file(text, file, &self.options.lex) {
            Ok(tokens) => tokens,
            Err(e) => {
                config.push_error(e);
                return config;
            }
        };

        let mut state = FileState {
            config,
            tokens: &tokens,
            pos: 0,
        };
        if let Err(e) = self.parse_block(&mut state, None, ctx) {
            state.config.push_error(e);
        }
        tracing::debug!(file, statements = state.config.roots.len(), "parsed file");
        state.config
    }

    /// Record `err`, or hand it back to stop the file
    fn fail(&self, state: &mut FileState<'_>, err: ConfigError) -> Result<(), ConfigError> {
        if self.options.catch_errors {
            state.config.push_error(err);
            Ok(())
        } else {
            Err(err)
        }
    }

    fn place(&mut self, state: &mut FileState<'_>, parent: Option<NodeId>, node: Node) -> NodeId {
        let id = self.tree.push(node);
        match parent {
            Some(parent) => self.tree.attach(parent, id),
            None => state.config.roots.push(id),
        }
        id
    }

    /// Discard tokens up to the `}` closing the current block
    fn skip_block(state: &mut FileState<'_>) {
        let mut depth = 1usize;
        while let Some(token) = state.next() {
            if token.is_block_open() {
                depth += 1;
            } else if token.is_block_close() {
                depth -= 1;
                if depth == 0 {
                    return;
                }
            }
        }
    }

    fn parse_block(
        &mut self,
        state: &mut FileState<'_>,
        parent: Option<NodeId>,
        ctx: &[String],
    ) -> Result<(), ConfigError> {
        let file = state.config.file.clone();

        while let Some(token) = state.next() {
            if token.is_block_close() {
                return Ok(());
            }

            if token.is_comment() {
                if self.options.comments {
                    self.place(state, parent, Node::comment(&token.text[1..], &file, token.line));
                }
                continue;
            }

            let name = token.text.clone();
            let line = token.line;
            let mut args = Vec::new();
            let mut trailing_comments = Vec::new();
            let terminator = loop {
                let Some(arg) = state.next() else {
                    return Err(ConfigError::new(
                        ErrorKind::Unterminated,
                        "unexpected end of file, expecting \";\" or \"}\"",
                        &file,
                        state.last_line(),
                    ));
                };
                if let Some(term) = Terminator::from_token(arg) {
                    break term;
                }
                if arg.is_comment() {
                    trailing_comments.push(arg.text[1..].to_string());
                } else {
                    args.push(arg.text.clone());
                }
            };

            if self.options.ignore.contains(&name) {
                match terminator {
                    Terminator::BlockOpen => Self::skip_block(state),
                    Terminator::BlockClose => return Ok(()),
                    Terminator::Semicolon => {}
                }
                continue;
            }

            if name == "if" {
                prepare_if_args(&mut args);
            }

            let verdict = analyze(
                &Statement {
                    file: &file,
                    line,
                    name: &name,
                    args: &args,
                    terminator,
                },
                ctx,
                self.options.checks(),
            );

            let is_include = name == "include";
            let id = self.place(state, parent, Node::directive(name, &file, line, args));

            if let Err(e) = verdict {
                self.fail(state, e)?;
            }

            if is_include && !self.options.single_file {
                if let Some(pattern) = self.tree.get(id).arg(0).map(str::to_string) {
                    let targets = self.resolve_include(state, &pattern, line, ctx)?;
                    self.tree.get_mut(id).includes = Some(targets);
                }
            }

            if terminator == Terminator::BlockOpen {
                self.tree.get_mut(id).block = Some(Vec::new());
                let inner = enter_block(ctx, &self.tree.get(id).name);
                self.parse_block(state, Some(id), &inner)?;
            }

            if self.options.comments {
                for text in trailing_comments {
                    self.place(state, parent, Node::comment(text, &file, line));
                }
            }

            if terminator == Terminator::BlockClose {
                return Ok(());
            }
        }
        Ok(())
    }

    fn resolve_include(
        &mut self,
        state: &mut FileState<'_>,
        pattern: &str,
        line: usize,
        ctx: &[String],
    ) -> Result<Vec<FileId>, ConfigError> {
        let path = if Path::new(pattern).is_absolute() {
            pattern.to_string()
        } else {
            self.config_dir.join(pattern).to_string_lossy().into_owned()
        };

        let names = if fs::has_magic(&path) {
            match self.fs.glob(&path) {
                Ok(mut names) => {
                    names.sort();
                    names
                }
                Err(e) => {
                    tracing::warn!(pattern = %path, error = %e, "include glob failed");
                    let err = ConfigError::new(
                        ErrorKind::IncludeGlob,
                        format!("glob() \"{}\" failed ({})", path, e),
                        &state.config.file,
                        line,
                    );
                    self.fail(state, err)?;
                    Vec::new()
                }
            }
        } else {
            match self.fs.check(&path) {
                Ok(()) => vec![path],
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "include target unavailable");
                    let err = ConfigError::new(
                        ErrorKind::IncludeNotFound,
                        format!("open() \"{}\" failed ({})", path, e),
                        &state.config.file,
                        line,
                    );
                    self.fail(state, err)?;
                    Vec::new()
                }
            }
        };

        let pending = &mut self.pending;
        let targets: Vec<FileId> = names
            .into_iter()
            .map(|name| {
                *self.included.entry(name.clone()).or_insert_with(|| {
                    tracing::debug!(include = %name, "queued include");
                    pending.push(Pending {
                        file: name,
                        ctx: ctx.to_vec(),
                    });
                    FileId::new(pending.len() - 1)
                })
            })
            .collect();
        Ok(targets)
    }
}

/// Strip the parentheses around an `if` condition
///
/// `if ($a = 1)` lexes as `($a`, `=`, `1)`. A parenthesis that stood alone
/// leaves an empty argument, which is dropped.
fn prepare_if_args(args: &mut Vec<String>) {
    let (Some(first), Some(last)) = (args.first(), args.last()) else {
        return;
    };
    if !first.starts_with('(') || !last.ends_with(')') {
        return;
    }

    args[0] = args[0][1..].trim_start().to_string();
    let end = args.len() - 1;
    let stripped = args[end][..args[end].len() - 1].trim_end().to_string();
    args[end] = stripped;

    let start = usize::from(args[0].is_empty());
    let stop = args.len() - usize::from(args[end].is_empty());
    if start >= stop {
        args.clear();
    } else {
        args.truncate(stop);
        args.drain(..start);
    }
}

// ========================================
// Combine
// ========================================

/// Splice every included file into the root tree
///
/// `include` statements are replaced by the statements of the files they
/// name, recursively. The result holds one file entry carrying every error
/// of the original parse. A file that includes itself, directly or through
/// others, is reported as a cycle and not expanded again.
pub fn combine(output: &ParseOutput) -> ParseOutput {
    let Some(root) = output.root() else {
        return output.clone();
    };

    let mut splicer = Splicer {
        source: output,
        tree: Tree::new(),
        stack: vec![FileId::ROOT],
        errors: Vec::new(),
    };
    let mut roots = Vec::new();
    splicer.splice(&root.roots, None, &mut roots);

    let mut errors = output.errors.clone();
    errors.extend(splicer.errors.iter().cloned());
    let status = if errors.is_empty() { Status::Ok } else { Status::Failed };

    tracing::debug!(files = output.files.len(), nodes = splicer.tree.len(), "combined includes");

    ParseOutput {
        status,
        errors: errors.clone(),
        tree: splicer.tree,
        files: vec![FileConfig {
            file: root.file.clone(),
            status,
            errors,
            roots,
        }],
        combined: true,
    }
}

struct Splicer<'o> {
    source: &'o ParseOutput,
    tree: Tree,
    /// Files being expanded, innermost last
    stack: Vec<FileId>,
    errors: Vec<ConfigError>,
}

impl Splicer<'_> {
    fn splice(&mut self, ids: &[NodeId], parent: Option<NodeId>, top: &mut Vec<NodeId>) {
        let source = self.source;
        for id in ids {
            let node = source.tree.get(*id);

            if let Some(includes) = &node.includes {
                for file_id in includes {
                    if self.stack.contains(file_id) {
                        let target = source.file(*file_id).map(|f| f.file.as_str()).unwrap_or("?");
                        self.errors.push(ConfigError::new(
                            ErrorKind::IncludeCycle,
                            format!("include cycle through \"{}\"", target),
                            &node.file,
                            node.line,
                        ));
                        continue;
                    }
                    let Some(included) = source.file(*file_id) else {
                        continue;
                    };
                    self.stack.push(*file_id);
                    self.splice(&included.roots, parent, top);
                    self.stack.pop();
                }
                continue;
            }

            let copy = self.tree.push(Node {
                parent: None,
                block: node.block.as_ref().map(|_| Vec::new()),
                includes: None,
                ..node.clone()
            });
            match parent {
                Some(parent) => self.tree.attach(parent, copy),
                None => top.push(copy),
            }
            if let Some(block) = &node.block {
                self.splice(block, Some(copy), top);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::ast::Outline;
    use crate::parser::fs::MemoryFileSystem;

    fn parse_with(fs: &MemoryFileSystem, path: &str, options: ParseOptions) -> ParseOutput {
        Parser::new(fs, options).parse_file(path)
    }

    fn parse_src(source: &str) -> ParseOutput {
        let fs = MemoryFileSystem::new().with_file("nginx.conf", source);
        parse_with(&fs, "nginx.conf", ParseOptions::default())
    }

    fn shape(output: &ParseOutput) -> Vec<Outline> {
        output.tree.outline(output.roots())
    }

    fn leaf(name: &str, args: &[&str]) -> Outline {
        Outline {
            name: name.into(),
            args: args.iter().map(|s| s.to_string()).collect(),
            comment: None,
            block: None,
        }
    }

    fn node(name: &str, args: &[&str], block: Vec<Outline>) -> Outline {
        Outline {
            block: Some(block),
            ..leaf(name, args)
        }
    }

    #[test]
    fn test_parse_nested() {
        let output = parse_src(
            "events {\n    worker_connections 1024;\n}\nhttp {\n    server {\n        listen 127.0.0.1:8080;\n        location / {\n            return 200 \"foo bar baz\";\n        }\n    }\n}\n",
        );
        assert!(output.is_ok(), "{:?}", output.errors);
        assert_eq!(
            shape(&output),
            vec![
                node("events", &[], vec![leaf("worker_connections", &["1024"])]),
                node(
                    "http",
                    &[],
                    vec![node(
                        "server",
                        &[],
                        vec![
                            leaf("listen", &["127.0.0.1:8080"]),
                            node("location", &["/"], vec![leaf("return", &["200", "foo bar baz"])]),
                        ]
                    )]
                ),
            ]
        );

        let http = output.roots()[1];
        let server = output.tree.children(http)[0];
        let listen = output.tree.children(server)[0];
        assert_eq!(output.tree.get(listen).line, 6);
        assert_eq!(output.tree.get(listen).parent, Some(server));
    }

    #[test]
    fn test_empty_block_is_kept() {
        let output = parse_src("http {\n}\n");
        assert_eq!(shape(&output), vec![node("http", &[], vec![])]);
    }

    #[test]
    fn test_errors_do_not_stop_siblings() {
        let output = parse_src("http {\n    listen 80;\n    server_tokens off;\n}\nworker_connections 2;\n");
        assert_eq!(output.status, Status::Failed);
        let messages: Vec<String> = output.errors.iter().map(|e| e.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "nginx.conf:2 \"listen\" directive is not allowed here",
                "nginx.conf:5 \"worker_connections\" directive is not allowed here",
            ]
        );
        // failing statements stay in the tree
        assert_eq!(output.tree.children(output.roots()[0]).len(), 2);
        assert_eq!(output.roots().len(), 2);
    }

    #[test]
    fn test_stop_at_first_error() {
        let fs = MemoryFileSystem::new().with_file("nginx.conf", "listen 80;\nuser nginx;\nlisten 81;\n");
        let options = ParseOptions {
            catch_errors: false,
            ..ParseOptions::default()
        };
        let output = parse_with(&fs, "nginx.conf", options);
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].line, Some(1));
        assert_eq!(output.roots().len(), 1);
    }

    #[test]
    fn test_strict_unknown() {
        let fs = MemoryFileSystem::new().with_file("nginx.conf", "frobnicate on;\n");
        let lenient = parse_with(&fs, "nginx.conf", ParseOptions::default());
        assert!(lenient.is_ok());

        let strict = parse_with(
            &fs,
            "nginx.conf",
            ParseOptions {
                strict: true,
                ..ParseOptions::default()
            },
        );
        assert_eq!(strict.errors[0].to_string(), "nginx.conf:1 unknown directive \"frobnicate\"");
    }

    #[test]
    fn test_comments() {
        let source = "# top\nuser nginx; # who\nhttp { # open\n    gzip on;\n}\n";
        let fs = MemoryFileSystem::new().with_file("nginx.conf", source);
        let output = parse_with(
            &fs,
            "nginx.conf",
            ParseOptions {
                comments: true,
                ..ParseOptions::default()
            },
        );
        let roots = output.roots();
        let names: Vec<&str> = roots.iter().map(|id| output.tree.get(*id).name.as_str()).collect();
        assert_eq!(names, vec!["#", "user", "#", "http"]);
        assert_eq!(output.tree.get(roots[2]).comment.as_deref(), Some(" who"));
        assert_eq!(output.tree.get(roots[2]).line, 2);

        let inner = output.tree.children(roots[3]);
        assert_eq!(output.tree.get(inner[0]).comment.as_deref(), Some(" open"));

        // dropped by default
        let plain = parse_src(source);
        assert_eq!(plain.roots().len(), 2);
    }

    #[test]
    fn test_comment_among_arguments() {
        let fs = MemoryFileSystem::new().with_file("nginx.conf", "user nginx #inline\n  staff;\n");
        let output = parse_with(
            &fs,
            "nginx.conf",
            ParseOptions {
                comments: true,
                ..ParseOptions::default()
            },
        );
        assert_eq!(
            shape(&output),
            vec![
                leaf("user", &["nginx", "staff"]),
                Outline {
                    comment: Some("inline".into()),
                    ..leaf("#", &[])
                },
            ]
        );
        assert_eq!(output.tree.get(output.roots()[1]).line, 1);
    }

    #[test]
    fn test_if_arguments() {
        let output = parse_src(
            "http { server { if ($request_method = POST) { return 405; } if ( $slow ) { set $mode slow; } } }",
        );
        assert!(output.is_ok(), "{:?}", output.errors);
        let server = output.tree.children(output.roots()[0])[0];
        let ifs: Vec<&Node> = output.tree.children(server).iter().map(|id| output.tree.get(*id)).collect();
        assert_eq!(ifs[0].args, vec!["$request_method", "=", "POST"]);
        assert_eq!(ifs[1].args, vec!["$slow"]);
    }

    #[test]
    fn test_prepare_if_args() {
        let mut args = vec!["()".to_string()];
        prepare_if_args(&mut args);
        assert!(args.is_empty());

        let mut args = vec!["($a)".to_string()];
        prepare_if_args(&mut args);
        assert_eq!(args, vec!["$a"]);

        let mut args = vec!["$a".to_string()];
        prepare_if_args(&mut args);
        assert_eq!(args, vec!["$a"]);
    }

    #[test]
    fn test_ignore() {
        let fs = MemoryFileSystem::new()
            .with_file("nginx.conf", "events { worker_connections 1; }\nhttp { server { listen 80; } gzip on; }\n");
        let output = parse_with(
            &fs,
            "nginx.conf",
            ParseOptions {
                ignore: HashSet::from(["server".to_string(), "events".to_string()]),
                ..ParseOptions::default()
            },
        );
        assert_eq!(shape(&output), vec![node("http", &[], vec![leaf("gzip", &["on"])])]);
    }

    #[test]
    fn test_location_context_collapses() {
        let output = parse_src("http { server { location / { location /a { proxy_pass http://b; } } } }");
        assert!(output.is_ok(), "{:?}", output.errors);
    }

    #[test]
    fn test_lua_block() {
        let output = parse_src("http { server { location / { content_by_lua_block { ngx.say(\"{\") } } } }");
        assert!(output.is_ok(), "{:?}", output.errors);
        let server = output.tree.children(output.roots()[0])[0];
        let location = output.tree.children(server)[0];
        let lua = output.tree.get(output.tree.children(location)[0]);
        assert_eq!(lua.name, "content_by_lua_block");
        assert_eq!(lua.args, vec![" ngx.say(\"{\") "]);
        assert!(lua.block.is_none());
    }

    #[test]
    fn test_lexer_failure_is_fatal() {
        let output = parse_src("http {\n    server {\n}\n");
        assert_eq!(output.status, Status::Failed);
        assert_eq!(output.errors[0].to_string(), "nginx.conf:3 unexpected end of file, expecting \"}\"");
        assert!(output.roots().is_empty());
    }

    #[test]
    fn test_missing_terminator_at_eof() {
        let output = parse_src("user nginx");
        assert_eq!(output.errors[0].kind, ErrorKind::Unterminated);
    }

    #[test]
    fn test_missing_root_file() {
        let fs = MemoryFileSystem::new();
        let output = parse_with(&fs, "/etc/nginx/nginx.conf", ParseOptions::default());
        assert_eq!(output.errors[0].kind, ErrorKind::Io);
        assert_eq!(output.errors[0].line, None);
    }

    // ========================================
    // Includes
    // ========================================

    fn site_fs() -> MemoryFileSystem {
        MemoryFileSystem::new()
            .with_file(
                "/etc/nginx/nginx.conf",
                "events {}\nhttp {\n    include mime.types;\n    include sites/*.conf;\n}\n",
            )
            .with_file("/etc/nginx/mime.types", "types {\n    text/html html;\n}\n")
            .with_file("/etc/nginx/sites/b.conf", "server {\n    listen 8081;\n}\n")
            .with_file("/etc/nginx/sites/a.conf", "server {\n    listen 8080;\n}\n")
    }

    #[test]
    fn test_include_files_are_parsed_separately() {
        let output = parse_with(&site_fs(), "/etc/nginx/nginx.conf", ParseOptions::default());
        assert!(output.is_ok(), "{:?}", output.errors);

        let names: Vec<&str> = output.files.iter().map(|f| f.file.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "/etc/nginx/nginx.conf",
                "/etc/nginx/mime.types",
                "/etc/nginx/sites/a.conf",
                "/etc/nginx/sites/b.conf",
            ]
        );

        let http = output.roots()[1];
        let includes: Vec<&Option<Vec<FileId>>> =
            output.tree.children(http).iter().map(|id| &output.tree.get(*id).includes).collect();
        assert_eq!(includes[0], &Some(vec![FileId::new(1)]));
        assert_eq!(includes[1], &Some(vec![FileId::new(2), FileId::new(3)]));

        // an included file is validated in the context of its include
        let site = &output.files[2];
        assert_eq!(output.tree.get(site.roots[0]).name, "server");
    }

    #[test]
    fn test_included_file_errors_carry_its_name() {
        let fs = site_fs().with_file("/etc/nginx/sites/a.conf", "listen 8080;\n");
        let output = parse_with(&fs, "/etc/nginx/nginx.conf", ParseOptions::default());
        assert_eq!(
            output.errors[0].to_string(),
            "/etc/nginx/sites/a.conf:1 \"listen\" directive is not allowed here"
        );
        assert_eq!(output.files[2].status, Status::Failed);
        assert_eq!(output.files[0].status, Status::Ok);
    }

    #[test]
    fn test_missing_literal_include() {
        let fs = MemoryFileSystem::new().with_file(
            "/etc/nginx/nginx.conf",
            "http {\n    include foo.conf;\n    server_tokens off;\n}\n",
        );
        let output = parse_with(&fs, "/etc/nginx/nginx.conf", ParseOptions::default());
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].kind, ErrorKind::IncludeNotFound);
        assert_eq!(output.errors[0].line, Some(2));
        assert_eq!(
            output.errors[0].reason,
            "open() \"/etc/nginx/foo.conf\" failed (No such file or directory)"
        );
        // the sibling still parsed
        assert_eq!(output.tree.children(output.roots()[0]).len(), 2);
    }

    #[test]
    fn test_invalid_include_glob() {
        let fs = MemoryFileSystem::new().with_file(
            "/etc/nginx/nginx.conf",
            "http {\n    server_tokens off;\n    include [!].conf;\n    gzip on;\n}\n",
        );
        let output = parse_with(&fs, "/etc/nginx/nginx.conf", ParseOptions::default());
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.errors[0].kind, ErrorKind::IncludeGlob);
        assert_eq!(output.errors[0].line, Some(3));
        assert!(output.errors[0].reason.starts_with("glob() \"/etc/nginx/[!].conf\" failed"));

        let http = output.roots()[0];
        let names: Vec<&str> = output.tree.children(http).iter().map(|id| output.tree.get(*id).name.as_str()).collect();
        assert_eq!(names, vec!["server_tokens", "include", "gzip"]);
        assert_eq!(output.tree.get(output.tree.children(http)[1]).includes, Some(vec![]));
    }

    #[test]
    fn test_empty_glob_is_not_an_error() {
        let fs = MemoryFileSystem::new().with_file("/etc/nginx/nginx.conf", "http {\n    include sites/*.conf;\n}\n");
        let output = parse_with(&fs, "/etc/nginx/nginx.conf", ParseOptions::default());
        assert!(output.is_ok());
        let include = output.tree.children(output.roots()[0])[0];
        assert_eq!(output.tree.get(include).includes, Some(vec![]));
    }

    #[test]
    fn test_same_file_included_twice_is_parsed_once() {
        let fs = MemoryFileSystem::new()
            .with_file(
                "/etc/nginx/nginx.conf",
                "http {\n    server { include common.conf; }\n    server { include common.conf; }\n}\n",
            )
            .with_file("/etc/nginx/common.conf", "gzip on;\n");
        let output = parse_with(&fs, "/etc/nginx/nginx.conf", ParseOptions::default());
        assert_eq!(output.files.len(), 2);
    }

    #[test]
    fn test_single_file() {
        let output = parse_with(
            &site_fs(),
            "/etc/nginx/nginx.conf",
            ParseOptions {
                single_file: true,
                ..ParseOptions::default()
            },
        );
        assert_eq!(output.files.len(), 1);
        let include = output.tree.children(output.roots()[1])[0];
        assert_eq!(output.tree.get(include).includes, None);
    }

    #[test]
    fn test_combine() {
        let output = parse_with(
            &site_fs(),
            "/etc/nginx/nginx.conf",
            ParseOptions {
                combine: true,
                ..ParseOptions::default()
            },
        );
        assert!(output.combined);
        assert_eq!(output.files.len(), 1);
        assert_eq!(
            shape(&output),
            vec![
                node("events", &[], vec![]),
                node(
                    "http",
                    &[],
                    vec![
                        node("types", &[], vec![leaf("text/html", &["html"])]),
                        node("server", &[], vec![leaf("listen", &["8080"])]),
                        node("server", &[], vec![leaf("listen", &["8081"])]),
                    ]
                ),
            ]
        );

        let http = output.roots()[1];
        let server = output.tree.children(http)[1];
        assert_eq!(output.tree.get(server).file, "/etc/nginx/sites/a.conf");
        assert_eq!(output.tree.get(server).parent, Some(http));
    }

    #[test]
    fn test_combine_keeps_errors() {
        let fs = site_fs().with_file("/etc/nginx/sites/b.conf", "server { listen; }\n");
        let output = parse_with(
            &fs,
            "/etc/nginx/nginx.conf",
            ParseOptions {
                combine: true,
                ..ParseOptions::default()
            },
        );
        assert_eq!(output.status, Status::Failed);
        assert_eq!(output.files[0].errors.len(), 1);
        assert_eq!(output.files[0].errors[0].file, "/etc/nginx/sites/b.conf");
    }

    #[test]
    fn test_combine_reports_cycles() {
        let fs = MemoryFileSystem::new()
            .with_file("/etc/nginx/nginx.conf", "http {\n    include a.conf;\n}\n")
            .with_file("/etc/nginx/a.conf", "gzip on;\ninclude nginx.conf;\n");
        let options = ParseOptions {
            combine: true,
            check_ctx: false,
            ..ParseOptions::default()
        };
        let output = parse_with(&fs, "/etc/nginx/nginx.conf", options);
        let cycle = output.errors.iter().find(|e| e.kind == ErrorKind::IncludeCycle).unwrap();
        assert_eq!(cycle.file, "/etc/nginx/a.conf");
        assert_eq!(cycle.line, Some(2));
        assert_eq!(shape(&output), vec![node("http", &[], vec![leaf("gzip", &["on"])])]);
    }

    #[test]
    fn test_local_disk() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("nginx.conf");
        std::fs::write(&root, "http {\n    include conf.d/*.conf;\n}\n").unwrap();
        std::fs::create_dir(dir.path().join("conf.d")).unwrap();
        std::fs::write(dir.path().join("conf.d").join("site.conf"), "server { listen 80; }\n").unwrap();

        let output = parse_file(
            &root.to_string_lossy(),
            ParseOptions {
                combine: true,
                ..ParseOptions::default()
            },
        );
        assert!(output.is_ok(), "{:?}", output.errors);
        assert_eq!(
            shape(&output),
            vec![node("http", &[], vec![node("server", &[], vec![leaf("listen", &["80"])])])]
        );
    }
}
