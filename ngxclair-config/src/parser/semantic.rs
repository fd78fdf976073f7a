//! Directive validation
//!
//! Checks one parsed statement against the directive table: is the name
//! known, is it legal in the enclosing context, and do its argument count and
//! terminator match one of the directive's shapes.

use super::context::Context;
use super::directives::{self, Arity, DirectiveSpec};
use super::lexer::Token;
use crate::error::{ConfigError, ErrorKind};

/// How a statement ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminator {
    /// `;`
    Semicolon,
    /// `{`
    BlockOpen,
    /// `}` right after the arguments, which closes the enclosing block
    BlockClose,
}

impl Terminator {
    pub fn from_token(token: &Token) -> Option<Self> {
        if token.is_quoted {
            return None;
        }
        match token.text.as_str() {
            ";" => Some(Terminator::Semicolon),
            "{" => Some(Terminator::BlockOpen),
            "}" => Some(Terminator::BlockClose),
            _ => None,
        }
    }
}

/// Which checks to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checks {
    /// Reject directives missing from the table
    pub strict: bool,
    pub check_ctx: bool,
    pub check_args: bool,
}

impl Default for Checks {
    fn default() -> Self {
        Self {
            strict: false,
            check_ctx: true,
            check_args: true,
        }
    }
}

/// A statement as seen by the validator
#[derive(Debug, Clone, Copy)]
pub struct Statement<'a> {
    pub file: &'a str,
    pub line: usize,
    pub name: &'a str,
    pub args: &'a [String],
    pub terminator: Terminator,
}

/// Why one spec alternative rejected a statement
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentReason {
    NoOpeningBrace,
    NotTerminated,
    InvalidCount,
    InvalidFlag { value: String },
}

impl ArgumentReason {
    /// Render with `template`'s wording and this reason's values
    ///
    /// Rejections are reported by stamping every candidate with the wording
    /// of the first one, so a flag template applied to a count failure
    /// renders an empty value.
    fn render_as(&self, template: &ArgumentReason, directive: &str) -> String {
        let value = match self {
            ArgumentReason::InvalidFlag { value } => value.as_str(),
            _ => "",
        };
        match template {
            ArgumentReason::NoOpeningBrace => {
                format!("directive \"{}\" has no opening \"{{\"", directive)
            }
            ArgumentReason::NotTerminated => {
                format!("directive \"{}\" is not terminated by \";\"", directive)
            }
            ArgumentReason::InvalidCount => {
                format!("invalid number of arguments in \"{}\" directive", directive)
            }
            ArgumentReason::InvalidFlag { .. } => format!(
                "invalid value \"{}\" in \"{}\" directive, it must be \"on\" or \"off\"",
                value, directive
            ),
        }
    }

    fn kind(&self) -> ErrorKind {
        match self {
            ArgumentReason::InvalidFlag { .. } => ErrorKind::InvalidFlag,
            _ => ErrorKind::InvalidArguments,
        }
    }
}

/// Collapse candidate rejections into one message
pub fn collapse_reasons(reasons: &[ArgumentReason], directive: &str) -> Option<(ErrorKind, String)> {
    let first = reasons.first()?;
    let mut rendered: Vec<String> = Vec::with_capacity(reasons.len());
    for reason in reasons {
        let text = reason.render_as(first, directive);
        if !rendered.contains(&text) {
            rendered.push(text);
        }
    }
    Some((first.kind(), rendered.join("; ")))
}

fn is_flag_value(arg: &str) -> bool {
    arg.eq_ignore_ascii_case("on") || arg.eq_ignore_ascii_case("off")
}

/// Check one alternative. `Err` carries the reason it rejected the statement.
fn check_spec(spec: &DirectiveSpec, stmt: &Statement<'_>) -> Result<(), ArgumentReason> {
    if spec.block && stmt.terminator != Terminator::BlockOpen {
        return Err(ArgumentReason::NoOpeningBrace);
    }
    if !spec.block && stmt.terminator != Terminator::Semicolon {
        return Err(ArgumentReason::NotTerminated);
    }

    let count = stmt.args.len();
    if spec.arity.accepts_count(count) {
        return Ok(());
    }
    match (spec.arity, stmt.args) {
        (Arity::Flag, [value]) if is_flag_value(value) => Ok(()),
        (Arity::Flag, [value]) => Err(ArgumentReason::InvalidFlag {
            value: value.clone(),
        }),
        _ => Err(ArgumentReason::InvalidCount),
    }
}

/// Validate a statement found inside the block path `ctx`
pub fn analyze<S: AsRef<str>>(stmt: &Statement<'_>, ctx: &[S], checks: Checks) -> Result<(), ConfigError> {
    let specs = directives::lookup(stmt.name);

    if checks.strict && specs.is_none() {
        return Err(ConfigError::new(
            ErrorKind::UnknownDirective,
            format!("unknown directive \"{}\"", stmt.name),
            stmt.file,
            stmt.line,
        ));
    }

    // unknown directives and unknown contexts cannot be judged
    let (Some(specs), Some(context)) = (specs, Context::from_path(ctx)) else {
        return Ok(());
    };

    let candidates: Vec<&DirectiveSpec> = if checks.check_ctx {
        let allowed: Vec<&DirectiveSpec> = specs.iter().filter(|s| s.contexts.contains(context)).collect();
        if allowed.is_empty() {
            return Err(ConfigError::new(
                ErrorKind::NotAllowedHere,
                format!("\"{}\" directive is not allowed here", stmt.name),
                stmt.file,
                stmt.line,
            ));
        }
        allowed
    } else {
        specs.iter().collect()
    };

    if !checks.check_args {
        return Ok(());
    }

    let mut reasons = Vec::new();
    for spec in candidates.iter().rev() {
        match check_spec(spec, stmt) {
            Ok(()) => return Ok(()),
            Err(reason) => reasons.push(reason),
        }
    }

    let (kind, reason) = collapse_reasons(&reasons, stmt.name)
        .unwrap_or((ErrorKind::InvalidArguments, format!("invalid number of arguments in \"{}\" directive", stmt.name)));
    Err(ConfigError::new(kind, reason, stmt.file, stmt.line))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::directives::DIRECTIVES;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn check(name: &str, values: &[&str], terminator: Terminator, ctx: &[&str], checks: Checks) -> Result<(), ConfigError> {
        let args = args(values);
        let stmt = Statement {
            file: "nginx.conf",
            line: 7,
            name,
            args: &args,
            terminator,
        };
        analyze(&stmt, ctx, checks)
    }

    fn strict() -> Checks {
        Checks {
            strict: true,
            ..Checks::default()
        }
    }

    /// Arguments that satisfy `arity`
    fn sample_args(arity: Arity) -> Vec<&'static str> {
        let n = match arity {
            Arity::Exact(n) => n as usize,
            Arity::OneOf(ns) => ns[0] as usize,
            Arity::AtLeast(n) => n as usize,
            Arity::Any => 0,
            Arity::Flag => return vec!["on"],
        };
        vec!["x"; n]
    }

    #[test]
    fn test_every_table_shape_validates_in_its_contexts() {
        for (name, specs) in DIRECTIVES {
            for spec in *specs {
                let terminator = if spec.block {
                    Terminator::BlockOpen
                } else {
                    Terminator::Semicolon
                };
                for ctx in spec.contexts.iter() {
                    let result = check(name, &sample_args(spec.arity), terminator, ctx.path(), strict());
                    assert!(result.is_ok(), "{} in {}: {:?}", name, ctx, result);
                }
            }
        }
    }

    #[test]
    fn test_every_directive_rejected_outside_its_contexts() {
        for (name, specs) in DIRECTIVES {
            for ctx in Context::ALL {
                if specs.iter().any(|s| s.contexts.contains(ctx)) {
                    continue;
                }
                let err = check(name, &[], Terminator::Semicolon, ctx.path(), strict()).unwrap_err();
                assert_eq!(err.kind, ErrorKind::NotAllowedHere, "{} in {}", name, ctx);
            }
        }
    }

    #[test]
    fn test_listen_contexts() {
        let ok = |ctx: &[&str]| check("listen", &["80"], Terminator::Semicolon, ctx, strict());
        assert!(ok(&["http", "server"]).is_ok());
        assert!(ok(&["mail", "server"]).is_ok());
        assert!(ok(&["stream", "server"]).is_ok());

        let err = ok(&["http"]).unwrap_err();
        assert_eq!(err.to_string(), "nginx.conf:7 \"listen\" directive is not allowed here");
    }

    #[test]
    fn test_worker_connections_errors_are_distinct() {
        let events = &["events"];
        assert!(check("worker_connections", &["1024"], Terminator::Semicolon, events, strict()).is_ok());

        let no_args = check("worker_connections", &[], Terminator::Semicolon, events, strict()).unwrap_err();
        assert_eq!(no_args.reason, "invalid number of arguments in \"worker_connections\" directive");

        let block = check("worker_connections", &["1024"], Terminator::BlockOpen, events, strict()).unwrap_err();
        assert_eq!(block.reason, "directive \"worker_connections\" is not terminated by \";\"");

        assert_ne!(no_args.reason, block.reason);
    }

    #[test]
    fn test_block_required() {
        let err = check("http", &[], Terminator::Semicolon, &[], strict()).unwrap_err();
        assert_eq!(err.reason, "directive \"http\" has no opening \"{\"");
    }

    #[test]
    fn test_flag_values() {
        let main: &[&str] = &[];
        assert!(check("daemon", &["on"], Terminator::Semicolon, main, strict()).is_ok());
        assert!(check("daemon", &["OFF"], Terminator::Semicolon, main, strict()).is_ok());

        let err = check("daemon", &["yes"], Terminator::Semicolon, main, strict()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidFlag);
        assert_eq!(
            err.reason,
            "invalid value \"yes\" in \"daemon\" directive, it must be \"on\" or \"off\""
        );

        let err = check("daemon", &["on", "off"], Terminator::Semicolon, main, strict()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidArguments);
    }

    #[test]
    fn test_unknown_directive() {
        let err = check("frobnicate", &[], Terminator::Semicolon, &["http"], strict()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnknownDirective);
        assert_eq!(err.reason, "unknown directive \"frobnicate\"");

        assert!(check("frobnicate", &[], Terminator::Semicolon, &["http"], Checks::default()).is_ok());
    }

    #[test]
    fn test_unknown_context_passes() {
        // map bodies hold arbitrary key/value pairs
        assert!(check("listen", &[], Terminator::BlockOpen, &["http", "map"], strict()).is_ok());
    }

    #[test]
    fn test_toggles() {
        let off = Checks {
            strict: false,
            check_ctx: false,
            check_args: true,
        };
        assert!(check("listen", &["80"], Terminator::Semicolon, &["http"], off).is_ok());

        let off = Checks {
            strict: false,
            check_ctx: true,
            check_args: false,
        };
        assert!(check("worker_connections", &[], Terminator::BlockOpen, &["events"], off).is_ok());
    }

    #[test]
    fn test_later_alternative_wins() {
        // `server` with arguments is only legal in an upstream
        let ctx = &["http", "upstream"];
        assert!(check("server", &["10.0.0.1:80", "weight=5"], Terminator::Semicolon, ctx, strict()).is_ok());
        let err = check("server", &[], Terminator::BlockOpen, ctx, strict()).unwrap_err();
        assert_eq!(err.reason, "directive \"server\" is not terminated by \";\"");
    }

    #[test]
    fn test_collapse_restamps_first_template() {
        let reasons = vec![
            ArgumentReason::InvalidFlag { value: "maybe".into() },
            ArgumentReason::InvalidCount,
        ];
        let (kind, message) = collapse_reasons(&reasons, "proxy_next_upstream").unwrap();
        assert_eq!(kind, ErrorKind::InvalidFlag);
        assert_eq!(
            message,
            "invalid value \"maybe\" in \"proxy_next_upstream\" directive, it must be \"on\" or \"off\"; \
             invalid value \"\" in \"proxy_next_upstream\" directive, it must be \"on\" or \"off\""
        );

        let same = vec![ArgumentReason::InvalidCount, ArgumentReason::NotTerminated];
        let (_, message) = collapse_reasons(&same, "x").unwrap();
        assert_eq!(message, "invalid number of arguments in \"x\" directive");

        assert!(collapse_reasons(&[], "x").is_none());
    }
}
