//! Block contexts
//!
//! A context is the chain of enclosing block names (`http`, `server`, ...)
//! that decides which directives are legal. Only the paths nginx itself
//! distinguishes get a [`Context`]; anything else is unknown and is not
//! judged.

use std::fmt;
use std::ops::BitOr;

/// A context nginx recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Context {
    Main,
    Events,
    MailMain,
    MailServer,
    StreamMain,
    StreamServer,
    StreamUpstream,
    HttpMain,
    HttpServer,
    HttpLocation,
    HttpUpstream,
    HttpServerIf,
    HttpLocationIf,
    HttpLimitExcept,
}

impl Context {
    pub const ALL: [Context; 14] = [
        Context::Main,
        Context::Events,
        Context::MailMain,
        Context::MailServer,
        Context::StreamMain,
        Context::StreamServer,
        Context::StreamUpstream,
        Context::HttpMain,
        Context::HttpServer,
        Context::HttpLocation,
        Context::HttpUpstream,
        Context::HttpServerIf,
        Context::HttpLocationIf,
        Context::HttpLimitExcept,
    ];

    /// Bit used for this context in a [`ContextSet`]
    pub const fn bit(self) -> u16 {
        1 << (self as u16)
    }

    /// Block path that selects this context
    pub const fn path(self) -> &'static [&'static str] {
        match self {
            Context::Main => &[],
            Context::Events => &["events"],
            Context::MailMain => &["mail"],
            Context::MailServer => &["mail", "server"],
            Context::StreamMain => &["stream"],
            Context::StreamServer => &["stream", "server"],
            Context::StreamUpstream => &["stream", "upstream"],
            Context::HttpMain => &["http"],
            Context::HttpServer => &["http", "server"],
            Context::HttpLocation => &["http", "location"],
            Context::HttpUpstream => &["http", "upstream"],
            Context::HttpServerIf => &["http", "server", "if"],
            Context::HttpLocationIf => &["http", "location", "if"],
            Context::HttpLimitExcept => &["http", "location", "limit_except"],
        }
    }

    /// Context selected by a block path, if nginx knows it
    pub fn from_path<S: AsRef<str>>(path: &[S]) -> Option<Context> {
        Context::ALL.into_iter().find(|ctx| {
            let known = ctx.path();
            known.len() == path.len() && known.iter().zip(path).all(|(a, b)| *a == b.as_ref())
        })
    }
}

impl fmt::Display for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path = self.path();
        if path.is_empty() {
            write!(f, "main")
        } else {
            write!(f, "{}", path.join(","))
        }
    }
}

/// Set of contexts a directive may appear in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ContextSet(u16);

impl ContextSet {
    pub const EMPTY: ContextSet = ContextSet(0);

    pub const fn from_bits(bits: u16) -> Self {
        ContextSet(bits)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, ctx: Context) -> bool {
        self.0 & ctx.bit() != 0
    }

    pub const fn intersects(self, other: ContextSet) -> bool {
        self.0 & other.0 != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Context> {
        Context::ALL.into_iter().filter(move |ctx| self.contains(*ctx))
    }
}

impl From<Context> for ContextSet {
    fn from(ctx: Context) -> Self {
        ContextSet(ctx.bit())
    }
}

impl BitOr for ContextSet {
    type Output = ContextSet;

    fn bitor(self, rhs: ContextSet) -> ContextSet {
        ContextSet(self.0 | rhs.0)
    }
}

/// Context path for the block opened by `directive` inside `current`
///
/// `location` anywhere under `http` always yields `http,location`: nesting a
/// location in a location does not change what is legal inside it.
pub fn enter_block<S: AsRef<str>>(current: &[S], directive: &str) -> Vec<String> {
    if directive == "location" && current.first().is_some_and(|c| c.as_ref() == "http") {
        return vec!["http".to_string(), "location".to_string()];
    }
    let mut next: Vec<String> = current.iter().map(|s| s.as_ref().to_string()).collect();
    next.push(directive.to_string());
    next
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_roundtrip() {
        for ctx in Context::ALL {
            assert_eq!(Context::from_path(ctx.path()), Some(ctx));
        }
        assert_eq!(Context::from_path(&["http", "map"]), None);
        assert_eq!(Context::from_path::<&str>(&[]), Some(Context::Main));
    }

    #[test]
    fn test_bits_are_distinct() {
        let all = Context::ALL.iter().fold(0u16, |acc, ctx| {
            assert_eq!(acc & ctx.bit(), 0);
            acc | ctx.bit()
        });
        assert_eq!(all.count_ones(), 14);
    }

    #[test]
    fn test_set_ops() {
        let set = ContextSet::from(Context::HttpServer) | ContextSet::from(Context::MailServer);
        assert!(set.contains(Context::MailServer));
        assert!(!set.contains(Context::HttpMain));
        assert!(set.intersects(Context::HttpServer.into()));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Context::MailServer, Context::HttpServer]);
    }

    #[test]
    fn test_enter_block() {
        assert_eq!(enter_block::<&str>(&[], "http"), vec!["http"]);
        assert_eq!(enter_block(&["http"], "server"), vec!["http", "server"]);
        assert_eq!(enter_block(&["http", "server"], "location"), vec!["http", "location"]);
        assert_eq!(enter_block(&["http", "location"], "location"), vec!["http", "location"]);
        assert_eq!(enter_block(&["http", "location"], "if"), vec!["http", "location", "if"]);
        assert_eq!(enter_block(&["stream"], "server"), vec!["stream", "server"]);
    }
}
