//! Compiled proxy model
//!
//! These types are the typed view of a parsed nginx configuration that the
//! serving engine consumes. They carry no behavior.

use serde::{Deserialize, Serialize};

/// Root of the compiled configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ProxyConfig {
    /// `worker_processes` at top level, if set
    #[serde(default)]
    pub worker_processes: Option<String>,

    /// Every `http { server { ... } }` block in source order
    #[serde(default)]
    pub http_servers: Vec<ServerConfig>,

    /// Every `stream { server { ... } }` block in source order
    #[serde(default)]
    pub stream_servers: Vec<StreamServerConfig>,

    /// Upstream pools from both `http` and `stream`
    #[serde(default)]
    pub upstreams: Vec<UpstreamConfig>,
}

/// HTTP virtual server
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerConfig {
    /// Listen sockets
    #[serde(default)]
    pub listen: Vec<ListenConfig>,

    /// `server_name` values
    #[serde(default)]
    pub server_names: Vec<String>,

    /// Location rules, flattened in source order
    #[serde(default)]
    pub locations: Vec<LocationConfig>,

    /// Source file and line of the `server` directive
    pub file: String,
    pub line: usize,
}

/// A `listen` directive
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ListenConfig {
    /// Address as written (`127.0.0.1:8080`, `[::]:443`, `80`, `unix:/run/x.sock`)
    pub address: String,

    #[serde(default)]
    pub ssl: bool,

    #[serde(default)]
    pub http2: bool,

    #[serde(default)]
    pub default_server: bool,

    /// Remaining parameters not interpreted above
    #[serde(default)]
    pub params: Vec<String>,
}

/// Location match modifier
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LocationModifier {
    /// No modifier: prefix match
    #[default]
    Prefix,
    /// `=`
    Exact,
    /// `^~`
    PrefixNoRegex,
    /// `~`
    Regex,
    /// `~*`
    RegexCaseless,
    /// `@name`
    Named,
}

/// A `location` block
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LocationConfig {
    pub modifier: LocationModifier,
    pub path: String,

    /// `proxy_pass` target, if any
    #[serde(default)]
    pub proxy_pass: Option<String>,

    /// `return` code and optional text/URL
    #[serde(default)]
    pub r#return: Option<ReturnConfig>,

    /// `root` directory, if any
    #[serde(default)]
    pub root: Option<String>,

    /// Nesting depth below the server (0 for top-level locations)
    #[serde(default)]
    pub depth: usize,
}

/// A `return` directive
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReturnConfig {
    /// Status code; `None` when the only argument is a URL (implied 302)
    pub code: Option<u16>,
    pub text: Option<String>,
}

/// TCP/UDP server
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct StreamServerConfig {
    #[serde(default)]
    pub listen: Vec<ListenConfig>,

    #[serde(default)]
    pub proxy_pass: Option<String>,

    pub file: String,
    pub line: usize,
}

/// Which block an upstream came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum UpstreamScope {
    #[default]
    Http,
    Stream,
}

/// An `upstream name { ... }` pool
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UpstreamConfig {
    pub name: String,
    pub scope: UpstreamScope,

    /// Balancing method directive (`least_conn`, `ip_hash`, `hash $x`), if any
    #[serde(default)]
    pub method: Option<String>,

    #[serde(default)]
    pub servers: Vec<UpstreamServer>,
}

/// A `server` line inside an upstream
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UpstreamServer {
    pub address: String,

    /// `weight=N`, default 1
    pub weight: u32,

    #[serde(default)]
    pub backup: bool,

    #[serde(default)]
    pub down: bool,

    /// Remaining parameters (`max_fails=`, `fail_timeout=`, ...)
    #[serde(default)]
    pub params: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names() {
        let location = LocationConfig {
            modifier: LocationModifier::RegexCaseless,
            path: r"\.png$".into(),
            r#return: Some(ReturnConfig { code: Some(404), text: None }),
            ..LocationConfig::default()
        };
        let json = serde_json::to_value(&location).unwrap();
        assert_eq!(json["modifier"], "regex_caseless");
        assert_eq!(json["return"]["code"], 404);

        let upstream: UpstreamConfig =
            serde_json::from_str(r#"{"name": "app", "scope": "stream"}"#).unwrap();
        assert_eq!(upstream.scope, UpstreamScope::Stream);
        assert!(upstream.servers.is_empty());
    }
}
