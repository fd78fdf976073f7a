//! Compiler for parsed nginx configuration
//!
//! Walks a combined tree and produces the typed [`ProxyConfig`] consumed by
//! the serving engine. The tree is trusted: contexts and arities were
//! checked by the parser, so only argument values are interpreted here.

use crate::parser::ast::{Node, NodeId, ParseOutput, Tree};
use crate::parser::combine;
use ngxclair_core::config::{
    ListenConfig, LocationConfig, LocationModifier, ProxyConfig, ReturnConfig, ServerConfig,
    StreamServerConfig, UpstreamConfig, UpstreamScope, UpstreamServer,
};
use thiserror::Error;
use tracing::debug;

/// Compiler errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CompileError {
    #[error("{file}:{line} invalid return code \"{value}\"")]
    InvalidReturnCode { file: String, line: usize, value: String },

    #[error("{file}:{line} invalid parameter \"{value}\" in \"{directive}\" directive")]
    InvalidParameter {
        file: String,
        line: usize,
        directive: String,
        value: String,
    },

    #[error("{file}:{line} \"{directive}\" directive is missing its argument")]
    MissingArgument { file: String, line: usize, directive: String },
}

type CompileResult<T> = Result<T, CompileError>;

/// Compile a parse result, splicing includes first if that has not happened
pub fn compile_output(output: &ParseOutput) -> CompileResult<ProxyConfig> {
    if output.combined {
        return compile_tree(&output.tree, output.roots());
    }
    let combined = combine(output);
    compile_tree(&combined.tree, combined.roots())
}

/// Compile the top-level statements `roots` of an include-free tree
pub fn compile_tree(tree: &Tree, roots: &[NodeId]) -> CompileResult<ProxyConfig> {
    let mut config = ProxyConfig {
        worker_processes: tree
            .named(roots, "worker_processes")
            .last()
            .and_then(|(_, n)| n.arg(0))
            .map(str::to_string),
        ..ProxyConfig::default()
    };

    for (http, _) in tree.named(roots, "http") {
        let block = tree.children(http);
        for (server, node) in tree.named(block, "server") {
            config.http_servers.push(compile_server(tree, server, node, &root_of(tree, block))?);
        }
        for (upstream, node) in tree.named(block, "upstream") {
            config.upstreams.push(compile_upstream(tree, upstream, node, UpstreamScope::Http)?);
        }
    }

    for (stream, _) in tree.named(roots, "stream") {
        let block = tree.children(stream);
        for (server, node) in tree.named(block, "server") {
            config.stream_servers.push(compile_stream_server(tree, server, node)?);
        }
        for (upstream, node) in tree.named(block, "upstream") {
            config.upstreams.push(compile_upstream(tree, upstream, node, UpstreamScope::Stream)?);
        }
    }

    debug!(
        http_servers = config.http_servers.len(),
        stream_servers = config.stream_servers.len(),
        upstreams = config.upstreams.len(),
        "compiled configuration"
    );
    Ok(config)
}

/// Last `root` among `ids`, the value a nested level would inherit
fn root_of(tree: &Tree, ids: &[NodeId]) -> Option<String> {
    tree.named(ids, "root")
        .last()
        .and_then(|(_, n)| n.arg(0))
        .map(str::to_string)
}

fn first_arg<'a>(node: &'a Node) -> CompileResult<&'a str> {
    node.arg(0).ok_or_else(|| CompileError::MissingArgument {
        file: node.file.clone(),
        line: node.line,
        directive: node.name.clone(),
    })
}

fn compile_listen(node: &Node) -> CompileResult<ListenConfig> {
    let mut listen = ListenConfig {
        address: first_arg(node)?.to_string(),
        ..ListenConfig::default()
    };
    for param in &node.args[1..] {
        match param.as_str() {
            "ssl" => listen.ssl = true,
            "http2" => listen.http2 = true,
            "default_server" | "default" => listen.default_server = true,
            _ => listen.params.push(param.clone()),
        }
    }
    Ok(listen)
}

fn compile_server(tree: &Tree, id: NodeId, node: &Node, inherited_root: &Option<String>) -> CompileResult<ServerConfig> {
    let block = tree.children(id);
    let mut config = ServerConfig {
        file: node.file.clone(),
        line: node.line,
        ..ServerConfig::default()
    };

    for (_, listen) in tree.named(block, "listen") {
        config.listen.push(compile_listen(listen)?);
    }
    for (_, names) in tree.named(block, "server_name") {
        config.server_names.extend(names.args.iter().cloned());
    }

    let root = root_of(tree, block).or_else(|| inherited_root.clone());
    compile_locations(tree, block, 0, &root, &mut config.locations)?;
    Ok(config)
}

/// Append every location under `block`, nested ones after their parent
fn compile_locations(
    tree: &Tree,
    block: &[NodeId],
    depth: usize,
    inherited_root: &Option<String>,
    out: &mut Vec<LocationConfig>,
) -> CompileResult<()> {
    for (id, node) in tree.named(block, "location") {
        let inner = tree.children(id);
        let (modifier, path) = split_location(node)?;
        let root = root_of(tree, inner).or_else(|| inherited_root.clone());

        out.push(LocationConfig {
            modifier,
            path,
            proxy_pass: tree
                .named(inner, "proxy_pass")
                .last()
                .and_then(|(_, n)| n.arg(0))
                .map(str::to_string),
            r#return: tree.named(inner, "return").next().map(|(_, n)| compile_return(n)).transpose()?,
            root: root.clone(),
            depth,
        });

        compile_locations(tree, inner, depth + 1, &root, out)?;
    }
    Ok(())
}

fn split_location(node: &Node) -> CompileResult<(LocationModifier, String)> {
    let modifier = |m: &str| match m {
        "=" => Some(LocationModifier::Exact),
        "^~" => Some(LocationModifier::PrefixNoRegex),
        "~" => Some(LocationModifier::Regex),
        "~*" => Some(LocationModifier::RegexCaseless),
        _ => None,
    };

    match node.args.as_slice() {
        [m, path] => match modifier(m) {
            Some(modifier) => Ok((modifier, path.clone())),
            None => Err(CompileError::InvalidParameter {
                file: node.file.clone(),
                line: node.line,
                directive: node.name.clone(),
                value: m.clone(),
            }),
        },
        [path] if path.starts_with('@') => Ok((LocationModifier::Named, path.clone())),
        [path] => {
            // `location =/exact`, `location ~*\.png$`
            for prefix in ["~*", "^~", "=", "~"] {
                if let Some(rest) = path.strip_prefix(prefix).filter(|r| !r.is_empty()) {
                    if let Some(m) = modifier(prefix) {
                        return Ok((m, rest.to_string()));
                    }
                }
            }
            Ok((LocationModifier::Prefix, path.clone()))
        }
        _ => Err(CompileError::MissingArgument {
            file: node.file.clone(),
            line: node.line,
            directive: node.name.clone(),
        }),
    }
}

fn compile_return(node: &Node) -> CompileResult<ReturnConfig> {
    let first = first_arg(node)?;
    match first.parse::<u16>() {
        Ok(code) if code <= 999 => Ok(ReturnConfig {
            code: Some(code),
            text: node.arg(1).map(str::to_string),
        }),
        _ if node.args.len() == 1
            && ["http://", "https://", "$scheme"].iter().any(|p| first.starts_with(p)) =>
        {
            Ok(ReturnConfig {
                code: None,
                text: Some(first.to_string()),
            })
        }
        _ => Err(CompileError::InvalidReturnCode {
            file: node.file.clone(),
            line: node.line,
            value: first.to_string(),
        }),
    }
}

fn compile_stream_server(tree: &Tree, id: NodeId, node: &Node) -> CompileResult<StreamServerConfig> {
    let block = tree.children(id);
    let mut config = StreamServerConfig {
        file: node.file.clone(),
        line: node.line,
        ..StreamServerConfig::default()
    };
    for (_, listen) in tree.named(block, "listen") {
        config.listen.push(compile_listen(listen)?);
    }
    config.proxy_pass = tree
        .named(block, "proxy_pass")
        .last()
        .and_then(|(_, n)| n.arg(0))
        .map(str::to_string);
    Ok(config)
}

const BALANCING_METHODS: &[&str] = &["least_conn", "ip_hash", "hash", "random", "least_time"];

fn compile_upstream(tree: &Tree, id: NodeId, node: &Node, scope: UpstreamScope) -> CompileResult<UpstreamConfig> {
    let mut config = UpstreamConfig {
        name: first_arg(node)?.to_string(),
        scope,
        ..UpstreamConfig::default()
    };

    for child in tree.children(id) {
        let child = tree.get(*child);
        if BALANCING_METHODS.contains(&child.name.as_str()) {
            let mut method = vec![child.name.clone()];
            method.extend(child.args.iter().cloned());
            config.method = Some(method.join(" "));
        } else if child.name == "server" {
            config.servers.push(compile_upstream_server(child)?);
        }
    }
    Ok(config)
}

fn compile_upstream_server(node: &Node) -> CompileResult<UpstreamServer> {
    let mut server = UpstreamServer {
        address: first_arg(node)?.to_string(),
        weight: 1,
        ..UpstreamServer::default()
    };
    for param in &node.args[1..] {
        if let Some(weight) = param.strip_prefix("weight=") {
            server.weight = weight
                .parse()
                .ok()
                .filter(|w| *w > 0)
                .ok_or_else(|| CompileError::InvalidParameter {
                    file: node.file.clone(),
                    line: node.line,
                    directive: node.name.clone(),
                    value: param.clone(),
                })?;
            continue;
        }
        match param.as_str() {
            "backup" => server.backup = true,
            "down" => server.down = true,
            _ => server.params.push(param.clone()),
        }
    }
    Ok(server)
}
