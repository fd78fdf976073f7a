//! JSON payload adapter
//!
//! The payload mirrors the parse result file by file:
//!
//! ```json
//! {"status": "ok", "errors": [],
//!  "config": [{"file": "nginx.conf", "status": "ok", "errors": [],
//!              "parsed": [{"directive": "events", "line": 1, "args": [], "block": []}]}]}
//! ```
//!
//! `includes` holds indexes into `config`. After a combine pass every
//! statement also names its source `file`.

use crate::parser::ast::{Node, NodeId, ParseOutput, Status, Tree, COMMENT};
use ngxclair_core::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

/// Whole-parse payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    pub status: Status,
    #[serde(default)]
    pub errors: Vec<PayloadError>,
    pub config: Vec<ConfigPayload>,
}

/// Error in the top-level list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PayloadError {
    pub file: String,
    pub line: Option<usize>,
    pub error: String,
}

/// One parsed file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigPayload {
    pub file: String,
    pub status: Status,
    #[serde(default)]
    pub errors: Vec<FileError>,
    pub parsed: Vec<StatementPayload>,
}

/// Error in a file's own list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileError {
    pub line: Option<usize>,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementPayload {
    pub directive: String,
    #[serde(default)]
    pub line: usize,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<Vec<usize>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub block: Option<Vec<StatementPayload>>,
}

impl Payload {
    pub fn from_output(output: &ParseOutput) -> Self {
        let errors = output
            .errors
            .iter()
            .map(|e| PayloadError {
                file: e.file.clone(),
                line: e.line,
                error: e.to_string(),
            })
            .collect();

        let config = output
            .files
            .iter()
            .map(|file| ConfigPayload {
                file: file.file.clone(),
                status: file.status,
                errors: file
                    .errors
                    .iter()
                    .map(|e| FileError {
                        line: e.line,
                        error: e.to_string(),
                    })
                    .collect(),
                parsed: statements(&output.tree, &file.roots, output.combined),
            })
            .collect();

        Self {
            status: output.status,
            errors,
            config,
        }
    }
}

fn statements(tree: &Tree, ids: &[NodeId], with_file: bool) -> Vec<StatementPayload> {
    ids.iter()
        .map(|id| {
            let node = tree.get(*id);
            StatementPayload {
                directive: node.name.clone(),
                line: node.line,
                args: node.args.clone(),
                file: with_file.then(|| node.file.clone()),
                comment: node.comment.clone(),
                includes: node
                    .includes
                    .as_ref()
                    .map(|files| files.iter().map(|f| f.index()).collect()),
                block: node.block.as_ref().map(|b| statements(tree, b, with_file)),
            }
        })
        .collect()
}

impl ConfigPayload {
    /// Rebuild the arena form of `parsed`
    ///
    /// `includes` links are dropped; each file of a payload is built on its own.
    pub fn to_tree(&self) -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new();
        let roots = self
            .parsed
            .iter()
            .map(|stmt| insert(&mut tree, stmt, &self.file))
            .collect();
        (tree, roots)
    }
}

fn insert(tree: &mut Tree, stmt: &StatementPayload, file: &str) -> NodeId {
    let file = stmt.file.as_deref().unwrap_or(file);
    let node = match &stmt.comment {
        Some(text) if stmt.directive == COMMENT => Node::comment(text.clone(), file, stmt.line),
        _ => Node::directive(stmt.directive.clone(), file, stmt.line, stmt.args.clone()),
    };
    let id = tree.push(node);
    if let Some(block) = &stmt.block {
        tree.get_mut(id).block = Some(Vec::new());
        for child in block {
            let child = insert(tree, child, file);
            tree.attach(id, child);
        }
    }
    id
}

/// JSON payload adapter
pub struct JsonAdapter;

impl JsonAdapter {
    /// Parse a JSON payload
    pub fn parse(input: &str) -> Result<Payload> {
        serde_json::from_str(input).map_err(|e| ngxclair_core::Error::Config(format!("invalid payload: {}", e)))
    }

    /// Serialize a parse result, compact or indented by `indent` spaces
    pub fn serialize(output: &ParseOutput, indent: Option<usize>) -> Result<String> {
        Self::to_string(&Payload::from_output(output), indent)
    }

    pub fn to_string<T: Serialize>(value: &T, indent: Option<usize>) -> Result<String> {
        let Some(width) = indent else {
            return serde_json::to_string(value).map_err(|e| ngxclair_core::Error::Internal(e.to_string()));
        };
        let pad = " ".repeat(width);
        let mut out = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(pad.as_bytes()));
        value
            .serialize(&mut ser)
            .map_err(|e| ngxclair_core::Error::Internal(e.to_string()))?;
        String::from_utf8(out).map_err(|e| ngxclair_core::Error::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{build, BuildOptions};
    use crate::parser::fs::MemoryFileSystem;
    use crate::parser::{ParseOptions, Parser};

    fn parse(fs: &MemoryFileSystem, options: ParseOptions) -> ParseOutput {
        Parser::new(fs, options).parse_file("nginx.conf")
    }

    #[test]
    fn test_payload_shape() {
        let fs = MemoryFileSystem::new()
            .with_file("nginx.conf", "events {}\nhttp {\n    include mime.types;\n}\n")
            .with_file("mime.types", "types { text/html html; }\n");
        let output = parse(&fs, ParseOptions::default());
        let json: serde_json::Value = serde_json::from_str(&JsonAdapter::serialize(&output, None).unwrap()).unwrap();

        assert_eq!(json["status"], "ok");
        assert_eq!(json["errors"].as_array().unwrap().len(), 0);
        assert_eq!(json["config"].as_array().unwrap().len(), 2);

        let parsed = &json["config"][0]["parsed"];
        assert_eq!(parsed[0]["directive"], "events");
        assert_eq!(parsed[0]["block"].as_array().unwrap().len(), 0);
        assert_eq!(parsed[1]["block"][0]["includes"], serde_json::json!([1]));
        assert!(parsed[1]["block"][0].get("file").is_none());
        assert_eq!(json["config"][1]["file"], "mime.types");
        assert_eq!(json["config"][1]["parsed"][0]["block"][0]["args"], serde_json::json!(["html"]));
    }

    #[test]
    fn test_payload_errors() {
        let fs = MemoryFileSystem::new().with_file("nginx.conf", "events {}\nworker_connections 10;\n");
        let output = parse(&fs, ParseOptions::default());
        let payload = Payload::from_output(&output);

        assert_eq!(payload.status, Status::Failed);
        assert_eq!(payload.errors[0].line, Some(2));
        assert_eq!(
            payload.errors[0].error,
            "nginx.conf:2 \"worker_connections\" directive is not allowed here"
        );
        assert_eq!(payload.config[0].errors[0].line, Some(2));
    }

    #[test]
    fn test_combined_payload_names_files() {
        let fs = MemoryFileSystem::new()
            .with_file("nginx.conf", "http {\n    include site.conf;\n}\n")
            .with_file("site.conf", "server { listen 80; }\n");
        let options = ParseOptions {
            combine: true,
            ..ParseOptions::default()
        };
        let payload = Payload::from_output(&parse(&fs, options));

        assert_eq!(payload.config.len(), 1);
        let http = &payload.config[0].parsed[0];
        assert_eq!(http.file.as_deref(), Some("nginx.conf"));
        let server = &http.block.as_ref().unwrap()[0];
        assert_eq!(server.directive, "server");
        assert_eq!(server.file.as_deref(), Some("site.conf"));
    }

    #[test]
    fn test_parse_and_build_payload() {
        let input = r##"{
            "status": "ok",
            "errors": [],
            "config": [{
                "file": "nginx.conf",
                "status": "ok",
                "errors": [],
                "parsed": [
                    {"directive": "#", "line": 1, "args": [], "comment": " generated"},
                    {"directive": "http", "line": 2, "args": [], "block": [
                        {"directive": "server", "line": 3, "args": [], "block": [
                            {"directive": "listen", "line": 4, "args": ["80"]},
                            {"directive": "return", "line": 5, "args": ["200", "hello world"]}
                        ]}
                    ]}
                ]
            }]
        }"##;
        let payload = JsonAdapter::parse(input).unwrap();
        let (tree, roots) = payload.config[0].to_tree();
        assert_eq!(
            build(&tree, &roots, &BuildOptions::default()),
            "# generated\nhttp {\n    server {\n        listen 80;\n        return 200 \"hello world\";\n    }\n}"
        );
    }

    #[test]
    fn test_rejects_malformed_payload() {
        assert!(JsonAdapter::parse("{\"status\": \"ok\"}").is_err());
        assert!(JsonAdapter::parse("not json").is_err());
    }

    #[test]
    fn test_indented_output() {
        let fs = MemoryFileSystem::new().with_file("nginx.conf", "events {}\n");
        let text = JsonAdapter::serialize(&parse(&fs, ParseOptions::default()), Some(2)).unwrap();
        assert!(text.contains("\n  \"status\": \"ok\""), "{}", text);
    }
}
