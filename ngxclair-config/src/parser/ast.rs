//! Parsed configuration tree
//!
//! Nodes live in one arena ([`Tree`]) and refer to each other by index.
//! A node owns its block through the ids listed in [`Node::block`]; its
//! parent is stored as an index only. `include` nodes point at the files they
//! pulled in through [`FileId`]s into [`ParseOutput::files`], which lets the
//! same file be spliced in at several places.

use crate::error::ConfigError;
use serde::Serialize;

/// Index of a node in its [`Tree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Index of a parsed file in [`ParseOutput::files`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct FileId(usize);

impl FileId {
    pub const ROOT: FileId = FileId(0);

    pub fn new(index: usize) -> Self {
        FileId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Name used by comment pseudo-nodes
pub const COMMENT: &str = "#";

/// One statement or comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub name: String,
    pub file: String,
    pub line: usize,
    pub args: Vec<String>,
    /// Comment text without the leading `#`, for comment nodes
    pub comment: Option<String>,
    pub parent: Option<NodeId>,
    /// `Some` when the statement opened a block, even an empty one
    pub block: Option<Vec<NodeId>>,
    /// Files pulled in by an `include`
    pub includes: Option<Vec<FileId>>,
}

impl Node {
    pub fn directive(name: impl Into<String>, file: impl Into<String>, line: usize, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            file: file.into(),
            line,
            args,
            comment: None,
            parent: None,
            block: None,
            includes: None,
        }
    }

    pub fn comment(text: impl Into<String>, file: impl Into<String>, line: usize) -> Self {
        Self {
            comment: Some(text.into()),
            ..Self::directive(COMMENT, file, line, Vec::new())
        }
    }

    pub fn is_comment(&self) -> bool {
        self.name == COMMENT
    }

    /// Argument at `index`, if present
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(String::as_str)
    }
}

/// Arena holding every node of one parse
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a detached node
    pub fn push(&mut self, node: Node) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    /// Append `child` to `parent`'s block, opening the block if needed
    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].block.get_or_insert_with(Vec::new).push(child);
    }

    /// Ids in `id`'s block, empty for a plain statement
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).block.as_deref().unwrap_or(&[])
    }

    /// Walk parent indices from `id` up to its top-level ancestor
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).parent, move |p| self.get(*p).parent)
    }

    /// Names of the enclosing blocks, outermost first
    pub fn block_path(&self, id: NodeId) -> Vec<&str> {
        let mut path: Vec<&str> = self.ancestors(id).map(|p| self.get(p).name.as_str()).collect();
        path.reverse();
        path
    }

    /// Nodes among `ids` named `name`
    pub fn named<'a>(&'a self, ids: &'a [NodeId], name: &'a str) -> impl Iterator<Item = (NodeId, &'a Node)> + 'a {
        ids.iter().map(move |id| (*id, self.get(*id))).filter(move |(_, n)| n.name == name)
    }

    /// Structural view of `roots`, for comparing parses
    pub fn outline(&self, roots: &[NodeId]) -> Vec<Outline> {
        roots
            .iter()
            .map(|id| {
                let node = self.get(*id);
                Outline {
                    name: node.name.clone(),
                    args: node.args.clone(),
                    comment: node.comment.clone(),
                    block: node.block.as_ref().map(|b| self.outline(b)),
                }
            })
            .collect()
    }
}

/// Line- and file-free shape of a subtree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outline {
    pub name: String,
    pub args: Vec<String>,
    pub comment: Option<String>,
    pub block: Option<Vec<Outline>>,
}

/// Whether a file or a whole parse ran clean
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Failed,
}

/// Parse result for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileConfig {
    pub file: String,
    pub status: Status,
    pub errors: Vec<ConfigError>,
    /// Top-level statements, in source order
    pub roots: Vec<NodeId>,
}

impl FileConfig {
    pub fn new(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            status: Status::Ok,
            errors: Vec::new(),
            roots: Vec::new(),
        }
    }

    pub fn push_error(&mut self, error: ConfigError) {
        self.status = Status::Failed;
        self.errors.push(error);
    }
}

/// Everything one parse produced: the root file and every file it included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOutput {
    pub status: Status,
    /// Every error from every file, in the order they were found
    pub errors: Vec<ConfigError>,
    pub tree: Tree,
    /// Root file first, then included files in discovery order
    pub files: Vec<FileConfig>,
    /// Includes have been spliced in and `files` holds only the root
    pub combined: bool,
}

impl ParseOutput {
    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn root(&self) -> Option<&FileConfig> {
        self.files.first()
    }

    /// Top-level statements of the root file
    pub fn roots(&self) -> &[NodeId] {
        self.root().map(|f| f.roots.as_slice()).unwrap_or(&[])
    }

    pub fn file(&self, id: FileId) -> Option<&FileConfig> {
        self.files.get(id.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Tree, Vec<NodeId>) {
        let mut tree = Tree::new();
        let http = tree.push(Node::directive("http", "nginx.conf", 1, vec![]));
        let server = tree.push(Node::directive("server", "nginx.conf", 2, vec![]));
        tree.attach(http, server);
        let listen = tree.push(Node::directive("listen", "nginx.conf", 3, vec!["80".into()]));
        tree.attach(server, listen);
        let note = tree.push(Node::comment(" main site", "nginx.conf", 3));
        tree.attach(server, note);
        (tree, vec![http])
    }

    #[test]
    fn test_attach_and_ancestry() {
        let (tree, roots) = sample();
        let server = tree.children(roots[0])[0];
        let listen = tree.children(server)[0];

        assert_eq!(tree.get(listen).parent, Some(server));
        assert_eq!(tree.ancestors(listen).collect::<Vec<_>>(), vec![server, roots[0]]);
        assert_eq!(tree.block_path(listen), vec!["http", "server"]);
        assert!(tree.block_path(roots[0]).is_empty());
        assert!(tree.children(listen).is_empty());
    }

    #[test]
    fn test_named() {
        let (tree, roots) = sample();
        let server = tree.children(roots[0])[0];
        let found: Vec<_> = tree.named(tree.children(server), "listen").collect();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].1.arg(0), Some("80"));
    }

    #[test]
    fn test_outline_ignores_lines() {
        let (tree, roots) = sample();
        let mut moved = tree.clone();
        for id in 0..moved.len() {
            moved.get_mut(NodeId(id)).line += 10;
        }
        assert_eq!(tree.outline(&roots), moved.outline(&roots));
        assert!(tree.get(tree.children(tree.children(roots[0])[0])[1]).is_comment());
    }

    #[test]
    fn test_file_config_status() {
        let mut file = FileConfig::new("a.conf");
        assert_eq!(file.status, Status::Ok);
        file.push_error(ConfigError::unlocated(crate::error::ErrorKind::Io, "boom", "a.conf"));
        assert_eq!(file.status, Status::Failed);
    }
}
