//! This crate provides the declared tree: the caller's description of the files and directories
//! that should exist under some root, independent of where that root is.
//!
//! A [Tree] maps names to [Node]s. A node is either a [FileNode], with optional [Content] and an
//! optional `skip` flag, or a [DirNode] with optional children of its own:
//!
//! ```
//! use treemount_schema::*;
//!
//! let tree = Tree::new()
//!     .file("settings.json", "{}")
//!     .skipped_file("history")
//!     .dir("logs", Tree::new().file("today.log", ""))
//!     .empty_dir("cache");
//!
//! assert_eq!(tree.len(), 4);
//! assert_eq!(tree.get("logs").unwrap().kind(), Kind::Dir);
//! tree.validate()?;
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Content may be computed on demand. A computed content is evaluated every time it is written
//! and is never cached:
//! ```
//! # use treemount_schema::*;
//! let stamp = Content::computed(|| format!("{}", 6 * 7));
//! assert_eq!(stamp.resolve(), "42");
//! ```
//!
//! Trees may also be declared in TOML, where a plain string is shorthand for a file with those
//! contents:
//! ```
//! # use treemount_schema::*;
//! let tree = Tree::from_toml(r#"
//!     "settings.json" = "{}"
//!     logs = { type = "dir", children = { "today.log" = "" } }
//!     history = { skip = true }
//! "#)?;
//! assert_eq!(tree.len(), 3);
//! # Ok::<(), anyhow::Error>(())
//! ```
#![warn(missing_docs)]

use std::{collections::BTreeMap, fmt::Display, rc::Rc};

use anyhow::{bail, Context as _, Result};

mod de;

/// Whether a node describes a file or a directory
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Kind {
    /// A regular file
    File,
    /// A directory
    Dir,
}

impl Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::File => write!(f, "file"),
            Kind::Dir => write!(f, "dir"),
        }
    }
}

/// The contents of a file, either given literally or computed when written
#[derive(Clone)]
pub enum Content {
    /// A fixed string
    Literal(String),
    /// A function producing the string, called at every point of use
    Computed(Rc<dyn Fn() -> String>),
}

impl Content {
    /// Constructs content computed by `f` each time it is needed
    pub fn computed(f: impl Fn() -> String + 'static) -> Self {
        Content::Computed(Rc::new(f))
    }

    /// Produces the string to be written, calling the function of computed content
    pub fn resolve(&self) -> String {
        match self {
            Content::Literal(text) => text.clone(),
            Content::Computed(f) => f(),
        }
    }
}

impl std::fmt::Debug for Content {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Content::Literal(text) => f.debug_tuple("Literal").field(text).finish(),
            Content::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

impl Default for Content {
    fn default() -> Self {
        Content::Literal(String::new())
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Literal(text.to_owned())
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Literal(text)
    }
}

/// A description of a file
#[derive(Debug, Clone, Default)]
pub struct FileNode {
    /// What to write into the file when the tree is materialized (empty if not given)
    pub content: Option<Content>,
    /// Whether materializing the tree should leave this file alone
    pub skip: bool,
}

impl FileNode {
    /// Constructs a description of an empty file
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the content of this file
    pub fn with_content(mut self, content: impl Into<Content>) -> Self {
        self.content = Some(content.into());
        self
    }

    /// Marks this file as known but not to be written during materialization
    pub fn skipped(mut self) -> Self {
        self.skip = true;
        self
    }
}

/// A description of a directory
#[derive(Debug, Clone, Default)]
pub struct DirNode {
    /// Entries declared inside this directory
    pub children: Option<Tree>,
}

impl DirNode {
    /// Constructs a description of a directory without declared children
    pub fn new() -> Self {
        Default::default()
    }

    /// Constructs a description of a directory with the given children
    pub fn with_children(children: Tree) -> Self {
        DirNode {
            children: Some(children),
        }
    }

    /// The declared children, if there are any
    ///
    /// An empty children map is treated the same as none at all.
    pub fn children(&self) -> Option<&Tree> {
        self.children.as_ref().filter(|tree| !tree.is_empty())
    }
}

/// A node in a declared tree
#[derive(Debug, Clone)]
pub enum Node {
    /// Indicates that this node describes a file
    File(FileNode),
    /// Indicates that this node describes a directory
    Directory(DirNode),
}

impl Node {
    /// Whether this is a file or directory node
    pub fn kind(&self) -> Kind {
        match self {
            Node::File(_) => Kind::File,
            Node::Directory(_) => Kind::Dir,
        }
    }

    /// Returns the inner [`FileNode`] if this is a file node
    pub fn as_file(&self) -> Option<&FileNode> {
        match self {
            Node::File(file) => Some(file),
            _ => None,
        }
    }

    /// Returns the inner [`DirNode`] if this is a directory node
    pub fn as_directory(&self) -> Option<&DirNode> {
        match self {
            Node::Directory(directory) => Some(directory),
            _ => None,
        }
    }
}

impl From<FileNode> for Node {
    fn from(file: FileNode) -> Self {
        Node::File(file)
    }
}

impl From<DirNode> for Node {
    fn from(directory: DirNode) -> Self {
        Node::Directory(directory)
    }
}

/// A mapping of unique names to [`Node`]s, at any level of nesting
#[derive(Debug, Clone, Default)]
pub struct Tree {
    entries: BTreeMap<String, Node>,
}

impl Tree {
    /// Constructs an empty tree
    pub fn new() -> Self {
        Default::default()
    }

    /// Adds (or replaces) an entry of this tree
    pub fn node(mut self, name: impl Into<String>, node: impl Into<Node>) -> Self {
        self.insert(name, node);
        self
    }

    /// Adds a file with the given content
    pub fn file(self, name: impl Into<String>, content: impl Into<Content>) -> Self {
        self.node(name, FileNode::new().with_content(content))
    }

    /// Adds a file that materialization will not write
    pub fn skipped_file(self, name: impl Into<String>) -> Self {
        self.node(name, FileNode::new().skipped())
    }

    /// Adds a directory with the given children
    pub fn dir(self, name: impl Into<String>, children: Tree) -> Self {
        self.node(name, DirNode::with_children(children))
    }

    /// Adds a directory without children
    pub fn empty_dir(self, name: impl Into<String>) -> Self {
        self.node(name, DirNode::new())
    }

    /// Adds (or replaces) an entry, returning any node previously held under that name
    pub fn insert(&mut self, name: impl Into<String>, node: impl Into<Node>) -> Option<Node> {
        self.entries.insert(name.into(), node.into())
    }

    /// Looks up the entry with the given name
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.entries.get(name)
    }

    /// Iterates over the entries of this level in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(name, node)| (name.as_str(), node))
    }

    /// The number of entries at this level
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if there are no entries at this level
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Checks that every name in the tree, at every level, is a single plain path component
    pub fn validate(&self) -> Result<()> {
        for (name, node) in self.iter() {
            validate_name(name)?;
            if let Node::Directory(directory) = node {
                if let Some(children) = directory.children() {
                    children
                        .validate()
                        .with_context(|| format!("Inside directory \"{name}\""))?;
                }
            }
        }
        Ok(())
    }

    /// Parses and validates a tree from its TOML form
    pub fn from_toml(text: &str) -> Result<Self> {
        let tree: Tree = toml::from_str(text)?;
        tree.validate()?;
        Ok(tree)
    }
}

impl FromIterator<(String, Node)> for Tree {
    fn from_iter<T: IntoIterator<Item = (String, Node)>>(iter: T) -> Self {
        Tree {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Checks that a name is usable as a single entry of a directory
pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() {
        bail!("Names must not be empty");
    }
    if name == "." || name == ".." {
        bail!("Name \"{}\" is reserved", name);
    }
    if name.contains(['/', '\\']) {
        bail!(
            "Name \"{}\" must be a single path component (no separators)",
            name
        );
    }
    Ok(())
}
