//! Projection of a declared [`Tree`] onto a root path
//!
use std::collections::BTreeMap;

use camino::{Utf8Path, Utf8PathBuf};

use treemount_schema::{Content, FileNode, Kind, Node, Tree};

/// A declared tree whose every node knows where it lives
#[derive(Debug, Clone)]
pub struct PlantedTree {
    root: Utf8PathBuf,
    entries: BTreeMap<String, PlantedNode>,
}

/// A declared node together with its path and the path of its containing directory
///
/// `path` is always `parent` joined with the node's own name.
#[derive(Debug, Clone)]
pub struct PlantedNode {
    path: Utf8PathBuf,
    parent: Utf8PathBuf,
    planted: Planted,
}

/// File/directory specific aspects of a [`PlantedNode`]
#[derive(Debug, Clone)]
pub enum Planted {
    /// A declared file
    File {
        /// Content to write when materializing (empty if not given)
        content: Option<Content>,
        /// Whether materializing leaves this file alone
        skip: bool,
    },
    /// A declared directory
    Directory {
        /// Planted children; `None` when none (or an empty set) were declared
        children: Option<BTreeMap<String, PlantedNode>>,
    },
}

/// Walks `tree`, joining every name onto its parent's path starting from `root`
///
/// No filesystem access takes place.
pub fn project(root: impl AsRef<Utf8Path>, tree: &Tree) -> PlantedTree {
    let root = root.as_ref();
    PlantedTree {
        root: root.to_owned(),
        entries: project_entries(root, tree),
    }
}

fn project_entries(parent: &Utf8Path, tree: &Tree) -> BTreeMap<String, PlantedNode> {
    tree.iter()
        .map(|(name, node)| (name.to_owned(), project_node(parent, name, node)))
        .collect()
}

fn project_node(parent: &Utf8Path, name: &str, node: &Node) -> PlantedNode {
    let path = parent.join(name);
    let planted = match node {
        Node::File(FileNode { content, skip }) => Planted::File {
            content: content.clone(),
            skip: *skip,
        },
        Node::Directory(directory) => Planted::Directory {
            children: directory
                .children()
                .map(|children| project_entries(&path, children)),
        },
    };
    PlantedNode {
        path,
        parent: parent.to_owned(),
        planted,
    }
}

impl PlantedTree {
    /// The path the tree was projected onto
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// The top level entries, by name
    pub fn entries(&self) -> &BTreeMap<String, PlantedNode> {
        &self.entries
    }

    /// Looks up a top level entry
    pub fn get(&self, name: &str) -> Option<&PlantedNode> {
        self.entries.get(name)
    }

    /// Every node of the tree, depth first, parents before their children
    pub fn walk(&self) -> Vec<&PlantedNode> {
        let mut nodes = Vec::new();
        for node in self.entries.values() {
            node.collect_into(&mut nodes);
        }
        nodes
    }
}

impl PlantedNode {
    /// The absolute path of this node
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The path of the directory containing this node
    pub fn parent(&self) -> &Utf8Path {
        &self.parent
    }

    /// The declared name of this node
    pub fn name(&self) -> &str {
        self.path.file_name().unwrap_or_default()
    }

    /// Whether this is a file or a directory
    pub fn kind(&self) -> Kind {
        match self.planted {
            Planted::File { .. } => Kind::File,
            Planted::Directory { .. } => Kind::Dir,
        }
    }

    /// The file or directory specifics of this node
    pub fn planted(&self) -> &Planted {
        &self.planted
    }

    /// The planted children of a directory node
    pub fn children(&self) -> Option<&BTreeMap<String, PlantedNode>> {
        match &self.planted {
            Planted::Directory { children } => children.as_ref(),
            Planted::File { .. } => None,
        }
    }

    fn collect_into<'a>(&'a self, nodes: &mut Vec<&'a PlantedNode>) {
        nodes.push(self);
        if let Some(children) = self.children() {
            for child in children.values() {
                child.collect_into(nodes);
            }
        }
    }
}
