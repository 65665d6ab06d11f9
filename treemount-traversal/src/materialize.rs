//! Writing a planted tree out to a filesystem
//!
//! Materializing walks every declared node depth first, creating directories and writing files.
//! A node whose path is already taken by the other kind of entry is a [`Conflict`]; it is
//! recorded and the walk carries on with the remaining nodes, skipping only the declared children
//! of a conflicting directory.
use std::fmt::Display;

use anyhow::{Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};

use treemount_filesystem::Filesystem;
use treemount_schema::{Content, Kind};

use crate::planted::{Planted, PlantedNode, PlantedTree};

/// A declared node that could not be created because its path is taken
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot create {kind} {path}: {reason}")]
pub struct Conflict {
    /// The declared kind of the node
    pub kind: Kind,
    /// Where the node was to be created
    pub path: Utf8PathBuf,
    /// Why it could not be, as given by the reason resolver
    pub reason: String,
}

/// The canned cause of a [`Conflict`], handed to a reason resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reason {
    /// A file was declared where a directory exists
    ExistsAsDirectory,
    /// A directory was declared where something other than a directory exists
    ExistsAsFile,
}

impl Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Reason::ExistsAsDirectory => write!(f, "path exists as a directory"),
            Reason::ExistsAsFile => write!(f, "path exists as a file"),
        }
    }
}

/// Collects conflicts while materializing
///
/// ```
/// use treemount_filesystem::{Filesystem, MemoryFilesystem};
/// use treemount_schema::Tree;
/// use treemount_traversal::{project, Materializer, Reason};
///
/// let fs = MemoryFilesystem::new();
/// fs.create_directory_all("/app/notes")?;
///
/// let tree = Tree::new().file("notes", "").file("todo", "- write docs");
/// let conflicts = Materializer::new(&fs)
///     .with_reason(|reason| format!("refusing, {reason}"))
///     .run(&project("/app", &tree))?;
///
/// assert_eq!(conflicts.len(), 1);
/// assert_eq!(conflicts[0].reason, "refusing, path exists as a directory");
/// assert_eq!(fs.read_file("/app/todo")?, "- write docs");
/// # Ok::<(), anyhow::Error>(())
/// ```
pub struct Materializer<'a, FS> {
    fs: &'a FS,
    reason: Box<dyn Fn(Reason) -> String + 'a>,
}

impl<'a, FS> Materializer<'a, FS>
where
    FS: Filesystem,
{
    /// Constructs a materializer writing to `fs`, reporting conflicts with the canned reasons
    pub fn new(fs: &'a FS) -> Self {
        Materializer {
            fs,
            reason: Box::new(|reason| reason.to_string()),
        }
    }

    /// Sets the function turning a canned [`Reason`] into the message of a [`Conflict`]
    pub fn with_reason(mut self, resolve: impl Fn(Reason) -> String + 'a) -> Self {
        self.reason = Box::new(resolve);
        self
    }

    /// Materializes the tree, returning every conflict met along the way
    ///
    /// Only unexpected filesystem errors stop the walk; these are returned as `Err`.
    pub fn run(&self, tree: &PlantedTree) -> Result<Vec<Conflict>> {
        let mut walk = Walk {
            conflicts: Vec::new(),
            strict: false,
        };
        self.materialize_tree(tree, &mut walk)?;
        Ok(walk.conflicts)
    }

    /// Materializes the tree, failing at the first conflict
    ///
    /// The error of a conflict can be downcast to [`Conflict`].
    pub fn run_strict(&self, tree: &PlantedTree) -> Result<()> {
        let mut walk = Walk {
            conflicts: Vec::new(),
            strict: true,
        };
        self.materialize_tree(tree, &mut walk)
    }

    fn materialize_tree(&self, tree: &PlantedTree, walk: &mut Walk) -> Result<()> {
        let root = tree.root();
        tracing::debug!("Materializing {}", root);
        if self.fs.is_directory(root) {
            tracing::trace!("Root {} exists", root);
        } else if self.fs.exists(root) {
            return walk.record(self.conflict(Kind::Dir, root, Reason::ExistsAsFile));
        } else {
            self.fs
                .create_directory_all(root)
                .with_context(|| format!("Creating root directory: {root}"))?;
            tracing::debug!("Created root directory {}", root);
        }
        for node in tree.entries().values() {
            self.materialize_node(node, walk)?;
        }
        Ok(())
    }

    fn materialize_node(&self, node: &PlantedNode, walk: &mut Walk) -> Result<()> {
        let path = node.path();
        match node.planted() {
            Planted::File { skip: true, .. } => {
                tracing::trace!("Skipping file {}", path);
            }
            Planted::File { content, .. } => {
                if self.fs.is_directory(path) {
                    return walk.record(self.conflict(
                        Kind::File,
                        path,
                        Reason::ExistsAsDirectory,
                    ));
                }
                let text = content.as_ref().map(Content::resolve).unwrap_or_default();
                self.fs
                    .write_file(path, &text)
                    .with_context(|| format!("Writing file: {path}"))?;
                tracing::debug!("Wrote file {} ({} bytes)", path, text.len());
            }
            Planted::Directory { children } => {
                if !self.fs.exists(path) {
                    self.fs
                        .create_directory(path)
                        .with_context(|| format!("Creating directory: {path}"))?;
                    tracing::debug!("Created directory {}", path);
                } else if !self.fs.is_directory(path) {
                    return walk.record(self.conflict(Kind::Dir, path, Reason::ExistsAsFile));
                }
                for child in children.iter().flat_map(|children| children.values()) {
                    self.materialize_node(child, walk)?;
                }
            }
        }
        Ok(())
    }

    fn conflict(&self, kind: Kind, path: &Utf8Path, reason: Reason) -> Conflict {
        Conflict {
            kind,
            path: path.to_owned(),
            reason: (self.reason)(reason),
        }
    }
}

struct Walk {
    conflicts: Vec<Conflict>,
    strict: bool,
}

impl Walk {
    fn record(&mut self, conflict: Conflict) -> Result<()> {
        if self.strict {
            return Err(conflict.into());
        }
        tracing::warn!("{}", conflict);
        self.conflicts.push(conflict);
        Ok(())
    }
}

/// Materializes the tree onto `fs`, returning every conflict met along the way
///
/// See [`Materializer::run`].
pub fn materialize<FS>(fs: &FS, tree: &PlantedTree) -> Result<Vec<Conflict>>
where
    FS: Filesystem,
{
    Materializer::new(fs).run(tree)
}

/// Materializes the tree onto `fs`, failing at the first conflict
///
/// See [`Materializer::run_strict`].
pub fn materialize_strict<FS>(fs: &FS, tree: &PlantedTree) -> Result<()>
where
    FS: Filesystem,
{
    Materializer::new(fs).run_strict(tree)
}
