//! Operations bound to the paths of a [`PlantedTree`]
//!
//! Every planted node is composed into either a [`FileOps`] or a [`DirOps`], held together as an
//! [`Ops`]. A [`DirOps`] owns the composed operations of its declared children, so the composed
//! tree has the same shape as the declared one:
//!
//! ```
//! use treemount_filesystem::MemoryFilesystem;
//! use treemount_schema::Tree;
//! use treemount_traversal::{compose_tree, project, Extensions};
//!
//! let fs = MemoryFilesystem::new();
//! let tree = Tree::new().dir("config", Tree::new().file("app.toml", ""));
//! let root = compose_tree(&fs, &project("/root", &tree), Extensions::new());
//!
//! let file = root.dir("config").and_then(|config| config.file("app.toml")).unwrap();
//! assert_eq!(file.path(), "/root/config/app.toml");
//! assert!(!file.exists());
//! ```
//!
//! Built-in operations are methods. Custom operations supplied through [`Extensions`] are
//! reachable by name through `call`, alongside the built-ins; a custom operation registered
//! under a built-in's name takes its place in `call`.
use std::{collections::BTreeSet, fmt::Display, rc::Rc};

use anyhow::{Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};

use treemount_filesystem::Filesystem;
use treemount_schema::{Content, Kind};

use crate::planted::{Planted, PlantedNode, PlantedTree};

mod directory;
mod extensions;
mod file;

pub use self::{
    directory::DirOps,
    extensions::{DirOperations, Extensions, FileOperations, Operation, Operations, Site},
    file::FileOps,
};

/// The composed operations of either a file or a directory
pub enum Ops<'fs, FS> {
    /// Operations of a file
    File(FileOps<'fs, FS>),
    /// Operations of a directory, and of its declared children
    Dir(DirOps<'fs, FS>),
}

/// The result of an operation invoked by name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Nothing to report
    Unit,
    /// A yes/no answer, or `false` for a directory that could not be created
    Flag(bool),
    /// File contents, or `None` if the file could not be read
    Text(Option<String>),
    /// The path of a node
    Path(Utf8PathBuf),
    /// Names of entries in a directory
    Listing(Vec<String>),
}

impl Display for Output {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Output::Unit | Output::Text(None) => Ok(()),
            Output::Flag(flag) => write!(f, "{flag}"),
            Output::Text(Some(text)) => write!(f, "{text}"),
            Output::Path(path) => write!(f, "{path}"),
            Output::Listing(names) => write!(f, "{}", names.join("\n")),
        }
    }
}

impl<'fs, FS> Ops<'fs, FS> {
    /// Whether these are the operations of a file or a directory
    pub fn kind(&self) -> Kind {
        match self {
            Ops::File(_) => Kind::File,
            Ops::Dir(_) => Kind::Dir,
        }
    }

    /// The path these operations act upon
    pub fn path(&self) -> &Utf8Path {
        match self {
            Ops::File(file) => file.path(),
            Ops::Dir(directory) => directory.path(),
        }
    }

    /// Returns the inner [`FileOps`] if these are file operations
    pub fn as_file(&self) -> Option<&FileOps<'fs, FS>> {
        match self {
            Ops::File(file) => Some(file),
            _ => None,
        }
    }

    /// Returns the inner [`DirOps`] if these are directory operations
    pub fn as_dir(&self) -> Option<&DirOps<'fs, FS>> {
        match self {
            Ops::Dir(directory) => Some(directory),
            _ => None,
        }
    }
}

impl<'fs, FS: Filesystem> Ops<'fs, FS> {
    /// Invokes an operation by name (see [`FileOps::call`] and [`DirOps::call`])
    pub fn call(&self, name: &str, args: &[String]) -> Result<Output> {
        match self {
            Ops::File(file) => file.call(name, args),
            Ops::Dir(directory) => directory.call(name, args),
        }
    }

    /// The names of all operations available through [`call`][Ops::call]
    pub fn operation_names(&self) -> Vec<String> {
        match self {
            Ops::File(file) => file.operation_names(),
            Ops::Dir(directory) => directory.operation_names(),
        }
    }
}

impl<FS> std::fmt::Debug for Ops<'_, FS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ops::File(file) => std::fmt::Debug::fmt(file, f),
            Ops::Dir(directory) => std::fmt::Debug::fmt(directory, f),
        }
    }
}

/// Composes the operations of a single planted node, and of any children it declares
pub fn compose_node<'fs, FS>(
    fs: &'fs FS,
    node: &PlantedNode,
    extensions: &Rc<Extensions<'fs, FS>>,
) -> Ops<'fs, FS>
where
    FS: Filesystem,
{
    match node.planted() {
        Planted::File { content, .. } => Ops::File(FileOps::compose(
            fs,
            node.path().to_owned(),
            node.parent().to_owned(),
            content.clone(),
            extensions,
        )),
        Planted::Directory { children } => Ops::Dir(DirOps::compose(
            fs,
            node.path().to_owned(),
            node.parent().to_owned(),
            children.as_ref(),
            extensions,
        )),
    }
}

/// Composes the operations of a whole planted tree, returning those of its root directory
pub fn compose_tree<'fs, FS>(
    fs: &'fs FS,
    tree: &PlantedTree,
    extensions: Extensions<'fs, FS>,
) -> DirOps<'fs, FS>
where
    FS: Filesystem,
{
    let root = tree.root();
    tracing::debug!("Composing operations for {}", root);
    DirOps::compose(
        fs,
        root.to_owned(),
        root.parent().unwrap_or(root).to_owned(),
        Some(tree.entries()),
        &Rc::new(extensions),
    )
}

/// The directory containing `path`, or `fallback` if it has none
fn parent_of(path: &Utf8Path, fallback: &Utf8Path) -> Utf8PathBuf {
    path.parent().unwrap_or(fallback).to_owned()
}

/// Reads a file, giving `None` when it is missing or unreadable
fn read_at<FS: Filesystem>(fs: &FS, path: &Utf8Path) -> Option<String> {
    match fs.read_file(path) {
        Ok(text) => Some(text),
        Err(e) => {
            tracing::debug!("Read of {} gave nothing: {:#}", path, e);
            None
        }
    }
}

/// Writes content to a file, resolving computed content now and creating missing parents
fn write_at<FS: Filesystem>(fs: &FS, path: &Utf8Path, content: &Content) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_str().is_empty() && !fs.is_directory(parent) {
            fs.create_directory_all(parent)
                .with_context(|| format!("Creating parent directories of {path}"))?;
        }
    }
    fs.write_file(path, &content.resolve())
}

/// Empties an existing file; a missing file is left missing
fn clear_at<FS: Filesystem>(fs: &FS, path: &Utf8Path) -> Result<()> {
    if !fs.exists(path) {
        tracing::trace!("Nothing to clear at {}", path);
        return Ok(());
    }
    fs.write_file(path, "")
}

/// Merges built-in operation names with the custom ones, sorted and unique
fn merged_names<N>(builtins: &[&str], custom: &Operations<N>) -> Vec<String> {
    let names: BTreeSet<&str> = builtins.iter().copied().chain(custom.names()).collect();
    names.into_iter().map(str::to_owned).collect()
}
