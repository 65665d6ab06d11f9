//! Declare a tree of files and directories, mount it on a root path, and operate on it.
//!
//! # Trees
//!
//! A [`Tree`] declares files (optionally with [`Content`], literal or computed) and directories
//! (optionally with children of their own). Trees are built in code or read from TOML:
//! ```
//! use treemount::Tree;
//!
//! let tree = Tree::from_toml(r#"
//!     "settings.json" = "{}"
//!     logs = { type = "dir" }
//!     cache = { type = "dir", children = { index = { skip = true } } }
//! "#)?;
//! assert_eq!(tree.len(), 3);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! # Mounting
//!
//! [`mount`] places a tree on a root path and composes operations for every declared node,
//! without touching the filesystem. [`Mount::materialize`] then creates what was declared,
//! reporting any [`Conflict`]s with what already exists:
//! ```
//! use treemount::{filesystem::MemoryFilesystem, mount, Extensions, Tree};
//!
//! let fs = MemoryFilesystem::new();
//! let tree = Tree::new()
//!     .file("settings.json", "{}")
//!     .dir("logs", Tree::new());
//! let app = mount(&fs, "/home/me/.config/app", &tree, Extensions::new())?;
//!
//! let settings = app.ops().file("settings.json").unwrap();
//! assert!(!settings.exists());
//!
//! assert!(app.materialize()?.is_empty());
//! assert_eq!(settings.read().as_deref(), Some("{}"));
//!
//! let logs = app.ops().dir("logs").unwrap();
//! logs.write_file("today.log", "started")?;
//! assert_eq!(logs.list()?, vec!["today.log"]);
//! # Ok::<(), anyhow::Error>(())
//! ```
//!
//! Operations beyond the built-in ones are supplied through [`Extensions`] and invoked by name
//! with `call`.
use anyhow::{Context as _, Result};
use camino::{Utf8Path, Utf8PathBuf};

pub use treemount_config as config;
pub use treemount_filesystem as filesystem;
pub use treemount_schema as schema;
pub use treemount_traversal as traversal;

pub use treemount_schema::{Content, DirNode, FileNode, Kind, Node, Tree};
pub use treemount_traversal::{
    Conflict, DirOperations, DirOps, Extensions, FileOperations, FileOps, Materializer, Ops,
    Output, PlantedTree, Reason, Site,
};

use treemount_filesystem::Filesystem;
use treemount_traversal::{compose_tree, materialize, materialize_strict, project};

/// A declared tree placed on a root path, with its composed operations
pub struct Mount<'fs, FS> {
    fs: &'fs FS,
    planted: PlantedTree,
    ops: DirOps<'fs, FS>,
}

/// Mounts a declared tree on `root`, composing operations for every declared node
///
/// The tree's names are validated first. A relative root is taken relative to the current
/// directory. Nothing is read from or written to the filesystem; see [`Mount::materialize`].
pub fn mount<'fs, FS>(
    fs: &'fs FS,
    root: impl AsRef<Utf8Path>,
    tree: &Tree,
    extensions: Extensions<'fs, FS>,
) -> Result<Mount<'fs, FS>>
where
    FS: Filesystem,
{
    tree.validate().context("Invalid tree")?;
    let root = absolute(root.as_ref())?;
    tracing::debug!("Mounting tree of {} entries on {}", tree.len(), root);
    let planted = project(&root, tree);
    let ops = compose_tree(fs, &planted, extensions);
    Ok(Mount { fs, planted, ops })
}

impl<'fs, FS> Mount<'fs, FS>
where
    FS: Filesystem,
{
    /// The absolute root path of this mount
    pub fn root(&self) -> &Utf8Path {
        self.planted.root()
    }

    /// The operations of the root directory, through which all declared nodes are reached
    pub fn ops(&self) -> &DirOps<'fs, FS> {
        &self.ops
    }

    /// The declared tree as projected onto the root
    pub fn planted(&self) -> &PlantedTree {
        &self.planted
    }

    /// Creates the declared directories and writes the declared files, returning any conflicts
    pub fn materialize(&self) -> Result<Vec<Conflict>> {
        materialize(self.fs, &self.planted)
    }

    /// Creates the declared directories and writes the declared files, failing at the first
    /// conflict
    pub fn materialize_strict(&self) -> Result<()> {
        materialize_strict(self.fs, &self.planted)
    }

    /// A materializer for this mount's filesystem, for custom conflict reasons
    pub fn materializer(&self) -> Materializer<'fs, FS> {
        Materializer::new(self.fs)
    }
}

fn absolute(root: &Utf8Path) -> Result<Utf8PathBuf> {
    if root.is_absolute() {
        return Ok(root.to_owned());
    }
    let current = std::env::current_dir().context("Reading the current directory")?;
    let current =
        Utf8PathBuf::try_from(current).context("The current directory is not UTF-8")?;
    Ok(current.join(root))
}
