//! This crate brings a declared [`Tree`][treemount_schema::Tree] to a place on a filesystem.
//!
//! It does so in three steps, each usable on its own:
//!
//! 1. [`project`] joins every declared name onto a root path, giving a [`PlantedTree`]. This
//!    touches no filesystem.
//! 2. [`compose_tree`] binds operations to every planted node ([`DirOps`] and [`FileOps`]),
//!    shaped exactly like the declared tree, with any custom operations from [`Extensions`].
//!    Composing also touches no filesystem; each operation queries it afresh when invoked.
//! 3. [`materialize`] creates the declared directories and writes the declared files,
//!    collecting any [`Conflict`]s rather than stopping at them.
//!
//! ```
//! use treemount_filesystem::{Filesystem, MemoryFilesystem};
//! use treemount_schema::Tree;
//! use treemount_traversal::{compose_tree, materialize, project, Extensions};
//!
//! let fs = MemoryFilesystem::new();
//! let tree = Tree::new()
//!     .file("settings.json", "{}")
//!     .dir("logs", Tree::new());
//! let planted = project("/home/me/.config/app", &tree);
//!
//! let ops = compose_tree(&fs, &planted, Extensions::new());
//! assert!(!ops.exists("settings.json"));
//!
//! let conflicts = materialize(&fs, &planted)?;
//! assert!(conflicts.is_empty());
//! assert_eq!(ops.file("settings.json").unwrap().read().as_deref(), Some("{}"));
//! assert!(fs.is_directory("/home/me/.config/app/logs"));
//! # Ok::<(), anyhow::Error>(())
//! ```
#![warn(missing_docs)]

mod materialize;
mod ops;
mod planted;

pub use self::{
    materialize::{materialize, materialize_strict, Conflict, Materializer, Reason},
    ops::{
        compose_node, compose_tree, DirOperations, DirOps, Extensions, FileOperations, FileOps,
        Operation, Operations, Ops, Output, Site,
    },
    planted::{project, Planted, PlantedNode, PlantedTree},
};
