use std::{collections::BTreeMap, rc::Rc};

use anyhow::Result;
use camino::Utf8Path;

use super::{DirOps, FileOps, Output};

/// A custom operation on a node of type `N`, invoked with string arguments
pub type Operation<N> = Rc<dyn Fn(&N, &[String]) -> Result<Output>>;

/// Custom operations for file nodes
pub type FileOperations<'fs, FS> = Operations<FileOps<'fs, FS>>;

/// Custom operations for directory nodes
pub type DirOperations<'fs, FS> = Operations<DirOps<'fs, FS>>;

/// A set of named custom operations for nodes of type `N`
///
/// ```
/// use treemount_filesystem::MemoryFilesystem;
/// use treemount_traversal::{FileOperations, FileOps, Output};
///
/// let operations = FileOperations::new()
///     .with("size", |file: &FileOps<'_, MemoryFilesystem>, _: &[String]| {
///         Ok(Output::Text(file.read().map(|text| text.len().to_string())))
///     });
/// assert_eq!(operations.names().collect::<Vec<_>>(), vec!["size"]);
/// ```
pub struct Operations<N> {
    map: BTreeMap<String, Operation<N>>,
}

impl<N> Operations<N> {
    /// Constructs an empty set of operations
    pub fn new() -> Self {
        Operations {
            map: BTreeMap::new(),
        }
    }

    /// Adds an operation, replacing any previously added under the same name
    pub fn with<F>(mut self, name: impl Into<String>, operation: F) -> Self
    where
        F: Fn(&N, &[String]) -> Result<Output> + 'static,
    {
        self.map.insert(name.into(), Rc::new(operation));
        self
    }

    /// Looks up an operation by name
    pub fn get(&self, name: &str) -> Option<&Operation<N>> {
        self.map.get(name)
    }

    /// The names of these operations, sorted
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.map.keys().map(String::as_str)
    }

    /// Returns true if there are no operations
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<N> Default for Operations<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N> Clone for Operations<N> {
    fn clone(&self) -> Self {
        Operations {
            map: self.map.clone(),
        }
    }
}

/// Where a node being composed lives, passed to the factories of [`Extensions`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site<'a> {
    /// The path of the node
    pub path: &'a Utf8Path,
    /// The path of the directory containing the node
    pub parent: &'a Utf8Path,
    /// Names of the declared children of a directory (always empty for files and for nodes
    /// created outside the declared tree)
    pub children: Vec<&'a str>,
}

type FileFactory<'fs, FS> = Box<dyn Fn(&Site<'_>) -> FileOperations<'fs, FS> + 'fs>;
type DirFactory<'fs, FS> = Box<dyn Fn(&Site<'_>) -> DirOperations<'fs, FS> + 'fs>;

/// Factories of custom operations, applied to every composed node
///
/// The same extensions are carried into nodes created later through [`DirOps::create_dir`] and
/// [`DirOps::create_file`], so those nodes gain the same custom operations as declared ones.
pub struct Extensions<'fs, FS>
where
    FS: 'fs,
{
    file: Option<FileFactory<'fs, FS>>,
    dir: Option<DirFactory<'fs, FS>>,
}

impl<'fs, FS> Extensions<'fs, FS> {
    /// No custom operations
    pub fn new() -> Self {
        Extensions {
            file: None,
            dir: None,
        }
    }

    /// Sets the factory producing custom operations for each file node
    pub fn on_file<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Site<'_>) -> FileOperations<'fs, FS> + 'fs,
    {
        self.file = Some(Box::new(factory));
        self
    }

    /// Sets the factory producing custom operations for each directory node
    pub fn on_dir<F>(mut self, factory: F) -> Self
    where
        F: Fn(&Site<'_>) -> DirOperations<'fs, FS> + 'fs,
    {
        self.dir = Some(Box::new(factory));
        self
    }

    pub(super) fn file_operations(&self, site: &Site<'_>) -> FileOperations<'fs, FS> {
        self.file
            .as_ref()
            .map(|factory| factory(site))
            .unwrap_or_default()
    }

    pub(super) fn dir_operations(&self, site: &Site<'_>) -> DirOperations<'fs, FS> {
        self.dir
            .as_ref()
            .map(|factory| factory(site))
            .unwrap_or_default()
    }
}

impl<FS> Default for Extensions<'_, FS> {
    fn default() -> Self {
        Self::new()
    }
}
