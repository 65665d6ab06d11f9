use std::{
    cell::RefCell,
    collections::{HashMap, HashSet},
};

use anyhow::{anyhow, bail, Context, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use super::Filesystem;

/// An in-memory representation of a file system
///
/// Paths must be absolute. The root directory `/` always exists.
#[derive(Debug)]
pub struct MemoryFilesystem {
    inner: RefCell<Inner>,
}

#[derive(Debug)]
struct Inner {
    map: HashMap<Utf8PathBuf, Node>,
}

#[derive(Debug)]
enum Node {
    File { content: String },
    Directory { children: Vec<String> },
}

impl MemoryFilesystem {
    /// Constructs a new in-memory filesystem containing only the root directory
    pub fn new() -> Self {
        let mut map = HashMap::new();
        map.insert("/".into(), Node::Directory { children: vec![] });

        MemoryFilesystem {
            inner: RefCell::new(Inner { map }),
        }
    }

    /// Returns every path known to this filesystem, including the root
    pub fn to_path_set(&self) -> HashSet<String> {
        self.inner
            .borrow()
            .map
            .keys()
            .map(|path| path.to_string())
            .collect()
    }

    fn parent_and_name(path: &Utf8Path) -> Result<(Utf8PathBuf, String)> {
        let path = normalize(path)?;
        match super::split(&path) {
            Some((parent, name)) if !name.is_empty() => Ok((parent.to_owned(), name.to_owned())),
            _ => Err(anyhow!("Cannot create {}", path)),
        }
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_directory(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        let (parent, name) = Self::parent_and_name(path)?;
        let mut inner = self.inner.borrow_mut();
        inner
            .insert_node(&parent, &name, Node::Directory { children: vec![] })
            .with_context(|| format!("Creating directory: {path}"))
    }

    fn write_file(&self, path: impl AsRef<Utf8Path>, content: &str) -> Result<()> {
        let path = path.as_ref();
        let (parent, name) = Self::parent_and_name(path)?;
        let mut inner = self.inner.borrow_mut();
        match inner.map.get_mut(&parent.join(&name)) {
            Some(Node::File { content: existing }) => {
                *existing = content.to_owned();
                Ok(())
            }
            Some(Node::Directory { .. }) => Err(anyhow!("Is a directory")),
            None => inner.insert_node(
                &parent,
                &name,
                Node::File {
                    content: content.to_owned(),
                },
            ),
        }
        .with_context(|| format!("Writing file: {path}"))
    }

    fn exists(&self, path: impl AsRef<Utf8Path>) -> bool {
        match normalize(path.as_ref()) {
            Ok(path) => self.inner.borrow().map.contains_key(&path),
            Err(_) => false,
        }
    }

    fn is_directory(&self, path: impl AsRef<Utf8Path>) -> bool {
        match normalize(path.as_ref()) {
            Err(_) => false,
            Ok(path) => matches!(
                self.inner.borrow().map.get(&path),
                Some(Node::Directory { .. })
            ),
        }
    }

    fn is_file(&self, path: impl AsRef<Utf8Path>) -> bool {
        match normalize(path.as_ref()) {
            Err(_) => false,
            Ok(path) => matches!(self.inner.borrow().map.get(&path), Some(Node::File { .. })),
        }
    }

    fn list_directory(&self, path: impl AsRef<Utf8Path>) -> Result<Vec<String>> {
        let path = normalize(path.as_ref())?;
        match self.inner.borrow().map.get(&path) {
            None => Err(anyhow!("No such file or directory: {}", path)),
            Some(Node::Directory { children }) => Ok(children.clone()),
            Some(Node::File { .. }) => Err(anyhow!("Tried to list directory of a file")),
        }
        .with_context(|| format!("Listing directory: {path}"))
    }

    fn read_file(&self, path: impl AsRef<Utf8Path>) -> Result<String> {
        let path = normalize(path.as_ref())?;
        match self.inner.borrow().map.get(&path) {
            None => Err(anyhow!("No such file or directory: {}", path)),
            Some(Node::File { content }) => Ok(content.clone()),
            Some(Node::Directory { .. }) => Err(anyhow!("Tried to read a directory: {}", path)),
        }
    }

    fn remove_file(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let (parent, name) = Self::parent_and_name(path.as_ref())?;
        let path = parent.join(&name);
        let mut inner = self.inner.borrow_mut();
        match inner.map.get(&path) {
            None => bail!("No such file or directory: {}", path),
            Some(Node::Directory { .. }) => bail!("Tried to remove a directory as a file: {}", path),
            Some(Node::File { .. }) => inner.remove_node(&parent, &name),
        }
        Ok(())
    }

    fn remove_all(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let (parent, name) = Self::parent_and_name(path.as_ref())?;
        let path = parent.join(&name);
        let mut inner = self.inner.borrow_mut();
        if !inner.map.contains_key(&path) {
            return Ok(());
        }
        let descendants: Vec<Utf8PathBuf> = inner
            .map
            .keys()
            .filter(|key| key.starts_with(&path) && **key != path)
            .cloned()
            .collect();
        for descendant in descendants {
            inner.map.remove(&descendant);
        }
        inner.remove_node(&parent, &name);
        Ok(())
    }
}

impl Inner {
    /// Inserts a new entry into the filesystem, under the given parent
    ///
    /// # Arguments
    ///
    /// * `parent` - A normalized path to the parent directory of the entry
    /// * `name` - The name to give to the new entry
    /// * `node` - The entry itself
    ///
    fn insert_node(&mut self, parent: &Utf8Path, name: &str, node: Node) -> Result<()> {
        // Check it doesn't already exist
        let path = parent.join(name);
        if self.map.contains_key(&path) {
            return Err(anyhow!("File exists: {:?}", path));
        }
        let parent_node = self
            .map
            .get_mut(parent)
            .ok_or_else(|| anyhow!("Parent directory not found: {}", parent))?;
        // Insert name into parent
        match parent_node {
            Node::Directory { ref mut children } => children.push(name.into()),
            Node::File { .. } => bail!("Parent not a directory: {}", parent),
        }
        // Insert full path and node into map
        self.map.insert(path, node);
        Ok(())
    }

    fn remove_node(&mut self, parent: &Utf8Path, name: &str) {
        self.map.remove(&parent.join(name));
        if let Some(Node::Directory { children }) = self.map.get_mut(parent) {
            children.retain(|child| child != name);
        }
    }
}

/// Collapses repeated separators, `.` and `..` components of an absolute path
///
/// A `..` is resolved against the path so far, as the operating system would. Going above the
/// root is an error.
fn normalize(path: &Utf8Path) -> Result<Utf8PathBuf> {
    if !path.is_absolute() {
        bail!("Only absolute paths supported: {}", path);
    }
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                if !normalized.pop() {
                    bail!("Path goes above the root: {}", path);
                }
            }
            other => normalized.push(other),
        }
    }
    Ok(normalized)
}
