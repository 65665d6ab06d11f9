use std::{collections::BTreeMap, rc::Rc};

use anyhow::{anyhow, bail, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};

use treemount_filesystem::Filesystem;
use treemount_schema::Content;

use super::{
    clear_at, compose_node, merged_names, parent_of, read_at, write_at, DirOperations,
    Extensions, FileOps, Ops, Output, Site,
};
use crate::planted::PlantedNode;

const BUILTINS: &[&str] = &[
    "clear_file",
    "create_dir",
    "create_dir_all",
    "create_file",
    "delete_dir",
    "delete_file",
    "exists",
    "list",
    "path",
    "read_file",
    "write_file",
];

/// Operations on a directory, its entries by name, and the composed operations of its declared
/// children
///
/// Names given to the entry operations are joined onto this directory's path and may contain
/// several components (e.g. `"nested/file"`).
pub struct DirOps<'fs, FS> {
    fs: &'fs FS,
    path: Utf8PathBuf,
    parent: Utf8PathBuf,
    children: BTreeMap<String, Ops<'fs, FS>>,
    extensions: Rc<Extensions<'fs, FS>>,
    custom: DirOperations<'fs, FS>,
}

impl<'fs, FS> DirOps<'fs, FS> {
    /// The path of this directory
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The path of the directory containing this one
    pub fn parent(&self) -> &Utf8Path {
        &self.parent
    }

    /// The composed operations of a declared child
    pub fn child(&self, name: &str) -> Option<&Ops<'fs, FS>> {
        self.children.get(name)
    }

    /// The operations of a declared child file
    pub fn file(&self, name: &str) -> Option<&FileOps<'fs, FS>> {
        self.child(name).and_then(Ops::as_file)
    }

    /// The operations of a declared child directory
    pub fn dir(&self, name: &str) -> Option<&DirOps<'fs, FS>> {
        self.child(name).and_then(Ops::as_dir)
    }

    /// The declared children, in name order
    pub fn children(&self) -> impl Iterator<Item = (&str, &Ops<'fs, FS>)> {
        self.children
            .iter()
            .map(|(name, child)| (name.as_str(), child))
    }

    /// Follows a relative path of declared names down the tree
    pub fn lookup(&self, relative: impl AsRef<Utf8Path>) -> Option<&Ops<'fs, FS>> {
        let mut names = relative.as_ref().components().map(|component| match component {
            Utf8Component::Normal(name) => Some(name),
            _ => None,
        });
        let mut current = self.child(names.next()??)?;
        for name in names {
            current = current.as_dir()?.child(name?)?;
        }
        Some(current)
    }

    /// The extensions this directory was composed with
    pub fn extensions(&self) -> &Rc<Extensions<'fs, FS>> {
        &self.extensions
    }
}

impl<'fs, FS> DirOps<'fs, FS>
where
    FS: Filesystem,
{
    /// Composes directory operations together with those of every declared child
    ///
    /// This is the one place a directory is composed, whether it was declared or created later.
    pub(crate) fn compose(
        fs: &'fs FS,
        path: Utf8PathBuf,
        parent: Utf8PathBuf,
        declared: Option<&BTreeMap<String, PlantedNode>>,
        extensions: &Rc<Extensions<'fs, FS>>,
    ) -> Self {
        let children: BTreeMap<String, Ops<'fs, FS>> = declared
            .map(|declared| {
                declared
                    .iter()
                    .map(|(name, node)| (name.clone(), compose_node(fs, node, extensions)))
                    .collect()
            })
            .unwrap_or_default();
        let custom = extensions.dir_operations(&Site {
            path: &path,
            parent: &parent,
            children: children.keys().map(String::as_str).collect(),
        });
        tracing::trace!("Composed directory {} ({} children)", path, children.len());
        DirOps {
            fs,
            path,
            parent,
            children,
            extensions: Rc::clone(extensions),
            custom,
        }
    }

    /// Whether an entry (file or directory) exists under this directory right now
    pub fn exists(&self, name: &str) -> bool {
        self.fs.exists(self.path.join(name))
    }

    /// Lists the names of the entries on disk in this directory, sorted
    pub fn list(&self) -> Result<Vec<String>> {
        let mut names = self.fs.list_directory(&self.path)?;
        names.sort();
        Ok(names)
    }

    /// Creates a directory under this one, whose parent must exist, and returns its operations
    ///
    /// An existing directory is not an error: its operations are returned as if just created.
    /// If the directory cannot be created, `None` is returned. This includes the case of a file
    /// already being at that path.
    pub fn create_dir(&self, name: &str) -> Option<DirOps<'fs, FS>> {
        self.create_directory(name, false)
    }

    /// Creates a directory under this one along with any missing parents, and returns its
    /// operations
    ///
    /// As with [`create_dir`][DirOps::create_dir], `None` is returned on failure.
    pub fn create_dir_all(&self, name: &str) -> Option<DirOps<'fs, FS>> {
        self.create_directory(name, true)
    }

    fn create_directory(&self, name: &str, recursive: bool) -> Option<DirOps<'fs, FS>> {
        let path = self.path.join(name);
        if self.fs.is_directory(&path) {
            tracing::debug!("Directory {} already exists", path);
            return Some(self.compose_created_directory(path));
        }
        let created = if recursive {
            self.fs.create_directory_all(&path)
        } else {
            self.fs.create_directory(&path)
        };
        match created {
            Ok(()) => {
                tracing::debug!("Created directory {}", path);
                Some(self.compose_created_directory(path))
            }
            Err(e) => {
                tracing::warn!("Failed to create directory {}: {:#}", path, e);
                None
            }
        }
    }

    fn compose_created_directory(&self, path: Utf8PathBuf) -> DirOps<'fs, FS> {
        let parent = parent_of(&path, &self.path);
        DirOps::compose(self.fs, path, parent, None, &self.extensions)
    }

    /// Removes a directory (or anything else) under this one, with all of its contents
    ///
    /// Nothing happens if there is nothing there.
    pub fn delete_dir(&self, name: &str) -> Result<()> {
        let path = self.path.join(name);
        tracing::debug!("Deleting {}", path);
        self.fs.remove_all(&path)
    }

    /// Creates an empty file under this directory and returns its operations
    ///
    /// See [`create_file_with`][DirOps::create_file_with].
    pub fn create_file(&self, name: &str) -> Result<FileOps<'fs, FS>> {
        self.create_file_with(name, Content::default())
    }

    /// Creates a file with the given content under this directory and returns its operations
    ///
    /// An existing file is left as it is and its operations returned. Unlike
    /// [`FileOps::write`], the directory to hold the file must already exist; it is an error if
    /// it does not.
    pub fn create_file_with(
        &self,
        name: &str,
        data: impl Into<Content>,
    ) -> Result<FileOps<'fs, FS>> {
        let path = self.path.join(name);
        let parent = parent_of(&path, &self.path);
        if self.fs.is_file(&path) {
            tracing::debug!("File {} already exists", path);
        } else if self.fs.exists(&path) {
            bail!("Cannot create file {}: path exists as a directory", path);
        } else if !self.fs.is_directory(&parent) {
            return Err(anyhow!(
                "Cannot create file {}: directory {} does not exist",
                path,
                parent
            ));
        } else {
            self.fs.write_file(&path, &data.into().resolve())?;
            tracing::debug!("Created file {}", path);
        }
        Ok(FileOps::compose(
            self.fs,
            path,
            parent,
            None,
            &self.extensions,
        ))
    }

    /// Removes a file under this directory; nothing happens if there is nothing there
    pub fn delete_file(&self, name: &str) -> Result<()> {
        let path = self.path.join(name);
        if self.fs.exists(&path) {
            tracing::debug!("Deleting file {}", path);
            self.fs.remove_file(&path)?;
        }
        Ok(())
    }

    /// Reads a file under this directory (see [`FileOps::read`])
    pub fn read_file(&self, name: &str) -> Option<String> {
        read_at(self.fs, &self.path.join(name))
    }

    /// Writes a file under this directory (see [`FileOps::write`])
    pub fn write_file(&self, name: &str, data: impl Into<Content>) -> Result<()> {
        write_at(self.fs, &self.path.join(name), &data.into())
    }

    /// Empties a file under this directory (see [`FileOps::clear`])
    pub fn clear_file(&self, name: &str) -> Result<()> {
        clear_at(self.fs, &self.path.join(name))
    }

    /// Invokes an operation by name
    ///
    /// A custom operation of that name is used if there is one, otherwise the built-in:
    ///
    /// | Name             | Arguments       | Output
    /// |------------------|-----------------|---------------------------
    /// | `exists`         | name            | [`Output::Flag`]
    /// | `list`           |                 | [`Output::Listing`]
    /// | `path`           |                 | [`Output::Path`]
    /// | `create_dir`     | name            | [`Output::Path`], or `Flag(false)` on failure
    /// | `create_dir_all` | name            | [`Output::Path`], or `Flag(false)` on failure
    /// | `delete_dir`     | name            | [`Output::Unit`]
    /// | `create_file`    | name \[, data\] | [`Output::Path`]
    /// | `delete_file`    | name            | [`Output::Unit`]
    /// | `read_file`      | name            | [`Output::Text`]
    /// | `write_file`     | name, data      | [`Output::Unit`]
    /// | `clear_file`     | name            | [`Output::Unit`]
    pub fn call(&self, name: &str, args: &[String]) -> Result<Output> {
        match self.custom.get(name) {
            Some(operation) => (**operation)(self, args),
            None => self.call_builtin(name, args),
        }
    }

    /// The names of all operations available through [`call`][DirOps::call]
    pub fn operation_names(&self) -> Vec<String> {
        merged_names(BUILTINS, &self.custom)
    }

    fn call_builtin(&self, name: &str, args: &[String]) -> Result<Output> {
        let created = |ops: Option<DirOps<'fs, FS>>| match ops {
            Some(ops) => Output::Path(ops.path),
            None => Output::Flag(false),
        };
        Ok(match (name, args) {
            ("exists", [entry]) => Output::Flag(self.exists(entry)),
            ("list", []) => Output::Listing(self.list()?),
            ("path", []) => Output::Path(self.path.clone()),
            ("create_dir", [entry]) => created(self.create_dir(entry)),
            ("create_dir_all", [entry]) => created(self.create_dir_all(entry)),
            ("delete_dir", [entry]) => {
                self.delete_dir(entry)?;
                Output::Unit
            }
            ("create_file", [entry]) => Output::Path(self.create_file(entry)?.path().to_owned()),
            ("create_file", [entry, data]) => {
                Output::Path(self.create_file_with(entry, data.as_str())?.path().to_owned())
            }
            ("delete_file", [entry]) => {
                self.delete_file(entry)?;
                Output::Unit
            }
            ("read_file", [entry]) => Output::Text(self.read_file(entry)),
            ("write_file", [entry, data]) => {
                self.write_file(entry, data.as_str())?;
                Output::Unit
            }
            ("clear_file", [entry]) => {
                self.clear_file(entry)?;
                Output::Unit
            }
            _ if BUILTINS.contains(&name) => bail!(
                "Operation \"{}\" does not take {} argument(s)",
                name,
                args.len()
            ),
            _ => bail!("No operation \"{}\" for directory {}", name, self.path),
        })
    }
}

impl<FS> std::fmt::Debug for DirOps<'_, FS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirOps")
            .field("path", &self.path)
            .field("children", &self.children)
            .field("custom", &self.custom.names().collect::<Vec<_>>())
            .finish()
    }
}
