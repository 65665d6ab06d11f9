use std::rc::Rc;

use anyhow::{bail, Result};
use camino::{Utf8Path, Utf8PathBuf};

use treemount_filesystem::Filesystem;
use treemount_schema::Content;

use super::{
    clear_at, merged_names, read_at, write_at, Extensions, FileOperations, Output, Site,
};

const BUILTINS: &[&str] = &["clear", "exists", "path", "read", "write"];

/// Operations on a single file
pub struct FileOps<'fs, FS> {
    fs: &'fs FS,
    path: Utf8PathBuf,
    parent: Utf8PathBuf,
    declared: Option<Content>,
    extensions: Rc<Extensions<'fs, FS>>,
    custom: FileOperations<'fs, FS>,
}

impl<'fs, FS> FileOps<'fs, FS> {
    /// The path of this file
    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    /// The path of the directory containing this file
    pub fn parent(&self) -> &Utf8Path {
        &self.parent
    }

    /// The content this file was declared with, if any
    pub fn declared(&self) -> Option<&Content> {
        self.declared.as_ref()
    }

    /// The extensions this file was composed with
    pub fn extensions(&self) -> &Rc<Extensions<'fs, FS>> {
        &self.extensions
    }
}

impl<'fs, FS> FileOps<'fs, FS>
where
    FS: Filesystem,
{
    pub(crate) fn compose(
        fs: &'fs FS,
        path: Utf8PathBuf,
        parent: Utf8PathBuf,
        declared: Option<Content>,
        extensions: &Rc<Extensions<'fs, FS>>,
    ) -> Self {
        let custom = extensions.file_operations(&Site {
            path: &path,
            parent: &parent,
            children: vec![],
        });
        tracing::trace!("Composed file {}", path);
        FileOps {
            fs,
            path,
            parent,
            declared,
            extensions: Rc::clone(extensions),
            custom,
        }
    }

    /// Reads the file, returning `None` if it does not exist or cannot be read
    pub fn read(&self) -> Option<String> {
        read_at(self.fs, &self.path)
    }

    /// Writes to the file, replacing its contents and creating its parent directories if needed
    ///
    /// Computed content is evaluated now, on every call.
    pub fn write(&self, data: impl Into<Content>) -> Result<()> {
        write_at(self.fs, &self.path, &data.into())
    }

    /// Empties the file; does nothing if the file does not exist
    pub fn clear(&self) -> Result<()> {
        clear_at(self.fs, &self.path)
    }

    /// Whether the file exists right now
    pub fn exists(&self) -> bool {
        self.fs.exists(&self.path)
    }

    /// Writes the declared content again (re-evaluating it if computed), or empties the file if
    /// none was declared
    pub fn restore(&self) -> Result<()> {
        let content = self.declared.clone().unwrap_or_default();
        self.write(content)
    }

    /// Invokes an operation by name
    ///
    /// A custom operation of that name is used if there is one, otherwise the built-in:
    ///
    /// | Name     | Arguments | Output
    /// |----------|-----------|---------------------------
    /// | `read`   |           | [`Output::Text`]
    /// | `write`  | data      | [`Output::Unit`]
    /// | `clear`  |           | [`Output::Unit`]
    /// | `exists` |           | [`Output::Flag`]
    /// | `path`   |           | [`Output::Path`]
    pub fn call(&self, name: &str, args: &[String]) -> Result<Output> {
        match self.custom.get(name) {
            Some(operation) => (**operation)(self, args),
            None => self.call_builtin(name, args),
        }
    }

    /// The names of all operations available through [`call`][FileOps::call]
    pub fn operation_names(&self) -> Vec<String> {
        merged_names(BUILTINS, &self.custom)
    }

    fn call_builtin(&self, name: &str, args: &[String]) -> Result<Output> {
        Ok(match (name, args) {
            ("read", []) => Output::Text(self.read()),
            ("write", [data]) => {
                self.write(data.as_str())?;
                Output::Unit
            }
            ("clear", []) => {
                self.clear()?;
                Output::Unit
            }
            ("exists", []) => Output::Flag(self.exists()),
            ("path", []) => Output::Path(self.path.clone()),
            _ if BUILTINS.contains(&name) => bail!(
                "Operation \"{}\" does not take {} argument(s)",
                name,
                args.len()
            ),
            _ => bail!("No operation \"{}\" for file {}", name, self.path),
        })
    }
}

impl<FS> std::fmt::Debug for FileOps<'_, FS> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileOps")
            .field("path", &self.path)
            .field("custom", &self.custom.names().collect::<Vec<_>>())
            .finish()
    }
}
