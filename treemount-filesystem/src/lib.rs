//! Provides an abstract [`Filesystem`] trait, together with a physical ([`DiskFilesystem`])
//! and virtual ([`MemoryFilesystem`]) implementation.
#![warn(missing_docs)]

use anyhow::Result;
use camino::Utf8Path;

mod memory;
mod physical;

pub use self::{memory::MemoryFilesystem, physical::DiskFilesystem};

/// Operations of a file system
///
/// Every operation takes `&self` so that many handles may share one filesystem; backends that
/// keep state use interior mutability.
pub trait Filesystem {
    /// Create a directory at the given path; its parent must already exist
    fn create_directory(&self, path: impl AsRef<Utf8Path>) -> Result<()>;

    /// Create a directory and all of its parents
    fn create_directory_all(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some((parent, _)) = split(path) {
            if parent != "/" && !parent.as_str().is_empty() {
                self.create_directory_all(parent)?;
            }
        }
        if !self.is_directory(path) {
            self.create_directory(path)?;
        }
        Ok(())
    }

    /// Write the given content to a file, creating it or replacing what was there
    ///
    /// The parent directory must already exist.
    fn write_file(&self, path: impl AsRef<Utf8Path>, content: &str) -> Result<()>;

    /// Returns true if the path exists
    fn exists(&self, path: impl AsRef<Utf8Path>) -> bool;

    /// Returns true if the path is a directory
    fn is_directory(&self, path: impl AsRef<Utf8Path>) -> bool;

    /// Returns true if the path is a regular file
    fn is_file(&self, path: impl AsRef<Utf8Path>) -> bool;

    /// Lists the contents of the given directory
    fn list_directory(&self, path: impl AsRef<Utf8Path>) -> Result<Vec<String>>;

    /// Reads the contents of the given file
    fn read_file(&self, path: impl AsRef<Utf8Path>) -> Result<String>;

    /// Removes a single file, failing if it is missing or is a directory
    fn remove_file(&self, path: impl AsRef<Utf8Path>) -> Result<()>;

    /// Removes a file or a whole directory tree, succeeding if nothing is there
    fn remove_all(&self, path: impl AsRef<Utf8Path>) -> Result<()>;
}

/// Splits the dirname and basename of the path if possible to do so
pub fn split(path: &Utf8Path) -> Option<(&Utf8Path, &str)> {
    path.as_str().rsplit_once('/').map(|(parent, child)| {
        if parent.is_empty() {
            ("/".into(), child)
        } else {
            (parent.into(), child)
        }
    })
}
