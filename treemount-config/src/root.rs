use std::fmt::Display;

use anyhow::{bail, Result};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Deserialize;

use treemount_filesystem::Filesystem;

/// The directory a tree is mounted on
///
/// A root is always absolute and written in its simplest form: no `.` or `..` components, no
/// repeated or trailing separators. Whether anything is there yet is checked separately, with
/// [`Root::check_mountable`].
#[derive(Deserialize, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(try_from = "Utf8PathBuf")]
pub struct Root(Utf8PathBuf);

impl Root {
    /// Validates and wraps the given path
    pub fn new(path: impl AsRef<Utf8Path>) -> Result<Self> {
        path.as_ref().to_owned().try_into()
    }

    /// The absolute path of this root
    pub fn path(&self) -> &Utf8Path {
        &self.0
    }

    /// Checks that a tree could be mounted here on the given filesystem
    ///
    /// The root may be missing (it is created when the tree is materialized) or an existing
    /// directory. Anything else at that path, or a file in place of one of its ancestors, is an
    /// error.
    pub fn check_mountable<FS: Filesystem>(&self, fs: &FS) -> Result<()> {
        if let Some(blocking) = self
            .0
            .ancestors()
            .find(|path| fs.exists(path) && !fs.is_directory(path))
        {
            if blocking == self.path() {
                bail!("Cannot mount on {}: path exists as a file", self);
            }
            bail!("Cannot mount on {}: {} exists as a file", self, blocking);
        }
        Ok(())
    }
}

impl AsRef<Utf8Path> for Root {
    fn as_ref(&self) -> &Utf8Path {
        &self.0
    }
}

impl Display for Root {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<Utf8PathBuf> for Root {
    type Error = anyhow::Error;

    fn try_from(value: Utf8PathBuf) -> Result<Self, Self::Error> {
        if !value.is_absolute() {
            bail!("Mount root must be absolute: {}", value);
        }
        let simplified: Utf8PathBuf = value.components().collect();
        if simplified != value.as_str()
            || value
                .components()
                .any(|component| matches!(component, Utf8Component::ParentDir))
        {
            bail!("Mount root must be written in its simplest form: {}", value);
        }
        Ok(Root(value))
    }
}

impl TryFrom<&str> for Root {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Utf8PathBuf::from(value).try_into()
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use treemount_filesystem::{Filesystem, MemoryFilesystem};

    use super::Root;

    #[test]
    fn valid_roots() {
        for path in ["/", "/tmp/app", "/home/me/.config"] {
            assert_eq!(Root::try_from(path).unwrap().path(), path);
        }
    }

    #[test]
    fn invalid_roots() {
        for path in ["relative", "", "/tmp/", "/tmp//app", "/tmp/./app", "/tmp/../etc", "/tmp/.."] {
            assert!(Root::try_from(path).is_err(), "Accepted {:?}", path);
        }
    }

    #[test]
    fn mountable_when_missing_or_a_directory() -> Result<()> {
        let fs = MemoryFilesystem::new();
        let root = Root::try_from("/srv/app")?;
        root.check_mountable(&fs)?;
        fs.create_directory_all("/srv/app")?;
        root.check_mountable(&fs)?;
        Ok(())
    }

    #[test]
    fn files_block_mounting() -> Result<()> {
        let fs = MemoryFilesystem::new();
        fs.create_directory("/srv")?;
        fs.write_file("/srv/app", "")?;
        let error = Root::try_from("/srv/app")?.check_mountable(&fs).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot mount on /srv/app: path exists as a file"
        );
        let error = Root::try_from("/srv/app/inner")?
            .check_mountable(&fs)
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot mount on /srv/app/inner: /srv/app exists as a file"
        );
        Ok(())
    }
}
