use std::fs;

use anyhow::{Context as _, Result};
use camino::Utf8Path;

use super::Filesystem;

/// Access to a real file system
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFilesystem;

impl DiskFilesystem {
    /// Constructs access to the real file system
    pub fn new() -> Self {
        DiskFilesystem
    }
}

impl Filesystem for DiskFilesystem {
    fn create_directory(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        tracing::trace!("mkdir {}", path);
        fs::create_dir(path).with_context(|| format!("Creating directory: {path}"))
    }

    fn create_directory_all(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        tracing::trace!("mkdir -p {}", path);
        fs::create_dir_all(path).with_context(|| format!("Creating directories: {path}"))
    }

    fn write_file(&self, path: impl AsRef<Utf8Path>, content: &str) -> Result<()> {
        let path = path.as_ref();
        tracing::trace!("write {} ({} bytes)", path, content.len());
        fs::write(path, content).with_context(|| format!("Writing file: {path}"))
    }

    fn exists(&self, path: impl AsRef<Utf8Path>) -> bool {
        fs::metadata(path.as_ref()).is_ok()
    }

    fn is_directory(&self, path: impl AsRef<Utf8Path>) -> bool {
        fs::metadata(path.as_ref())
            .map(|m| m.file_type().is_dir())
            .unwrap_or(false)
    }

    fn is_file(&self, path: impl AsRef<Utf8Path>) -> bool {
        fs::metadata(path.as_ref())
            .map(|m| m.file_type().is_file())
            .unwrap_or(false)
    }

    fn list_directory(&self, path: impl AsRef<Utf8Path>) -> Result<Vec<String>> {
        let path = path.as_ref();
        let mut listing = Vec::new();
        for entry in fs::read_dir(path).with_context(|| format!("Listing directory: {path}"))? {
            let entry = entry?;
            let file_name = entry.file_name();
            listing.push(file_name.to_string_lossy().into_owned());
        }
        Ok(listing)
    }

    fn read_file(&self, path: impl AsRef<Utf8Path>) -> Result<String> {
        let path = path.as_ref();
        fs::read_to_string(path).with_context(|| format!("Reading file: {path}"))
    }

    fn remove_file(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        tracing::trace!("rm {}", path);
        fs::remove_file(path).with_context(|| format!("Removing file: {path}"))
    }

    fn remove_all(&self, path: impl AsRef<Utf8Path>) -> Result<()> {
        let path = path.as_ref();
        let metadata = match fs::symlink_metadata(path) {
            Ok(metadata) => metadata,
            Err(_) => return Ok(()),
        };
        tracing::trace!("rm -rf {}", path);
        if metadata.is_dir() {
            fs::remove_dir_all(path)
        } else {
            fs::remove_file(path)
        }
        .with_context(|| format!("Removing: {path}"))
    }
}
