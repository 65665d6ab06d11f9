use anyhow::{Context as _, Result};
use camino::Utf8PathBuf;

#[cfg(not(any(windows, target_os = "macos")))]
use camino::Utf8Path;

use treemount_filesystem::{DiskFilesystem, Filesystem};
use treemount_schema::validate_name;

/// The vendor directory placed between the platform's base directory and each application's
const VENDOR: &str = "treemount";

/// Resolves the directory where the named application keeps its files
///
/// This is `<base>/treemount/<app_name>`, where `<base>` depends on the platform:
///
/// | Platform | Base                                          |
/// |----------|-----------------------------------------------|
/// | Windows  | `{FOLDERID_RoamingAppData}`                   |
/// | macOS    | `$HOME/Library/Application Support`           |
/// | Other    | `$HOME/.config` if it is a directory, else `$HOME` |
///
/// The application name must be a single, non-empty path component.
pub fn app_home(app_name: &str) -> Result<Utf8PathBuf> {
    app_home_in(&DiskFilesystem::new(), app_name)
}

/// As [`app_home`], checking for the existence of directories on the given filesystem
pub fn app_home_in<FS>(fs: &FS, app_name: &str) -> Result<Utf8PathBuf>
where
    FS: Filesystem,
{
    validate_name(app_name).context("Invalid application name")?;
    let base = base_directory(fs)?;
    tracing::debug!("Base directory for {} is {}", app_name, base);
    Ok(base.join(VENDOR).join(app_name))
}

#[cfg(any(windows, target_os = "macos"))]
fn base_directory<FS>(_fs: &FS) -> Result<Utf8PathBuf>
where
    FS: Filesystem,
{
    let config = dirs::config_dir().context("No configuration directory on this platform")?;
    Utf8PathBuf::try_from(config).context("Configuration directory is not UTF-8")
}

#[cfg(not(any(windows, target_os = "macos")))]
fn base_directory<FS>(fs: &FS) -> Result<Utf8PathBuf>
where
    FS: Filesystem,
{
    let home = dirs::home_dir().context("Cannot determine the home directory")?;
    let home = Utf8PathBuf::try_from(home).context("Home directory is not UTF-8")?;
    Ok(config_or_home(fs, &home))
}

#[cfg(not(any(windows, target_os = "macos")))]
fn config_or_home<FS>(fs: &FS, home: &Utf8Path) -> Utf8PathBuf
where
    FS: Filesystem,
{
    let config = home.join(".config");
    if fs.is_directory(&config) {
        config
    } else {
        home.to_owned()
    }
}
