//! Configuration of treemount: the `treemount.toml` file naming each mount, and the platform
//! dependent home directory of an application.
//!
//! ```
//! use treemount_config::ConfigFile;
//!
//! let config = ConfigFile::try_from(r#"
//!     [mounts.app]
//!     root = "/tmp/app"
//!
//!     [mounts.app.tree]
//!     "settings.json" = "{}"
//!     logs = { type = "dir" }
//! "#)?;
//! let mount = config.mount("app")?;
//! assert_eq!(mount.root()?.path(), "/tmp/app");
//! assert_eq!(mount.tree().len(), 2);
//! # Ok::<(), anyhow::Error>(())
//! ```
#![warn(missing_docs)]

mod file;
mod home;
mod root;

pub use self::{
    file::{ConfigFile, MountConfig},
    home::{app_home, app_home_in},
    root::Root,
};
