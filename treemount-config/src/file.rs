use std::collections::HashMap;

use anyhow::{anyhow, bail, Context as _, Result};
use camino::Utf8Path;
use serde::Deserialize;

use treemount_schema::Tree;

use crate::{app_home, Root};

/// Deserialization of treemount.toml
#[derive(Deserialize, Default, Debug, Clone)]
pub struct ConfigFile {
    /// A map of unique names to individual mount configurations
    #[serde(default)]
    pub mounts: HashMap<String, MountConfig>,
}

/// Configuration for a single mount within treemount.toml
///
/// Exactly one of `root` and `app` is given.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct MountConfig {
    root: Option<Root>,
    app: Option<String>,
    #[serde(default)]
    tree: Tree,
}

impl MountConfig {
    /// The directory the tree is to be mounted on
    ///
    /// This is either the configured `root`, or the home directory of the configured `app` (see
    /// [`app_home`]).
    pub fn root(&self) -> Result<Root> {
        match (&self.root, &self.app) {
            (Some(root), None) => Ok(root.clone()),
            (None, Some(app)) => Root::new(app_home(app)?),
            (Some(_), Some(_)) => bail!("Only one of \"root\" and \"app\" may be given"),
            (None, None) => bail!("One of \"root\" or \"app\" must be given"),
        }
    }

    /// The configured root, if given directly
    pub fn configured_root(&self) -> Option<&Root> {
        self.root.as_ref()
    }

    /// The configured application name, if given
    pub fn app(&self) -> Option<&str> {
        self.app.as_deref()
    }

    /// The declared tree to mount
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    fn validate(&self) -> Result<()> {
        if self.root.is_some() == self.app.is_some() {
            bail!("Exactly one of \"root\" or \"app\" must be given");
        }
        self.tree.validate()
    }
}

impl ConfigFile {
    /// Load a configuration from the specified file
    ///
    pub fn load(path: impl AsRef<Utf8Path>) -> Result<Self> {
        let path = path.as_ref();
        let config_context = || format!("Reading config file {path:?}");
        let config_data = std::fs::read_to_string(path).with_context(config_context)?;
        config_data
            .as_str()
            .try_into()
            .with_context(|| format!("Loading config file {path:?}"))
    }

    /// Looks up a mount by name
    pub fn mount(&self, name: &str) -> Result<&MountConfig> {
        self.mounts.get(name).ok_or_else(|| {
            let mut names: Vec<&str> = self.mounts.keys().map(String::as_str).collect();
            names.sort();
            anyhow!(
                "No mount named \"{}\" (configured: {})",
                name,
                names.join(", ")
            )
        })
    }
}

impl TryFrom<&str> for ConfigFile {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let config: ConfigFile = toml::from_str(value)?;
        for (name, mount) in &config.mounts {
            mount
                .validate()
                .with_context(|| format!("Invalid mount \"{name}\""))?;
        }
        Ok(config)
    }
}
