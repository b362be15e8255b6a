//! Configuration loading and layering.
//!
//! Settings come from up to four layers, lowest precedence first: built-in
//! defaults, the user-level config file, the project manifest
//! (`./seamster.toml` or an explicit `--config` path), and command-line
//! flags. Later layers win field by field; the flag layer is merged by the
//! binary after the file layers resolve.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use etcetera::{BaseStrategy, choose_base_strategy};
use log::debug;
use serde::Deserialize;

use crate::stitcher::StitchRequest;

/// Project manifest file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "seamster.toml";

/// One configuration layer. Unset fields defer to lower-precedence layers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Global name the stitched modules attach to.
    pub namespace: Option<String>,
    /// Module files in stitch order.
    #[serde(default)]
    pub files: Vec<PathBuf>,
    /// Bundle destination path.
    pub destination: Option<PathBuf>,
    /// Emit a source map artifact next to the bundle.
    pub source_map: Option<bool>,
    /// Mirror the namespace onto `module.exports` or `window`.
    pub expose: Option<bool>,
}

impl Config {
    /// Read one layer from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file `{}`", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid config file `{}`", path.display()))
    }

    /// Location of the user-level config file, typically
    /// `~/.config/seamster/seamster.toml`.
    pub fn user_config_path() -> Option<PathBuf> {
        choose_base_strategy().ok().map(|strategy| {
            strategy
                .config_dir()
                .join("seamster")
                .join(CONFIG_FILE_NAME)
        })
    }

    /// Build the effective file-based configuration: defaults, then the user
    /// config when present, then the project manifest.
    ///
    /// An explicit `config` path must exist; the implicit `./seamster.toml`
    /// is skipped silently when absent.
    pub fn layered(config: Option<&Path>) -> Result<Self> {
        let mut layered = Self::default();

        if let Some(user) = Self::user_config_path()
            && user.is_file()
        {
            debug!("Applying user config `{}`", user.display());
            layered.merge(Self::load(&user)?);
        }

        let project = match config {
            Some(path) => Some(path.to_path_buf()),
            None => {
                let implicit = PathBuf::from(CONFIG_FILE_NAME);
                implicit.is_file().then_some(implicit)
            }
        };
        if let Some(project) = project {
            debug!("Applying project config `{}`", project.display());
            layered.merge(Self::load(&project)?);
        }

        Ok(layered)
    }

    /// Overlay `other` onto `self`, field by field. An empty file list in
    /// `other` leaves the current list in place.
    pub fn merge(&mut self, other: Self) {
        if other.namespace.is_some() {
            self.namespace = other.namespace;
        }
        if !other.files.is_empty() {
            self.files = other.files;
        }
        if other.destination.is_some() {
            self.destination = other.destination;
        }
        if other.source_map.is_some() {
            self.source_map = other.source_map;
        }
        if other.expose.is_some() {
            self.expose = other.expose;
        }
    }

    /// Collapse the layers into a stitch request. Fields still missing here
    /// surface as validation errors when the request is stitched.
    pub fn into_request(self) -> StitchRequest {
        StitchRequest::new(
            self.namespace.unwrap_or_default(),
            self.files,
            self.destination.unwrap_or_default(),
        )
        .with_source_map(self.source_map.unwrap_or(true))
        .with_expose(self.expose.unwrap_or(false))
    }
}
