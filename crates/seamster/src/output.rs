//! Artifact writing: the bundle file and its sibling `.map` file.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::debug;

use crate::stitcher::Bundle;

/// Path of the map artifact for a bundle destination: the destination path
/// with `.map` appended after any existing extension.
pub fn map_path(destination: &Path) -> PathBuf {
    let mut path = OsString::from(destination.as_os_str());
    path.push(".map");
    PathBuf::from(path)
}

/// Write the bundle, and its source map when present, creating parent
/// directories as needed.
pub fn write_bundle(destination: &Path, bundle: &Bundle) -> Result<()> {
    if let Some(parent) = destination.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).with_context(|| {
            format!(
                "Failed to create destination directory `{}`",
                parent.display()
            )
        })?;
    }

    fs::write(destination, &bundle.text)
        .with_context(|| format!("Failed to write bundle `{}`", destination.display()))?;
    debug!("Wrote bundle `{}`", destination.display());

    if let Some(map) = &bundle.source_map {
        let map_path = map_path(destination);
        fs::write(&map_path, map.to_json()?)
            .with_context(|| format!("Failed to write source map `{}`", map_path.display()))?;
        debug!("Wrote source map `{}`", map_path.display());
    }

    Ok(())
}
