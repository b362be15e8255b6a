//! Core stitching pipeline.
//!
//! A stitch concatenates module files in request order, wraps each one in its
//! own function scope, wraps the whole result in an outer scope, and prefixes
//! a namespace declaration the modules attach to. Line accounting runs
//! alongside concatenation so every content line of every module maps back to
//! its original file.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use log::debug;

use crate::output;
use crate::source_map::{SourceMap, SourceMapBuilder};
use crate::util::source_reference;
use crate::wrapper::{line_count, newline_count, wrap};

/// Everything one stitch needs: what to join, where to put it, and which
/// artifacts to produce.
#[derive(Debug, Clone)]
pub struct StitchRequest {
    /// Global name the stitched modules attach to.
    pub namespace: String,
    /// Module files in stitch order.
    pub files: Vec<PathBuf>,
    /// Where the bundle will be written.
    pub destination: PathBuf,
    /// Emit a source map artifact next to the bundle.
    pub source_map: bool,
    /// Mirror the namespace onto `module.exports` or `window`.
    pub expose: bool,
}

impl StitchRequest {
    /// A request with the default artifact settings: source map on, expose off.
    pub fn new(
        namespace: impl Into<String>,
        files: Vec<PathBuf>,
        destination: impl Into<PathBuf>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            files,
            destination: destination.into(),
            source_map: true,
            expose: false,
        }
    }

    #[must_use]
    pub fn with_source_map(mut self, source_map: bool) -> Self {
        self.source_map = source_map;
        self
    }

    #[must_use]
    pub fn with_expose(mut self, expose: bool) -> Self {
        self.expose = expose;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.namespace.is_empty() {
            bail!("A namespace was not provided");
        }
        if self.files.is_empty() {
            bail!("A list of files to stitch was not provided");
        }
        if self.destination.as_os_str().is_empty() {
            bail!("A destination file path was not provided");
        }
        Ok(())
    }
}

/// A finished stitch: the bundle text and its optional source map.
#[derive(Debug, Clone)]
pub struct Bundle {
    /// Complete bundle text, including the `sourceMappingURL` trailer when a
    /// map was produced.
    pub text: String,
    /// Source map for the bundle, when requested.
    pub source_map: Option<SourceMap>,
}

/// The namespace declaration emitted as the first line of every bundle.
fn declaration(namespace: &str, expose: bool) -> String {
    let mut declaration = format!("var {namespace} = {{}};");
    if expose {
        declaration.push_str(&format!(
            r#" typeof module != "undefined" && module.exports ? module.exports = {namespace} : window.{namespace} = {namespace};"#
        ));
    }
    declaration
}

/// Stitch the requested files into a single namespaced bundle.
///
/// Fails when the request is incomplete or a module file cannot be read;
/// nothing is written to disk.
pub fn stitch(request: &StitchRequest) -> Result<Bundle> {
    request.validate()?;

    let mut builder = request.source_map.then(SourceMapBuilder::new);
    let mut bundle = declaration(&request.namespace, request.expose);
    bundle.push('\n');
    let mut bundle_lines = newline_count(&bundle);

    let last = request.files.len() - 1;
    for (position, file) in request.files.iter().enumerate() {
        let content = fs::read_to_string(file)
            .with_context(|| format!("Failed to read module file `{}`", file.display()))?;
        debug!(
            "Stitching `{}` starting at bundle line {}",
            file.display(),
            bundle_lines + 3
        );

        if let Some(builder) = builder.as_mut() {
            let reference = source_reference(&request.destination, file);
            // The outer wrapper and this unit's own scope opener sit above
            // the first content line, hence the offset of two.
            for line in 1..=line_count(&content) {
                builder.add_mapping(&reference, line, 2 + bundle_lines + line);
            }
            builder.set_source_content(&reference, &content);
        }

        let wrapped = wrap(&content, position < last);
        bundle_lines += newline_count(&wrapped);
        bundle.push_str(&wrapped);
        debug_assert_eq!(
            bundle_lines,
            newline_count(&bundle),
            "bundle line accounting drifted"
        );
    }

    let mut text = wrap(&bundle, false);
    let source_map = builder.map(SourceMapBuilder::build).transpose()?;

    if source_map.is_some() {
        let file_name = request.destination.file_name().unwrap_or_default();
        text.push_str(&format!(
            "\n//# sourceMappingURL={}.map",
            file_name.to_string_lossy()
        ));
    }

    Ok(Bundle { text, source_map })
}

/// Stitch and write the bundle, and its map when requested, to the
/// destination path. Parent directories are created as needed.
pub fn stitch_to_disk(request: &StitchRequest) -> Result<Bundle> {
    let bundle = stitch(request)?;
    output::write_bundle(&request.destination, &bundle)?;
    Ok(bundle)
}
