//! # Seamster
//!
//! Stitches independently authored JavaScript files into a single namespaced
//! bundle and emits a line-accurate Source Map v3 artifact alongside it.
//!
//! Each module file is wrapped in its own function scope, the whole bundle in
//! an outer scope, and the shared namespace object declared on the first
//! inner line is the only global the modules touch. Source maps are
//! line-granular: every content line of every module resolves back to its
//! original file and line.
//!
//! ## Example
//!
//! ```no_run
//! use seamster::StitchRequest;
//!
//! fn main() -> anyhow::Result<()> {
//!     let request = StitchRequest::new(
//!         "app",
//!         vec!["modules/a.js".into(), "init.js".into()],
//!         "dist/bundle.js",
//!     )
//!     .with_expose(true);
//!
//!     seamster::stitch_to_disk(&request)?;
//!     Ok(())
//! }
//! ```

mod config;
mod output;
mod source_map;
mod stitcher;
mod util;
mod wrapper;

pub use config::{CONFIG_FILE_NAME, Config};
pub use output::{map_path, write_bundle};
pub use source_map::{Mapping, OriginalLocation, SourceMap, SourceMapBuilder};
pub use stitcher::{Bundle, StitchRequest, stitch, stitch_to_disk};
