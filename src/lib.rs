//! coverage-bundler packs a directory of generated HTML coverage-report pages
//! (one root `index.html` plus linked sub-pages) into a single self-contained
//! HTML file. The output embeds every page as an entry of an in-memory
//! archive together with a client-side navigation script, so the whole
//! multi-page report can be mailed around or opened from disk as one artifact
//! while links, stylesheets and script order keep working.
//!
//! The bundling run is strictly ordered: enumerate pages, rewrite their
//! intra-report references into canonical archive keys, serialize the archive
//! and splice it into the root page. The navigation script embedded into the
//! output decodes the archive in the viewer's browser, extracts the page
//! selected by the `?path=` query parameter (default `index.html`) and swaps
//! the live document body without a full reload.
//!
//! # Using as a standalone application
//!
//! ```text
//! $ coverage-bundler --source ./coverage-report --output ./coverage-report.html
//! ```
//!
//! With `--overwrite` the bundle is written back over the root index and the
//! packed per-page files are deleted afterwards:
//!
//! ```text
//! $ coverage-bundler --source ./coverage-report --overwrite
//! ```
//!
//! # Using as a library
//!
//! ```no_run
//! # use anyhow::Error;
//! # use coverage_bundler::bundle::{self, Options};
//! # use std::path::PathBuf;
//! #
//! # fn main() -> Result<(), Error> {
//! bundle::run(&Options {
//!     source: PathBuf::from("coverage-report"),
//!     output: PathBuf::from("coverage-report.html"),
//!     overwrite: false,
//! })?;
//! # Ok(())
//! # }
//! ```
//!
//! For finer-grained use (rewriting single pages, building the archive
//! manually) browse through modules of this crate.

#![allow(clippy::new_without_default)]
#![warn(missing_docs)]

pub mod archive;
pub mod bootstrap;
pub mod bundle;
pub mod directory;
pub mod report_path;
pub mod rewrite;
