//! Directory helpers. Contains [search] function, used to gather report pages
//! from the source directory recursively.

use crate::report_path::ReportKey;
use anyhow::{Context, Error};
use std::{fs, path::Path};
use walkdir::WalkDir;

/// File names that are never included in the bundle. These are reserved
/// report artifacts without navigable content.
const EXCLUDED_FILE_NAMES: &[&str] = &["xdashboard.html", "new.html"];

/// A single report page: raw markup plus its canonical key.
#[derive(Debug)]
pub struct PageSource {
    /// Path of the page relative to the report root.
    pub key: ReportKey,
    /// Raw markup, as read from the source tree.
    pub content: String,
}

/// Settings for [search] function.
///
/// If not sure what to set here, use [Default].
#[derive(Debug)]
pub struct SearchOptions {
    /// Whether to follow links while traversing directories.
    pub follow_links: bool,
}
impl Default for SearchOptions {
    fn default() -> Self {
        Self { follow_links: true }
    }
}

/// Searches fs recursively and builds a [PageSource] for every `.html` file
/// under `root`, except the reserved artifacts `xdashboard.html` and
/// `new.html`.
///
/// Keys are created by stripping `root` from the full file path. Order
/// follows the directory walk; processing order does not affect the bundle.
pub fn search(
    root: &Path,
    options: &SearchOptions,
) -> Result<Vec<PageSource>, Error> {
    let pages = WalkDir::new(root)
        .follow_links(options.follow_links)
        .into_iter()
        .map(|file_entry| {
            // detect search errors
            let file_entry = file_entry?;

            // we are interested in files only
            // if follow_links is true, this will be resolved as link target
            if !file_entry.file_type().is_file() {
                return Ok(None);
            }

            // pages only
            if file_entry.path().extension().and_then(|extension| extension.to_str())
                != Some("html")
            {
                return Ok(None);
            }
            if file_entry
                .file_name()
                .to_str()
                .is_some_and(|file_name| EXCLUDED_FILE_NAMES.contains(&file_name))
            {
                return Ok(None);
            }

            // build page
            let relative_path = file_entry
                .path()
                .strip_prefix(root)
                .context("resolve root relative path")?;
            let key = ReportKey::from_relative_path(relative_path)?;

            let content = fs::read_to_string(file_entry.path())
                .with_context(|| file_entry.path().to_string_lossy().into_owned())?;

            // yield for processing
            Ok(Some(PageSource { key, content }))
        })
        .filter_map(|entry_result: Result<_, Error>| entry_result.transpose()) // strips Ok(None)
        .collect::<Result<Vec<_>, Error>>()?;

    Ok(pages)
}
