//! Bundling run. Contains [Options] and [run], wiring page enumeration, link
//! rewriting, archive building and bootstrap assembly together.
//!
//! The run is strictly ordered in two phases: phase one reads, rewrites and
//! archives every page without touching the source tree; phase two, entered
//! only after phase one succeeded fully, performs deletions (overwrite mode)
//! and the final write.

use crate::{archive, bootstrap, directory, rewrite};
use anyhow::{Context, Error, ensure};
use std::{fs, path::PathBuf};

/// Name of the root page every report must contain. It doubles as the default
/// page rendered by the bundle when no `?path=` parameter is given.
pub const ROOT_PAGE: &str = "index.html";

/// Settings for a single [run].
#[derive(Debug)]
pub struct Options {
    /// Report directory containing the root `index.html`.
    pub source: PathBuf,
    /// Path the assembled bundle is written to.
    pub output: PathBuf,
    /// Delete the packed per-page files after the bundle has been built. The
    /// root index is rewritten in place, never deleted.
    pub overwrite: bool,
}

/// Executes a full bundling run.
pub fn run(options: &Options) -> Result<(), Error> {
    let source = fs::canonicalize(&options.source)
        .with_context(|| format!("source directory {:?} does not exist", options.source))?;
    ensure!(
        source.is_dir(),
        "source {:?} is not a directory",
        options.source
    );

    let root_page_path = source.join(ROOT_PAGE);
    let root_markup = fs::read_to_string(&root_page_path)
        .with_context(|| format!("missing root page {:?}", root_page_path))?;
    // fails before any destructive step when the root page lacks a body pair
    let template = bootstrap::template_from_root_page(&root_markup).context("root page")?;

    let pages = directory::search(&source, &directory::SearchOptions::default())?;

    let mut builder = archive::Builder::new();
    for page in &pages {
        log::info!("packing page {}", page.key);

        let rewritten = rewrite::rewrite_links(&page.content, &page.key, &source)
            .with_context(|| page.key.to_string())?;

        builder.page_add(page.key.clone(), rewritten)?;
    }
    let archive = builder.finalize();
    let payload = archive.store_memory()?;

    let bundled = bootstrap::assemble(&template, &payload)?;

    // phase two: the source tree is mutated only from here on
    if options.overwrite {
        for page in &pages {
            if &*page.key == ROOT_PAGE {
                continue;
            }

            let page_path = source.join(&*page.key);
            fs::remove_file(&page_path)
                .with_context(|| page_path.to_string_lossy().into_owned())?;
            log::info!("deleted packed page {}", page.key);
        }
    }

    fs::write(&options.output, &bundled)
        .with_context(|| format!("cannot write output {:?}", options.output))?;
    log::info!(
        "bundled {} pages into {}",
        archive.entries.len(),
        options.output.display()
    );

    Ok(())
}
