//! Archive helpers. Contains [Builder], builder for [Archive], the container
//! embedded into the bootstrap page.

use crate::report_path::ReportKey;
use anyhow::{Context, Error, anyhow, bail};
use std::{
    collections::HashSet,
    io::{Cursor, Write},
};
use zip::{CompressionMethod, DateTime, ZipWriter, write::SimpleFileOptions};

/// Main builder for [Archive]. Inside it keeps the rewritten pages under
/// their respective [ReportKey], in insertion order.
#[derive(Debug)]
pub struct Builder {
    entries: Vec<(ReportKey, String)>,
    keys: HashSet<ReportKey>,
}
impl Builder {
    /// Creates empty [self] to be filled with pages.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            keys: HashSet::new(),
        }
    }

    /// Adds a rewritten page to the archive.
    ///
    /// Keys must be unique. A collision means two pages resolved to the same
    /// canonical key, which the enumeration step rules out - it is an
    /// internal-consistency failure, not recoverable user input.
    pub fn page_add(
        &mut self,
        key: ReportKey,
        content: String,
    ) -> Result<(), Error> {
        if !self.keys.insert(key.clone()) {
            bail!("archive entry {} already exists", key);
        }

        self.entries.push((key, content));

        Ok(())
    }

    /// Finalizes the builder, returning built [Archive].
    pub fn finalize(self) -> Archive {
        Archive {
            entries: self.entries,
        }
    }
}

/// Ordered collection of rewritten pages, immutable after creation.
#[derive(Debug)]
pub struct Archive {
    /// Contained pages, `(canonical key, rewritten markup)`, in insertion
    /// order.
    pub entries: Vec<(ReportKey, String)>,
}
impl Archive {
    /// Serializes [self] into an in-memory zip container. Every entry is
    /// stored under its literal canonical key and is retrievable
    /// byte-for-byte with the exact same key string.
    ///
    /// Entry timestamps are pinned so identical input yields an identical
    /// container.
    pub fn store_memory(&self) -> Result<Vec<u8>, Error> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));

        let timestamp = DateTime::from_date_and_time(1980, 1, 1, 0, 0, 0)
            .map_err(|error| anyhow!("invalid archive timestamp: {}", error))?;
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(timestamp);

        for (key, content) in &self.entries {
            writer
                .start_file(&**key, options)
                .with_context(|| key.to_string())?;
            writer
                .write_all(content.as_bytes())
                .with_context(|| key.to_string())?;
        }

        let cursor = writer.finish().context("finalize archive")?;

        Ok(cursor.into_inner())
    }
}
