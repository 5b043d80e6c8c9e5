//! Report path helpers. Contains [ReportKey], the canonical archive key of a
//! report page, and [resolve_reference], which canonicalizes references found
//! inside page markup.

use anyhow::{Error, anyhow, bail, ensure};
use std::{
    borrow::Borrow,
    fmt,
    ops::Deref,
    path::{Component, Path},
};

/// [ReportKey] is the path of a page relative to the report root, eg.
/// `report/a.html`. It is used as the archive entry name and as the value of
/// the `?path=` query parameter understood by the embedded navigation script.
///
/// Custom type is used to enforce some rules: forward slash separators, no
/// leading slash, never escaping the report root.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ReportKey {
    inner: String,
}
impl ReportKey {
    /// Construct key from string representation. Refer to [self] for details.
    pub fn from_string(inner: String) -> Self {
        Self { inner }
    }

    /// Creates key (eg. `dir1/dir2/file.html`) from a root-relative fs path,
    /// as produced by stripping the source root from a found file's path.
    ///
    /// # Examples
    ///
    /// ```
    /// # use anyhow::Error;
    /// # use coverage_bundler::report_path::ReportKey;
    /// # use std::path::PathBuf;
    /// #
    /// # fn main() -> Result<(), Error> {
    /// #
    /// assert_eq!(
    ///     ReportKey::from_relative_path(&PathBuf::from("report/a.html"))?,
    ///     ReportKey::from_string("report/a.html".to_owned()),
    /// );
    /// #
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_relative_path(path: &Path) -> Result<Self, Error> {
        assert!(path.is_relative());

        // list of path components, eg. ["report", "a.html"]
        let components = path
            .components()
            .map(|component| {
                // we cannot handle things like '/' or '.' or '..' here
                ensure!(
                    matches!(component, Component::Normal(_)),
                    "relative path must contain only standard path items, got {:?}",
                    component
                );

                component
                    .as_os_str()
                    .to_str()
                    .ok_or_else(|| anyhow!("cannot convert path component to string"))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        let key = itertools::join(components, "/");

        Ok(Self::from_string(key))
    }
}

// to allow searching archive entries directly by str key
impl Deref for ReportKey {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
impl Borrow<str> for ReportKey {
    fn borrow(&self) -> &str {
        self.inner.as_str()
    }
}
impl fmt::Display for ReportKey {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// Canonicalizes a reference found on the page `current_key` into a
/// [ReportKey] relative to the report root.
///
/// The reference is resolved against the directory of `current_key`
/// (filesystem style, `.` / `..` segments collapse) and then checked against
/// the report tree under `root`. Fails when resolution would escape `root` or
/// when the referenced file does not exist - the caller is expected to keep
/// the original reference unchanged in that case.
///
/// Read-only; never mutates the tree.
pub fn resolve_reference(
    root: &Path,
    current_key: &str,
    reference: &str,
) -> Result<ReportKey, Error> {
    // references resolve against the directory of the page they appear on
    let current_directory = match current_key.rsplit_once('/') {
        Some((directory, _file)) => directory,
        None => "",
    };

    let mut segments = Vec::<&str>::new();
    for segment in current_directory
        .split('/')
        .chain(reference.split('/'))
    {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.pop().is_none() {
                    bail!("reference {:?} escapes the report root", reference);
                }
            }
            segment => segments.push(segment),
        }
    }

    ensure!(
        !segments.is_empty(),
        "reference {:?} does not name a file",
        reference
    );
    let key = itertools::join(segments.iter(), "/");

    // the original reference may point at anything, including files outside
    // the report or plain external urls. only references naming an existing
    // file under the root are canonicalizable.
    let file_path = segments
        .iter()
        .fold(root.to_path_buf(), |path, segment| path.join(segment));
    ensure!(
        file_path.is_file(),
        "reference {:?} resolves to {:?}, which is not a file in the report",
        reference,
        key
    );

    Ok(ReportKey::from_string(key))
}
