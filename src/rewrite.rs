//! Link rewriter. Scans page markup for link-bearing elements and rewrites
//! their reference attributes into canonical archive keys, so that the pages
//! keep navigating correctly once they are served from inside the bundle.
//!
//! Markup is parsed into a proper element tree instead of being scanned with
//! regular expressions, so attribute order, quoting and escaping inside the
//! opening tag do not matter.

use crate::report_path::resolve_reference;
use anyhow::{Context, Error};
use html5ever::{
    Attribute, ParseOpts, parse_document,
    serialize::{SerializeOpts, serialize},
    tendril::TendrilSink,
};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::{cell::RefCell, path::Path};

/// Query-style marker prepended to rewritten anchor references. Anchors carry
/// it so that following them routes through the embedded navigation script
/// instead of requesting the original per-page file.
pub const NAVIGATION_PREFIX: &str = "?path=";

/// Rewrites all intra-report references of a single page.
///
/// Recognized element/attribute pairs are `a[href]` (rewritten with
/// [NAVIGATION_PREFIX]), `script[src]` and `link[href]` for stylesheet links
/// (both rewritten to the bare canonical key, since those are looked up
/// directly). A trailing `#fragment` is preserved verbatim, and references
/// that consist of a fragment only are left untouched so in-page anchors keep
/// native browser scrolling.
///
/// References that cannot be canonicalized (external urls, files missing from
/// the report, paths escaping the root) are kept exactly as the source wrote
/// them.
pub fn rewrite_links(
    markup: &str,
    page_key: &str,
    root: &Path,
) -> Result<String, Error> {
    let dom: RcDom = parse_document(RcDom::default(), ParseOpts::default())
        .from_utf8()
        .read_from(&mut markup.as_bytes())
        .context("parse page markup")?;

    rewrite_node(&dom.document, page_key, root);

    let mut rewritten = Vec::new();
    let document: SerializableHandle = dom.document.clone().into();
    serialize(&mut rewritten, &document, SerializeOpts::default())
        .context("serialize page markup")?;
    let rewritten = String::from_utf8(rewritten).context("serialized markup is not utf-8")?;

    Ok(rewritten)
}

fn rewrite_node(
    node: &Handle,
    page_key: &str,
    root: &Path,
) {
    if let NodeData::Element { name, attrs, .. } = &node.data {
        match name.local.as_ref() {
            "a" => rewrite_attribute(attrs, "href", NAVIGATION_PREFIX, page_key, root),
            "script" => rewrite_attribute(attrs, "src", "", page_key, root),
            "link" => {
                if is_stylesheet_link(&attrs.borrow()) {
                    rewrite_attribute(attrs, "href", "", page_key, root);
                }
            }
            _ => {}
        }
    }

    for child in node.children.borrow().iter() {
        rewrite_node(child, page_key, root);
    }
}

fn rewrite_attribute(
    attrs: &RefCell<Vec<Attribute>>,
    attribute: &str,
    prefix: &str,
    page_key: &str,
    root: &Path,
) {
    let mut attrs = attrs.borrow_mut();
    let attr = match attrs
        .iter_mut()
        .find(|attr| attr.name.local.as_ref() == attribute)
    {
        Some(attr) => attr,
        None => return,
    };

    let value = attr.value.to_string();
    let (path, fragment) = split_fragment(&value);

    // fragment-only references are in-page anchors, resolved natively
    if path.is_empty() {
        return;
    }

    match resolve_reference(root, page_key, path) {
        Ok(key) => {
            attr.value = format!("{}{}{}", prefix, key, fragment).as_str().into();
        }
        Err(error) => {
            // unresolvable references stay exactly as the source wrote them
            log::debug!(
                "keeping reference {:?} on {} unchanged: {:#}",
                value,
                page_key,
                error
            );
        }
    }
}

fn is_stylesheet_link(attrs: &[Attribute]) -> bool {
    attrs.iter().any(|attr| {
        attr.name.local.as_ref() == "rel"
            && attr
                .value
                .split_ascii_whitespace()
                .any(|token| token.eq_ignore_ascii_case("stylesheet"))
    })
}

/// Splits an attribute value into `(path, fragment)`, where the fragment is
/// any trailing `#...` portion including the `#` itself.
fn split_fragment(value: &str) -> (&str, &str) {
    match value.find('#') {
        Some(position) => value.split_at(position),
        None => (value, ""),
    }
}

#[cfg(test)]
mod test {
    use super::{rewrite_links, split_fragment};
    use std::fs;
    use tempfile::TempDir;
    use test_case::test_case;

    #[test_case("report/a.html", ("report/a.html", ""); "no fragment")]
    #[test_case("report/a.html#top", ("report/a.html", "#top"); "path with fragment")]
    #[test_case("#section1", ("", "#section1"); "fragment only")]
    #[test_case("", ("", ""); "empty value")]
    fn split_fragment_returns_expected(
        value: &str,
        expected: (&str, &str),
    ) {
        assert_eq!(split_fragment(value), expected);
    }

    fn report_root() -> TempDir {
        let root = tempfile::tempdir().unwrap();
        fs::create_dir_all(root.path().join("report")).unwrap();
        fs::write(root.path().join("index.html"), "index").unwrap();
        fs::write(root.path().join("styles.css"), "css").unwrap();
        fs::write(root.path().join("app.js"), "js").unwrap();
        fs::write(root.path().join("report").join("a.html"), "a").unwrap();
        root
    }

    fn page(body: &str) -> String {
        format!("<html><head></head><body>{}</body></html>", body)
    }

    #[test]
    fn anchor_reference_gets_navigation_prefix() {
        let root = report_root();
        let rewritten = rewrite_links(
            &page(r#"<a href="report/a.html">x</a>"#),
            "index.html",
            root.path(),
        )
        .unwrap();
        assert!(rewritten.contains(r#"href="?path=report/a.html""#));
    }

    #[test]
    fn anchor_fragment_is_preserved_after_key() {
        let root = report_root();
        let rewritten = rewrite_links(
            &page(r#"<a href="report/a.html#top">x</a>"#),
            "index.html",
            root.path(),
        )
        .unwrap();
        assert!(rewritten.contains(r#"href="?path=report/a.html#top""#));
    }

    #[test]
    fn pure_anchor_is_untouched() {
        let root = report_root();
        let rewritten = rewrite_links(
            &page(r#"<a href="#section1">x</a>"#),
            "index.html",
            root.path(),
        )
        .unwrap();
        assert!(rewritten.contains(r#"href="#section1""#));
    }

    #[test]
    fn script_source_is_rewritten_without_prefix() {
        let root = report_root();
        let rewritten = rewrite_links(
            &page(r#"<script src="../app.js"></script>"#),
            "report/a.html",
            root.path(),
        )
        .unwrap();
        assert!(rewritten.contains(r#"src="app.js""#));
    }

    #[test]
    fn stylesheet_link_is_rewritten_without_prefix() {
        let root = report_root();
        let markup = r#"<html><head><link rel="stylesheet" href="../styles.css"></head><body></body></html>"#;
        let rewritten = rewrite_links(markup, "report/a.html", root.path()).unwrap();
        assert!(rewritten.contains(r#"href="styles.css""#));
    }

    #[test]
    fn non_stylesheet_link_is_untouched() {
        let root = report_root();
        let markup =
            r#"<html><head><link rel="icon" href="../favicon.ico"></head><body></body></html>"#;
        let rewritten = rewrite_links(markup, "report/a.html", root.path()).unwrap();
        assert!(rewritten.contains(r#"href="../favicon.ico""#));
    }

    #[test]
    fn unresolvable_reference_is_kept_as_written() {
        let root = report_root();
        let rewritten = rewrite_links(
            &page(r#"<a href="missing.html">x</a>"#),
            "index.html",
            root.path(),
        )
        .unwrap();
        assert!(rewritten.contains(r#"href="missing.html""#));
    }

    #[test]
    fn external_url_passes_through_unchanged() {
        let root = report_root();
        let rewritten = rewrite_links(
            &page(r#"<a href="https://example.com/docs.html">x</a>"#),
            "index.html",
            root.path(),
        )
        .unwrap();
        assert!(rewritten.contains(r#"href="https://example.com/docs.html""#));
    }

    #[test]
    fn attribute_order_does_not_matter() {
        let root = report_root();
        let rewritten = rewrite_links(
            &page(r#"<a class="covered" href="report/a.html" id="l1">x</a>"#),
            "index.html",
            root.path(),
        )
        .unwrap();
        assert!(rewritten.contains(r#"href="?path=report/a.html""#));
        assert!(rewritten.contains(r#"class="covered""#));
        assert!(rewritten.contains(r#"id="l1""#));
    }

    #[test]
    fn unrelated_elements_are_untouched() {
        let root = report_root();
        let rewritten = rewrite_links(
            &page(r#"<img src="logo.png"><a href="report/a.html">x</a>"#),
            "index.html",
            root.path(),
        )
        .unwrap();
        assert!(rewritten.contains(r#"src="logo.png""#));
    }
}
