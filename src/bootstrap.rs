//! Bootstrap page assembler. Produces the single output page by replacing the
//! root page's body with the embedded archive payload and the navigation
//! script.

use anyhow::{Error, bail, ensure};
use base64::Engine;
use std::ops::Range;

/// Token standing in for the root page body between template creation and
/// final assembly. Chosen so it cannot occur in generated report markup.
const BODY_PLACEHOLDER: &str = "<!--coverage-bundler:body-->";

/// Name of the script variable carrying the base64 encoded archive. The
/// navigation script reads the payload from it.
const ARCHIVE_VARIABLE: &str = "bundledArchive";

/// Navigation script embedded into every bundle.
const NAVIGATION_SCRIPT: &str = include_str!("navigation.js");

/// Locates the body content span: text strictly between the first `<body...>`
/// tag and the last `</body>`.
fn body_span(markup: &str) -> Result<Range<usize>, Error> {
    let open_start = match markup.find("<body") {
        Some(position) => position,
        None => bail!("markup has no <body> tag"),
    };
    let open_end = match markup[open_start..].find('>') {
        Some(position) => open_start + position,
        None => bail!("markup has an unterminated <body> tag"),
    };
    let close = match markup.rfind("</body>") {
        Some(position) => position,
        None => bail!("markup has no </body> tag"),
    };
    ensure!(close > open_end, "markup has a malformed <body> tag pair");

    Ok(open_end + 1..close)
}

/// Returns the body content of the given markup.
pub fn body_content(markup: &str) -> Result<&str, Error> {
    let span = body_span(markup)?;

    Ok(&markup[span])
}

/// Produces the bootstrap template: the given root page markup with its body
/// content replaced by a single placeholder token. Everything outside the
/// body (doctype, head, stylesheet links) is preserved as written.
pub fn template_from_root_page(markup: &str) -> Result<String, Error> {
    let span = body_span(markup)?;

    let mut template =
        String::with_capacity(markup.len() - span.len() + BODY_PLACEHOLDER.len());
    template.push_str(&markup[..span.start]);
    template.push_str(BODY_PLACEHOLDER);
    template.push_str(&markup[span.end..]);

    Ok(template)
}

/// Splices the encoded archive payload and the navigation script into the
/// template, replacing the placeholder exactly once.
pub fn assemble(
    template: &str,
    archive: &[u8],
) -> Result<String, Error> {
    ensure!(
        template.matches(BODY_PLACEHOLDER).count() == 1,
        "template must contain the body placeholder exactly once"
    );

    let payload = base64::engine::general_purpose::STANDARD.encode(archive);

    let mut script = String::with_capacity(payload.len() + NAVIGATION_SCRIPT.len() + 128);
    script.push_str("<script type=\"text/javascript\">\nvar ");
    script.push_str(ARCHIVE_VARIABLE);
    script.push_str(" = \"");
    script.push_str(&payload);
    script.push_str("\";\n");
    script.push_str(NAVIGATION_SCRIPT);
    script.push_str("</script>");

    Ok(template.replacen(BODY_PLACEHOLDER, &script, 1))
}

#[cfg(test)]
mod test {
    use super::{BODY_PLACEHOLDER, assemble, body_content, template_from_root_page};
    use base64::Engine;
    use test_case::test_case;

    #[test_case(
        "<html><body>coverage</body></html>",
        "coverage";
        "plain body"
    )]
    #[test_case(
        "<html><body class=\"dashboard\">coverage</body></html>",
        "coverage";
        "body tag with attributes"
    )]
    #[test_case(
        "<html><body></body></html>",
        "";
        "empty body"
    )]
    #[test_case(
        "<html><body>a</body><body>b</body></html>",
        "a</body><body>b";
        "first opening and last closing tag delimit the span"
    )]
    fn body_content_returns_expected(
        markup: &str,
        expected: &str,
    ) {
        assert_eq!(body_content(markup).unwrap(), expected);
    }

    #[test_case("<html><p>no body here</p></html>"; "missing body tag")]
    #[test_case("<html><body>unterminated</html>"; "missing closing tag")]
    fn body_content_rejects_malformed_markup(markup: &str) {
        assert!(body_content(markup).is_err());
    }

    #[test]
    fn template_replaces_body_content_only() {
        let markup = "<html><head><title>t</title></head><body id=\"b\">coverage</body></html>";
        let template = template_from_root_page(markup).unwrap();
        assert_eq!(
            template,
            format!(
                "<html><head><title>t</title></head><body id=\"b\">{}</body></html>",
                BODY_PLACEHOLDER
            )
        );
    }

    #[test]
    fn assemble_embeds_payload_and_navigation_script() {
        let template = template_from_root_page("<html><body>x</body></html>").unwrap();
        let assembled = assemble(&template, b"archive-bytes").unwrap();

        let payload = base64::engine::general_purpose::STANDARD.encode(b"archive-bytes");
        assert!(assembled.contains(&payload));
        assert!(assembled.contains("var bundledArchive"));
        assert!(assembled.contains("DecompressionStream"));
        assert!(!assembled.contains(BODY_PLACEHOLDER));
    }

    #[test]
    fn assemble_requires_exactly_one_placeholder() {
        assert!(assemble("<html><body>no placeholder</body></html>", b"x").is_err());
    }
}
