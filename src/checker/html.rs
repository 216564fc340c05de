// src/checker/html.rs
// =============================================================================
// This module finds anchors in HTML.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Two entry points:
// - a whole document (the page as first loaded)
// - a fragment (a subtree that was added to the page later)
//
// Either way we only report what is there: raw href plus link text. Deciding
// whether an href is probeable is validate.rs's job.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

// "a[href]" means "all <a> tags that have an href attribute"
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("static selector is valid"));

/// An anchor as found in the markup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawAnchor {
    /// The href attribute exactly as written.
    pub href: String,
    /// Visible text, whitespace collapsed.
    pub text: String,
}

// Extracts every anchor from a full HTML document, in document order
pub fn extract_document_anchors(html: &str) -> Vec<RawAnchor> {
    let document = Html::parse_document(html);
    collect(document.select(&ANCHOR_SELECTOR))
}

// Extracts every anchor from an HTML fragment (a newly added subtree)
//
// If the fragment's root is itself an anchor it is included; select() walks
// the root element as well as its descendants
pub fn extract_fragment_anchors(html: &str) -> Vec<RawAnchor> {
    let fragment = Html::parse_fragment(html);
    collect(fragment.select(&ANCHOR_SELECTOR))
}

fn collect<'a>(elements: impl Iterator<Item = ElementRef<'a>>) -> Vec<RawAnchor> {
    elements
        .filter_map(|element| {
            let href = element.value().attr("href")?;
            let text = element.text().collect::<String>();
            Some(RawAnchor {
                href: href.to_string(),
                text: text.split_whitespace().collect::<Vec<_>>().join(" "),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_keeps_raw_href() {
        let html = r#"<a href="/docs">Docs</a>"#;
        let anchors = extract_document_anchors(html);
        assert_eq!(
            anchors,
            vec![RawAnchor { href: "/docs".to_string(), text: "Docs".to_string() }]
        );
    }

    #[test]
    fn test_anchor_without_href_is_ignored() {
        let html = r#"<a name="top">Top</a><a href="https://rust-lang.org">Rust</a>"#;
        let anchors = extract_document_anchors(html);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].href, "https://rust-lang.org");
    }

    #[test]
    fn test_multiple_links_in_order() {
        let html = r#"
            <a href="https://rust-lang.org">Rust</a>
            <p><a href="/docs">Docs</a></p>
            <a href="mailto:test@example.com">Email</a>
        "#;
        let hrefs: Vec<_> = extract_document_anchors(html)
            .into_iter()
            .map(|a| a.href)
            .collect();
        assert_eq!(hrefs, vec!["https://rust-lang.org", "/docs", "mailto:test@example.com"]);
    }

    #[test]
    fn test_fragment_root_anchor_is_included() {
        let anchors = extract_fragment_anchors(r#"<a href="/new">New <b>link</b></a>"#);
        assert_eq!(anchors.len(), 1);
        assert_eq!(anchors[0].text, "New link");
    }
}
