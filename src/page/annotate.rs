// src/page/annotate.rs
// =============================================================================
// Paints links on the page.
//
// Two jobs:
// - after a probe resolves, color the link and give it a tooltip
// - on request from the popup, outline one link and scroll to it
//
// Only one link is outlined at a time. The annotator remembers which one so
// it can take the outline off again.
// =============================================================================

use tracing::debug;

use super::document::{ElementHandle, Page};
use crate::checker::StatusKind;

#[derive(Debug, Default)]
pub struct Annotator {
    highlighted: Option<ElementHandle>,
}

impl Annotator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colors `element` for its resolved status and sets its title.
    pub fn annotate(
        &self,
        page: &mut Page,
        element: ElementHandle,
        kind: StatusKind,
        http_status: u16,
    ) {
        if let Some(anchor) = page.anchor_mut(element) {
            anchor.style.color = Some(kind.style().color);
            anchor.title = Some(kind.tooltip(http_status));
        }
    }

    // Outlines the first link whose href is exactly `url`
    //
    // Whatever was highlighted before loses its outline first, even when
    // no link matches the new URL
    pub fn highlight(
        &mut self,
        page: &mut Page,
        url: &str,
        kind: StatusKind,
    ) -> Option<ElementHandle> {
        self.clear(page);

        let target = page
            .anchors()
            .find(|(_, anchor)| anchor.href == url)
            .map(|(handle, _)| handle);

        let Some(handle) = target else {
            debug!(url, "no link to highlight");
            return None;
        };

        if let Some(anchor) = page.anchor_mut(handle) {
            anchor.style.outline = Some(kind.style().color);
        }
        page.scroll_into_view(handle);
        self.highlighted = Some(handle);
        Some(handle)
    }

    /// Removes the outline from the highlighted link, if there is one.
    pub fn clear(&mut self, page: &mut Page) {
        if let Some(handle) = self.highlighted.take() {
            if let Some(anchor) = page.anchor_mut(handle) {
                anchor.style.outline = None;
            }
        }
    }

    pub fn highlighted(&self) -> Option<ElementHandle> {
        self.highlighted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::Color;
    use url::Url;

    fn page() -> Page {
        Page::parse(
            Url::parse("https://example.com/").unwrap(),
            r#"
                <a href="https://a.test/">A</a>
                <a href="https://b.test/">B</a>
                <a href="https://a.test/">A again</a>
            "#,
        )
    }

    #[test]
    fn test_annotate_sets_color_and_title() {
        let mut page = page();
        let handle = ElementHandle { subtree: 0, index: 1 };
        Annotator::new().annotate(&mut page, handle, StatusKind::Broken, 404);

        let anchor = page.anchor(handle).unwrap();
        assert_eq!(anchor.style.color, Some(Color::Red));
        assert_eq!(anchor.title.as_deref(), Some("Broken Link (Status: 404)"));
    }

    #[test]
    fn test_highlight_picks_first_match_and_scrolls() {
        let mut page = page();
        let mut annotator = Annotator::new();

        let handle = annotator.highlight(&mut page, "https://a.test/", StatusKind::Ok).unwrap();

        assert_eq!(handle, ElementHandle { subtree: 0, index: 0 });
        assert_eq!(page.anchor(handle).unwrap().style.outline, Some(Color::Green));
        assert_eq!(page.scrolled_to(), Some(handle));
    }

    #[test]
    fn test_new_highlight_clears_previous() {
        let mut page = page();
        let mut annotator = Annotator::new();

        let a = annotator.highlight(&mut page, "https://a.test/", StatusKind::Ok).unwrap();
        let b = annotator.highlight(&mut page, "https://b.test/", StatusKind::Redirect).unwrap();

        assert_eq!(page.anchor(a).unwrap().style.outline, None);
        assert_eq!(page.anchor(b).unwrap().style.outline, Some(Color::Orange));
        let outlined = page.anchors().filter(|(_, x)| x.style.outline.is_some()).count();
        assert_eq!(outlined, 1);
    }

    #[test]
    fn test_highlight_without_match_still_clears() {
        let mut page = page();
        let mut annotator = Annotator::new();

        let a = annotator.highlight(&mut page, "https://a.test/", StatusKind::Ok).unwrap();
        assert!(annotator.highlight(&mut page, "https://nowhere.test/", StatusKind::Ok).is_none());

        assert_eq!(page.anchor(a).unwrap().style.outline, None);
        assert!(annotator.highlighted().is_none());
    }

    #[test]
    fn test_clear_keeps_status_color() {
        let mut page = page();
        let mut annotator = Annotator::new();
        let handle = ElementHandle { subtree: 0, index: 0 };

        annotator.annotate(&mut page, handle, StatusKind::Ok, 200);
        annotator.highlight(&mut page, "https://a.test/", StatusKind::Ok);
        annotator.clear(&mut page);

        let anchor = page.anchor(handle).unwrap();
        assert_eq!(anchor.style.outline, None);
        assert_eq!(anchor.style.color, Some(Color::Green));
    }
}
