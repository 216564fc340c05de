// src/page/document.rs
// =============================================================================
// The page being scanned.
//
// This stands in for the browser DOM. The page is made of subtrees: the
// document as first loaded is subtree 0, and every later DOM mutation
// appends another one. Subtrees never change once added, so an anchor can
// be addressed by (subtree, position) for the lifetime of the page.
//
// The only thing that changes on an anchor is its inline style and title,
// which is exactly what the annotator touches.
// =============================================================================

use url::Url;

use crate::checker::{self, Color, RawAnchor};

/// Reference to one anchor element in the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementHandle {
    pub subtree: usize,
    pub index: usize,
}

/// Inline style state the annotator can set on an anchor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ElementStyle {
    pub color: Option<Color>,
    /// Dashed outline color when the anchor is highlighted.
    pub outline: Option<Color>,
}

impl ElementStyle {
    /// Renders the style the way it would sit in a `style` attribute.
    pub fn to_css(&self) -> String {
        let mut parts = Vec::new();
        if let Some(color) = self.color {
            parts.push(format!("color: {} !important", color));
        }
        if let Some(outline) = self.outline {
            parts.push(format!("outline: 2px dashed {} !important", outline));
            parts.push("outline-offset: 2px !important".to_string());
        }
        parts.join("; ")
    }
}

/// One anchor element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    /// The href attribute as written in the markup.
    pub raw_href: String,
    /// What a browser reports as `link.href`: the href resolved against the
    /// page URL, or the raw value when it cannot be resolved.
    pub href: String,
    pub text: String,
    pub title: Option<String>,
    pub style: ElementStyle,
}

impl Anchor {
    fn new(base: &Url, raw: RawAnchor) -> Self {
        let href = base
            .join(raw.href.trim())
            .map(|url| url.to_string())
            .unwrap_or_else(|_| raw.href.clone());

        Self {
            raw_href: raw.href,
            href,
            text: raw.text,
            title: None,
            style: ElementStyle::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Page {
    url: Url,
    subtrees: Vec<Vec<Anchor>>,
    scrolled_to: Option<ElementHandle>,
}

impl Page {
    /// Parses a full document; its anchors become subtree 0.
    pub fn parse(url: Url, html: &str) -> Self {
        let anchors = checker::extract_document_anchors(html)
            .into_iter()
            .map(|raw| Anchor::new(&url, raw))
            .collect();

        Self {
            url,
            subtrees: vec![anchors],
            scrolled_to: None,
        }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Adds a subtree to the page, as a DOM mutation would. Returns its index.
    pub fn append_subtree(&mut self, html: &str) -> usize {
        let anchors = checker::extract_fragment_anchors(html)
            .into_iter()
            .map(|raw| Anchor::new(&self.url, raw))
            .collect();
        self.subtrees.push(anchors);
        self.subtrees.len() - 1
    }

    pub fn subtree_count(&self) -> usize {
        self.subtrees.len()
    }

    /// Anchors of one subtree, in document order.
    pub fn anchors_in(&self, subtree: usize) -> impl Iterator<Item = (ElementHandle, &Anchor)> {
        self.subtrees
            .get(subtree)
            .into_iter()
            .flat_map(move |anchors| {
                anchors
                    .iter()
                    .enumerate()
                    .map(move |(index, anchor)| (ElementHandle { subtree, index }, anchor))
            })
    }

    /// Every anchor on the page, in document order.
    pub fn anchors(&self) -> impl Iterator<Item = (ElementHandle, &Anchor)> {
        (0..self.subtrees.len()).flat_map(move |subtree| self.anchors_in(subtree))
    }

    pub fn anchor(&self, handle: ElementHandle) -> Option<&Anchor> {
        self.subtrees.get(handle.subtree)?.get(handle.index)
    }

    pub fn anchor_mut(&mut self, handle: ElementHandle) -> Option<&mut Anchor> {
        self.subtrees.get_mut(handle.subtree)?.get_mut(handle.index)
    }

    pub fn scroll_into_view(&mut self, handle: ElementHandle) {
        self.scrolled_to = Some(handle);
    }

    /// The anchor last scrolled into view, if any.
    pub fn scrolled_to(&self) -> Option<ElementHandle> {
        self.scrolled_to
    }
}
