// src/checker/mod.rs
// =============================================================================
// This module contains everything about a single link, independent of any
// page or context:
//
// Submodules:
// - status: the six status kinds and their presentation table
// - validate: which hrefs may be probed at all
// - http: the HEAD probe and its classification
// - html: finding anchors in markup
// =============================================================================

mod html;
mod http;
mod status;
mod validate;

pub use html::{extract_document_anchors, extract_fragment_anchors, RawAnchor};
pub use http::{classify, ProbeResult, Prober, ProberConfig};
pub use status::{Color, LinkStatusType, StatusKind, StatusStyle};
pub use validate::{is_probeable, parse_absolute, validate_href};
