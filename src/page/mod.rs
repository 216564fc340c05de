// src/page/mod.rs
// =============================================================================
// Everything the page-scanning context owns.
//
// Submodules:
// - document: the page's anchors and their inline style
// - load: getting the page in the first place
// - registry: link id -> anchor, for links waiting on a probe
// - aggregate: counts and URL lists per status kind
// - annotate: coloring and highlighting links
// - export: CSV output of the aggregate
// =============================================================================

mod aggregate;
mod annotate;
mod document;
mod export;
mod load;
mod registry;

pub use aggregate::{StatusAggregator, StatusCounts, StatusSnapshot, StatusUrlLists};
pub use annotate::Annotator;
pub use document::{Anchor, ElementHandle, ElementStyle, Page};
pub use export::{export_file_name, generate_csv, CSV_HEADER};
pub use load::load_page;
pub use registry::{LinkId, LinkRecord, LinkRegistry};
