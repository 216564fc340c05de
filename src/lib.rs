// src/lib.rs
// =============================================================================
// link-beacon: scan a page's links, probe each target, annotate every link
// by status and report the tally.
//
// Modules, leaf first:
// - checker: status kinds, URL validation, the HTTP probe, anchor extraction
// - page: the page and the state the scanning context keeps about it
// - protocol: the messages and the three contexts that exchange them
// - settings: the persisted on/off flag
// - error: error types shared by the above
// =============================================================================

pub mod checker;
pub mod error;
pub mod page;
pub mod protocol;
pub mod settings;
