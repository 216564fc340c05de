// src/page/registry.rs
// =============================================================================
// Maps the ids we hand to the background prober back to anchor elements.
//
// Lifecycle of an entry:
//   register()  when a valid link is discovered
//   take()      when its probe result arrives; the entry is gone afterwards
//
// Because take() removes the entry, a second reply for the same id (or a
// reply for an id we never issued) finds nothing and is dropped by the
// caller. That is the whole of the replay protection.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use super::document::ElementHandle;
use crate::checker::StatusKind;

/// Opaque per-page link id, `link-0`, `link-1`, ...
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LinkId(String);

impl LinkId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LinkId {
    fn from(value: &str) -> Self {
        LinkId(value.to_string())
    }
}

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A discovered link waiting for (or just given) its status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRecord {
    pub id: LinkId,
    pub element: ElementHandle,
    pub resolved: Option<StatusKind>,
}

#[derive(Debug, Default)]
pub struct LinkRegistry {
    next_id: u64,
    records: HashMap<LinkId, LinkRecord>,
}

impl LinkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh id for `element` and remembers the association.
    pub fn register(&mut self, element: ElementHandle) -> LinkId {
        let id = LinkId(format!("link-{}", self.next_id));
        self.next_id += 1;

        self.records.insert(
            id.clone(),
            LinkRecord {
                id: id.clone(),
                element,
                resolved: None,
            },
        );
        id
    }

    /// Removes and returns the record for `id`, if it is still pending.
    pub fn take(&mut self, id: &LinkId) -> Option<LinkRecord> {
        self.records.remove(id)
    }

    /// Number of links dispatched but not yet resolved.
    pub fn pending(&self) -> usize {
        self.records.len()
    }

    /// Number of ids handed out so far.
    pub fn issued(&self) -> u64 {
        self.next_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handle(index: usize) -> ElementHandle {
        ElementHandle { subtree: 0, index }
    }

    #[test]
    fn test_ids_are_sequential_and_unique() {
        let mut registry = LinkRegistry::new();
        let a = registry.register(handle(0));
        let b = registry.register(handle(0));

        assert_eq!(a.as_str(), "link-0");
        assert_eq!(b.as_str(), "link-1");
        assert_eq!(registry.pending(), 2);
    }

    #[test]
    fn test_take_removes_exactly_once() {
        let mut registry = LinkRegistry::new();
        let id = registry.register(handle(3));

        let record = registry.take(&id).unwrap();
        assert_eq!(record.element, handle(3));
        assert!(registry.take(&id).is_none());
        assert_eq!(registry.pending(), 0);
    }

    #[test]
    fn test_unknown_id_is_ignored() {
        let mut registry = LinkRegistry::new();
        assert!(registry.take(&LinkId::from("link-99")).is_none());
    }

    #[test]
    fn test_ids_never_reused_after_take() {
        let mut registry = LinkRegistry::new();
        let first = registry.register(handle(0));
        registry.take(&first);
        let second = registry.register(handle(1));
        assert_ne!(first, second);
        assert_eq!(registry.issued(), 2);
    }
}
