// src/page/aggregate.rs
// =============================================================================
// Per-page tally of resolved links.
//
// For every status kind we keep a counter and the list of URLs that landed
// there, in the order they resolved. Both only ever grow, and they grow
// together: counts.get(k) == urls.get(k).len() for every kind k.
// =============================================================================

use serde::{Deserialize, Serialize};

use crate::checker::StatusKind;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub ok: u64,
    pub redirect: u64,
    pub broken: u64,
    pub network_error: u64,
    pub invalid_url: u64,
    pub unknown: u64,
}

impl StatusCounts {
    pub fn get(&self, kind: StatusKind) -> u64 {
        match kind {
            StatusKind::Ok => self.ok,
            StatusKind::Redirect => self.redirect,
            StatusKind::Broken => self.broken,
            StatusKind::NetworkError => self.network_error,
            StatusKind::InvalidUrl => self.invalid_url,
            StatusKind::Unknown => self.unknown,
        }
    }

    fn slot(&mut self, kind: StatusKind) -> &mut u64 {
        match kind {
            StatusKind::Ok => &mut self.ok,
            StatusKind::Redirect => &mut self.redirect,
            StatusKind::Broken => &mut self.broken,
            StatusKind::NetworkError => &mut self.network_error,
            StatusKind::InvalidUrl => &mut self.invalid_url,
            StatusKind::Unknown => &mut self.unknown,
        }
    }

    pub fn total(&self) -> u64 {
        StatusKind::ALL.iter().map(|&kind| self.get(kind)).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUrlLists {
    pub ok: Vec<String>,
    pub redirect: Vec<String>,
    pub broken: Vec<String>,
    pub network_error: Vec<String>,
    pub invalid_url: Vec<String>,
    pub unknown: Vec<String>,
}

impl StatusUrlLists {
    pub fn get(&self, kind: StatusKind) -> &[String] {
        match kind {
            StatusKind::Ok => &self.ok,
            StatusKind::Redirect => &self.redirect,
            StatusKind::Broken => &self.broken,
            StatusKind::NetworkError => &self.network_error,
            StatusKind::InvalidUrl => &self.invalid_url,
            StatusKind::Unknown => &self.unknown,
        }
    }

    fn list(&mut self, kind: StatusKind) -> &mut Vec<String> {
        match kind {
            StatusKind::Ok => &mut self.ok,
            StatusKind::Redirect => &mut self.redirect,
            StatusKind::Broken => &mut self.broken,
            StatusKind::NetworkError => &mut self.network_error,
            StatusKind::InvalidUrl => &mut self.invalid_url,
            StatusKind::Unknown => &mut self.unknown,
        }
    }

    /// Every (kind, url) pair, bucket by bucket in `StatusKind::ALL` order.
    pub fn iter(&self) -> impl Iterator<Item = (StatusKind, &str)> {
        StatusKind::ALL
            .into_iter()
            .flat_map(move |kind| self.get(kind).iter().map(move |url| (kind, url.as_str())))
    }
}

/// Copy of the aggregate handed out to the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub counts: StatusCounts,
    pub urls: StatusUrlLists,
}

#[derive(Debug, Default)]
pub struct StatusAggregator {
    counts: StatusCounts,
    urls: StatusUrlLists,
}

impl StatusAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts one resolved link.
    pub fn record(&mut self, kind: StatusKind, url: &str) {
        *self.counts.slot(kind) += 1;
        self.urls.list(kind).push(url.to_string());
    }

    pub fn counts(&self) -> &StatusCounts {
        &self.counts
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        StatusSnapshot {
            counts: self.counts.clone(),
            urls: self.urls.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_lists_stay_in_step() {
        let mut aggregator = StatusAggregator::new();
        aggregator.record(StatusKind::Ok, "https://a.test/");
        aggregator.record(StatusKind::Broken, "https://b.test/");
        aggregator.record(StatusKind::Ok, "https://c.test/");

        let snapshot = aggregator.snapshot();
        for kind in StatusKind::ALL {
            assert_eq!(snapshot.counts.get(kind), snapshot.urls.get(kind).len() as u64);
        }
        assert_eq!(snapshot.counts.total(), 3);
        assert_eq!(snapshot.urls.ok, vec!["https://a.test/", "https://c.test/"]);
    }

    #[test]
    fn test_snapshot_is_stable_without_new_results() {
        let mut aggregator = StatusAggregator::new();
        aggregator.record(StatusKind::Redirect, "https://a.test/");
        assert_eq!(aggregator.snapshot(), aggregator.snapshot());
    }

    #[test]
    fn test_iter_walks_buckets_in_order() {
        let mut aggregator = StatusAggregator::new();
        aggregator.record(StatusKind::Unknown, "https://u.test/");
        aggregator.record(StatusKind::Ok, "https://o.test/");

        let pairs: Vec<_> = aggregator
            .snapshot()
            .urls
            .iter()
            .map(|(k, u)| (k, u.to_string()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                (StatusKind::Ok, "https://o.test/".to_string()),
                (StatusKind::Unknown, "https://u.test/".to_string()),
            ]
        );
    }

    #[test]
    fn test_wire_shape_uses_kind_names() {
        let json = serde_json::to_value(StatusSnapshot::default()).unwrap();
        assert_eq!(json["counts"]["network_error"], 0);
        assert!(json["urls"]["invalid_url"].as_array().unwrap().is_empty());
    }
}
