// src/checker/status.rs
// =============================================================================
// Status kinds a link can end up in, and the one table that maps each kind
// to how it is shown (color, label, description).
//
// There are two enums here:
// - LinkStatusType: what the prober reports on the wire. It has an extra
//   `broken_inferred` variant for "request succeeded but the response was
//   opaque and reported status 0".
// - StatusKind: the six buckets everything downstream counts and colors.
//   `broken_inferred` folds into `broken`.
//
// Rust concepts:
// - Exhaustive match: adding a variant forces every table below to be updated
// - serde rename_all: keeps the snake_case strings used on the wire
// =============================================================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the six buckets a resolved link is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Ok,
    Redirect,
    Broken,
    NetworkError,
    InvalidUrl,
    Unknown,
}

impl StatusKind {
    /// All kinds, in the order buckets are listed and exported.
    pub const ALL: [StatusKind; 6] = [
        StatusKind::Ok,
        StatusKind::Redirect,
        StatusKind::Broken,
        StatusKind::NetworkError,
        StatusKind::InvalidUrl,
        StatusKind::Unknown,
    ];

    /// The snake_case name used in messages and CSV rows.
    pub fn as_str(self) -> &'static str {
        match self {
            StatusKind::Ok => "ok",
            StatusKind::Redirect => "redirect",
            StatusKind::Broken => "broken",
            StatusKind::NetworkError => "network_error",
            StatusKind::InvalidUrl => "invalid_url",
            StatusKind::Unknown => "unknown",
        }
    }

    /// Looks up how this kind is presented.
    ///
    /// The annotator, the popup view and the CLI table all read from here,
    /// so a link and its row in the popup can never disagree on color.
    pub fn style(self) -> StatusStyle {
        match self {
            StatusKind::Ok => StatusStyle {
                color: Color::Green,
                label: "OK",
                description: "Link is working properly",
            },
            StatusKind::Redirect => StatusStyle {
                color: Color::Orange,
                label: "Redirect",
                description: "Link redirects to another URL",
            },
            StatusKind::Broken => StatusStyle {
                color: Color::Red,
                label: "Broken",
                description: "Link returns 4xx/5xx error",
            },
            StatusKind::NetworkError => StatusStyle {
                color: Color::Red,
                label: "Network Error",
                description: "Failed to connect",
            },
            StatusKind::InvalidUrl => StatusStyle {
                color: Color::Red,
                label: "Invalid URL",
                description: "Malformed URL",
            },
            StatusKind::Unknown => StatusStyle {
                color: Color::Gray,
                label: "Unknown",
                description: "Unable to determine status",
            },
        }
    }

    /// Tooltip put on an annotated link, e.g. `Broken Link (Status: 404)`.
    ///
    /// `http_status` is 0 when no status code is known; the broken and
    /// unknown templates then fall back to a word instead of printing 0.
    pub fn tooltip(self, http_status: u16) -> String {
        match self {
            StatusKind::Ok => format!("OK (Status: {})", http_status),
            StatusKind::Redirect => format!("Redirected (Status: {})", http_status),
            StatusKind::Broken => match http_status {
                0 => "Broken Link (Status: Error)".to_string(),
                code => format!("Broken Link (Status: {})", code),
            },
            StatusKind::NetworkError => "Network Error".to_string(),
            StatusKind::InvalidUrl => "Invalid URL".to_string(),
            StatusKind::Unknown => match http_status {
                0 => "Unknown Status (Status: Unknown)".to_string(),
                code => format!("Unknown Status (Status: {})", code),
            },
        }
    }
}

impl fmt::Display for StatusKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Presentation attributes for one status kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusStyle {
    pub color: Color,
    pub label: &'static str,
    pub description: &'static str,
}

/// The four colors links are painted with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    Green,
    Orange,
    Red,
    Gray,
}

impl Color {
    /// CSS color keyword.
    pub fn as_css(self) -> &'static str {
        match self {
            Color::Green => "green",
            Color::Orange => "orange",
            Color::Red => "red",
            Color::Gray => "gray",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_css())
    }
}

/// Status as reported by the background prober.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatusType {
    Ok,
    Redirect,
    Broken,
    /// Opaque response with status 0. Counted as broken even though some of
    /// these are cross-origin successes that simply cannot be inspected.
    BrokenInferred,
    NetworkError,
    InvalidUrl,
    Unknown,
}

impl LinkStatusType {
    /// The bucket this status is counted and colored as.
    pub fn kind(self) -> StatusKind {
        match self {
            LinkStatusType::Ok => StatusKind::Ok,
            LinkStatusType::Redirect => StatusKind::Redirect,
            LinkStatusType::Broken | LinkStatusType::BrokenInferred => StatusKind::Broken,
            LinkStatusType::NetworkError => StatusKind::NetworkError,
            LinkStatusType::InvalidUrl => StatusKind::InvalidUrl,
            LinkStatusType::Unknown => StatusKind::Unknown,
        }
    }

    /// Whether the link should be reported as broken (`isBroken` on the wire).
    pub fn is_broken(self) -> bool {
        matches!(
            self,
            LinkStatusType::Broken
                | LinkStatusType::BrokenInferred
                | LinkStatusType::NetworkError
                | LinkStatusType::InvalidUrl
        )
    }
}
