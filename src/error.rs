// src/error.rs
// =============================================================================
// Error types shared across modules.
//
// A link that turns out broken is NOT an error here: it is a status kind.
// These types cover things that stop an operation from happening at all
// (a page that cannot be loaded, a settings file that cannot be written,
// a context that went away).
// =============================================================================

use thiserror::Error;

/// Why an href was rejected before any probe was sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("malformed URL '{href}': {reason}")]
    Malformed { href: String, reason: String },

    #[error("unsupported scheme '{scheme}' in '{href}'")]
    UnsupportedScheme { href: String, scheme: String },
}

/// Failures while loading the page to scan.
#[derive(Debug, Error)]
pub enum PageError {
    #[error("invalid page URL '{0}'")]
    InvalidUrl(String),

    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("fetching {url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Failures reading or writing the persisted settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file {path} is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no config directory available; pass --storage")]
    NoConfigDir,
}

/// Failures talking to another context over a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ProtocolError {
    #[error("the receiving context is gone")]
    Disconnected,

    #[error("no reply before the timeout")]
    Timeout,
}
