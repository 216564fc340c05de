// src/checker/http.rs
// =============================================================================
// This module checks if a URL is alive by making one HTTP request.
//
// Key functionality:
// - Makes a single HTTP HEAD request (lightweight, no body download)
// - Follows redirects, and remembers whether any happened
// - Sorts the outcome into one status type
// - Never retries: one probe, one answer
//
// Classification, first match wins:
//   1. transport failure (DNS, refused, timeout)  -> network_error, status 0
//   2. opaque response reporting status 0          -> broken_inferred
//   3. a redirect happened on the way              -> redirect
//   4. final status >= 400                         -> broken
//   5. final status == 200                         -> ok
//   6. anything else                               -> unknown
//
// Rust concepts:
// - async/await: For network I/O
// - Clone on Client: reqwest::Client is a cheap handle to a shared pool
// =============================================================================

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::status::LinkStatusType;

/// Settings for the HTTP client used by every probe.
#[derive(Debug, Clone)]
pub struct ProberConfig {
    /// Per-request timeout. `None` leaves it to the client (no timeout).
    pub timeout: Option<Duration>,
    /// How many redirects to follow before giving up.
    pub max_redirects: usize,
    pub user_agent: String,
    /// Optional cap on probes running at the same time. `None` = unbounded.
    pub max_in_flight: Option<usize>,
}

impl Default for ProberConfig {
    fn default() -> Self {
        Self {
            timeout: Some(Duration::from_secs(30)),
            // Same limit browsers use for fetch()
            max_redirects: 20,
            user_agent: concat!("link-beacon/", env!("CARGO_PKG_VERSION")).to_string(),
            max_in_flight: None,
        }
    }
}

// Represents the result of probing a single link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// The URL that was probed
    pub url: String,
    /// Final HTTP status, 0 if none was received
    pub http_status: u16,
    /// Whether at least one redirect was followed
    pub redirected: bool,
    pub status_type: LinkStatusType,
}

// Issues reachability checks
//
// Holds one reqwest Client so every probe shares its connection pool
#[derive(Debug, Clone)]
pub struct Prober {
    client: Client,
}

impl Prober {
    pub fn new(config: &ProberConfig) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder()
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .user_agent(config.user_agent.clone());

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self { client: builder.build()? })
    }

    // Probes a single link
    //
    // This never fails: every outcome, including the request blowing up,
    // is turned into a ProbeResult
    pub async fn probe(&self, url: &Url) -> ProbeResult {
        match self.client.head(url.clone()).send().await {
            Ok(response) => {
                // reqwest already followed the redirects; if we ended up
                // somewhere other than where we started, there was one
                let redirected = response.url() != url;
                let http_status = response.status().as_u16();
                debug!(%url, http_status, redirected, "probe answered");

                ProbeResult {
                    url: url.to_string(),
                    http_status,
                    redirected,
                    status_type: classify(http_status, redirected),
                }
            }
            Err(e) => {
                debug!(%url, error = %e, "probe failed in transport");
                ProbeResult {
                    url: url.to_string(),
                    http_status: 0,
                    redirected: false,
                    status_type: LinkStatusType::NetworkError,
                }
            }
        }
    }
}

/// Classifies a response that did arrive.
///
/// A 0 status only shows up for opaque responses; reqwest never produces
/// those, but the rule is kept so the classification stays total.
pub fn classify(http_status: u16, redirected: bool) -> LinkStatusType {
    if http_status == 0 {
        LinkStatusType::BrokenInferred
    } else if redirected {
        LinkStatusType::Redirect
    } else if http_status >= 400 {
        LinkStatusType::Broken
    } else if http_status == 200 {
        LinkStatusType::Ok
    } else {
        LinkStatusType::Unknown
    }
}
