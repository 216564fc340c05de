// src/protocol/message.rs
// =============================================================================
// The message contract between the three contexts.
//
//   page  --checkLink-->        background  --LinkCheckReply--> page
//   popup --getStatusCounts-->  page        --StatusSnapshot--> popup
//   popup --exportData-->       page        --ExportReply-->    popup
//   popup --highlightLink-->    page        (no payload)
//   popup --clearHighlight-->   page        (no payload)
//   popup --getScanProgress-->  page        --ScanProgress-->   popup
//
// Messages are plain Rust values on tokio channels; the serde attributes pin
// down their JSON shape (camelCase fields, an `action` tag on requests) so
// they print the same way the extension's messages look.
// =============================================================================

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};

use crate::checker::{LinkStatusType, ProbeResult, StatusKind};
use crate::page::{LinkId, StatusSnapshot};

/// Name of the long-lived port the popup opens to the page.
pub const POPUP_PORT: &str = "popup";

/// Sender side of a page's inbox. This is what "the tab" is to the other
/// contexts: the address replies and requests are delivered to.
pub type PageSender = mpsc::UnboundedSender<PageEvent>;

// Request from the page to the background prober
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename = "checkLink", rename_all = "camelCase")]
pub struct CheckLink {
    pub url: String,
    pub link_id: LinkId,
}

// The background prober's answer to a CheckLink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCheckReply {
    pub url: String,
    pub link_id: LinkId,
    /// HTTP status, 0 when there is none
    pub status: u16,
    pub redirected: bool,
    pub link_status_type: LinkStatusType,
    pub is_broken: bool,
}

impl LinkCheckReply {
    pub fn from_probe(request: CheckLink, result: ProbeResult) -> Self {
        Self {
            url: request.url,
            link_id: request.link_id,
            status: result.http_status,
            redirected: result.redirected,
            link_status_type: result.status_type,
            is_broken: result.status_type.is_broken(),
        }
    }

    /// Answer for a URL that can't be probed at all.
    pub fn invalid(request: CheckLink) -> Self {
        Self::unreachable(request, LinkStatusType::InvalidUrl)
    }

    /// Answer for a URL whose probe never got a response.
    pub fn network_error(request: CheckLink) -> Self {
        Self::unreachable(request, LinkStatusType::NetworkError)
    }

    fn unreachable(request: CheckLink, status_type: LinkStatusType) -> Self {
        Self {
            url: request.url,
            link_id: request.link_id,
            status: 0,
            redirected: false,
            link_status_type: status_type,
            is_broken: status_type.is_broken(),
        }
    }
}

// Requests the popup sends to the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum PopupRequest {
    GetStatusCounts,
    ExportData,
    HighlightLink { url: String, status: StatusKind },
    ClearHighlight,
    GetScanProgress,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportReply {
    pub csv_data: String,
    pub page_url: String,
}

/// Where the page's scan stands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanProgress {
    /// Whether scanning started for this page load.
    pub observing: bool,
    /// Anchors looked at, valid or not.
    pub discovered: u64,
    /// Anchors turned away by the URL validator.
    pub rejected: u64,
    pub resolved: u64,
    /// Probes dispatched and not answered yet.
    pub pending: u64,
}

impl ScanProgress {
    /// True once every dispatched probe has come back.
    pub fn is_settled(&self) -> bool {
        self.pending == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PopupResponse {
    Counts(StatusSnapshot),
    Export(ExportReply),
    Progress(ScanProgress),
    /// Acknowledges a request that has no reply payload.
    Done,
}

/// Everything that can arrive in a page's inbox.
#[derive(Debug)]
pub enum PageEvent {
    /// A probe result from the background prober.
    LinkChecked(LinkCheckReply),
    /// A request from the popup; `reply` is None for fire-and-forget sends.
    Popup {
        request: PopupRequest,
        reply: Option<oneshot::Sender<PopupResponse>>,
    },
    /// Subtrees added to the DOM since the last notification.
    DomMutation { added: Vec<String> },
    PortConnected { name: String },
    PortDisconnected { name: String },
    /// The page is navigating away.
    Unload,
}
