// src/protocol/popup.rs
// =============================================================================
// The UI context.
//
// PopupClient talks to a page over request/response messages. It never
// touches page state; it only ever holds copies. If the page does not
// answer (gone, or just slow) the client gives back None and the UI shows
// whatever it showed before.
//
// PopupView turns a snapshot into what the popup displays: four tiles
// (ok, redirect, broken, and "errors" which lumps network errors, invalid
// URLs and unknowns together), the URL lists behind them, and the status
// message at the top.
// =============================================================================

use serde::Serialize;
use std::time::Duration;
use tokio::time::timeout;
use tracing::debug;

use super::content::PageHandle;
use super::message::{ExportReply, PageEvent, PopupRequest, PopupResponse, ScanProgress, POPUP_PORT};
use crate::checker::{Color, StatusKind};
use crate::error::ProtocolError;
use crate::page::StatusSnapshot;

/// How long the popup waits for the page before giving up on a request.
pub const DEFAULT_REPLY_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug)]
pub struct PopupClient {
    page: PageHandle,
    reply_timeout: Duration,
    last_seen: Option<StatusSnapshot>,
}

impl PopupClient {
    pub fn new(page: PageHandle) -> Self {
        Self {
            page,
            reply_timeout: DEFAULT_REPLY_TIMEOUT,
            last_seen: None,
        }
    }

    pub fn with_reply_timeout(mut self, reply_timeout: Duration) -> Self {
        self.reply_timeout = reply_timeout;
        self
    }

    /// Current counts and URL lists, or None if the page didn't answer.
    pub async fn status_counts(&self) -> Option<StatusSnapshot> {
        match self.ask(PopupRequest::GetStatusCounts).await? {
            PopupResponse::Counts(snapshot) => Some(snapshot),
            _ => None,
        }
    }

    // Polls the page and returns the snapshot only if it changed since the
    // last call that returned one
    //
    // This is what a periodic refresh uses so it doesn't redraw for nothing
    pub async fn poll_changes(&mut self) -> Option<StatusSnapshot> {
        let snapshot = self.status_counts().await?;
        if self.last_seen.as_ref() == Some(&snapshot) {
            return None;
        }
        self.last_seen = Some(snapshot.clone());
        Some(snapshot)
    }

    pub async fn export(&self) -> Option<ExportReply> {
        match self.ask(PopupRequest::ExportData).await? {
            PopupResponse::Export(export) => Some(export),
            _ => None,
        }
    }

    pub async fn scan_progress(&self) -> Option<ScanProgress> {
        match self.ask(PopupRequest::GetScanProgress).await? {
            PopupResponse::Progress(progress) => Some(progress),
            _ => None,
        }
    }

    /// Outlines the first link to `url` on the page.
    pub fn highlight(&self, url: &str, kind: StatusKind) {
        self.tell(PopupRequest::HighlightLink {
            url: url.to_string(),
            status: kind,
        });
    }

    pub fn clear_highlight(&self) {
        self.tell(PopupRequest::ClearHighlight);
    }

    /// Opens the long-lived popup port. Dropping it clears any highlight.
    pub fn connect(&self) -> PopupPort {
        PopupPort::open(self.page.clone(), POPUP_PORT)
    }

    async fn ask(&self, request: PopupRequest) -> Option<PopupResponse> {
        let result = match timeout(self.reply_timeout, self.page.request(request)).await {
            Ok(result) => result,
            Err(_) => Err(ProtocolError::Timeout),
        };

        result
            .map_err(|e| debug!(error = %e, "page did not answer"))
            .ok()
    }

    fn tell(&self, request: PopupRequest) {
        if let Err(e) = self.page.notify(request) {
            debug!(error = %e, "page did not take the request");
        }
    }
}

// A named connection to the page that lives as long as this value
//
// The page learns about the disconnect when the port is dropped
#[derive(Debug)]
pub struct PopupPort {
    page: PageHandle,
    name: String,
}

impl PopupPort {
    fn open(page: PageHandle, name: &str) -> Self {
        let _ = page.send(PageEvent::PortConnected { name: name.to_string() });
        Self {
            page,
            name: name.to_string(),
        }
    }
}

impl Drop for PopupPort {
    fn drop(&mut self) {
        let _ = self.page.send(PageEvent::PortDisconnected {
            name: std::mem::take(&mut self.name),
        });
    }
}

/// The four tiles of the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PopupSection {
    Ok,
    Redirect,
    Broken,
    Errors,
}

impl PopupSection {
    pub fn of(kind: StatusKind) -> Self {
        match kind {
            StatusKind::Ok => PopupSection::Ok,
            StatusKind::Redirect => PopupSection::Redirect,
            StatusKind::Broken => PopupSection::Broken,
            StatusKind::NetworkError | StatusKind::InvalidUrl | StatusKind::Unknown => {
                PopupSection::Errors
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupEntry {
    pub section: PopupSection,
    pub kind: StatusKind,
    pub url: String,
    /// Hover text, e.g. `Status: Broken - Link returns 4xx/5xx error`.
    pub tooltip: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusMessage {
    pub text: &'static str,
    /// Green when on, red when off.
    pub tone: Color,
}

/// Shown on top of the popup when there is nothing else to show.
pub fn status_message(enabled: bool, has_data: bool) -> Option<StatusMessage> {
    match (enabled, has_data) {
        (true, true) => None,
        (true, false) => Some(StatusMessage {
            text: "Extension is ON - Refresh page to collect data",
            tone: Color::Green,
        }),
        (false, _) => Some(StatusMessage {
            text: "Extension is OFF - No data will be collected",
            tone: Color::Red,
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PopupView {
    pub ok: u64,
    pub redirect: u64,
    pub broken: u64,
    pub errors: u64,
    pub entries: Vec<PopupEntry>,
    pub message: Option<StatusMessage>,
}

impl PopupView {
    pub fn new(snapshot: &StatusSnapshot, enabled: bool) -> Self {
        let counts = &snapshot.counts;
        let entries = snapshot
            .urls
            .iter()
            .map(|(kind, url)| {
                let style = kind.style();
                PopupEntry {
                    section: PopupSection::of(kind),
                    kind,
                    url: url.to_string(),
                    tooltip: format!("Status: {} - {}", style.label, style.description),
                }
            })
            .collect();

        Self {
            ok: counts.ok,
            redirect: counts.redirect,
            broken: counts.broken,
            errors: counts.network_error + counts.invalid_url + counts.unknown,
            entries,
            message: status_message(enabled, counts.total() > 0),
        }
    }

    /// Entries listed under one tile.
    pub fn section(&self, section: PopupSection) -> impl Iterator<Item = &PopupEntry> {
        self.entries.iter().filter(move |entry| entry.section == section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Page, StatusAggregator};
    use crate::protocol::background::BackgroundHandle;
    use crate::protocol::content::PageSession;
    use tokio::sync::mpsc;
    use url::Url;

    fn snapshot() -> StatusSnapshot {
        let mut aggregator = StatusAggregator::new();
        aggregator.record(StatusKind::Ok, "https://ok.test/");
        aggregator.record(StatusKind::NetworkError, "https://down.test/");
        aggregator.record(StatusKind::Unknown, "https://odd.test/");
        aggregator.record(StatusKind::InvalidUrl, "https://bad.test/");
        aggregator.snapshot()
    }

    #[test]
    fn test_errors_tile_lumps_three_kinds() {
        let view = PopupView::new(&snapshot(), true);

        assert_eq!(view.ok, 1);
        assert_eq!(view.broken, 0);
        assert_eq!(view.errors, 3);

        let urls: Vec<_> = view.section(PopupSection::Errors).map(|e| e.url.as_str()).collect();
        assert_eq!(urls, vec!["https://down.test/", "https://bad.test/", "https://odd.test/"]);
        assert!(view.message.is_none());
    }

    #[test]
    fn test_entry_tooltips() {
        let view = PopupView::new(&snapshot(), true);
        let ok = view.section(PopupSection::Ok).next().unwrap();
        assert_eq!(ok.tooltip, "Status: OK - Link is working properly");
    }

    #[test]
    fn test_status_messages() {
        assert!(status_message(true, true).is_none());
        assert_eq!(
            status_message(true, false).unwrap().text,
            "Extension is ON - Refresh page to collect data"
        );
        assert_eq!(
            status_message(false, true).unwrap().text,
            "Extension is OFF - No data will be collected"
        );
    }

    fn running_page(html: &str) -> PageHandle {
        // The background receiver is dropped, so links resolve immediately
        // as network errors
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let page = Page::parse(Url::parse("https://example.com/").unwrap(), html);
        let (mut session, handle) = PageSession::new(page, BackgroundHandle::from_sender(tx));
        session.load(true);
        tokio::spawn(session.run());
        handle
    }

    #[tokio::test]
    async fn test_poll_changes_only_reports_new_data() {
        let handle = running_page(r#"<a href="https://a.test/">a</a>"#);
        let mut popup = PopupClient::new(handle.clone());

        let first = popup.poll_changes().await.unwrap();
        assert_eq!(first.counts.network_error, 1);
        assert!(popup.poll_changes().await.is_none());

        handle.mutate(vec![r#"<a href="https://b.test/">b</a>"#.to_string()]).unwrap();
        let second = popup.poll_changes().await.unwrap();
        assert_eq!(second.counts.network_error, 2);
    }

    #[tokio::test]
    async fn test_gone_page_yields_none() {
        let handle = running_page("");
        let popup = PopupClient::new(handle.clone()).with_reply_timeout(Duration::from_millis(200));

        handle.unload().unwrap();
        // Give the session a moment to stop
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(popup.status_counts().await.is_none());
        assert!(popup.export().await.is_none());
    }

    #[tokio::test]
    async fn test_dropping_port_clears_highlight() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let page = Page::parse(
            Url::parse("https://example.com/").unwrap(),
            r#"<a href="https://a.test/">a</a>"#,
        );
        let (session, handle) = PageSession::new(page, BackgroundHandle::from_sender(tx));
        let task = tokio::spawn(session.run());

        let popup = PopupClient::new(handle.clone());
        let port = popup.connect();
        popup.highlight("https://a.test/", StatusKind::Broken);
        drop(port);

        handle.unload().unwrap();
        let page = task.await.unwrap();
        let (_, anchor) = page.anchors().next().unwrap();
        assert_eq!(anchor.style.outline, None);
        assert_eq!(page.scrolled_to().map(|h| h.index), Some(0));
    }
}
