// src/protocol/content.rs
// =============================================================================
// The page-scanning context.
//
// A PageSession owns all per-page state: the page itself, the link
// registry, the aggregate and the annotator. It runs as one task and reacts
// to events on its inbox one at a time, so nothing else ever touches that
// state and nothing needs a lock. Other contexts only get copies, through
// request/response messages.
//
// Per link the lifecycle only moves forward:
//   discovered -> validated -> probe_dispatched -> resolved
//   discovered -> rejected
//
// How it works:
// 1. load(): if the extension is enabled, scan the document and start
//    observing DOM mutations
// 2. Each mutation scans only the subtrees it added
// 3. Each probe reply is matched to its registry entry (then removed),
//    counted, and painted on the page
// 4. Unload ends the loop and hands the page back. So does every sender
//    going away: once no handle and no in-flight probe can reach the page,
//    nothing else will ever arrive
// =============================================================================

use std::ops::ControlFlow;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};
use url::Url;

use super::background::BackgroundHandle;
use super::message::{
    CheckLink, ExportReply, LinkCheckReply, PageEvent, PageSender, PopupRequest, PopupResponse,
    ScanProgress, POPUP_PORT,
};
use crate::checker;
use crate::error::ProtocolError;
use crate::page::{generate_csv, Annotator, LinkRegistry, Page, StatusAggregator, StatusSnapshot};

// Address of a running page session
//
// Everything the popup (or the "browser", for DOM mutations and unload)
// wants from the page goes through here
#[derive(Debug, Clone)]
pub struct PageHandle {
    tx: PageSender,
}

impl PageHandle {
    /// Sends a request and waits for the page's answer.
    pub async fn request(&self, request: PopupRequest) -> Result<PopupResponse, ProtocolError> {
        let (reply, rx) = oneshot::channel();
        self.send(PageEvent::Popup {
            request,
            reply: Some(reply),
        })?;
        rx.await.map_err(|_| ProtocolError::Disconnected)
    }

    /// Sends a request without waiting for anything back.
    pub fn notify(&self, request: PopupRequest) -> Result<(), ProtocolError> {
        self.send(PageEvent::Popup { request, reply: None })
    }

    /// Tells the page that these subtrees were added to its DOM.
    pub fn mutate(&self, added: Vec<String>) -> Result<(), ProtocolError> {
        self.send(PageEvent::DomMutation { added })
    }

    /// Navigates away: the session stops and returns its page.
    pub fn unload(&self) -> Result<(), ProtocolError> {
        self.send(PageEvent::Unload)
    }

    pub(crate) fn send(&self, event: PageEvent) -> Result<(), ProtocolError> {
        self.tx.send(event).map_err(|_| ProtocolError::Disconnected)
    }
}

#[derive(Debug)]
pub struct PageSession {
    page: Page,
    registry: LinkRegistry,
    aggregator: StatusAggregator,
    annotator: Annotator,
    background: BackgroundHandle,
    inbox: mpsc::UnboundedReceiver<PageEvent>,
    // Reply address for the background prober. Weak, so the session alone
    // never keeps its own inbox open
    reply_to: mpsc::WeakUnboundedSender<PageEvent>,
    observing: bool,
    discovered: u64,
    rejected: u64,
    resolved: u64,
}

impl PageSession {
    pub fn new(page: Page, background: BackgroundHandle) -> (Self, PageHandle) {
        let (tx, inbox) = mpsc::unbounded_channel();
        let session = Self {
            page,
            registry: LinkRegistry::new(),
            aggregator: StatusAggregator::new(),
            annotator: Annotator::new(),
            background,
            inbox,
            reply_to: tx.downgrade(),
            observing: false,
            discovered: 0,
            rejected: 0,
            resolved: 0,
        };
        (session, PageHandle { tx })
    }

    // Runs the "page fully loaded" step
    //
    // When the extension is disabled nothing is scanned and later DOM
    // mutations are ignored for the rest of this page load
    pub fn load(&mut self, enabled: bool) {
        if !enabled {
            info!(page = %self.page.url(), "extension disabled, not scanning");
            return;
        }

        info!(page = %self.page.url(), "page loaded, starting initial link processing");
        for subtree in 0..self.page.subtree_count() {
            self.scan_subtree(subtree);
        }
        self.observing = true;
    }

    /// Processes events until the page unloads, then returns the page.
    ///
    /// Dropping every `PageHandle` counts as an unload once the probes still
    /// in flight have answered. Probes in flight at an explicit unload are
    /// abandoned; their replies go nowhere.
    pub async fn run(mut self) -> Page {
        while let Some(event) = self.inbox.recv().await {
            if self.handle_event(event).is_break() {
                break;
            }
        }

        info!(page = %self.page.url(), pending = self.registry.pending(), "page unloaded");
        self.page
    }

    pub fn handle_event(&mut self, event: PageEvent) -> ControlFlow<()> {
        match event {
            PageEvent::LinkChecked(reply) => self.on_link_checked(reply),
            PageEvent::Popup { request, reply } => {
                let response = self.on_popup(request);
                if let Some(reply) = reply {
                    // The popup may have closed while waiting; that's fine
                    let _ = reply.send(response);
                }
            }
            PageEvent::DomMutation { added } => self.on_mutation(added),
            PageEvent::PortConnected { name } => debug!(port = %name, "port connected"),
            PageEvent::PortDisconnected { name } => {
                debug!(port = %name, "port disconnected");
                if name == POPUP_PORT {
                    self.annotator.clear(&mut self.page);
                }
            }
            PageEvent::Unload => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn snapshot(&self) -> StatusSnapshot {
        self.aggregator.snapshot()
    }

    pub fn progress(&self) -> ScanProgress {
        ScanProgress {
            observing: self.observing,
            discovered: self.discovered,
            rejected: self.rejected,
            resolved: self.resolved,
            pending: self.registry.pending() as u64,
        }
    }

    fn on_mutation(&mut self, added: Vec<String>) {
        for html in added {
            // The DOM changes whether or not anyone is watching
            let subtree = self.page.append_subtree(&html);
            if self.observing {
                self.scan_subtree(subtree);
            }
        }
    }

    // Finds the anchors of one subtree and sends every valid one off to be
    // probed. Identical URLs are not merged: each anchor is its own probe
    fn scan_subtree(&mut self, subtree: usize) {
        let Some(reply_to) = self.reply_to.upgrade() else {
            debug!(subtree, "page has no handles left, not scanning");
            return;
        };
        let base: Url = self.page.url().clone();
        let anchors: Vec<_> = self
            .page
            .anchors_in(subtree)
            .map(|(handle, anchor)| (handle, anchor.raw_href.clone()))
            .collect();

        for (handle, href) in anchors {
            self.discovered += 1;

            let url = match checker::validate_href(&base, &href) {
                Ok(url) => url,
                Err(e) => {
                    self.rejected += 1;
                    warn!(%href, error = %e, "skipping link");
                    continue;
                }
            };

            let link_id = self.registry.register(handle);
            debug!(%link_id, %url, "dispatching probe");

            let request = CheckLink {
                url: url.to_string(),
                link_id,
            };
            if let Err(e) = self.background.check_link(request.clone(), reply_to.clone()) {
                // No prober to answer, so answer ourselves rather than leave
                // the link pending forever
                warn!(link_id = %request.link_id, error = %e, "background prober unavailable");
                self.on_link_checked(LinkCheckReply::network_error(request));
            }
        }
    }

    fn on_link_checked(&mut self, reply: LinkCheckReply) {
        let Some(mut record) = self.registry.take(&reply.link_id) else {
            debug!(link_id = %reply.link_id, "reply for unknown link dropped");
            return;
        };

        let kind = reply.link_status_type.kind();
        record.resolved = Some(kind);

        self.aggregator.record(kind, &reply.url);
        self.annotator.annotate(&mut self.page, record.element, kind, reply.status);
        self.resolved += 1;

        debug!(link_id = %record.id, url = %reply.url, status = %kind, "link resolved");
    }

    fn on_popup(&mut self, request: PopupRequest) -> PopupResponse {
        match request {
            PopupRequest::GetStatusCounts => PopupResponse::Counts(self.aggregator.snapshot()),
            PopupRequest::ExportData => {
                let page_url = self.page.url().to_string();
                PopupResponse::Export(ExportReply {
                    csv_data: generate_csv(&page_url, &self.aggregator.snapshot()),
                    page_url,
                })
            }
            PopupRequest::HighlightLink { url, status } => {
                self.annotator.highlight(&mut self.page, &url, status);
                PopupResponse::Done
            }
            PopupRequest::ClearHighlight => {
                self.annotator.clear(&mut self.page);
                PopupResponse::Done
            }
            PopupRequest::GetScanProgress => PopupResponse::Progress(self.progress()),
        }
    }
}
