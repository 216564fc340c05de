// src/protocol/background.rs
// =============================================================================
// The background prober: receives checkLink requests from any page and
// answers each one on that page's inbox.
//
// Every request becomes its own spawned task. Nothing waits on those tasks
// and nothing orders them, so replies arrive in whatever order the network
// finishes them. One probe failing has no effect on the others.
//
// By default there is no limit on how many probes run at once. An optional
// cap (a semaphore) can be set; requests over the cap wait for a permit
// inside their own task, so the receive loop itself never blocks.
// =============================================================================

use std::sync::Arc;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::message::{CheckLink, LinkCheckReply, PageEvent, PageSender};
use crate::checker::{self, Prober};
use crate::error::ProtocolError;

/// A checkLink request plus the inbox of the page that sent it.
#[derive(Debug)]
pub struct Envelope {
    pub request: CheckLink,
    pub reply_to: PageSender,
}

// Cheap, cloneable address of the background prober
#[derive(Debug, Clone)]
pub struct BackgroundHandle {
    tx: mpsc::UnboundedSender<Envelope>,
}

impl BackgroundHandle {
    pub(crate) fn from_sender(tx: mpsc::UnboundedSender<Envelope>) -> Self {
        Self { tx }
    }

    /// Sends a checkLink. Returns as soon as the request is queued.
    pub fn check_link(
        &self,
        request: CheckLink,
        reply_to: PageSender,
    ) -> Result<(), ProtocolError> {
        self.tx
            .send(Envelope { request, reply_to })
            .map_err(|_| ProtocolError::Disconnected)
    }
}

#[derive(Debug)]
pub struct BackgroundProber {
    prober: Prober,
    limit: Option<Arc<Semaphore>>,
}

impl BackgroundProber {
    pub fn new(prober: Prober, max_in_flight: Option<usize>) -> Self {
        Self {
            prober,
            limit: max_in_flight.map(|n| Arc::new(Semaphore::new(n.max(1)))),
        }
    }

    /// Starts the receive loop. It ends once every handle has been dropped.
    pub fn spawn(self) -> (BackgroundHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (BackgroundHandle::from_sender(tx), task)
    }

    async fn run(self, mut rx: mpsc::UnboundedReceiver<Envelope>) {
        let max_in_flight = self.limit.as_ref().map(|s| s.available_permits());
        info!(?max_in_flight, "background prober started");

        while let Some(envelope) = rx.recv().await {
            self.dispatch(envelope);
        }

        info!("background prober stopped");
    }

    fn dispatch(&self, envelope: Envelope) {
        let Envelope { request, reply_to } = envelope;

        // Pages validate before sending, but don't trust that blindly
        let url = match checker::parse_absolute(&request.url) {
            Ok(url) => url,
            Err(e) => {
                warn!(link_id = %request.link_id, error = %e, "refusing to probe");
                deliver(&reply_to, LinkCheckReply::invalid(request));
                return;
            }
        };

        let prober = self.prober.clone();
        let limit = self.limit.clone();

        tokio::spawn(async move {
            // Held for the duration of the probe; None when unbounded
            let _permit = match limit {
                Some(semaphore) => semaphore.acquire_owned().await.ok(),
                None => None,
            };

            let result = prober.probe(&url).await;
            deliver(&reply_to, LinkCheckReply::from_probe(request, result));
        });
    }
}

fn deliver(reply_to: &PageSender, reply: LinkCheckReply) {
    let link_id = reply.link_id.clone();
    if reply_to.send(PageEvent::LinkChecked(reply)).is_err() {
        // The page went away while we were probing
        debug!(%link_id, "page gone, reply dropped");
    }
}
