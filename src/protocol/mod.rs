// src/protocol/mod.rs
// =============================================================================
// How the three contexts talk to each other.
//
// Submodules:
// - message: the message types and their JSON shape
// - background: the prober context, one task per checkLink
// - content: the page context that owns registry, aggregate and annotations
// - popup: the UI context, a client plus the view it renders
//
// Each context is a tokio task; they share nothing and only exchange
// messages over channels.
// =============================================================================

mod background;
mod content;
mod message;
mod popup;

pub use background::{BackgroundHandle, BackgroundProber, Envelope};
pub use content::{PageHandle, PageSession};
pub use message::{
    CheckLink, ExportReply, LinkCheckReply, PageEvent, PageSender, PopupRequest, PopupResponse,
    ScanProgress, POPUP_PORT,
};
pub use popup::{
    status_message, PopupClient, PopupEntry, PopupPort, PopupSection, PopupView, StatusMessage,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::{Color, Prober, ProberConfig, StatusKind};
    use crate::page::Page;
    use mockito::Server;
    use std::time::Duration;
    use url::Url;

    async fn settle(popup: &PopupClient) -> ScanProgress {
        for _ in 0..100 {
            if let Some(progress) = popup.scan_progress().await {
                if progress.is_settled() {
                    return progress;
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        panic!("scan never settled");
    }

    #[tokio::test]
    async fn test_full_scan_across_contexts() {
        let mut server = Server::new_async().await;
        let base = server.url();
        server.mock("HEAD", "/ok").with_status(200).create_async().await;
        server.mock("HEAD", "/missing").with_status(404).create_async().await;
        server
            .mock("HEAD", "/old")
            .with_status(301)
            .with_header("location", &format!("{}/ok", base))
            .create_async()
            .await;

        let html = r#"
                <a href="/ok">ok</a>
                <a href="/missing">missing</a>
                <a href="/old">old</a>
                <a href="http://127.0.0.1:1/">down</a>
                <a href="javascript:void(0)">js</a>
                <a href="mailto:someone@example.com">mail</a>
            "#;
        let page = Page::parse(Url::parse(&format!("{}/", base)).unwrap(), html);

        let prober = Prober::new(&ProberConfig::default()).unwrap();
        let (background, _background_task) = BackgroundProber::new(prober, None).spawn();
        let (mut session, handle) = PageSession::new(page, background);
        session.load(true);
        let session_task = tokio::spawn(session.run());

        let popup = PopupClient::new(handle.clone());
        let port = popup.connect();

        let progress = settle(&popup).await;
        assert_eq!(progress.discovered, 6);
        assert_eq!(progress.rejected, 2);
        assert_eq!(progress.resolved, 4);

        let snapshot = popup.status_counts().await.unwrap();
        assert_eq!(snapshot.counts.ok, 1);
        assert_eq!(snapshot.counts.broken, 1);
        assert_eq!(snapshot.counts.redirect, 1);
        assert_eq!(snapshot.counts.network_error, 1);
        assert_eq!(snapshot.counts.total(), progress.resolved);
        assert_eq!(popup.status_counts().await.unwrap(), snapshot);

        let export = popup.export().await.unwrap();
        assert_eq!(export.csv_data.lines().count(), 5);
        assert_eq!(export.page_url, format!("{}/", base));

        let missing = format!("{}/missing", base);
        popup.highlight(&missing, StatusKind::Broken);

        handle.unload().unwrap();
        let page = session_task.await.unwrap();
        drop(port);

        let colors: Vec<_> = page.anchors().map(|(_, a)| a.style.color).collect();
        assert_eq!(
            colors,
            vec![
                Some(Color::Green),
                Some(Color::Red),
                Some(Color::Orange),
                Some(Color::Red),
                None,
                None,
            ]
        );

        let (_, highlighted) = page.anchors().nth(1).unwrap();
        assert_eq!(highlighted.href, missing);
        assert_eq!(highlighted.style.outline, Some(Color::Red));
    }
}
