// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens for `scan`:
// 1. Read the on/off flag from the settings store
// 2. Load the page and start the three contexts:
//    - the background prober (one task, spawns a task per probe)
//    - the page session (owns registry, aggregate, annotations)
//    - the popup client (asks the page for copies of its state)
// 3. Poll the page until every probe has answered
// 4. Print the popup view, export CSV if asked, unload the page
// 5. Exit with proper code (0 = all fine, 1 = broken links, 2 = error)
// =============================================================================

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ScanArgs};
use link_beacon::checker::{Prober, ProberConfig, StatusKind};
use link_beacon::page::{self, Page, StatusCounts};
use link_beacon::protocol::{
    self, BackgroundProber, PageSession, PopupClient, PopupView, ScanProgress,
};
use link_beacon::settings::SettingsStore;

#[tokio::main]
async fn main() {
    init_tracing();

    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // If an unexpected error occurred, print it and exit with code 2
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Logs go to stderr so `--json` output on stdout stays parseable
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("link_beacon=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();
    let store = SettingsStore::open(cli.storage)?;

    match cli.command {
        Commands::Scan(args) => handle_scan(&store, args).await,
        Commands::Toggle { state } => {
            let settings = store.set_enabled(state.enabled()).await?;
            print_status_message(settings.extension_enabled, false);
            Ok(0)
        }
        Commands::Status => {
            let settings = store.load().await?;
            println!(
                "Extension is {} ({})",
                if settings.extension_enabled { "ON" } else { "OFF" },
                store.path().display()
            );
            Ok(0)
        }
    }
}

async fn handle_scan(store: &SettingsStore, args: ScanArgs) -> Result<i32> {
    scan(store, args, &mut std::io::stdout()).await
}

// Runs one scan and writes the report to `out`
//
// Only the report goes to `out`. Notices go to stderr, next to the logs,
// so that with --json the output is a single JSON document
async fn scan(store: &SettingsStore, args: ScanArgs, out: &mut impl Write) -> Result<i32> {
    let settings = store.load().await?;

    let config = ProberConfig {
        timeout: Some(Duration::from_secs(args.timeout)),
        max_in_flight: args.max_in_flight,
        ..ProberConfig::default()
    };
    let prober = Prober::new(&config).context("failed to build HTTP client")?;

    eprintln!("🔍 Loading page: {}", args.page);
    let client = reqwest::Client::new();
    let page = page::load_page(&client, &args.page, args.base_url.as_deref()).await?;

    let (background, background_task) = BackgroundProber::new(prober, config.max_in_flight).spawn();
    let (mut session, page_handle) = PageSession::new(page, background);
    session.load(settings.extension_enabled);
    let session_task = tokio::spawn(session.run());

    let mut popup = PopupClient::new(page_handle.clone());
    let port = popup.connect();

    let progress = wait_until_settled(&mut popup, Duration::from_millis(args.poll_ms)).await;
    let snapshot = popup.status_counts().await.unwrap_or_default();
    let view = PopupView::new(&snapshot, settings.extension_enabled);

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &view)?;
        writeln!(out)?;
    } else {
        write_view(out, &view, progress)?;
    }

    if let Some(path) = args.export {
        export_csv(&popup, path).await?;
    }

    // Closing the popup, then navigating away
    drop(port);
    page_handle.unload()?;
    let page = session_task.await.context("page session panicked")?;
    background_task.abort();

    if args.show_annotations && !args.json {
        write_annotations(out, &page)?;
    }

    Ok(exit_code(&snapshot.counts))
}

// 1 if any link is broken, unreachable or invalid; redirects and unknown
// statuses alone don't fail the scan
fn exit_code(counts: &StatusCounts) -> i32 {
    if counts.broken + counts.network_error + counts.invalid_url > 0 {
        1
    } else {
        0
    }
}

// Polls scan progress until no probe is pending
//
// Each time the counts change, a progress line is logged, the way the
// popup redraws on its refresh timer
async fn wait_until_settled(popup: &mut PopupClient, interval: Duration) -> ScanProgress {
    loop {
        if let Some(snapshot) = popup.poll_changes().await {
            info!(resolved = snapshot.counts.total(), "counts updated");
        }

        match popup.scan_progress().await {
            Some(progress) if progress.is_settled() => return progress,
            Some(_) => {}
            // Page gone; nothing more will arrive
            None => return ScanProgress::default(),
        }

        tokio::time::sleep(interval).await;
    }
}

async fn export_csv(popup: &PopupClient, path: PathBuf) -> Result<()> {
    let Some(export) = popup.export().await else {
        eprintln!("⚠️  Page did not answer the export request");
        return Ok(());
    };

    let path = if path.as_os_str().is_empty() {
        PathBuf::from(page::export_file_name(chrono::Utc::now()))
    } else {
        path
    };

    tokio::fs::write(&path, &export.csv_data)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    eprintln!("💾 Exported results for {} to {}", export.page_url, path.display());
    Ok(())
}

fn print_status_message(enabled: bool, has_data: bool) {
    if let Some(message) = protocol::status_message(enabled, has_data) {
        println!("{}", message.text);
    }
}

// Writes the popup view as a human-readable table
fn write_view(out: &mut impl Write, view: &PopupView, progress: ScanProgress) -> Result<()> {
    if let Some(message) = &view.message {
        writeln!(out, "{}", message.text)?;
        if !progress.observing {
            return Ok(());
        }
    }

    writeln!(out)?;
    writeln!(out, "{:<60} {:<15} {:<8}", "URL", "STATUS", "COLOR")?;
    writeln!(out, "{}", "=".repeat(85))?;

    for entry in &view.entries {
        // Truncate URL if too long for display
        let url_display = if entry.url.chars().count() > 57 {
            format!("{}...", entry.url.chars().take(57).collect::<String>())
        } else {
            entry.url.clone()
        };

        writeln!(
            out,
            "{:<60} {:<15} {:<8}",
            url_display,
            format_status(entry.kind),
            entry.kind.style().color
        )?;
    }

    writeln!(out)?;
    writeln!(out, "📊 Summary:")?;
    writeln!(out, "   ✅ OK: {}", view.ok)?;
    writeln!(out, "   🔀 Redirect: {}", view.redirect)?;
    writeln!(out, "   ❌ Broken: {}", view.broken)?;
    writeln!(out, "   ⚠️  Errors: {}", view.errors)?;
    writeln!(out, "   🚫 Skipped (not http/https): {}", progress.rejected)?;
    Ok(())
}

fn write_annotations(out: &mut impl Write, page: &Page) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "🖍️  Annotations on {}:", page.url())?;
    for (_, anchor) in page.anchors() {
        writeln!(
            out,
            "   {} [{}] {}",
            anchor.href,
            anchor.title.as_deref().unwrap_or("not probed"),
            anchor.style.to_css()
        )?;
    }
    Ok(())
}

// Formats the status kind with an emoji marker
fn format_status(kind: StatusKind) -> String {
    match kind {
        StatusKind::Ok => "✅ OK".to_string(),
        StatusKind::Redirect => "🔀 REDIRECT".to_string(),
        StatusKind::Broken => "❌ BROKEN".to_string(),
        StatusKind::NetworkError => "🌐 NETWORK".to_string(),
        StatusKind::InvalidUrl => "🚫 INVALID".to_string(),
        StatusKind::Unknown => "❔ UNKNOWN".to_string(),
    }
}
