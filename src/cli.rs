// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Three subcommands:
// - scan:   load a page, probe every link on it, show the popup view
// - toggle: turn the extension on or off for future page loads
// - status: show whether the extension is on
// =============================================================================

use clap::builder::TypedValueParser;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "link-beacon",
    version,
    about = "Scan a page's links, probe each one and report their status",
    long_about = "link-beacon loads a web page, sends one HEAD request per link and sorts every \
                  link into ok, redirect, broken, network error, invalid URL or unknown. \
                  Results can be printed as a table or JSON and exported as CSV."
)]
pub struct Cli {
    /// Settings file holding the on/off flag
    ///
    /// Defaults to link-beacon/storage.json in the user config directory
    #[arg(long, global = true)]
    pub storage: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan a page and report the status of every link on it
    ///
    /// Example: link-beacon scan https://example.com --export
    Scan(ScanArgs),

    /// Turn link scanning on or off for future page loads
    ///
    /// Example: link-beacon toggle off
    Toggle {
        #[arg(value_enum)]
        state: Toggle,
    },

    /// Show whether link scanning is on
    Status,
}

#[derive(clap::Args, Debug)]
pub struct ScanArgs {
    /// Page to scan: an http(s) URL or a local HTML file
    pub page: String,

    /// URL that relative links resolve against (defaults to the page URL)
    #[arg(long)]
    pub base_url: Option<String>,

    /// Output results in JSON format instead of a table
    #[arg(long)]
    pub json: bool,

    /// Write the results as CSV
    ///
    /// Without a value the file is named link-status-YYYY-MM-DD.csv
    #[arg(long, num_args = 0..=1, default_missing_value = "", value_parser = clap::builder::OsStringValueParser::new().map(PathBuf::from))]
    pub export: Option<PathBuf>,

    /// Per-probe timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Cap on probes running at once (default: no cap)
    #[arg(long)]
    pub max_in_flight: Option<usize>,

    /// How often to poll the page for progress, in milliseconds
    #[arg(long, default_value_t = 250)]
    pub poll_ms: u64,

    /// Also list every anchor with the style and title it ended up with
    #[arg(long)]
    pub show_annotations: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        matches!(self, Toggle::On)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scan_defaults() {
        let cli = Cli::parse_from(["link-beacon", "scan", "https://example.com"]);
        match cli.command {
            Commands::Scan(args) => {
                assert_eq!(args.page, "https://example.com");
                assert_eq!(args.timeout, 30);
                assert!(args.export.is_none());
                assert!(args.max_in_flight.is_none());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_export_without_value() {
        let cli = Cli::parse_from(["link-beacon", "scan", "page.html", "--export"]);
        match cli.command {
            Commands::Scan(args) => assert_eq!(args.export, Some(PathBuf::new())),
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_toggle_and_global_storage() {
        let cli = Cli::parse_from(["link-beacon", "toggle", "off", "--storage", "/tmp/s.json"]);
        assert_eq!(cli.storage, Some(PathBuf::from("/tmp/s.json")));
        match cli.command {
            Commands::Toggle { state } => assert!(!state.enabled()),
            other => panic!("unexpected command {:?}", other),
        }
    }
}
