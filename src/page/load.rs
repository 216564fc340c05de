// src/page/load.rs
// =============================================================================
// Loads the page to scan: either over HTTP or from a local HTML file.
//
// A local file gets a file:// page URL unless a base URL is supplied, which
// means its relative links resolve to file:// and are rejected, just as they
// would be in a browser tab showing that file.
// =============================================================================

use reqwest::Client;
use std::path::Path;
use tracing::info;
use url::Url;

use super::document::Page;
use crate::error::PageError;

// Loads a page from an http(s) URL or a file path
//
// Parameters:
//   client: HTTP client used for remote pages
//   source: "https://..." or a path to an .html file
//   base_url: optional override for the URL links resolve against
pub async fn load_page(
    client: &Client,
    source: &str,
    base_url: Option<&str>,
) -> Result<Page, PageError> {
    let base_override = base_url
        .map(|base| Url::parse(base).map_err(|_| PageError::InvalidUrl(base.to_string())))
        .transpose()?;

    let (url, html) = match Url::parse(source) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => {
            let html = fetch_page(client, &url).await?;
            (url, html)
        }
        _ => read_file(source).await?,
    };

    let url = base_override.unwrap_or(url);
    info!(page = %url, bytes = html.len(), "page loaded");
    Ok(Page::parse(url, &html))
}

// Fetches a web page and returns its HTML content
async fn fetch_page(client: &Client, url: &Url) -> Result<String, PageError> {
    let fetch_error = |source| PageError::Fetch {
        url: url.to_string(),
        source,
    };

    let response = client.get(url.clone()).send().await.map_err(fetch_error)?;

    if !response.status().is_success() {
        return Err(PageError::Status {
            url: url.to_string(),
            status: response.status().as_u16(),
        });
    }

    response.text().await.map_err(fetch_error)
}

async fn read_file(source: &str) -> Result<(Url, String), PageError> {
    let read_error = |source_err| PageError::Read {
        path: source.to_string(),
        source: source_err,
    };

    let path = tokio::fs::canonicalize(Path::new(source)).await.map_err(read_error)?;
    let html = tokio::fs::read_to_string(&path).await.map_err(read_error)?;
    let url = Url::from_file_path(&path).map_err(|_| PageError::InvalidUrl(source.to_string()))?;
    Ok((url, html))
}
