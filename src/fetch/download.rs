// src/fetch/download.rs

use once_cell::sync::Lazy;
use regex::Regex;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{error, info};
use url::Url;

use super::{fetch_index, Row};
use crate::{
    config::Settings,
    error::Result,
    html::{find_in_document, find_tag, required_attr, TagQuery},
    http::CachedClient,
};

static PDF_A4_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r".+pdf-a4\.zip$").expect("archive pattern should compile"));

/// Local file name for an archive URL: its last path segment.
pub fn archive_file_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|name| !name.is_empty())
        .unwrap_or("download.zip")
        .to_string()
}

/// Absolute URL of the A4 PDF archive linked from the downloads page.
pub fn find_archive_url(client: &CachedClient, settings: &Settings) -> Result<Option<Url>> {
    let downloads_url = Url::parse(&settings.main_doc_url)?.join("download.html")?;
    let Some(doc) = fetch_index(client, downloads_url.as_str())? else {
        error!(url = %downloads_url, "could not load the downloads page");
        return Ok(None);
    };

    let main = find_in_document(&doc, &TagQuery::new("div").attr("role", "main"))?;
    let table = find_tag(main, &TagQuery::new("table").attr("class", "docutils"))?;
    let anchor = find_tag(table, &TagQuery::new("a").attr_matching("href", &PDF_A4_RE))?;
    Ok(Some(downloads_url.join(required_attr(anchor, "href")?)?))
}

/// Save `archive_url` under `downloads_dir`, returning the written path.
pub fn download_archive(
    client: &CachedClient,
    archive_url: &Url,
    downloads_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(downloads_dir)?;
    let archive_path = downloads_dir.join(archive_file_name(archive_url));
    let bytes = client.download_to(archive_url.as_str(), &archive_path)?;
    info!(path = %archive_path.display(), bytes, "archive downloaded and saved");
    Ok(archive_path)
}

/// Download the documentation archive. A failed archive transfer is logged
/// and swallowed; there is never anything to report.
pub fn download(client: &CachedClient, settings: &Settings) -> Result<Option<Vec<Row>>> {
    let Some(archive_url) = find_archive_url(client, settings)? else {
        return Ok(None);
    };

    if let Err(e) = download_archive(client, &archive_url, &settings.downloads_dir()) {
        error!(url = %archive_url, error = %e, "failed to download archive");
    }
    Ok(None)
}
