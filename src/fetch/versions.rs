// src/fetch/versions.rs

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::ElementRef;
use tracing::{error, info};

use super::{fetch_index, row, Row};
use crate::{
    config::Settings,
    error::{ParserError, Result},
    html::{find_all, find_in_document, required_attr, text_of, TagQuery},
    http::CachedClient,
};

pub const HEADER: [&str; 3] = ["Documentation link", "Version", "Status"];

static VERSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"Python (?P<version>\d\.\d+) \((?P<status>.*)\)")
        .expect("version pattern should compile")
});

/// Split an anchor label like `Python 3.12 (stable)` into version and status.
/// Labels that don't fit come back whole with an empty status.
pub fn parse_version_label(label: &str) -> (String, String) {
    match VERSION_RE.captures(label) {
        Some(caps) => (caps["version"].to_string(), caps["status"].to_string()),
        None => (label.to_string(), String::new()),
    }
}

/// The documentation links listed under "All versions" in the sidebar.
pub fn latest_versions(client: &CachedClient, settings: &Settings) -> Result<Option<Vec<Row>>> {
    let url = settings.main_doc_url.as_str();
    let Some(doc) = fetch_index(client, url)? else {
        error!(%url, "could not load the main documentation page");
        return Ok(None);
    };

    let sidebar = find_in_document(
        &doc,
        &TagQuery::new("div").attr("class", "sphinxsidebarwrapper"),
    )?;
    let anchors = versions_list(sidebar)?;

    let mut results = vec![row(HEADER)];
    for a in anchors {
        let link = required_attr(a, "href")?;
        let (version, status) = parse_version_label(&text_of(a));
        results.push(vec![link.to_string(), version, status]);
    }

    info!(versions = results.len() - 1, "collected documentation versions");
    Ok(Some(results))
}

fn versions_list(sidebar: ElementRef<'_>) -> Result<Vec<ElementRef<'_>>> {
    find_all(sidebar, &TagQuery::new("ul"))
        .into_iter()
        .find(|ul| text_of(*ul).contains("All versions"))
        .map(|ul| find_all(ul, &TagQuery::new("a")))
        .ok_or(ParserError::VersionsNotFound)
}
