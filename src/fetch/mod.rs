// src/fetch/mod.rs

pub mod download;
pub mod pep;
pub mod versions;
pub mod whats_new;

use indicatif::{ProgressBar, ProgressStyle};
use scraper::Html;
use tracing::error;

use crate::{
    cli::Mode,
    config::Settings,
    error::{ParserError, Result},
    http::CachedClient,
};

/// One output line; the first row of a result set is the header.
pub type Row = Vec<String>;

pub(crate) fn row<const N: usize>(fields: [&str; N]) -> Row {
    fields.iter().map(|f| f.to_string()).collect()
}

/// Run the fetcher for `mode`. `Ok(None)` means there is nothing to report:
/// the index page was unavailable, or the mode only downloads.
pub fn scrape(mode: Mode, client: &CachedClient, settings: &Settings) -> Result<Option<Vec<Row>>> {
    match mode {
        Mode::WhatsNew => whats_new::whats_new(client, settings),
        Mode::LatestVersions => versions::latest_versions(client, settings),
        Mode::Download => download::download(client, settings),
        Mode::Pep => pep::pep(client, settings),
    }
}

/// Fetch an index page. A failed request is logged and turned into `None`;
/// any other error propagates.
pub(crate) fn fetch_index(client: &CachedClient, url: &str) -> Result<Option<Html>> {
    match client.get_html(url) {
        Ok(doc) => Ok(Some(doc)),
        Err(e @ ParserError::RequestFailed { .. }) => {
            error!(%url, error = %e, "page unavailable");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

pub(crate) fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::Path;

    use crate::{config::Settings, http::CachedClient};

    /// Settings pointing both upstream sites at `server`, rooted in `base`.
    pub fn settings_for(server: &mockito::Server, base: &Path) -> Settings {
        Settings {
            base_dir: base.to_path_buf(),
            main_doc_url: format!("{}/3/", server.url()),
            pep_url: format!("{}/peps/", server.url()),
        }
    }

    pub fn client_in(base: &Path) -> CachedClient {
        CachedClient::new(base.join("http_cache")).unwrap()
    }
}
