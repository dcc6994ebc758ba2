// src/http/mod.rs

mod cache;

use reqwest::blocking::Client;
use scraper::Html;
use std::{
    fs::File,
    io::{Read, Write},
    path::Path,
};
use tracing::{debug, error};

use crate::error::{ParserError, Result};
use cache::HttpCache;

/// Archive downloads are copied to disk in pieces of this size.
pub const CHUNK_SIZE: usize = 8192;

const USER_AGENT: &str = concat!("docscraper/", env!("CARGO_PKG_VERSION"));

/// Blocking GET client with an on-disk response cache.
pub struct CachedClient {
    client: Client,
    cache: HttpCache,
}

impl CachedClient {
    pub fn new(cache_dir: impl AsRef<Path>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(ParserError::ClientSetup)?;
        let cache = HttpCache::open(cache_dir.as_ref())?;
        Ok(Self { client, cache })
    }

    pub fn clear_cache(&self) -> Result<()> {
        self.cache.clear()
    }

    /// Body of a successful GET, from the cache when present.
    pub fn get(&self, url: &str) -> Result<Vec<u8>> {
        if let Some(body) = self.cache.load("GET", url)? {
            return Ok(body);
        }

        debug!(%url, "GET");
        let body = self.send(url).map_err(|source| {
            error!(%url, error = %source, "request failed");
            ParserError::RequestFailed {
                url: url.to_string(),
                source,
            }
        })?;
        self.cache.store("GET", url, &body)?;
        Ok(body)
    }

    fn send(&self, url: &str) -> reqwest::Result<Vec<u8>> {
        let resp = self.client.get(url).send()?.error_for_status()?;
        Ok(resp.bytes()?.to_vec())
    }

    /// Body decoded as UTF-8 whatever the server claims.
    pub fn get_text(&self, url: &str) -> Result<String> {
        let body = self.get(url)?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    pub fn get_html(&self, url: &str) -> Result<Html> {
        let text = self.get_text(url)?;
        Ok(Html::parse_document(&text))
    }

    /// Stream `url` into `dest` in `CHUNK_SIZE` pieces, bypassing the cache.
    /// Returns the number of bytes written.
    pub fn download_to(&self, url: &str, dest: &Path) -> Result<u64> {
        let mut resp = self
            .client
            .get(url)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|source| {
                error!(%url, error = %source, "download request failed");
                ParserError::RequestFailed {
                    url: url.to_string(),
                    source,
                }
            })?;

        let mut file = File::create(dest)?;
        let mut buf = [0u8; CHUNK_SIZE];
        let mut written = 0u64;
        loop {
            let n = resp.read(&mut buf)?;
            if n == 0 {
                break;
            }
            file.write_all(&buf[..n])?;
            written += n as u64;
        }
        file.flush()?;
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_second_get_is_served_from_cache() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/page.html")
            .with_status(200)
            .with_body("<h1>Hi</h1>")
            .expect(1)
            .create();

        let tmp = tempdir().unwrap();
        let client = CachedClient::new(tmp.path().join("cache")).unwrap();
        let url = format!("{}/page.html", server.url());

        assert_eq!(client.get_text(&url).unwrap(), "<h1>Hi</h1>");
        assert_eq!(client.get_text(&url).unwrap(), "<h1>Hi</h1>");
        mock.assert();
    }

    #[test]
    fn test_clear_cache_forces_refetch() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/page.html")
            .with_status(200)
            .with_body("body")
            .expect(2)
            .create();

        let tmp = tempdir().unwrap();
        let client = CachedClient::new(tmp.path().join("cache")).unwrap();
        let url = format!("{}/page.html", server.url());

        client.get(&url).unwrap();
        client.clear_cache().unwrap();
        client.get(&url).unwrap();
        mock.assert();
    }

    #[test]
    fn test_corrupt_cache_metadata_triggers_refetch() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/p")
            .with_status(200)
            .with_body("fresh")
            .expect(2)
            .create();

        let tmp = tempdir().unwrap();
        let cache_dir = tmp.path().join("cache");
        let client = CachedClient::new(&cache_dir).unwrap();
        let url = format!("{}/p", server.url());
        assert_eq!(client.get(&url).unwrap(), b"fresh");

        let meta = std::fs::read_dir(&cache_dir)
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .find(|path| path.extension().is_some_and(|ext| ext == "json"))
            .expect("metadata file should exist");
        std::fs::write(&meta, "{\"meth").unwrap();

        assert_eq!(client.get(&url).unwrap(), b"fresh");
        // refetched entry is cached again
        assert_eq!(client.get(&url).unwrap(), b"fresh");
        mock.assert();
    }

    #[test]
    fn test_error_status_is_request_failed_and_not_cached() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/missing")
            .with_status(404)
            .expect(2)
            .create();

        let tmp = tempdir().unwrap();
        let client = CachedClient::new(tmp.path().join("cache")).unwrap();
        let url = format!("{}/missing", server.url());

        for _ in 0..2 {
            match client.get(&url) {
                Err(ParserError::RequestFailed { url: failed, .. }) => assert_eq!(failed, url),
                other => panic!("expected RequestFailed, got {other:?}"),
            }
        }
        mock.assert();
    }

    #[test]
    fn test_text_is_decoded_as_utf8() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/ru")
            .with_status(200)
            .with_header("content-type", "text/html; charset=iso-8859-1")
            .with_body("Что нового")
            .create();

        let tmp = tempdir().unwrap();
        let client = CachedClient::new(tmp.path().join("cache")).unwrap();
        let text = client.get_text(&format!("{}/ru", server.url())).unwrap();
        assert_eq!(text, "Что нового");
    }

    #[test]
    fn test_download_streams_body_to_file() {
        let mut server = mockito::Server::new();
        let payload = vec![7u8; CHUNK_SIZE * 3 + 11];
        server
            .mock("GET", "/docs-pdf-a4.zip")
            .with_status(200)
            .with_body(payload.clone())
            .create();

        let tmp = tempdir().unwrap();
        let client = CachedClient::new(tmp.path().join("cache")).unwrap();
        let dest = tmp.path().join("docs-pdf-a4.zip");
        let written = client
            .download_to(&format!("{}/docs-pdf-a4.zip", server.url()), &dest)
            .unwrap();

        assert_eq!(written, payload.len() as u64);
        assert_eq!(std::fs::read(&dest).unwrap(), payload);
    }
}
