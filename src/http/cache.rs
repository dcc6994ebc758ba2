// src/http/cache.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::error::Result;

/// Metadata written next to each cached body.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
struct CacheMeta {
    method: String,
    url: String,
    fetched_at: DateTime<Utc>,
}

/// Directory of responses keyed by `(method, url)`.
///
/// Each entry is `<key>.json` (metadata) plus `<key>.body`. Entries never
/// expire; `clear` drops all of them. An entry whose metadata cannot be
/// read back is discarded and reported as a miss.
pub struct HttpCache {
    dir: PathBuf,
}

impl HttpCache {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    #[cfg(test)]
    fn dir(&self) -> &Path {
        &self.dir
    }

    fn key(method: &str, url: &str) -> String {
        format!("{:016x}", xxh3_64(format!("{method} {url}").as_bytes()))
    }

    fn paths(&self, method: &str, url: &str) -> (PathBuf, PathBuf) {
        let key = Self::key(method, url);
        (
            self.dir.join(format!("{key}.json")),
            self.dir.join(format!("{key}.body")),
        )
    }

    /// Cached body for `(method, url)`, if any.
    pub fn load(&self, method: &str, url: &str) -> Result<Option<Vec<u8>>> {
        let (meta_path, body_path) = self.paths(method, url);
        let meta_raw = match fs::read(&meta_path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                warn!(%url, error = %e, "unreadable cache entry, refetching");
                self.discard(&meta_path, &body_path);
                return Ok(None);
            }
        };
        let meta: CacheMeta = match serde_json::from_slice(&meta_raw) {
            Ok(meta) => meta,
            Err(e) => {
                warn!(%url, error = %e, "corrupt cache entry, refetching");
                self.discard(&meta_path, &body_path);
                return Ok(None);
            }
        };
        // hash collision: treat as a miss
        if meta.method != method || meta.url != url {
            return Ok(None);
        }
        let body = match fs::read(&body_path) {
            Ok(body) => body,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        debug!(%url, "cache hit");
        Ok(Some(body))
    }

    pub fn store(&self, method: &str, url: &str, body: &[u8]) -> Result<()> {
        let (meta_path, body_path) = self.paths(method, url);
        let meta = CacheMeta {
            method: method.to_string(),
            url: url.to_string(),
            fetched_at: Utc::now(),
        };
        // body first, so a metadata file always has its body
        write_replace(&body_path, body)?;
        write_replace(&meta_path, &serde_json::to_vec_pretty(&meta)?)?;
        Ok(())
    }

    fn discard(&self, meta_path: &Path, body_path: &Path) {
        for path in [meta_path, body_path] {
            if let Err(e) = fs::remove_file(path) {
                if e.kind() != ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "could not remove cache file");
                }
            }
        }
    }

    /// Remove every entry and recreate the empty directory.
    pub fn clear(&self) -> Result<()> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        fs::create_dir_all(&self.dir)?;
        info!(dir = %self.dir.display(), "HTTP cache cleared");
        Ok(())
    }
}

/// Write through a sibling `.tmp` file and rename it over `path`, so an
/// interrupted run never leaves a truncated file behind.
fn write_replace(path: &Path, contents: &[u8]) -> Result<()> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_store_and_load() {
        let tmp = tempdir().unwrap();
        let cache = HttpCache::open(tmp.path().join("cache")).unwrap();
        let url = "https://docs.python.org/3/";

        assert!(cache.load("GET", url).unwrap().is_none());
        cache.store("GET", url, b"<html></html>").unwrap();

        let hit = cache.load("GET", url).unwrap().expect("entry should be cached");
        assert_eq!(hit, b"<html></html>");
        assert!(!cache.dir().join(format!("{}.json.tmp", HttpCache::key("GET", url))).exists());

        // method is part of the key
        assert!(cache.load("HEAD", url).unwrap().is_none());
    }

    #[test]
    fn test_clear_drops_entries() {
        let tmp = tempdir().unwrap();
        let cache = HttpCache::open(tmp.path().join("cache")).unwrap();
        cache.store("GET", "https://peps.python.org/", b"x").unwrap();
        cache.clear().unwrap();
        assert!(cache.load("GET", "https://peps.python.org/").unwrap().is_none());
        assert!(cache.dir().is_dir());
    }

    #[test]
    fn test_corrupt_metadata_is_a_miss() {
        let tmp = tempdir().unwrap();
        let cache = HttpCache::open(tmp.path().join("cache")).unwrap();
        let url = "https://peps.python.org/pep-0008/";
        cache.store("GET", url, b"body").unwrap();

        let (meta_path, body_path) = cache.paths("GET", url);
        fs::write(&meta_path, b"{\"meth").unwrap();

        assert!(cache.load("GET", url).unwrap().is_none());
        assert!(!meta_path.exists());
        assert!(!body_path.exists());

        cache.store("GET", url, b"again").unwrap();
        assert_eq!(cache.load("GET", url).unwrap().unwrap(), b"again");
    }
}
