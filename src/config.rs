// src/config.rs

use once_cell::sync::Lazy;
use std::{
    collections::HashMap,
    env,
    path::{Path, PathBuf},
};

pub const MAIN_DOC_URL: &str = "https://docs.python.org/3/";
pub const PEP_URL: &str = "https://peps.python.org/";

/// `strftime` pattern used in result file names.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
/// `strftime` pattern for the timestamp at the start of each log line.
pub const LOG_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

pub const LOG_FILE: &str = "parser.log";
pub const DOWNLOADS_DIR: &str = "downloads";
pub const RESULTS_DIR: &str = "results";
pub const CACHE_DIR: &str = "http_cache";

/// Overrides the base directory (defaults to the working directory).
pub const BASE_DIR_ENV: &str = "DOCSCRAPER_BASE_DIR";

/// Preview code from the PEP index → statuses a PEP page may legitimately show.
pub static EXPECTED_STATUS: Lazy<HashMap<&'static str, &'static [&'static str]>> =
    Lazy::new(|| {
        HashMap::from([
            ("A", &["Active", "Accepted"] as &[&str]),
            ("D", &["Deferred"] as &[&str]),
            ("F", &["Final"] as &[&str]),
            ("P", &["Provisional"] as &[&str]),
            ("R", &["Rejected"] as &[&str]),
            ("S", &["Superseded"] as &[&str]),
            ("W", &["Withdrawn"] as &[&str]),
            ("", &["Draft", "Active"] as &[&str]),
        ])
    });

/// Where the scraper reads from and writes to.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub main_doc_url: String,
    pub pep_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_dir: PathBuf::from("."),
            main_doc_url: MAIN_DOC_URL.to_string(),
            pep_url: PEP_URL.to_string(),
        }
    }
}

impl Settings {
    /// Defaults, with the base directory taken from `DOCSCRAPER_BASE_DIR`
    /// or the current working directory.
    pub fn from_env() -> Self {
        let base_dir = env::var_os(BASE_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            base_dir,
            ..Self::default()
        }
    }

    pub fn with_base_dir(mut self, base_dir: impl AsRef<Path>) -> Self {
        self.base_dir = base_dir.as_ref().to_path_buf();
        self
    }

    pub fn log_path(&self) -> PathBuf {
        self.base_dir.join(LOG_FILE)
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.base_dir.join(DOWNLOADS_DIR)
    }

    pub fn results_dir(&self) -> PathBuf {
        self.base_dir.join(RESULTS_DIR)
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.base_dir.join(CACHE_DIR)
    }
}
