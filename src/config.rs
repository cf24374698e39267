//! Config module.
//! Fixed paths, URL and timeout for one update cycle.
//! Every field has a default; `main` only overrides what was passed on the command line.

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_STORE_PATH: &str = "data.json";
pub const DEFAULT_LOG_PATH: &str = "scraper.log";
pub const PRIMARY_SOURCE_URL: &str = "https://www.acpm.fr/Classements/Radios";
pub const TIMEOUT_SECS: u64 = 10;

/// Browser-like headers sent with the primary fetch.
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";
pub const ACCEPT_LANGUAGE: &str = "fr-FR,fr;q=0.9,en;q=0.8";
pub const ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// JSON document read and rewritten each run
    pub store_path: PathBuf,
    pub log_path: PathBuf,
    pub source_url: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store_path: PathBuf::from(DEFAULT_STORE_PATH),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            source_url: PRIMARY_SOURCE_URL.to_string(),
            timeout: Duration::from_secs(TIMEOUT_SECS),
        }
    }
}
