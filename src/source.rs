//! Remote sources for audience figures.
//! Primary: ACPM radio ranking page, one GET with browser headers, body handed to an `Extractor`.
//! Secondary: Médiamétrie does not publish its figures programmatically, so it is constants only.
//! The default extractor ignores the page and returns the last known figures.
//! Swap in a real `Extractor` once the ranking table layout is pinned down.

use anyhow::{Context, Result};
use reqwest::Client;
use reqwest::header::{self, HeaderMap, HeaderValue};
use scraper::Html;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{error, info};

use crate::config::{self, Config};

/// Listener count used when a fetched record carries no `main` figure.
pub const DEFAULT_MAIN_LISTENERS: u64 = 4_840_000;

// *************** Records ***************

/// Streaming listener counts.
/// Fields are optional so partial extractions only touch what they found.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StreamingFigures {
    pub main: Option<u64>,
    pub klassiks: Option<u64>,
    pub french: Option<u64>,
    /// Percentage
    pub trend: Option<f64>,
}

impl StreamingFigures {
    pub fn placeholder() -> Self {
        Self {
            main: Some(DEFAULT_MAIN_LISTENERS),
            klassiks: Some(1_110_000),
            french: Some(508_000),
            trend: Some(12.3),
        }
    }

    /// No figure at all; the updater treats this like a failed fetch.
    pub fn is_empty(&self) -> bool {
        self.main.is_none()
            && self.klassiks.is_none()
            && self.french.is_none()
            && self.trend.is_none()
    }

    /// Present fields only, keyed the way they appear under `streaming`.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::new();
        if let Some(v) = self.main {
            map.insert("main".to_string(), v.into());
        }
        if let Some(v) = self.klassiks {
            map.insert("klassiks".to_string(), v.into());
        }
        if let Some(v) = self.french {
            map.insert("french".to_string(), v.into());
        }
        if let Some(v) = self.trend {
            map.insert("trend".to_string(), v.into());
        }
        map
    }
}

/// Broadcast audience figures (Médiamétrie).
#[cfg_attr(not(test), allow(dead_code))]
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceFigures {
    pub daily: u64,
    pub trend: i64,
    pub share: f64,
    pub share_trend: f64,
}

// *************** Extraction ***************

/// Turns the primary source page into streaming figures.
pub trait Extractor {
    fn extract(&self, page: &Html) -> Result<StreamingFigures>;
}

pub struct PlaceholderExtractor;

impl Extractor for PlaceholderExtractor {
    fn extract(&self, _page: &Html) -> Result<StreamingFigures> {
        Ok(StreamingFigures::placeholder())
    }
}

// *************** Public API ***************

/// Where the updater gets its streaming figures. `None` means "keep what the store has".
#[allow(async_fn_in_trait)]
pub trait PrimarySource {
    async fn fetch_primary(&self) -> Option<StreamingFigures>;
}

pub struct HttpSource<E = PlaceholderExtractor> {
    client: Client,
    url: String,
    extractor: E,
}

impl HttpSource {
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_extractor(config, PlaceholderExtractor)
    }
}

impl<E: Extractor> HttpSource<E> {
    pub fn with_extractor(config: &Config, extractor: E) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::USER_AGENT, HeaderValue::from_static(config::USER_AGENT));
        headers.insert(header::ACCEPT_LANGUAGE, HeaderValue::from_static(config::ACCEPT_LANGUAGE));
        headers.insert(header::ACCEPT, HeaderValue::from_static(config::ACCEPT));

        let client = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            url: config.source_url.clone(),
            extractor,
        })
    }

    async fn fetch_page(&self) -> Result<String> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", self.url))?;

        if !response.status().is_success() {
            anyhow::bail!("{} returned HTTP {}", self.url, response.status());
        }

        response
            .text()
            .await
            .with_context(|| format!("Failed to read body from {}", self.url))
    }
}

impl<E: Extractor> PrimarySource for HttpSource<E> {
    async fn fetch_primary(&self) -> Option<StreamingFigures> {
        info!("Fetching primary source {}", self.url);

        let body = match self.fetch_page().await {
            Ok(body) => body,
            Err(e) => {
                error!("Primary source fetch failed: {e:#}");
                return None;
            }
        };

        let page = Html::parse_document(&body);
        match self.extractor.extract(&page) {
            Ok(figures) => Some(figures),
            Err(e) => {
                error!("Could not extract figures from {}: {e:#}", self.url);
                None
            }
        }
    }
}

/// Last known Médiamétrie figures. No I/O. Not part of the update cycle.
#[cfg_attr(not(test), allow(dead_code))]
pub fn fetch_secondary_source() -> AudienceFigures {
    AudienceFigures {
        daily: 3_160_000,
        trend: 220,
        share: 5.3,
        share_trend: 0.4,
    }
}

// *************** Tests ***************
