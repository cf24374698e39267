//! One update cycle: load → fetch → merge → save.

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{info, warn};

use crate::document::{AudienceDocument, period_label};
use crate::error::StoreError;
use crate::source::{DEFAULT_MAIN_LISTENERS, PrimarySource};
use crate::store::Store;

pub struct Updater<S> {
    store: Store,
    source: S,
}

impl<S: PrimarySource> Updater<S> {
    pub fn new(store: Store, source: S) -> Self {
        Self { store, source }
    }

    pub async fn update(&self) -> Result<AudienceDocument> {
        self.update_on(Local::now().date_naive()).await
    }

    /// Runs the cycle as if today were `today`.
    /// A missing or corrupt store falls back to an empty document. A successful fetch
    /// then needs `streaming`, `digital.stations[0]` and `sources[0]`; without them
    /// nothing is saved.
    pub async fn update_on(&self, today: NaiveDate) -> Result<AudienceDocument> {
        info!("Starting data update of {}", self.store.path().display());

        // Missing/corrupt already logged by the store
        let mut doc = match self.store.load() {
            Ok(doc) => doc,
            Err(StoreError::Missing(_) | StoreError::Corrupt { .. }) => {
                AudienceDocument::new(today)
            }
            Err(e) => return Err(e.into()),
        };
        doc.touch(today);

        match self.source.fetch_primary().await {
            Some(figures) if !figures.is_empty() => {
                doc.merge_streaming(&figures)?;
                doc.set_main_listeners(figures.main.unwrap_or(DEFAULT_MAIN_LISTENERS))?;
                doc.set_source_period(period_label(today))?;
            }
            Some(_) => warn!("Primary source returned no figures, keeping stored values"),
            None => {}
        }

        self.store.save(&doc)?;
        info!("Update finished");

        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UpdateError;
    use crate::source::StreamingFigures;
    use serde_json::{Value, json};
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    /// Canned primary source; `None` stands in for a network failure.
    struct FixedSource(Option<StreamingFigures>);

    impl PrimarySource for FixedSource {
        async fn fetch_primary(&self) -> Option<StreamingFigures> {
            self.0.clone()
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 14).unwrap()
    }

    fn seed(path: &Path) -> AudienceDocument {
        let doc: AudienceDocument = serde_json::from_value(json!({
            "lastUpdate": "2026-09-01",
            "streaming": {
                "main": 4_700_000,
                "klassiks": 1_000_000,
                "podcasts": 250_000,
                "trend": 10.5
            },
            "digital": {
                "stations": [
                    { "name": "Skyrock", "listeners": 4_700_000 },
                    { "name": "Skyrock Klassiks", "listeners": 1_000_000 }
                ]
            },
            "audience": { "daily": 3_100_000 },
            "idf": { "rank": 2 },
            "shows": {},
            "sources": [
                { "name": "ACPM", "period": "AUGUST 2026" },
                { "name": "Médiamétrie", "period": "AVRIL-JUIN 2026" }
            ]
        }))
        .unwrap();
        Store::new(path).save(&doc).unwrap();
        doc
    }

    fn updater(path: &Path, figures: Option<StreamingFigures>) -> Updater<FixedSource> {
        Updater::new(Store::new(path), FixedSource(figures))
    }

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_successful_fetch_merges_streaming() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        seed(&path);

        let doc = updater(&path, Some(StreamingFigures::placeholder()))
            .update_on(today())
            .await
            .unwrap();

        assert_eq!(doc.last_update, "2026-10-14");
        assert_eq!(doc.streaming["main"], 4_840_000);
        assert_eq!(doc.streaming["klassiks"], 1_110_000);
        assert_eq!(doc.streaming["french"], 508_000);
        assert_eq!(doc.streaming["trend"], 12.3);
        assert_eq!(doc.streaming["podcasts"], 250_000);
    }

    #[tokio::test]
    async fn test_successful_fetch_sets_listeners_and_period() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        seed(&path);

        let figures = StreamingFigures {
            main: Some(5_000_000),
            ..StreamingFigures::default()
        };
        updater(&path, Some(figures)).update_on(today()).await.unwrap();

        let saved = Store::new(&path).load().unwrap();
        assert_eq!(saved.digital["stations"][0]["listeners"], 5_000_000);
        assert_eq!(saved.digital["stations"][1]["listeners"], 1_000_000);
        assert_eq!(saved.sources[0]["period"], "OCTOBER 2026");
        assert_eq!(saved.sources[1]["period"], "AVRIL-JUIN 2026");
    }

    #[tokio::test]
    async fn test_missing_main_falls_back_to_default_listeners() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        seed(&path);

        let figures = StreamingFigures {
            trend: Some(-1.5),
            ..StreamingFigures::default()
        };
        let doc = updater(&path, Some(figures)).update_on(today()).await.unwrap();

        assert_eq!(doc.digital["stations"][0]["listeners"], DEFAULT_MAIN_LISTENERS);
        assert_eq!(doc.streaming["main"], 4_700_000);
        assert_eq!(doc.streaming["trend"], -1.5);
    }

    #[tokio::test]
    async fn test_empty_figures_only_touch_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let before = seed(&path);

        let doc = updater(&path, Some(StreamingFigures::default()))
            .update_on(today())
            .await
            .unwrap();

        assert_eq!(doc.last_update, "2026-10-14");
        assert_eq!(doc.streaming, before.streaming);
        assert_eq!(doc.digital, before.digital);
        assert_eq!(doc.sources, before.sources);
    }

    #[tokio::test]
    async fn test_failed_fetch_only_touches_date() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let before = seed(&path);

        let doc = updater(&path, None).update_on(today()).await.unwrap();

        let saved = Store::new(&path).load().unwrap();
        assert_eq!(saved, doc);
        assert_eq!(saved.last_update, "2026-10-14");
        assert_eq!(saved.streaming, before.streaming);
        assert_eq!(saved.digital, before.digital);
        assert_eq!(saved.sources, before.sources);
        assert_eq!(saved.audience, before.audience);
    }

    #[tokio::test]
    async fn test_wrong_shape_store_keeps_its_data_on_failed_fetch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(
            &path,
            r#"{"lastUpdate":null,"streaming":{"main":1},"audience":{"daily":3100000},
                "shows":{"x":1},"sources":[{"period":"AUGUST 2026"}],"notes":"keep"}"#,
        )
        .unwrap();

        updater(&path, None).update_on(today()).await.unwrap();

        let saved = read_json(&path);
        assert_eq!(saved["lastUpdate"], "2026-10-14");
        assert_eq!(saved["streaming"], json!({ "main": 1 }));
        assert_eq!(saved["audience"]["daily"], 3_100_000);
        assert_eq!(saved["shows"], json!({ "x": 1 }));
        assert_eq!(saved["sources"][0]["period"], "AUGUST 2026");
        assert_eq!(saved["notes"], "keep");
    }

    #[tokio::test]
    async fn test_null_streaming_fails_merge_and_keeps_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let original = r#"{"streaming":null,"audience":{"daily":3100000}}"#;
        fs::write(&path, original).unwrap();

        let err = updater(&path, Some(StreamingFigures::placeholder()))
            .update_on(today())
            .await
            .unwrap_err();

        assert_eq!(err.downcast_ref::<UpdateError>(), Some(&UpdateError::MalformedStreaming));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_non_object_store_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "[1, 2, 3]").unwrap();

        let err = updater(&path, None).update_on(today()).await.unwrap_err();

        assert!(matches!(err.downcast_ref::<StoreError>(), Some(StoreError::NotAnObject(_))));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[1, 2, 3]");
    }

    #[tokio::test]
    async fn test_missing_store_with_failed_fetch_writes_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        let doc = updater(&path, None).update_on(today()).await.unwrap();

        assert_eq!(doc, AudienceDocument::new(today()));
        assert_eq!(Store::new(&path).load().unwrap(), doc);
    }

    #[tokio::test]
    async fn test_missing_store_with_successful_fetch_fails_at_station() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");

        let err = updater(&path, Some(StreamingFigures::placeholder()))
            .update_on(today())
            .await
            .unwrap_err();

        assert_eq!(err.downcast_ref::<UpdateError>(), Some(&UpdateError::MissingStation));
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_empty_sources_fails_and_keeps_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        let original = r#"{"digital":{"stations":[{"listeners":1}]},"sources":[]}"#;
        fs::write(&path, original).unwrap();

        let err = updater(&path, Some(StreamingFigures::placeholder()))
            .update_on(today())
            .await
            .unwrap_err();

        assert_eq!(err.downcast_ref::<UpdateError>(), Some(&UpdateError::MissingSource));
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[tokio::test]
    async fn test_corrupt_store_is_replaced_by_default() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "not json").unwrap();

        let doc = updater(&path, None).update_on(today()).await.unwrap();

        assert_eq!(doc, AudienceDocument::new(today()));
        assert_eq!(Store::new(&path).load().unwrap(), doc);
    }
}
