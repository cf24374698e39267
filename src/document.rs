//! The audience document persisted in the store.
//! Sections are kept as raw JSON: a parseable file always loads, whatever its shape.
//! Types are only checked where the updater writes (`streaming`, `digital.stations[0]`,
//! `sources[0]`).

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::UpdateError;
use crate::source::StreamingFigures;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudienceDocument {
    /// `YYYY-MM-DD` once touched; whatever the file held before that
    #[serde(default = "empty_string")]
    pub last_update: Value,
    /// Listener counts per channel plus `trend`
    #[serde(default = "empty_object")]
    pub streaming: Value,
    #[serde(default = "empty_object")]
    pub digital: Value,
    #[serde(default = "empty_object")]
    pub audience: Value,
    #[serde(default = "empty_object")]
    pub idf: Value,
    #[serde(default = "empty_object")]
    pub shows: Value,
    #[serde(default = "empty_array")]
    pub sources: Value,
    /// Unknown top-level keys, kept so a save never drops data
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn empty_string() -> Value {
    Value::String(String::new())
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

fn empty_array() -> Value {
    Value::Array(Vec::new())
}

impl Default for AudienceDocument {
    fn default() -> Self {
        Self {
            last_update: empty_string(),
            streaming: empty_object(),
            digital: empty_object(),
            audience: empty_object(),
            idf: empty_object(),
            shows: empty_object(),
            sources: empty_array(),
            extra: Map::new(),
        }
    }
}

impl AudienceDocument {
    /// Fresh document used when the store is missing or unreadable.
    pub fn new(today: NaiveDate) -> Self {
        let mut doc = Self::default();
        doc.touch(today);
        doc
    }

    pub fn touch(&mut self, today: NaiveDate) {
        self.last_update = Value::String(today.format(DATE_FORMAT).to_string());
    }

    /// Shallow merge: fetched keys overwrite, the rest stay.
    pub fn merge_streaming(&mut self, figures: &StreamingFigures) -> Result<(), UpdateError> {
        let streaming = self
            .streaming
            .as_object_mut()
            .ok_or(UpdateError::MalformedStreaming)?;

        streaming.extend(figures.to_map());
        Ok(())
    }

    pub fn set_main_listeners(&mut self, listeners: u64) -> Result<(), UpdateError> {
        let station = self
            .digital
            .get_mut("stations")
            .and_then(Value::as_array_mut)
            .and_then(|stations| stations.first_mut())
            .and_then(Value::as_object_mut)
            .ok_or(UpdateError::MissingStation)?;

        station.insert("listeners".to_string(), listeners.into());
        Ok(())
    }

    pub fn set_source_period(&mut self, period: String) -> Result<(), UpdateError> {
        let source = self
            .sources
            .as_array_mut()
            .and_then(|sources| sources.first_mut())
            .and_then(Value::as_object_mut)
            .ok_or(UpdateError::MissingSource)?;

        source.insert("period".to_string(), Value::String(period));
        Ok(())
    }
}

/// Upper-cased "<Month> <Year>", e.g. `OCTOBER 2026`.
pub fn period_label(today: NaiveDate) -> String {
    today.format("%B %Y").to_string().to_uppercase()
}
