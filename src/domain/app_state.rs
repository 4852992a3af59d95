use std::{
    collections::HashMap,
    time::{Duration, SystemTime},
};

use serde::{Deserialize, Serialize};

use super::analytics::HistoryFilter;
use super::entities::{AnalysisRecord, BackendSettings, Prediction};
use super::shelf_life::{EnvironmentReading, ShelfLifeEstimate};

/// The image currently being analyzed and everything learned about it.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisSession {
    pub image_path: String,
    pub prediction: Prediction,
    pub reading: EnvironmentReading,
    pub saved: bool,
}

impl AnalysisSession {
    pub fn new(image_path: impl Into<String>, prediction: Prediction) -> Self {
        Self {
            image_path: image_path.into(),
            prediction,
            reading: EnvironmentReading::default(),
            saved: false,
        }
    }

    pub fn shelf_life(&self) -> ShelfLifeEstimate {
        self.prediction.shelf_life(&self.reading)
    }

    /// A new reading invalidates any earlier save.
    pub fn apply_reading(&mut self, reading: EnvironmentReading) {
        self.reading = reading;
        self.saved = false;
    }
}

#[derive(Clone, Debug, Default)]
pub struct AppState {
    pub settings: BackendSettings,
    pub session: Option<AnalysisSession>,
    pub history: Vec<AnalysisRecord>,
    pub history_filter: HistoryFilter,
    pub cache: CacheTimestamps,
}

impl AppState {
    pub fn is_stale(&self, resource: &CacheResource, ttl: Duration) -> bool {
        self.cache.is_stale(resource, ttl)
    }

    pub fn filtered_history(&self) -> Vec<&AnalysisRecord> {
        self.history_filter.apply(&self.history)
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    pub fn apply_persisted(&mut self, persisted: PersistedState) {
        self.settings = persisted.settings;
    }

    pub fn to_persisted(&self) -> PersistedState {
        PersistedState {
            settings: self.settings.clone(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct CacheTimestamps {
    entries: HashMap<CacheResource, SystemTime>,
}

impl CacheTimestamps {
    pub fn record_fetch(&mut self, resource: CacheResource, fetched_at: SystemTime) {
        self.entries.insert(resource, fetched_at);
    }

    pub fn fetched_at(&self, resource: &CacheResource) -> Option<SystemTime> {
        self.entries.get(resource).copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CacheResource, &SystemTime)> {
        self.entries.iter()
    }

    pub fn is_stale(&self, resource: &CacheResource, ttl: Duration) -> bool {
        self.fetched_at(resource)
            .map(|time| time.elapsed().map(|elapsed| elapsed > ttl).unwrap_or(true))
            .unwrap_or(true)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CacheResource {
    History,
    SensorReading,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub settings: BackendSettings,
}
