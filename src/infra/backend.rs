//! Thin asynchronous client for the fruit analysis backend.
//!
//! - Submits images for prediction and pushes shelf-life results back.
//! - Reads the IoT sensor through the backend.
//! - Keeps the analysis history in a short-lived in-memory cache with stale fallback.

use std::{
    path::Path,
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{
    multipart::{Form, Part},
    Client, Url,
};
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;
use time::{macros::format_description, Date};
use tokio::sync::Mutex;

use crate::domain::{
    AnalysisRecord, BackendSettings, EnvironmentReading, Prediction, ResultUpdate, RipenessClass,
    DEFAULT_BACKEND_URL,
};

pub const BASE_URL_ENV: &str = "FRESH_INSIGHT_BACKEND_URL";
/// How long fetched history counts as fresh.
pub const HISTORY_TTL: Duration = Duration::from_secs(5 * 60);
const USER_AGENT: &str = concat!("fresh-insight/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("failed to read image: {0}")]
    Io(#[from] std::io::Error),
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("backend error: {0}")]
    Backend(String),
    #[error("prediction has no result id; nothing to update")]
    MissingResultId,
    #[error("no complete sensor reading to save")]
    MissingReading,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Default)]
struct BackendCache {
    history: Option<Cached<Vec<AnalysisRecord>>>,
}

#[derive(Clone)]
pub struct BackendClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<BackendCache>>,
    ttl: Duration,
}

impl BackendClient {
    /// Persisted settings first, then the environment override.
    pub fn from_settings(settings: &BackendSettings) -> Result<Self, BackendError> {
        Self::with_base_url(&resolve_base_url(
            Some(&settings.base_url),
            std::env::var(BASE_URL_ENV).ok(),
        ))
    }

    pub fn with_base_url(base: &str) -> Result<Self, BackendError> {
        let base_url = normalize_base_url(base)?;
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(BackendCache::default())),
            ttl: HISTORY_TTL,
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub async fn predict_file(&self, path: &Path) -> Result<Prediction, BackendError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image.png".to_string());
        self.predict(bytes, file_name).await
    }

    pub async fn predict(
        &self,
        image: Vec<u8>,
        file_name: String,
    ) -> Result<Prediction, BackendError> {
        let url = self.url("predict")?;
        tracing::info!(bytes = image.len(), %file_name, "submitting image to {url}");

        let form = Form::new().part("image", Part::bytes(image).file_name(file_name));
        let dto: PredictionDto = self
            .fetch_json(self.http.post(url).multipart(form))
            .await?;
        let prediction = Prediction::from(dto);

        tracing::info!(
            fruit = %prediction.fruit,
            ripeness = %prediction.ripeness,
            is_fruit = prediction.is_fruit,
            "prediction received"
        );
        Ok(prediction)
    }

    pub async fn read_sensor(&self) -> Result<EnvironmentReading, BackendError> {
        let url = self.url("sensor_data")?;
        let dto: SensorDto = self.fetch_json(self.http.get(url)).await?;
        let reading = EnvironmentReading::from(dto);
        tracing::debug!(?reading, "sensor reading");
        Ok(reading)
    }

    pub async fn update_result(&self, update: &ResultUpdate) -> Result<(), BackendError> {
        let url = self.url("update_result")?;
        let response = self.http.post(url).json(update).send().await?;
        let status = response.status();
        if status.is_success() {
            tracing::info!(
                result_id = %update.result_id,
                shelf_life = %update.shelf_life,
                "result updated"
            );
            // History rows now carry the new shelf life.
            self.expire_history().await;
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Backend(
            parse_error_message(&body).unwrap_or_else(|| format!("HTTP {status}")),
        ))
    }

    /// Builds the update from the current session and sends it.
    pub async fn save_analysis(
        &self,
        prediction: &Prediction,
        reading: &EnvironmentReading,
    ) -> Result<ResultUpdate, BackendError> {
        if prediction.result_id.is_none() {
            return Err(BackendError::MissingResultId);
        }
        let update = ResultUpdate::for_prediction(prediction, reading)
            .ok_or(BackendError::MissingReading)?;
        self.update_result(&update).await?;
        Ok(update)
    }

    pub async fn get_history(
        &self,
    ) -> Result<CachedPayload<Vec<AnalysisRecord>>, BackendError> {
        if let Some(payload) = self.cached_history().await {
            tracing::debug!("serving cached history ({} rows)", payload.data.len());
            return Ok(payload);
        }

        let url = self.url("history_data")?;
        match self
            .fetch_json::<Vec<HistoryRowDto>>(self.http.get(url))
            .await
        {
            Ok(rows) => {
                let data = rows
                    .into_iter()
                    .map(AnalysisRecord::from)
                    .collect::<Vec<_>>();
                tracing::info!("loaded {} history rows", data.len());
                Ok(self.store_history(data).await)
            }
            Err(error) => {
                if let Some(stale) = self.cached_history_stale().await {
                    tracing::warn!("history request failed ({error}); serving stale copy");
                    return Ok(stale);
                }
                Err(error)
            }
        }
    }

    pub async fn refresh_history(
        &self,
    ) -> Result<CachedPayload<Vec<AnalysisRecord>>, BackendError> {
        self.expire_history().await;
        self.get_history().await
    }

    pub async fn clear_cache(&self) {
        self.cache.lock().await.history = None;
    }

    pub fn csv_download_url(&self) -> Result<Url, BackendError> {
        Ok(self.url("download_csv")?)
    }

    async fn cached_history(&self) -> Option<CachedPayload<Vec<AnalysisRecord>>> {
        let cache = self.cache.lock().await;
        cache
            .history
            .as_ref()
            .and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_history_stale(&self) -> Option<CachedPayload<Vec<AnalysisRecord>>> {
        let cache = self.cache.lock().await;
        cache.history.as_ref().map(Cached::stale)
    }

    /// Keeps the rows for stale fallback but forces the next read to refetch.
    async fn expire_history(&self) {
        let mut cache = self.cache.lock().await;
        if let Some(entry) = cache.history.as_mut() {
            entry.fetched_at = SystemTime::UNIX_EPOCH;
        }
    }

    async fn store_history(
        &self,
        data: Vec<AnalysisRecord>,
    ) -> CachedPayload<Vec<AnalysisRecord>> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(data.clone(), fetched_at, CacheStatus::Fresh);
        let mut cache = self.cache.lock().await;
        cache.history = Some(Cached::new(data, fetched_at));
        payload
    }

    async fn fetch_json<T>(&self, builder: reqwest::RequestBuilder) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
    {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(BackendError::Backend(
                parse_error_message(&body).unwrap_or_else(|| format!("HTTP {status}")),
            ));
        }
        if let Some(message) = parse_error_message(&body) {
            return Err(BackendError::Backend(message));
        }

        Ok(serde_json::from_str(&body)?)
    }

    fn url(&self, path: &str) -> Result<Url, url::ParseError> {
        self.base_url.join(path)
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

/// Environment beats settings; blank values fall through to the default.
pub fn resolve_base_url(settings_url: Option<&str>, env_url: Option<String>) -> String {
    env_url
        .filter(|value| !value.trim().is_empty())
        .or_else(|| {
            settings_url
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
        .unwrap_or_else(|| DEFAULT_BACKEND_URL.to_string())
}

/// `Url::join` drops the last path segment unless the base ends with `/`.
pub fn normalize_base_url(base: &str) -> Result<Url, url::ParseError> {
    let trimmed = base.trim();
    if trimmed.ends_with('/') {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("{trimmed}/"))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorDto {
    error: String,
}

fn parse_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorDto>(body)
        .ok()
        .map(|dto| dto.error)
}

#[derive(Debug, Deserialize)]
struct PredictionDto {
    #[serde(default, deserialize_with = "opt_string_from_json")]
    result_id: Option<String>,
    #[serde(default = "default_true")]
    is_fruit: bool,
    #[serde(default)]
    ripeness: String,
    #[serde(default)]
    ripeness_conf: f64,
    #[serde(default)]
    fruit: Option<String>,
    #[serde(default)]
    fruit_conf: f64,
}

fn default_true() -> bool {
    true
}

impl From<PredictionDto> for Prediction {
    fn from(dto: PredictionDto) -> Self {
        Self {
            result_id: dto.result_id,
            is_fruit: dto.is_fruit,
            fruit: dto.fruit.unwrap_or_else(|| "N/A".to_string()),
            fruit_conf: dto.fruit_conf,
            ripeness: RipenessClass::parse(&dto.ripeness),
            ripeness_conf: dto.ripeness_conf,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SensorDto {
    #[serde(default, alias = "temperature_c")]
    temperature: Option<f64>,
    #[serde(default, alias = "humidity_pct")]
    humidity: Option<f64>,
}

impl From<SensorDto> for EnvironmentReading {
    fn from(dto: SensorDto) -> Self {
        EnvironmentReading::new(dto.temperature, dto.humidity)
    }
}

#[derive(Debug, Deserialize)]
struct HistoryRowDto {
    #[serde(rename = "ID", deserialize_with = "string_from_json")]
    id: String,
    #[serde(rename = "Timestamp", default)]
    timestamp: Option<String>,
    #[serde(rename = "Date", default)]
    date: Option<String>,
    #[serde(rename = "Fruit_Type", default)]
    fruit_type: Option<String>,
    #[serde(rename = "Fruit_Confidence", default)]
    fruit_confidence: Option<f64>,
    #[serde(rename = "Ripeness", default)]
    ripeness: Option<String>,
    #[serde(rename = "Ripeness_Confidence", default)]
    ripeness_confidence: Option<f64>,
    #[serde(rename = "Temperature_C", default)]
    temperature_c: Option<f64>,
    #[serde(rename = "Humidity_pct", default)]
    humidity_pct: Option<f64>,
    #[serde(rename = "Shelf_Life", default)]
    shelf_life: Option<String>,
    #[serde(rename = "Source", default)]
    source: Option<String>,
}

impl From<HistoryRowDto> for AnalysisRecord {
    fn from(dto: HistoryRowDto) -> Self {
        let timestamp = dto.timestamp.unwrap_or_default();
        let date = parse_record_date(dto.date.as_deref(), &timestamp);
        Self {
            id: dto.id,
            timestamp,
            date,
            fruit_type: dto.fruit_type.unwrap_or_else(|| "Unknown".to_string()),
            fruit_confidence: dto.fruit_confidence.unwrap_or_default(),
            ripeness: dto.ripeness.unwrap_or_else(|| "Unknown".to_string()),
            ripeness_confidence: dto.ripeness_confidence.unwrap_or_default(),
            temperature_c: dto.temperature_c,
            humidity_pct: dto.humidity_pct,
            shelf_life: dto.shelf_life,
            source: dto.source.unwrap_or_else(|| "Unknown".to_string()),
        }
    }
}

/// Uses the `Date` column when present, else the date prefix of the timestamp.
fn parse_record_date(date: Option<&str>, timestamp: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    date.into_iter()
        .chain(std::iter::once(timestamp))
        .filter_map(|raw| raw.trim().get(..10))
        .find_map(|prefix| Date::parse(prefix, format).ok())
}

/// Integer-valued floats (`17.0`) render without the fraction.
fn id_from_f64(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        (value as i64).to_string()
    } else {
        value.to_string()
    }
}

fn opt_string_from_json<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.and_then(|value| match value {
        serde_json::Value::String(string) if !string.is_empty() => Some(string),
        serde_json::Value::Number(number) => Some(match number.as_f64() {
            Some(value) if number.is_f64() => id_from_f64(value),
            _ => number.to_string(),
        }),
        _ => None,
    }))
}

fn string_from_json<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct StringOrNumber;

    impl<'de> serde::de::Visitor<'de> for StringOrNumber {
        type Value = String;

        fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
            formatter.write_str("a string or number")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_string<E>(self, value: String) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value)
        }

        fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(value.to_string())
        }

        fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            Ok(id_from_f64(value))
        }
    }

    deserializer.deserialize_any(StringOrNumber)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn prediction_accepts_numeric_result_id() {
        let dto: PredictionDto = serde_json::from_str(
            r#"{
                "result_id": 17,
                "is_fruit": true,
                "ripeness": "Ripe",
                "ripeness_conf": 0.82,
                "fruit": "Orange",
                "fruit_conf": 0.97,
                "ripeness_probs": [0.1, 0.82, 0.05, 0.03],
                "fruit_probs": [0.03, 0.97]
            }"#,
        )
        .unwrap();
        let prediction = Prediction::from(dto);
        assert_eq!(prediction.result_id.as_deref(), Some("17"));
        assert_eq!(prediction.ripeness, RipenessClass::Ripe);
        assert_eq!(prediction.fruit, "Orange");
    }

    #[test]
    fn not_fruit_prediction_without_id() {
        let dto: PredictionDto = serde_json::from_str(
            r#"{"is_fruit": false, "ripeness": "Not Fruit", "ripeness_conf": 0.9,
                "fruit": "N/A", "fruit_conf": 0.0}"#,
        )
        .unwrap();
        let prediction = Prediction::from(dto);
        assert!(!prediction.is_fruit);
        assert!(prediction.result_id.is_none());
        assert_eq!(prediction.ripeness.label(), "Not Fruit");
    }

    #[test]
    fn error_payload_is_detected() {
        assert_eq!(
            parse_error_message(r#"{"error": "No image uploaded"}"#).as_deref(),
            Some("No image uploaded")
        );
        assert_eq!(parse_error_message(r#"{"fruit": "Apple"}"#), None);
        assert_eq!(parse_error_message("<html>502</html>"), None);
    }

    #[test]
    fn history_rows_parse_with_nulls() {
        let rows: Vec<HistoryRowDto> = serde_json::from_str(
            r#"[
                {"ID": 3, "Timestamp": "2024-03-02 10:15:00", "Fruit_Type": "Apple",
                 "Fruit_Confidence": 45.5, "Ripeness": "Unripe", "Ripeness_Confidence": 88.1,
                 "Temperature_C": null, "Humidity_pct": null, "Shelf_Life": null, "Source": "Upload"},
                {"ID": "4", "Timestamp": "2024-03-03 08:00:00", "Date": "2024-03-03",
                 "Fruit_Type": "Orange", "Fruit_Confidence": 91.0, "Ripeness": "Ripe",
                 "Ripeness_Confidence": 77.0, "Temperature_C": 22.5, "Humidity_pct": 61.0,
                 "Shelf_Life": "2-3 days", "Source": "Camera"}
            ]"#,
        )
        .unwrap();
        let records: Vec<AnalysisRecord> = rows.into_iter().map(AnalysisRecord::from).collect();

        assert_eq!(records[0].id, "3");
        assert_eq!(records[0].date, Some(date!(2024 - 03 - 02)));
        assert!(records[0].is_low_confidence());
        assert_eq!(records[0].shelf_life_label(), "N/A");
        assert_eq!(records[1].id, "4");
        assert_eq!(records[1].temperature_c, Some(22.5));
        assert_eq!(records[1].shelf_life_label(), "2-3 days");
    }

    #[test]
    fn float_ids_drop_the_fraction() {
        let rows: Vec<HistoryRowDto> = serde_json::from_str(
            r#"[{"ID": 12.0, "Timestamp": "2024-03-02 10:15:00", "Fruit_Type": "Banana",
                 "Fruit_Confidence": 80.0, "Ripeness": "Ripe", "Ripeness_Confidence": 70.0,
                 "Source": "Upload"},
                {"ID": 12.5, "Timestamp": "2024-03-02 10:16:00"}]"#,
        )
        .unwrap();
        assert_eq!(rows[0].id, "12");
        assert_eq!(rows[1].id, "12.5");

        let dto: PredictionDto = serde_json::from_str(
            r#"{"result_id": 9.0, "is_fruit": true, "ripeness": "Ripe", "ripeness_conf": 0.8,
                "fruit": "Apple", "fruit_conf": 0.9}"#,
        )
        .unwrap();
        assert_eq!(Prediction::from(dto).result_id.as_deref(), Some("9"));
    }

    #[test]
    fn record_date_fallbacks() {
        assert_eq!(parse_record_date(None, "garbage"), None);
        assert_eq!(
            parse_record_date(Some("not a date"), "2024-01-05T09:00:00"),
            Some(date!(2024 - 01 - 05))
        );
    }

    #[test]
    fn sensor_reading_with_missing_humidity() {
        let dto: SensorDto = serde_json::from_str(r#"{"temperature": 24.0, "humidity": null}"#).unwrap();
        let reading = EnvironmentReading::from(dto);
        assert_eq!(reading.temperature_c, Some(24.0));
        assert_eq!(reading.humidity_pct, None);
    }

    #[test]
    fn base_url_resolution_order() {
        assert_eq!(resolve_base_url(None, None), DEFAULT_BACKEND_URL);
        assert_eq!(
            resolve_base_url(Some("http://pi.local:5000"), None),
            "http://pi.local:5000"
        );
        assert_eq!(
            resolve_base_url(Some("http://pi.local:5000"), Some("http://env:9000/".into())),
            "http://env:9000/"
        );
        assert_eq!(resolve_base_url(Some("  "), Some(String::new())), DEFAULT_BACKEND_URL);
    }

    #[test]
    fn endpoints_join_under_base_path() {
        let client = BackendClient::with_base_url("http://127.0.0.1:5000/api").unwrap();
        assert_eq!(
            client.csv_download_url().unwrap().as_str(),
            "http://127.0.0.1:5000/api/download_csv"
        );
        assert!(BackendClient::with_base_url("not a url").is_err());
    }

    #[tokio::test]
    async fn stale_history_survives_expiry() {
        let client = BackendClient::with_base_url(DEFAULT_BACKEND_URL).unwrap();
        assert!(client.cached_history().await.is_none());

        client.store_history(Vec::new()).await;
        let cached = client.cached_history().await.expect("fresh entry");
        assert_eq!(cached.status, CacheStatus::Cached);

        client.expire_history().await;
        assert!(client.cached_history().await.is_none());
        let stale = client.cached_history_stale().await.expect("stale entry");
        assert_eq!(stale.status, CacheStatus::Stale);
    }

    #[tokio::test]
    async fn incomplete_saves_fail_before_any_request() {
        // Port 9 (discard) is never contacted: both checks run first.
        let client = BackendClient::with_base_url("http://127.0.0.1:9/").unwrap();
        let mut prediction = Prediction {
            result_id: None,
            is_fruit: true,
            fruit: "Apple".to_string(),
            fruit_conf: 0.9,
            ripeness: RipenessClass::Ripe,
            ripeness_conf: 0.8,
        };
        let reading = EnvironmentReading::new(Some(22.0), Some(60.0));
        assert!(matches!(
            client.save_analysis(&prediction, &reading).await,
            Err(BackendError::MissingResultId)
        ));

        prediction.result_id = Some("3".to_string());
        assert!(matches!(
            client
                .save_analysis(&prediction, &EnvironmentReading::new(Some(22.0), None))
                .await,
            Err(BackendError::MissingReading)
        ));
    }

    #[tokio::test]
    async fn zero_ttl_never_serves_cached_history() {
        let client = BackendClient::with_base_url(DEFAULT_BACKEND_URL)
            .unwrap()
            .with_ttl(Duration::ZERO);
        client.store_history(Vec::new()).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(client.cached_history().await.is_none());
        assert!(client.cached_history_stale().await.is_some());
    }
}
