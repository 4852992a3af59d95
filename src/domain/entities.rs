use serde::{Deserialize, Serialize};
use time::Date;

use super::shelf_life::{estimate_for, EnvironmentReading, RipenessClass, ShelfLifeEstimate};

/// Fruit confidence (percent) below which a history row is flagged.
pub const LOW_CONFIDENCE_PCT: f64 = 50.0;

pub const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:5000/";

/// Classifier output for one submitted image.
#[derive(Clone, Debug, PartialEq)]
pub struct Prediction {
    /// Identifier the backend assigned to the stored row, when it returns one.
    pub result_id: Option<String>,
    pub is_fruit: bool,
    pub fruit: String,
    /// Probability in `0.0..=1.0`.
    pub fruit_conf: f64,
    pub ripeness: RipenessClass,
    /// Probability in `0.0..=1.0`.
    pub ripeness_conf: f64,
}

impl Prediction {
    pub fn fruit_percent(&self) -> f64 {
        self.fruit_conf * 100.0
    }

    pub fn ripeness_percent(&self) -> f64 {
        self.ripeness_conf * 100.0
    }

    pub fn shelf_life(&self, reading: &EnvironmentReading) -> ShelfLifeEstimate {
        if !self.is_fruit {
            return ShelfLifeEstimate::NotApplicable;
        }
        estimate_for(&self.ripeness, reading)
    }
}

/// One row of the backend's analysis history.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalysisRecord {
    pub id: String,
    /// Timestamp exactly as the backend stored it.
    pub timestamp: String,
    pub date: Option<Date>,
    pub fruit_type: String,
    /// Percent, `0.0..=100.0`.
    pub fruit_confidence: f64,
    pub ripeness: String,
    /// Percent, `0.0..=100.0`.
    pub ripeness_confidence: f64,
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
    pub shelf_life: Option<String>,
    pub source: String,
}

impl AnalysisRecord {
    pub fn reading(&self) -> EnvironmentReading {
        EnvironmentReading::new(self.temperature_c, self.humidity_pct)
    }

    pub fn is_low_confidence(&self) -> bool {
        self.fruit_confidence < LOW_CONFIDENCE_PCT
    }

    pub fn shelf_life_label(&self) -> &str {
        self.shelf_life
            .as_deref()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or("N/A")
    }
}

/// Body of `POST /update_result`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResultUpdate {
    pub result_id: String,
    pub temperature: f64,
    pub humidity: f64,
    pub shelf_life: String,
}

impl ResultUpdate {
    /// `None` without a backend-assigned id or a complete sensor reading.
    pub fn for_prediction(prediction: &Prediction, reading: &EnvironmentReading) -> Option<Self> {
        let result_id = prediction.result_id.clone()?;
        let (temperature, humidity) = reading.complete()?;
        Some(Self {
            result_id,
            temperature,
            humidity,
            shelf_life: prediction.shelf_life(reading).to_string(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BackendSettings {
    pub base_url: String,
    /// Offer the sensor read button on the analyze page.
    #[serde(default = "default_true")]
    pub sensor_enabled: bool,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BACKEND_URL.to_string(),
            sensor_enabled: true,
        }
    }
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(ripeness: &str, result_id: Option<&str>) -> Prediction {
        Prediction {
            result_id: result_id.map(str::to_string),
            is_fruit: true,
            fruit: "Apple".to_string(),
            fruit_conf: 0.91,
            ripeness: RipenessClass::parse(ripeness),
            ripeness_conf: 0.87,
        }
    }

    #[test]
    fn update_carries_estimate_for_reading() {
        let reading = EnvironmentReading::new(Some(31.0), Some(60.0));
        let update = ResultUpdate::for_prediction(&prediction("Unripe", Some("42")), &reading)
            .expect("result id present");
        assert_eq!(update.result_id, "42");
        assert_eq!(update.shelf_life, "3-4 days");
        assert_eq!(update.temperature, 31.0);

        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["shelf_life"], "3-4 days");
        assert_eq!(json["humidity"], 60.0);
    }

    #[test]
    fn update_requires_result_id() {
        let reading = EnvironmentReading::new(Some(22.0), Some(60.0));
        assert!(ResultUpdate::for_prediction(&prediction("Ripe", None), &reading).is_none());
    }

    #[test]
    fn update_requires_complete_reading() {
        let ripe = prediction("Ripe", Some("5"));
        for reading in [
            EnvironmentReading::default(),
            EnvironmentReading::new(Some(22.0), None),
            EnvironmentReading::new(Some(f64::NAN), Some(60.0)),
        ] {
            assert!(ResultUpdate::for_prediction(&ripe, &reading).is_none());
        }
        let update = ResultUpdate::for_prediction(&ripe, &EnvironmentReading::new(Some(22.0), Some(60.0)))
            .expect("complete reading");
        let json = serde_json::to_value(&update).unwrap();
        assert!(json["temperature"].is_number());
        assert!(json["humidity"].is_number());
    }

    #[test]
    fn non_fruit_has_no_shelf_life() {
        let mut not_fruit = prediction("Not Fruit", Some("7"));
        not_fruit.is_fruit = false;
        let estimate = not_fruit.shelf_life(&EnvironmentReading::default());
        assert_eq!(estimate.to_string(), "N/A");
    }

    #[test]
    fn confidence_percentages() {
        let p = prediction("Ripe", None);
        approx::assert_relative_eq!(p.fruit_percent(), 91.0, epsilon = 1e-9);
        approx::assert_relative_eq!(p.ripeness_percent(), 87.0, epsilon = 1e-9);
    }

    #[test]
    fn settings_default_to_local_backend() {
        let settings: BackendSettings =
            serde_json::from_str(r#"{"base_url":"http://10.0.0.2:5000/"}"#).unwrap();
        assert!(settings.sensor_enabled);
        assert_eq!(BackendSettings::default().base_url, DEFAULT_BACKEND_URL);
    }
}
