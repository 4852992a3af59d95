//! Shelf-life estimation from ripeness and storage conditions.
//!
//! - Base day ranges per ripeness class, scaled by a temperature/humidity band.
//! - Pure and stateless: safe to call from any thread, any number of times.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Ripeness stage reported by the classifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RipenessClass {
    Unripe,
    Ripe,
    Overripe,
    /// Any label outside the three known stages (e.g. "Not Fruit").
    Unknown(String),
}

impl RipenessClass {
    /// Exact match on the classifier's labels; anything else is `Unknown`.
    pub fn parse(label: &str) -> Self {
        match label {
            "Unripe" => Self::Unripe,
            "Ripe" => Self::Ripe,
            "Overripe" => Self::Overripe,
            _ => Self::Unknown(label.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Unripe => "Unripe",
            Self::Ripe => "Ripe",
            Self::Overripe => "Overripe",
            Self::Unknown(raw) => raw.as_str(),
        }
    }

    /// Inclusive base range in days, before environmental adjustment.
    pub fn base_days(&self) -> Option<(u32, u32)> {
        match self {
            Self::Unripe => Some((5, 7)),
            Self::Ripe => Some((2, 3)),
            Self::Overripe => Some((0, 0)),
            Self::Unknown(_) => None,
        }
    }
}

impl FromStr for RipenessClass {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for RipenessClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Temperature (°C) and relative humidity (%) from the sensor, each optional.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentReading {
    pub temperature_c: Option<f64>,
    pub humidity_pct: Option<f64>,
}

impl EnvironmentReading {
    pub fn new(temperature_c: Option<f64>, humidity_pct: Option<f64>) -> Self {
        Self {
            temperature_c,
            humidity_pct,
        }
    }

    /// Both readings, if present and finite.
    pub fn complete(&self) -> Option<(f64, f64)> {
        let temperature = self.temperature_c.filter(|t| t.is_finite())?;
        let humidity = self.humidity_pct.filter(|h| h.is_finite())?;
        Some((temperature, humidity))
    }
}

/// Multiplicative correction picked from the first matching band.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdjustmentFactor {
    Heat,
    Acceptable,
    Cool,
    Suboptimal,
}

impl AdjustmentFactor {
    pub fn for_conditions(temperature_c: f64, humidity_pct: f64) -> Self {
        if temperature_c > 30.0 {
            Self::Heat
        } else if (20.0..=30.0).contains(&temperature_c) && (50.0..=80.0).contains(&humidity_pct)
        {
            Self::Acceptable
        } else if temperature_c < 20.0 && (55.0..=65.0).contains(&humidity_pct) {
            Self::Cool
        } else {
            Self::Suboptimal
        }
    }

    pub fn value(&self) -> f64 {
        match self {
            Self::Heat => 0.6,
            Self::Acceptable => 1.0,
            Self::Cool => 1.2,
            Self::Suboptimal => 0.8,
        }
    }

    /// Scales one bound; rounds half away from zero and clamps at zero.
    pub fn apply(&self, days: u32) -> u32 {
        let scaled = (f64::from(days) * self.value()).round();
        if scaled <= 0.0 {
            0
        } else {
            scaled as u32
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShelfLifeEstimate {
    Range { low: u32, high: u32 },
    /// Overripe fruit: no usable shelf life left.
    Expired,
    NotApplicable,
}

impl fmt::Display for ShelfLifeEstimate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range { low, high } => write!(f, "{low}-{high} days"),
            Self::Expired => f.write_str("0 days"),
            Self::NotApplicable => f.write_str("N/A"),
        }
    }
}

/// Estimates remaining shelf life. Never fails: unknown ripeness yields `N/A`,
/// a missing (or non-finite) reading yields the unadjusted base range.
pub fn estimate(
    ripeness: &RipenessClass,
    temperature_c: Option<f64>,
    humidity_pct: Option<f64>,
) -> ShelfLifeEstimate {
    let Some((low, high)) = ripeness.base_days() else {
        return ShelfLifeEstimate::NotApplicable;
    };

    if *ripeness == RipenessClass::Overripe {
        return ShelfLifeEstimate::Expired;
    }

    let reading = EnvironmentReading::new(temperature_c, humidity_pct);
    let Some((temperature, humidity)) = reading.complete() else {
        return ShelfLifeEstimate::Range { low, high };
    };

    let factor = AdjustmentFactor::for_conditions(temperature, humidity);
    ShelfLifeEstimate::Range {
        low: factor.apply(low),
        high: factor.apply(high),
    }
}

pub fn estimate_for(ripeness: &RipenessClass, reading: &EnvironmentReading) -> ShelfLifeEstimate {
    estimate(ripeness, reading.temperature_c, reading.humidity_pct)
}

/// Storage condition grade shown next to the latest sensor reading.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConditionStatus {
    Optimal,
    Acceptable,
    Poor,
    Unknown,
}

impl ConditionStatus {
    pub fn from_reading(reading: &EnvironmentReading) -> Self {
        match reading.complete() {
            None => Self::Unknown,
            Some((temperature, humidity)) => {
                match AdjustmentFactor::for_conditions(temperature, humidity) {
                    AdjustmentFactor::Cool => Self::Optimal,
                    AdjustmentFactor::Acceptable => Self::Acceptable,
                    AdjustmentFactor::Heat | AdjustmentFactor::Suboptimal => Self::Poor,
                }
            }
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Self::Optimal => "Current conditions are optimal!",
            Self::Acceptable => "Current conditions are acceptable.",
            Self::Poor => "Current conditions need adjustment.",
            Self::Unknown => "No sensor reading yet.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn est(label: &str, temperature: Option<f64>, humidity: Option<f64>) -> String {
        estimate(&RipenessClass::parse(label), temperature, humidity).to_string()
    }

    #[test]
    fn base_ranges_without_readings() {
        assert_eq!(est("Unripe", None, None), "5-7 days");
        assert_eq!(est("Ripe", None, None), "2-3 days");
        assert_eq!(est("Overripe", None, None), "0 days");
    }

    #[test]
    fn overripe_ignores_environment() {
        for (t, h) in [(Some(5.0), Some(60.0)), (Some(35.0), Some(90.0)), (None, Some(50.0))] {
            assert_eq!(est("Overripe", t, h), "0 days");
        }
    }

    #[test]
    fn unknown_ripeness_is_not_applicable() {
        assert_eq!(est("Not Fruit", Some(25.0), Some(60.0)), "N/A");
        assert_eq!(est("", None, None), "N/A");
        assert_eq!(est("rotten", Some(10.0), None), "N/A");
    }

    #[test]
    fn label_variants_are_not_applicable() {
        for label in ["ripe", "UNRIPE", " Overripe ", "overripe"] {
            assert_eq!(est(label, None, None), "N/A", "label {label:?}");
            assert_eq!(est(label, Some(15.0), Some(60.0)), "N/A", "label {label:?}");
        }
    }

    #[test]
    fn parse_is_exact_and_keeps_raw_label() {
        assert_eq!(RipenessClass::parse("Ripe"), RipenessClass::Ripe);
        assert_eq!(RipenessClass::parse("Overripe"), RipenessClass::Overripe);
        assert_eq!(
            RipenessClass::parse(" Overripe "),
            RipenessClass::Unknown(" Overripe ".to_string())
        );
        let unknown = RipenessClass::parse("Not Fruit");
        assert!(matches!(unknown, RipenessClass::Unknown(_)));
        assert_eq!(unknown.label(), "Not Fruit");
    }

    #[test]
    fn upper_edge_of_acceptable_band() {
        assert_eq!(est("Unripe", Some(30.0), Some(80.0)), "5-7 days");
    }

    #[test]
    fn heat_band() {
        assert_eq!(est("Unripe", Some(31.0), Some(60.0)), "3-4 days");
    }

    #[test]
    fn heat_takes_priority_over_cool_humidity() {
        assert_eq!(
            AdjustmentFactor::for_conditions(35.0, 60.0),
            AdjustmentFactor::Heat
        );
        assert_eq!(est("Ripe", Some(35.0), Some(60.0)), "1-2 days");
    }

    #[test]
    fn cool_band_extends() {
        assert_eq!(est("Ripe", Some(15.0), Some(60.0)), "2-4 days");
    }

    #[test]
    fn outside_named_bands_is_suboptimal() {
        assert_eq!(est("Ripe", Some(25.0), Some(40.0)), "2-2 days");
        assert_eq!(
            AdjustmentFactor::for_conditions(10.0, 90.0),
            AdjustmentFactor::Suboptimal
        );
    }

    #[test]
    fn missing_humidity_returns_base() {
        assert_eq!(est("Unripe", Some(25.0), None), "5-7 days");
        assert_eq!(est("Ripe", None, Some(60.0)), "2-3 days");
    }

    #[test]
    fn non_finite_reading_counts_as_missing() {
        assert_eq!(est("Unripe", Some(f64::NAN), Some(60.0)), "5-7 days");
        assert_eq!(est("Ripe", Some(25.0), Some(f64::INFINITY)), "2-3 days");
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        assert_eq!(AdjustmentFactor::Heat.apply(5), 3);
        assert_eq!(AdjustmentFactor::Cool.apply(3), 4);
        assert_eq!(AdjustmentFactor::Suboptimal.apply(5), 4);
        assert_eq!(AdjustmentFactor::Cool.apply(5), 6);
        assert_eq!(AdjustmentFactor::Heat.apply(0), 0);
    }

    #[test]
    fn adjusted_range_never_inverts() {
        let temperatures = [-10.0, 0.0, 15.0, 19.9, 20.0, 25.0, 30.0, 30.1, 45.0];
        let humidities = [0.0, 49.9, 50.0, 55.0, 60.0, 65.0, 80.0, 80.1, 100.0];
        for label in ["Unripe", "Ripe", "Overripe"] {
            for t in temperatures {
                for h in humidities {
                    let estimate = estimate(&RipenessClass::parse(label), Some(t), Some(h));
                    match estimate {
                        ShelfLifeEstimate::Range { low, high } => {
                            assert!(low <= high, "{label} at {t}C/{h}% gave {estimate}");
                        }
                        ShelfLifeEstimate::Expired => assert_eq!(label, "Overripe"),
                        ShelfLifeEstimate::NotApplicable => panic!("{label} has no estimate"),
                    }
                }
            }
        }
    }

    #[test]
    fn condition_status_follows_bands() {
        let status = |t, h| ConditionStatus::from_reading(&EnvironmentReading::new(t, h));
        assert_eq!(status(Some(15.0), Some(60.0)), ConditionStatus::Optimal);
        assert_eq!(status(Some(25.0), Some(60.0)), ConditionStatus::Acceptable);
        assert_eq!(status(Some(33.0), Some(60.0)), ConditionStatus::Poor);
        assert_eq!(status(Some(25.0), Some(20.0)), ConditionStatus::Poor);
        assert_eq!(status(None, Some(60.0)), ConditionStatus::Unknown);
    }
}
