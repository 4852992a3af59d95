//! Aggregations over the analysis history for the history table and dashboard.

use std::collections::HashMap;

use time::Date;

use super::entities::AnalysisRecord;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HistoryFilter {
    /// `None` means all fruit types.
    pub fruit: Option<String>,
    pub ripeness: Option<String>,
    /// Inclusive lower bound.
    pub from: Option<Date>,
    /// Inclusive upper bound.
    pub to: Option<Date>,
}

impl HistoryFilter {
    pub fn is_empty(&self) -> bool {
        self.fruit.is_none() && self.ripeness.is_none() && self.from.is_none() && self.to.is_none()
    }

    pub fn matches(&self, record: &AnalysisRecord) -> bool {
        if let Some(ref fruit) = self.fruit {
            if &record.fruit_type != fruit {
                return false;
            }
        }
        if let Some(ref ripeness) = self.ripeness {
            if &record.ripeness != ripeness {
                return false;
            }
        }
        if self.from.is_some() || self.to.is_some() {
            let Some(date) = record.date else {
                return false;
            };
            if self.from.map(|from| date < from).unwrap_or(false) {
                return false;
            }
            if self.to.map(|to| date > to).unwrap_or(false) {
                return false;
            }
        }
        true
    }

    pub fn apply<'a>(&self, records: &'a [AnalysisRecord]) -> Vec<&'a AnalysisRecord> {
        records.iter().filter(|record| self.matches(record)).collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GroupKey {
    Fruit,
    Ripeness,
    Source,
}

impl GroupKey {
    fn value<'a>(&self, record: &'a AnalysisRecord) -> &'a str {
        match self {
            Self::Fruit => &record.fruit_type,
            Self::Ripeness => &record.ripeness,
            Self::Source => &record.source,
        }
    }
}

/// Distinct values in first-seen order, for filter dropdowns.
pub fn distinct_values(records: &[AnalysisRecord], key: GroupKey) -> Vec<String> {
    let mut seen = Vec::<String>::new();
    for record in records {
        let value = key.value(record);
        if !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_string());
        }
    }
    seen
}

/// Counts per group in first-seen order.
pub fn distribution(records: &[&AnalysisRecord], key: GroupKey) -> Vec<(String, usize)> {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for record in records {
        let value = key.value(record);
        match counts.iter_mut().find(|(label, _)| label == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value.to_string(), 1)),
        }
    }
    counts
}

/// Fruit type by ripeness counts, keyed `(fruit, ripeness)` in first-seen order.
pub fn fruit_by_ripeness(records: &[&AnalysisRecord]) -> Vec<((String, String), usize)> {
    let mut counts: Vec<((String, String), usize)> = Vec::new();
    for record in records {
        let found = counts.iter_mut().find(|((fruit, ripeness), _)| {
            fruit == &record.fruit_type && ripeness == &record.ripeness
        });
        match found {
            Some((_, count)) => *count += 1,
            None => counts.push(((record.fruit_type.clone(), record.ripeness.clone()), 1)),
        }
    }
    counts
}

/// Analyses per day, ascending. Rows without a date are skipped.
pub fn daily_counts(records: &[&AnalysisRecord]) -> Vec<(Date, usize)> {
    let mut by_day: HashMap<Date, usize> = HashMap::new();
    for date in records.iter().filter_map(|record| record.date) {
        *by_day.entry(date).or_default() += 1;
    }
    let mut days: Vec<_> = by_day.into_iter().collect();
    days.sort_by_key(|(date, _)| *date);
    days
}

/// Analyses per day and fruit type, ascending by day; fruits keep first-seen order.
pub fn daily_counts_by_fruit(records: &[&AnalysisRecord]) -> Vec<(Date, String, usize)> {
    let mut counts: Vec<(Date, String, usize)> = Vec::new();
    for record in records {
        let Some(date) = record.date else {
            continue;
        };
        let found = counts
            .iter_mut()
            .find(|(day, fruit, _)| *day == date && fruit == &record.fruit_type);
        match found {
            Some((_, _, count)) => *count += 1,
            None => counts.push((date, record.fruit_type.clone(), 1)),
        }
    }
    counts.sort_by_key(|(date, _, _)| *date);
    counts
}

/// Min, mean and max of a confidence column, in percent.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConfidenceRange {
    pub min: f64,
    pub avg: f64,
    pub max: f64,
}

impl ConfidenceRange {
    fn from_values(values: &[f64]) -> Option<Self> {
        Some(Self {
            min: values.iter().copied().reduce(f64::min)?,
            avg: round1(mean(values.iter().copied())?),
            max: values.iter().copied().reduce(f64::max)?,
        })
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ConfidenceSummary {
    pub group: String,
    pub count: usize,
    pub fruit: ConfidenceRange,
    pub ripeness: ConfidenceRange,
}

/// Fruit and ripeness confidence per group, in first-seen group order.
pub fn confidence_by_group(records: &[&AnalysisRecord], key: GroupKey) -> Vec<ConfidenceSummary> {
    let mut groups: Vec<(String, Vec<f64>, Vec<f64>)> = Vec::new();
    for record in records {
        let value = key.value(record);
        let index = match groups.iter().position(|(label, _, _)| label == value) {
            Some(index) => index,
            None => {
                groups.push((value.to_string(), Vec::new(), Vec::new()));
                groups.len() - 1
            }
        };
        let (_, fruit, ripeness) = &mut groups[index];
        if record.fruit_confidence.is_finite() {
            fruit.push(record.fruit_confidence);
        }
        if record.ripeness_confidence.is_finite() {
            ripeness.push(record.ripeness_confidence);
        }
    }
    groups
        .into_iter()
        .filter_map(|(group, fruit, ripeness)| {
            Some(ConfidenceSummary {
                count: fruit.len().max(ripeness.len()),
                fruit: ConfidenceRange::from_values(&fruit)?,
                ripeness: ConfidenceRange::from_values(&ripeness)?,
                group,
            })
        })
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct DashboardMetrics {
    pub total_analyses: usize,
    pub avg_fruit_conf: Option<f64>,
    pub avg_ripeness_conf: Option<f64>,
    pub most_common_fruit: Option<String>,
    pub avg_temp: Option<f64>,
    pub avg_humidity: Option<f64>,
}

pub fn dashboard_metrics(records: &[&AnalysisRecord]) -> DashboardMetrics {
    let most_common_fruit = distribution(records, GroupKey::Fruit)
        .into_iter()
        .fold(None::<(String, usize)>, |best, (fruit, count)| match best {
            Some((_, best_count)) if best_count >= count => best,
            _ => Some((fruit, count)),
        })
        .map(|(fruit, _)| fruit);

    DashboardMetrics {
        total_analyses: records.len(),
        avg_fruit_conf: mean(records.iter().map(|r| r.fruit_confidence)).map(round1),
        avg_ripeness_conf: mean(records.iter().map(|r| r.ripeness_confidence)).map(round1),
        most_common_fruit,
        avg_temp: mean(records.iter().filter_map(|r| finite(r.temperature_c))).map(round1),
        avg_humidity: mean(records.iter().filter_map(|r| finite(r.humidity_pct))).map(round1),
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvironmentStats {
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub avg_temp: Option<f64>,
    pub min_hum: Option<f64>,
    pub max_hum: Option<f64>,
    pub avg_hum: Option<f64>,
    /// Pearson correlation over rows carrying both readings.
    pub correlation: Option<f64>,
}

pub fn environment_stats(records: &[&AnalysisRecord]) -> EnvironmentStats {
    let temps: Vec<f64> = records.iter().filter_map(|r| finite(r.temperature_c)).collect();
    let hums: Vec<f64> = records.iter().filter_map(|r| finite(r.humidity_pct)).collect();
    let pairs: Vec<(f64, f64)> = records
        .iter()
        .filter_map(|r| Some((finite(r.temperature_c)?, finite(r.humidity_pct)?)))
        .collect();

    EnvironmentStats {
        min_temp: temps.iter().copied().reduce(f64::min),
        max_temp: temps.iter().copied().reduce(f64::max),
        avg_temp: mean(temps.iter().copied()).map(round1),
        min_hum: hums.iter().copied().reduce(f64::min),
        max_hum: hums.iter().copied().reduce(f64::max),
        avg_hum: mean(hums.iter().copied()).map(round1),
        correlation: pearson(&pairs),
    }
}

/// Most recent row (by position) that carries a sensor reading.
pub fn latest_reading(records: &[AnalysisRecord]) -> Option<&AnalysisRecord> {
    records
        .iter()
        .rev()
        .find(|record| record.reading().complete().is_some())
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;
    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0usize), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
