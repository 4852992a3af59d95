use dioxus::prelude::*;

use super::ripeness_badge::RipenessBadge;
use crate::domain::AnalysisRecord;

#[derive(Clone, Debug, PartialEq)]
pub struct HistoryRow {
    pub id: String,
    pub timestamp: String,
    pub fruit: String,
    pub fruit_confidence: String,
    pub ripeness: String,
    pub ripeness_confidence: String,
    pub temperature: String,
    pub humidity: String,
    pub shelf_life: String,
    pub source: String,
    pub low_confidence: bool,
}

impl From<&AnalysisRecord> for HistoryRow {
    fn from(record: &AnalysisRecord) -> Self {
        Self {
            id: record.id.clone(),
            timestamp: record.timestamp.clone(),
            fruit: record.fruit_type.clone(),
            fruit_confidence: format!("{}%", record.fruit_confidence),
            ripeness: record.ripeness.clone(),
            ripeness_confidence: format!("{}%", record.ripeness_confidence),
            temperature: reading_label(record.temperature_c),
            humidity: reading_label(record.humidity_pct),
            shelf_life: record.shelf_life_label().to_string(),
            source: record.source.clone(),
            low_confidence: record.is_low_confidence(),
        }
    }
}

fn reading_label(value: Option<f64>) -> String {
    value
        .filter(|v| v.is_finite())
        .map(|v| format!("{v:.1}"))
        .unwrap_or_else(|| "N/A".to_string())
}

#[component]
pub fn HistoryTable(rows: Vec<HistoryRow>) -> Element {
    rsx! {
        div { class: "card table-container",
            table {
                thead {
                    tr {
                        th { "ID" }
                        th { "Timestamp" }
                        th { "Fruit" }
                        th { "Fruit Conf." }
                        th { "Ripeness" }
                        th { "Ripeness Conf." }
                        th { "Temp (°C)" }
                        th { "Humidity (%)" }
                        th { "Shelf Life" }
                        th { "Source" }
                    }
                }
                tbody {
                    if rows.is_empty() {
                        tr {
                            td { class: "centered muted", colspan: "10", "No data available" }
                        }
                    }
                    for row in rows {
                        tr {
                            class: if row.low_confidence { "low-confidence" } else { "" },
                            td { "{row.id}" }
                            td { "{row.timestamp}" }
                            td { "{row.fruit}" }
                            td { "{row.fruit_confidence}" }
                            td { RipenessBadge { label: row.ripeness.clone() } }
                            td { "{row.ripeness_confidence}" }
                            td { "{row.temperature}" }
                            td { "{row.humidity}" }
                            td { "{row.shelf_life}" }
                            td { "{row.source}" }
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_labels() {
        let record = AnalysisRecord {
            id: "9".to_string(),
            timestamp: "2024-05-01 09:30:00".to_string(),
            date: None,
            fruit_type: "Apple".to_string(),
            fruit_confidence: 42.5,
            ripeness: "Ripe".to_string(),
            ripeness_confidence: 90.0,
            temperature_c: Some(21.26),
            humidity_pct: None,
            shelf_life: Some(String::new()),
            source: "Upload".to_string(),
        };
        let row = HistoryRow::from(&record);
        assert_eq!(row.fruit_confidence, "42.5%");
        assert_eq!(row.temperature, "21.3");
        assert_eq!(row.humidity, "N/A");
        assert_eq!(row.shelf_life, "N/A");
        assert!(row.low_confidence);
    }
}
