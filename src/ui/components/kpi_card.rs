use dioxus::prelude::*;

#[component]
pub fn KpiCard(title: String, value: String, description: Option<String>) -> Element {
    rsx! {
        div {
            class: "card kpi",
            h3 { class: "label", "{title}" }
            p { class: "kpi-value", "{value}" }
            if let Some(desc) = description {
                p { class: "muted small", "{desc}" }
            }
        }
    }
}

/// `"-"` for metrics that have no data yet.
pub fn metric_or_dash(value: Option<f64>, unit: &str) -> String {
    value
        .map(|v| format!("{v:.1}{unit}"))
        .unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_metric_renders_dash() {
        assert_eq!(metric_or_dash(None, "%"), "-");
        assert_eq!(metric_or_dash(Some(21.04), "°C"), "21.0°C");
    }
}
