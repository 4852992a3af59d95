use dioxus::prelude::*;

/// Confidence in percent, shown with two decimals and a level.
#[component]
pub fn ConfidenceBadge(percent: f64) -> Element {
    let (label, class) = confidence_level(percent);
    let percent = format!("{percent:.2}%");

    rsx! {
        span {
            class: "badge {class}",
            title: "{label} confidence",
            "{percent}"
        }
    }
}

fn confidence_level(value: f64) -> (&'static str, &'static str) {
    match value {
        v if v >= 75.0 => ("High", "confidence-high"),
        v if v >= 50.0 => ("Medium", "confidence-medium"),
        v if v > 0.0 => ("Low", "confidence-low"),
        _ => ("N/A", "confidence-none"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels() {
        assert_eq!(confidence_level(90.0).0, "High");
        assert_eq!(confidence_level(50.0).0, "Medium");
        assert_eq!(confidence_level(20.0).0, "Low");
        assert_eq!(confidence_level(0.0).0, "N/A");
    }
}
