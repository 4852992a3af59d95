use dioxus::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub struct DistributionEntry {
    pub label: String,
    pub count: usize,
    pub color: Option<&'static str>,
}

/// Share of the largest count, in percent, for the bar width.
pub fn bar_width(count: usize, max: usize) -> f64 {
    if max == 0 {
        0.0
    } else {
        count as f64 / max as f64 * 100.0
    }
}

#[component]
pub fn DistributionList(title: String, entries: Vec<DistributionEntry>) -> Element {
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    let total: usize = entries.iter().map(|e| e.count).sum();

    rsx! {
        div { class: "card",
            h3 { class: "label", "{title}" }
            if entries.is_empty() {
                p { class: "muted small", "No data yet." }
            }
            ul { class: "bars",
                for entry in entries {
                    li { class: "bar-row",
                        span { class: "bar-label", "{entry.label}" }
                        div { class: "bar-track",
                            div {
                                class: "bar-fill",
                                style: format!(
                                    "width: {:.1}%; background: {};",
                                    bar_width(entry.count, max),
                                    entry.color.unwrap_or("#6366f1")
                                ),
                            }
                        }
                        span { class: "bar-count", "{entry.count} ({percent_of(entry.count, total):.0}%)" }
                    }
                }
            }
        }
    }
}

fn percent_of(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn widths_scale_to_largest_bar() {
        assert_eq!(bar_width(5, 10), 50.0);
        assert_eq!(bar_width(10, 10), 100.0);
        assert_eq!(bar_width(3, 0), 0.0);
        assert_eq!(percent_of(1, 4), 25.0);
    }
}
