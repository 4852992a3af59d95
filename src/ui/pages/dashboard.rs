use dioxus::prelude::*;

use crate::{
    domain::{
        confidence_by_group, daily_counts, daily_counts_by_fruit, dashboard_metrics,
        distribution, environment_stats, fruit_by_ripeness, latest_reading, AppState,
        ConditionStatus, ConfidenceSummary, DashboardMetrics, EnvironmentReading,
        EnvironmentStats, GroupKey,
    },
    ui::{
        components::{
            distribution_list::{DistributionEntry, DistributionList},
            kpi_card::{metric_or_dash, KpiCard},
        },
        theme,
    },
};

#[component]
pub fn DashboardPage() -> Element {
    let state = use_context::<Signal<AppState>>();

    let view = state.with(|st| {
        let rows = st.filtered_history();
        let latest = latest_reading(&st.history).map(|record| record.reading());
        DashboardView {
            metrics: dashboard_metrics(&rows),
            environment: environment_stats(&rows),
            by_fruit: entries(distribution(&rows, GroupKey::Fruit), false),
            by_ripeness: entries(distribution(&rows, GroupKey::Ripeness), true),
            by_source: entries(distribution(&rows, GroupKey::Source), false),
            cross: fruit_by_ripeness(&rows)
                .into_iter()
                .map(|((fruit, ripeness), count)| DistributionEntry {
                    color: Some(theme::ripeness_color(&ripeness)),
                    label: format!("{fruit} · {ripeness}"),
                    count,
                })
                .collect(),
            daily: daily_counts(&rows)
                .into_iter()
                .map(|(date, count)| DistributionEntry {
                    label: date.to_string(),
                    count,
                    color: None,
                })
                .collect(),
            daily_by_fruit: daily_counts_by_fruit(&rows)
                .into_iter()
                .map(|(date, fruit, count)| DistributionEntry {
                    label: format!("{date} · {fruit}"),
                    count,
                    color: None,
                })
                .collect(),
            confidence_by_fruit: confidence_by_group(&rows, GroupKey::Fruit),
            confidence_by_ripeness: confidence_by_group(&rows, GroupKey::Ripeness),
            latest,
            filtered: !st.history_filter.is_empty(),
        }
    });

    let metrics = view.metrics;
    let env = view.environment;
    let status = view
        .latest
        .map(|reading| ConditionStatus::from_reading(&reading))
        .unwrap_or(ConditionStatus::Unknown);
    let latest_label = view
        .latest
        .and_then(|reading| reading.complete())
        .map(|(t, h)| format!("{t:.1} °C · {h:.1} %"));
    let env_rows = [
        (
            "Temperature (°C)",
            [env.min_temp, env.avg_temp, env.max_temp].map(|v| metric_or_dash(v, "")),
        ),
        (
            "Humidity (%)",
            [env.min_hum, env.avg_hum, env.max_hum].map(|v| metric_or_dash(v, "")),
        ),
    ];
    let correlation = env
        .correlation
        .map(|r| format!("{r:.2}"))
        .unwrap_or_else(|| "-".to_string());

    rsx! {
        section { class: "stack",
            h2 { "Dashboard" }
            if view.filtered {
                p { class: "muted small", "Figures follow the filters set on the History page." }
            }

            div { class: "grid",
                KpiCard { title: "Total analyses", value: metrics.total_analyses.to_string() }
                KpiCard {
                    title: "Avg. fruit confidence",
                    value: metric_or_dash(metrics.avg_fruit_conf, "%"),
                }
                KpiCard {
                    title: "Avg. ripeness confidence",
                    value: metric_or_dash(metrics.avg_ripeness_conf, "%"),
                }
                KpiCard {
                    title: "Most common fruit",
                    value: metrics.most_common_fruit.clone().unwrap_or_else(|| "-".to_string()),
                }
                KpiCard { title: "Avg. temperature", value: metric_or_dash(metrics.avg_temp, " °C") }
                KpiCard { title: "Avg. humidity", value: metric_or_dash(metrics.avg_humidity, " %") }
            }

            div { class: "card",
                h3 { class: "label", "Storage conditions" }
                p { class: "{theme::condition_class(status)}",
                    "{theme::condition_icon(status)} {status.message()}"
                }
                if let Some(label) = latest_label {
                    p { class: "small", "Latest reading: {label}" }
                }
                table { class: "compact",
                    thead {
                        tr { th {} th { "Min" } th { "Avg" } th { "Max" } }
                    }
                    tbody {
                        for (label, [min, avg, max]) in env_rows {
                            tr {
                                td { "{label}" }
                                td { "{min}" }
                                td { "{avg}" }
                                td { "{max}" }
                            }
                        }
                    }
                }
                p { class: "muted small", "Temperature/humidity correlation: {correlation}" }
            }

            div { class: "grid",
                DistributionList { title: "Fruit types", entries: view.by_fruit }
                DistributionList { title: "Ripeness levels", entries: view.by_ripeness }
                DistributionList { title: "Sources", entries: view.by_source }
                DistributionList { title: "Fruit by ripeness", entries: view.cross }
            }
            div { class: "grid",
                ConfidenceTable { title: "Confidence by fruit", rows: view.confidence_by_fruit }
                ConfidenceTable { title: "Confidence by ripeness", rows: view.confidence_by_ripeness }
            }
            DistributionList { title: "Analyses per day", entries: view.daily }
            DistributionList { title: "Fruit analyses per day", entries: view.daily_by_fruit }
        }
    }
}

struct DashboardView {
    metrics: DashboardMetrics,
    environment: EnvironmentStats,
    by_fruit: Vec<DistributionEntry>,
    by_ripeness: Vec<DistributionEntry>,
    by_source: Vec<DistributionEntry>,
    cross: Vec<DistributionEntry>,
    daily: Vec<DistributionEntry>,
    daily_by_fruit: Vec<DistributionEntry>,
    confidence_by_fruit: Vec<ConfidenceSummary>,
    confidence_by_ripeness: Vec<ConfidenceSummary>,
    latest: Option<EnvironmentReading>,
    filtered: bool,
}

/// Fruit and ripeness confidence (min / avg / max) per group.
#[component]
fn ConfidenceTable(title: String, rows: Vec<ConfidenceSummary>) -> Element {
    rsx! {
        div { class: "card",
            h3 { class: "label", "{title}" }
            if rows.is_empty() {
                p { class: "muted small", "No data yet." }
            } else {
                table { class: "compact",
                    thead {
                        tr {
                            th { "Group" }
                            th { "n" }
                            th { "Fruit conf. (min / avg / max)" }
                            th { "Ripeness conf. (min / avg / max)" }
                        }
                    }
                    tbody {
                        for row in rows {
                            tr {
                                td { "{row.group}" }
                                td { "{row.count}" }
                                td { "{row.fruit.min:.1} / {row.fruit.avg:.1} / {row.fruit.max:.1}" }
                                td { "{row.ripeness.min:.1} / {row.ripeness.avg:.1} / {row.ripeness.max:.1}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

fn entries(counts: Vec<(String, usize)>, ripeness_colors: bool) -> Vec<DistributionEntry> {
    counts
        .into_iter()
        .map(|(label, count)| DistributionEntry {
            color: ripeness_colors.then(|| theme::ripeness_color(&label)),
            label,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ripeness_entries_carry_badge_colors() {
        let built = entries(vec![("Ripe".to_string(), 3), ("Unripe".to_string(), 1)], true);
        assert_eq!(built[0].color, Some("#FFD700"));
        assert_eq!(built[1].count, 1);
        assert!(entries(vec![("Upload".to_string(), 2)], false)[0].color.is_none());
    }
}
