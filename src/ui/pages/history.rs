use dioxus::prelude::*;
use time::{macros::format_description, Date};

use crate::{
    app::{request_history_refresh, HistoryRequest},
    domain::{distinct_values, AppState, GroupKey, HistoryFilter},
    infra::backend::BackendClient,
    ui::{
        components::{
            history_table::{HistoryRow, HistoryTable},
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

const ALL: &str = "All";

#[component]
pub fn HistoryPage() -> Element {
    let mut state = use_context::<Signal<AppState>>();
    let client = use_context::<Signal<Option<BackendClient>>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let history_request = use_context::<HistoryRequest>();

    let (fruits, ripeness_levels, filter, rows, total) = state.with(|st| {
        let rows = st
            .filtered_history()
            .into_iter()
            .map(HistoryRow::from)
            .collect::<Vec<_>>();
        (
            distinct_values(&st.history, GroupKey::Fruit),
            distinct_values(&st.history, GroupKey::Ripeness),
            st.history_filter.clone(),
            rows,
            st.history.len(),
        )
    });
    let shown = rows.len();
    let low_confidence = rows.iter().filter(|row| row.low_confidence).count();
    let csv_url = client.with(|c| {
        c.as_ref()
            .and_then(|c| c.csv_download_url().ok())
            .map(|url| url.to_string())
    });

    let on_refresh = move |_| {
        request_history_refresh(history_request);
        push_toast(toasts, ToastKind::Info, "Refreshing history...");
    };

    let on_clear_filters = move |_| {
        state.with_mut(|st| st.history_filter = HistoryFilter::default());
    };

    let from_value = filter.from.map(date_input_value).unwrap_or_default();
    let to_value = filter.to.map(date_input_value).unwrap_or_default();
    let fruit_value = filter.fruit.clone().unwrap_or_else(|| ALL.to_string());
    let ripeness_value = filter.ripeness.clone().unwrap_or_else(|| ALL.to_string());

    rsx! {
        section { class: "stack",
            div { class: "page-header",
                h2 { "Analysis history" }
                div { class: "actions",
                    button { class: "{theme::btn(false)}", onclick: on_refresh, "🔄 Refresh" }
                    if let Some(url) = csv_url {
                        a {
                            class: "{theme::btn(true)}",
                            href: "{url}",
                            target: "_blank",
                            rel: "noreferrer",
                            "⬇️ Download CSV"
                        }
                    }
                }
            }

            div { class: "card filters",
                div {
                    label { class: "label", "Fruit" }
                    select {
                        class: "input",
                        value: "{fruit_value}",
                        onchange: move |evt| {
                            let choice = selection(evt.value());
                            state.with_mut(|st| st.history_filter.fruit = choice);
                        },
                        option { value: ALL, "All" }
                        for fruit in fruits {
                            option { value: "{fruit}", selected: fruit == fruit_value, "{fruit}" }
                        }
                    }
                }
                div {
                    label { class: "label", "Ripeness" }
                    select {
                        class: "input",
                        value: "{ripeness_value}",
                        onchange: move |evt| {
                            let choice = selection(evt.value());
                            state.with_mut(|st| st.history_filter.ripeness = choice);
                        },
                        option { value: ALL, "All" }
                        for level in ripeness_levels {
                            option { value: "{level}", selected: level == ripeness_value, "{level}" }
                        }
                    }
                }
                div {
                    label { class: "label", "From" }
                    input {
                        class: "input",
                        r#type: "date",
                        value: "{from_value}",
                        oninput: move |evt| {
                            let date = parse_date_input(&evt.value());
                            state.with_mut(|st| st.history_filter.from = date);
                        },
                    }
                }
                div {
                    label { class: "label", "To" }
                    input {
                        class: "input",
                        r#type: "date",
                        value: "{to_value}",
                        oninput: move |evt| {
                            let date = parse_date_input(&evt.value());
                            state.with_mut(|st| st.history_filter.to = date);
                        },
                    }
                }
                if !filter.is_empty() {
                    button { class: "link small", onclick: on_clear_filters, "Clear filters" }
                }
            }

            p { class: "muted small",
                "Showing {shown} of {total} analyses."
                if low_confidence > 0 {
                    " {low_confidence} highlighted rows have fruit confidence below 50%."
                }
            }
            HistoryTable { rows }
        }
    }
}

fn selection(value: String) -> Option<String> {
    if value.is_empty() || value == ALL {
        None
    } else {
        Some(value)
    }
}

/// Date inputs report `YYYY-MM-DD`, or an empty string once cleared.
fn parse_date_input(value: &str) -> Option<Date> {
    let format = format_description!("[year]-[month]-[day]");
    Date::parse(value.trim(), format).ok()
}

fn date_input_value(date: Date) -> String {
    let format = format_description!("[year]-[month]-[day]");
    date.format(format).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn all_option_clears_selection() {
        assert_eq!(selection(ALL.to_string()), None);
        assert_eq!(selection(String::new()), None);
        assert_eq!(selection("Banana".to_string()), Some("Banana".to_string()));
    }

    #[test]
    fn date_inputs() {
        assert_eq!(parse_date_input("2024-05-01"), Some(date!(2024 - 05 - 01)));
        assert_eq!(parse_date_input(""), None);
        assert_eq!(date_input_value(date!(2024 - 05 - 01)), "2024-05-01");
    }
}
