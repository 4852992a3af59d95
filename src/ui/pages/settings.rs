use std::time::SystemTime;

use dioxus::prelude::*;

use crate::{
    app::{current_client, persist_user_state, rebuild_client},
    domain::{AppState, BackendSettings, CacheResource},
    infra::backend::{normalize_base_url, BackendClient, BASE_URL_ENV},
    ui::{
        components::toast::{push_toast, ToastKind, ToastMessage},
        theme,
    },
};

#[component]
pub fn SettingsPage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let client = use_context::<Signal<Option<BackendClient>>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();

    let initial = state.with(|st| st.settings.clone());
    let mut base_url_input = use_signal(|| initial.base_url.clone());
    let mut sensor_enabled = use_signal(|| initial.sensor_enabled);

    let effective_url = client.with(|c| c.as_ref().map(|c| c.base_url().to_string()));
    let env_override = std::env::var(BASE_URL_ENV)
        .ok()
        .filter(|value| !value.trim().is_empty());

    let cache_entries = state.with(|st| {
        st.cache
            .iter()
            .map(|(resource, time)| (cache_label(resource), humanize_age(*time)))
            .collect::<Vec<_>>()
    });

    let on_apply = {
        let mut state = state.clone();
        move |_| match parse_settings(&base_url_input(), sensor_enabled()) {
            Ok(settings) => {
                state.with_mut(|st| st.settings = settings);
                persist_user_state(&state);
                rebuild_client(&state, client, toasts);
                push_toast(toasts, ToastKind::Success, "Saved backend settings.");
            }
            Err(message) => push_toast(toasts, ToastKind::Error, message),
        }
    };

    let on_reset = {
        let mut state = state.clone();
        move |_| {
            let defaults = BackendSettings::default();
            base_url_input.set(defaults.base_url.clone());
            sensor_enabled.set(defaults.sensor_enabled);
            state.with_mut(|st| st.settings = defaults);
            persist_user_state(&state);
            rebuild_client(&state, client, toasts);
            push_toast(toasts, ToastKind::Info, "Restored default backend settings.");
        }
    };

    let on_clear_cache = {
        let mut state = state.clone();
        move |_| {
            state.with_mut(|st| st.cache.clear());
            if let Some(client) = current_client(client, toasts) {
                spawn(async move {
                    client.clear_cache().await;
                });
            }
            push_toast(
                toasts,
                ToastKind::Info,
                "Cleared cached history. Data will refresh on next fetch.",
            );
        }
    };

    rsx! {
        section { class: "stack",
            div { class: "card stack",
                h2 { class: "label", "Backend" }
                div {
                    label { class: "label", r#for: "base-url", "Server URL" }
                    input {
                        id: "base-url",
                        class: "input",
                        value: base_url_input(),
                        oninput: move |evt| base_url_input.set(evt.value()),
                        placeholder: "http://127.0.0.1:5000/",
                    }
                }
                label { class: "checkbox",
                    input {
                        r#type: "checkbox",
                        checked: sensor_enabled(),
                        onchange: move |evt| sensor_enabled.set(evt.checked()),
                    }
                    " Offer sensor readings on the Analyze page"
                }
                if let Some(url) = effective_url {
                    p { class: "muted small", "Requests go to {url}" }
                }
                if let Some(value) = env_override {
                    p { class: "warning small", "{BASE_URL_ENV} is set to {value} and overrides the URL above." }
                }
                div { class: "actions",
                    button { class: "{theme::btn(true)}", onclick: on_apply, "Apply" }
                    button { class: "{theme::btn(false)}", onclick: on_reset, "Reset Defaults" }
                }
            }

            div { class: "card stack",
                h2 { class: "label", "Cache Status" }
                if cache_entries.is_empty() {
                    p { class: "muted small", "No cached fetches yet." }
                } else {
                    ul { class: "cache-list",
                        for (label, age) in cache_entries {
                            li {
                                span { "{label}" }
                                span { class: "muted small", "{age}" }
                            }
                        }
                    }
                }
                div { class: "actions",
                    button { class: "{theme::btn(false)}", onclick: on_clear_cache, "Clear Cache" }
                }
            }
        }
    }
}

fn parse_settings(base_url: &str, sensor_enabled: bool) -> Result<BackendSettings, String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err("Server URL cannot be empty".to_string());
    }
    let url = normalize_base_url(trimmed).map_err(|err| format!("Invalid server URL: {err}"))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err("Server URL must start with http:// or https://".to_string());
    }
    Ok(BackendSettings {
        base_url: url.to_string(),
        sensor_enabled,
    })
}

fn cache_label(resource: &CacheResource) -> &'static str {
    match resource {
        CacheResource::History => "History",
        CacheResource::SensorReading => "Sensor reading",
    }
}

fn humanize_age(updated_at: SystemTime) -> String {
    let age = SystemTime::now()
        .duration_since(updated_at)
        .unwrap_or_default()
        .as_secs();
    if age < 60 {
        format!("{age}s ago")
    } else if age < 3_600 {
        format!("{}m ago", age / 60)
    } else if age < 86_400 {
        format!("{}h ago", age / 3_600)
    } else {
        format!("{}d ago", age / 86_400)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn settings_validation() {
        let parsed = parse_settings(" http://10.0.0.5:5000 ", false).unwrap();
        assert_eq!(parsed.base_url, "http://10.0.0.5:5000/");
        assert!(!parsed.sensor_enabled);
        assert!(parse_settings("", true).is_err());
        assert!(parse_settings("not a url", true).is_err());
        assert!(parse_settings("ftp://host/", true).is_err());
    }

    #[test]
    fn ages_are_humanized() {
        let now = SystemTime::now();
        assert_eq!(humanize_age(now + Duration::from_secs(5)), "0s ago");
        assert_eq!(humanize_age(now - Duration::from_secs(120)), "2m ago");
        assert_eq!(humanize_age(now - Duration::from_secs(7_200)), "2h ago");
        assert_eq!(humanize_age(now - Duration::from_secs(3 * 86_400)), "3d ago");
    }
}
