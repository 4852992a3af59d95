use std::path::PathBuf;

use dioxus::prelude::*;

use crate::{
    app::{current_client, request_history_refresh, HistoryRequest},
    domain::{AnalysisSession, AppState, CacheResource},
    infra::backend::{BackendClient, BackendError},
    ui::{
        components::{
            shelf_life_card::ShelfLifeCard,
            toast::{push_toast, ToastKind, ToastMessage},
        },
        theme,
    },
};

#[component]
pub fn AnalyzePage() -> Element {
    let state = use_context::<Signal<AppState>>();
    let client = use_context::<Signal<Option<BackendClient>>>();
    let toasts = use_context::<Signal<Vec<ToastMessage>>>();
    let history_request = use_context::<HistoryRequest>();

    let mut image_path = use_signal(String::new);
    let busy = use_signal(|| false);

    let session = state.with(|st| st.session.clone());
    let sensor_enabled = state.with(|st| st.settings.sensor_enabled);

    let on_submit = {
        let state = state.clone();
        let toasts = toasts.clone();
        move |evt: FormEvent| {
            evt.prevent_default();
            let path = image_path().trim().to_string();
            if path.is_empty() {
                push_toast(toasts.clone(), ToastKind::Warning, "Enter the path of an image first.");
                return;
            }
            let Some(client) = current_client(client, toasts) else {
                return;
            };
            let mut state = state.clone();
            let mut busy = busy.clone();
            let toasts = toasts.clone();
            busy.set(true);
            spawn(async move {
                match client.predict_file(&PathBuf::from(&path)).await {
                    Ok(prediction) => {
                        if !prediction.is_fruit {
                            push_toast(toasts, ToastKind::Info, "No fruit detected in that image.");
                        }
                        state.with_mut(|st| st.session = Some(AnalysisSession::new(path, prediction)));
                    }
                    Err(err) => {
                        tracing::warn!("prediction failed: {err}");
                        push_toast(toasts, ToastKind::Error, format!("Error: {err}"));
                    }
                }
                busy.set(false);
            });
        }
    };

    let on_read_sensor = {
        let state = state.clone();
        let toasts = toasts.clone();
        move |_| {
            let Some(client) = current_client(client, toasts) else {
                return;
            };
            let mut state = state.clone();
            let mut busy = busy.clone();
            let toasts = toasts.clone();
            busy.set(true);
            spawn(async move {
                match client.read_sensor().await {
                    Ok(reading) => {
                        if reading.complete().is_none() {
                            push_toast(
                                toasts,
                                ToastKind::Warning,
                                "Sensor returned no data; showing the base range.",
                            );
                        }
                        state.with_mut(|st| {
                            if let Some(session) = st.session.as_mut() {
                                session.apply_reading(reading);
                            }
                            st.cache
                                .record_fetch(CacheResource::SensorReading, std::time::SystemTime::now());
                        });
                    }
                    Err(err) => {
                        tracing::warn!("sensor read failed: {err}");
                        push_toast(
                            toasts,
                            ToastKind::Error,
                            format!("Error fetching sensor data: {err}"),
                        );
                    }
                }
                busy.set(false);
            });
        }
    };

    let on_save = {
        let state = state.clone();
        let toasts = toasts.clone();
        move |_| {
            let Some(session) = state.with(|st| st.session.clone()) else {
                return;
            };
            let Some(client) = current_client(client, toasts) else {
                return;
            };
            let mut state = state.clone();
            let mut busy = busy.clone();
            let toasts = toasts.clone();
            busy.set(true);
            spawn(async move {
                match client
                    .save_analysis(&session.prediction, &session.reading)
                    .await
                {
                    Ok(update) => {
                        state.with_mut(|st| {
                            if let Some(current) = st.session.as_mut() {
                                current.saved = true;
                            }
                        });
                        push_toast(
                            toasts,
                            ToastKind::Success,
                            format!("Saved shelf life {} for result {}.", update.shelf_life, update.result_id),
                        );
                        request_history_refresh(history_request);
                    }
                    Err(BackendError::MissingResultId) => {
                        push_toast(
                            toasts,
                            ToastKind::Warning,
                            "The backend did not return a result id; nothing was saved.",
                        );
                    }
                    Err(BackendError::MissingReading) => {
                        push_toast(
                            toasts,
                            ToastKind::Warning,
                            "Read the sensor before saving; nothing was saved.",
                        );
                    }
                    Err(err) => {
                        tracing::warn!("saving result failed: {err}");
                        push_toast(toasts, ToastKind::Error, format!("Error saving result: {err}"));
                    }
                }
                busy.set(false);
            });
        }
    };

    let on_scan_another = {
        let mut state = state.clone();
        move |_| {
            state.with_mut(|st| st.clear_session());
            image_path.set(String::new());
        }
    };

    let working = busy();

    rsx! {
        section { class: "stack",
            h2 { "Analyze a fruit" }
            p { class: "muted", "Submit a photo to classify the fruit and estimate its remaining shelf life." }

            if let Some(session) = session {
                p { class: "muted small", "Image: {session.image_path}" }
                ShelfLifeCard { prediction: session.prediction.clone(), reading: session.reading }
                if session.prediction.is_fruit && session.reading.complete().is_none() {
                    p { class: "muted small", "Read the sensor to save this result with its storage conditions." }
                }
                div { class: "actions",
                    if sensor_enabled && session.prediction.is_fruit {
                        button {
                            class: "{theme::btn(false)}",
                            disabled: working,
                            onclick: on_read_sensor,
                            "🌡️ Read sensor"
                        }
                    }
                    if session.prediction.is_fruit && session.reading.complete().is_some() {
                        button {
                            class: "{theme::btn(true)}",
                            disabled: working || session.saved,
                            onclick: on_save,
                            if session.saved { "Saved" } else { "💾 Save result" }
                        }
                    }
                    button {
                        class: "{theme::btn(false)}",
                        disabled: working,
                        onclick: on_scan_another,
                        "📷 Scan another"
                    }
                }
            } else {
                form { class: "card stack", onsubmit: on_submit,
                    label { class: "label", r#for: "image-path", "Image file" }
                    input {
                        id: "image-path",
                        class: "input",
                        value: image_path(),
                        oninput: move |evt| image_path.set(evt.value()),
                        placeholder: "/home/me/Pictures/banana.jpg",
                    }
                    button {
                        class: "{theme::btn(true)}",
                        r#type: "submit",
                        disabled: working,
                        if working { "Analyzing..." } else { "🔍 Analyze" }
                    }
                }
            }
        }
    }
}
