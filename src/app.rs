use std::time::Duration;

use dioxus::{prelude::*, signals::Signal};

use crate::{
    domain::{AppState, CacheResource},
    infra::backend::{BackendClient, CacheStatus, HISTORY_TTL},
    ui::{
        components::toast::{push_toast, Toast, ToastKind, ToastMessage},
        pages::{AnalyzePage, DashboardPage, HistoryPage, SettingsPage},
        shell::Shell,
    },
    util::{
        assets,
        persistence::{load_persisted_state, save_persisted_state},
    },
};

const STALE_CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Bumped to request a history reload; values above zero bypass the client cache.
pub type HistoryRequest = Signal<u32>;

#[derive(Routable, Clone, PartialEq)]
pub enum Route {
    #[route("/")]
    Analyze {},
    #[route("/history")]
    History {},
    #[route("/dashboard")]
    Dashboard {},
    #[route("/settings")]
    Settings {},
}

#[component]
pub fn App() -> Element {
    let state = use_signal(AppState::default);
    let client = use_signal(|| None::<BackendClient>);
    let toasts = use_signal(Vec::<ToastMessage>::new);
    use_hook({
        let mut state = state.clone();
        let client = client.clone();
        let toasts = toasts.clone();
        move || {
            if let Some(saved) = load_persisted_state() {
                state.with_mut(|st| st.apply_persisted(saved));
            }
            rebuild_client(&state, client, toasts);
        }
    });
    use_context_provider(|| state.clone());
    use_context_provider(|| client.clone());
    use_context_provider(|| toasts.clone());

    let history_request: HistoryRequest = use_signal(|| 0);
    use_context_provider(|| history_request.clone());

    let _history = use_resource({
        let state = state.clone();
        let toasts = toasts.clone();
        move || async move {
            fetch_history(state.clone(), client.clone(), toasts.clone(), history_request).await
        }
    });

    // Reload history once the last fetch outlives the cache window.
    let _stale_check = use_future(move || async move {
        loop {
            tokio::time::sleep(STALE_CHECK_INTERVAL).await;
            let loaded_once = state.with(|st| {
                st.cache
                    .fetched_at(&CacheResource::History)
                    .is_some()
            });
            if loaded_once && state.with(|st| st.is_stale(&CacheResource::History, HISTORY_TTL)) {
                tracing::debug!("history older than {HISTORY_TTL:?}; reloading");
                request_history_refresh(history_request);
            }
        }
    });

    rsx! {
        document::Style { "{assets::main_css()}" }
        Router::<Route> {}
        Toast {}
    }
}

pub fn persist_user_state(state: &Signal<AppState>) {
    let snapshot = state.with(|st| st.to_persisted());
    if let Err(err) = save_persisted_state(&snapshot) {
        tracing::warn!("failed to persist user settings: {err}");
    }
}

/// Replaces the shared client after the backend settings change.
pub fn rebuild_client(
    state: &Signal<AppState>,
    mut client: Signal<Option<BackendClient>>,
    toasts: Signal<Vec<ToastMessage>>,
) {
    let settings = state.with(|st| st.settings.clone());
    match BackendClient::from_settings(&settings) {
        Ok(built) => {
            tracing::info!("backend client targets {}", built.base_url());
            client.set(Some(built));
        }
        Err(err) => {
            tracing::warn!("cannot build backend client for {}: {err}", settings.base_url);
            client.set(None);
            push_toast(
                toasts,
                ToastKind::Error,
                format!("Backend URL is not usable: {err}"),
            );
        }
    }
}

/// The shared client, or an error toast when the settings left none.
pub fn current_client(
    client: Signal<Option<BackendClient>>,
    toasts: Signal<Vec<ToastMessage>>,
) -> Option<BackendClient> {
    let current = client.with(|c| c.clone());
    if current.is_none() {
        push_toast(
            toasts,
            ToastKind::Error,
            "No backend configured. Check the URL in Settings.",
        );
    }
    current
}

pub fn request_history_refresh(mut history_request: HistoryRequest) {
    history_request.with_mut(|generation| *generation += 1);
}

async fn fetch_history(
    mut state: Signal<AppState>,
    client: Signal<Option<BackendClient>>,
    toasts: Signal<Vec<ToastMessage>>,
    history_request: HistoryRequest,
) -> Option<CacheStatus> {
    let force = history_request() > 0;
    let client = client()?;

    let result = if force {
        client.refresh_history().await
    } else {
        client.get_history().await
    };

    match result {
        Ok(payload) => {
            tracing::info!(
                rows = payload.data.len(),
                status = ?payload.status,
                "history loaded"
            );
            state.with_mut(|st| {
                st.history = payload.data.clone();
                st.cache
                    .record_fetch(CacheResource::History, payload.fetched_at);
            });
            if payload.status == CacheStatus::Stale {
                push_toast(
                    toasts,
                    ToastKind::Warning,
                    "Backend unreachable; showing the last loaded history.",
                );
            }
            Some(payload.status)
        }
        Err(err) => {
            tracing::warn!("failed to load history: {err}");
            push_toast(
                toasts,
                ToastKind::Error,
                format!("Failed to load history data: {err}"),
            );
            None
        }
    }
}

#[component]
pub fn Analyze() -> Element {
    rsx! { Shell { AnalyzePage {} } }
}

#[component]
pub fn History() -> Element {
    rsx! { Shell { HistoryPage {} } }
}

#[component]
pub fn Dashboard() -> Element {
    rsx! { Shell { DashboardPage {} } }
}

#[component]
pub fn Settings() -> Element {
    rsx! { Shell { SettingsPage {} } }
}
