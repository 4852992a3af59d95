use dioxus::prelude::*;

use crate::app::Route;
use crate::util::version::{version_label, APP_NAME};

#[component]
pub fn Shell(children: Element) -> Element {
    let current_route = use_route::<Route>();
    let nav = use_navigator();

    rsx! {
        div { class: "app",
            header { class: "app-header",
                div { class: "brand",
                    span { class: "brand-icon", "🍎" }
                    div {
                        h1 { class: "brand-title", "{APP_NAME}" }
                        p { class: "muted small", "{version_label()}" }
                    }
                }
                nav { class: "nav",
                    NavButton { active: matches!(current_route, Route::Analyze {}), onclick: move |_| { nav.push(Route::Analyze {}); }, label: "📷 Analyze" }
                    NavButton { active: matches!(current_route, Route::History {}), onclick: move |_| { nav.push(Route::History {}); }, label: "📋 History" }
                    NavButton { active: matches!(current_route, Route::Dashboard {}), onclick: move |_| { nav.push(Route::Dashboard {}); }, label: "📊 Dashboard" }
                    NavButton { active: matches!(current_route, Route::Settings {}), onclick: move |_| { nav.push(Route::Settings {}); }, label: "⚙️" }
                }
            }
            main { class: "page",
                {children}
            }
        }
    }
}

#[component]
fn NavButton(active: bool, onclick: EventHandler<()>, label: &'static str) -> Element {
    let class = if active { "nav-btn active" } else { "nav-btn" };

    rsx! {
        button {
            class: "{class}",
            onclick: move |_| onclick.call(()),
            "{label}"
        }
    }
}
