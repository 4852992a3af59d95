use dioxus::prelude::*;

use crate::domain::RipenessClass;
use crate::ui::theme;

#[component]
pub fn RipenessBadge(label: String) -> Element {
    let ripeness = RipenessClass::parse(&label);
    rsx! {
        span { class: "{theme::ripeness_class(&ripeness)}", "{ripeness}" }
    }
}
