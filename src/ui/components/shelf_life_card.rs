use dioxus::prelude::*;

use super::confidence_badge::ConfidenceBadge;
use crate::domain::{ConditionStatus, EnvironmentReading, Prediction, ShelfLifeEstimate};
use crate::ui::theme;

/// Classifier result with the shelf-life estimate for the current reading.
#[component]
pub fn ShelfLifeCard(prediction: Prediction, reading: EnvironmentReading) -> Element {
    if !prediction.is_fruit {
        return rsx! {
            div { class: "card warning",
                h3 { class: "label", "Not a fruit" }
                p { "The image does not look like a fruit. Try another photo." }
                p { class: "muted small", "Classifier label: {classifier_label(&prediction)}" }
            }
        };
    }

    let estimate = prediction.shelf_life(&reading);
    let status = ConditionStatus::from_reading(&reading);
    let basis = estimate_basis(&estimate, &reading);

    rsx! {
        div { class: "card result",
            div { class: "result-row",
                span { class: "label", "Fruit" }
                strong { "{prediction.fruit}" }
                ConfidenceBadge { percent: prediction.fruit_percent() }
            }
            div { class: "result-row",
                span { class: "label", "Ripeness" }
                span { class: "{theme::ripeness_class(&prediction.ripeness)}", "{prediction.ripeness}" }
                ConfidenceBadge { percent: prediction.ripeness_percent() }
            }
            div { class: "result-row",
                span { class: "label", "Shelf life" }
                strong { class: "shelf-life", "{estimate}" }
            }
            p { class: "muted small", "{basis}" }
            div { class: "result-row",
                span { class: "label", "Conditions" }
                span { class: "{theme::condition_class(status)}",
                    "{theme::condition_icon(status)} {status.message()}"
                }
            }
            if let Some((temperature, humidity)) = reading.complete() {
                p { class: "small", "🌡️ {temperature:.1} °C · 💧 {humidity:.1} %" }
            }
        }
    }
}

/// The classifier reports "Not Fruit" as the ripeness and leaves `fruit` as `N/A`.
fn classifier_label(prediction: &Prediction) -> String {
    prediction.ripeness.to_string()
}

fn estimate_basis(estimate: &ShelfLifeEstimate, reading: &EnvironmentReading) -> &'static str {
    match estimate {
        ShelfLifeEstimate::NotApplicable => "No estimate for this ripeness label.",
        ShelfLifeEstimate::Expired => "Overripe fruit should be used right away.",
        ShelfLifeEstimate::Range { .. } if reading.complete().is_some() => {
            "Adjusted for the latest sensor reading."
        }
        ShelfLifeEstimate::Range { .. } => "Base range; read the sensor to adjust it.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::RipenessClass;

    #[test]
    fn not_fruit_card_shows_ripeness_label() {
        let prediction = Prediction {
            result_id: None,
            is_fruit: false,
            fruit: "N/A".to_string(),
            fruit_conf: 0.0,
            ripeness: RipenessClass::parse("Not Fruit"),
            ripeness_conf: 0.93,
        };
        assert_eq!(classifier_label(&prediction), "Not Fruit");
    }

    #[test]
    fn basis_reflects_reading() {
        let range = ShelfLifeEstimate::Range { low: 2, high: 3 };
        assert_eq!(
            estimate_basis(&range, &EnvironmentReading::default()),
            "Base range; read the sensor to adjust it."
        );
        assert_eq!(
            estimate_basis(&range, &EnvironmentReading::new(Some(15.0), Some(60.0))),
            "Adjusted for the latest sensor reading."
        );
        assert_eq!(
            estimate_basis(&ShelfLifeEstimate::Expired, &EnvironmentReading::default()),
            "Overripe fruit should be used right away."
        );
    }
}
