//! Class helpers shared by pages so ripeness and condition colors stay consistent.

use crate::domain::{ConditionStatus, RipenessClass};

pub fn ripeness_class(ripeness: &RipenessClass) -> &'static str {
    match ripeness {
        RipenessClass::Unripe => "badge ripeness-unripe",
        RipenessClass::Ripe => "badge ripeness-ripe",
        RipenessClass::Overripe => "badge ripeness-overripe",
        RipenessClass::Unknown(_) => "badge ripeness-unknown",
    }
}

/// Bar fill color per ripeness label, matching the badges.
pub fn ripeness_color(label: &str) -> &'static str {
    match RipenessClass::parse(label) {
        RipenessClass::Unripe => "#90EE90",
        RipenessClass::Ripe => "#FFD700",
        RipenessClass::Overripe => "#FF6347",
        RipenessClass::Unknown(_) => "#808080",
    }
}

pub fn condition_class(status: ConditionStatus) -> &'static str {
    match status {
        ConditionStatus::Optimal => "status status-optimal",
        ConditionStatus::Acceptable => "status status-acceptable",
        ConditionStatus::Poor => "status status-poor",
        ConditionStatus::Unknown => "status muted",
    }
}

pub fn condition_icon(status: ConditionStatus) -> &'static str {
    match status {
        ConditionStatus::Optimal => "✅",
        ConditionStatus::Acceptable => "⚠️",
        ConditionStatus::Poor => "❌",
        ConditionStatus::Unknown => "·",
    }
}

pub fn btn(primary: bool) -> &'static str {
    if primary {
        "btn btn-primary"
    } else {
        "btn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colors_follow_parsed_ripeness() {
        assert_eq!(ripeness_color("Ripe"), "#FFD700");
        assert_eq!(ripeness_color("ripe"), "#808080");
        assert_eq!(ripeness_color("Not Fruit"), "#808080");
        assert_eq!(
            ripeness_class(&RipenessClass::Overripe),
            "badge ripeness-overripe"
        );
    }
}
