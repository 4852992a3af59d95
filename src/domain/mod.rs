//! Domain logic for fruit analysis lives here.

pub mod analytics;
pub mod app_state;
pub mod entities;
pub mod shelf_life;

#[allow(unused_imports)]
pub use analytics::{
    confidence_by_group, daily_counts, daily_counts_by_fruit, dashboard_metrics, distinct_values,
    distribution, environment_stats, fruit_by_ripeness, latest_reading, ConfidenceRange,
    ConfidenceSummary, DashboardMetrics, EnvironmentStats, GroupKey, HistoryFilter,
};
#[allow(unused_imports)]
pub use app_state::{AnalysisSession, AppState, CacheResource, CacheTimestamps, PersistedState};
#[allow(unused_imports)]
pub use entities::{
    AnalysisRecord, BackendSettings, Prediction, ResultUpdate, DEFAULT_BACKEND_URL,
    LOW_CONFIDENCE_PCT,
};
#[allow(unused_imports)]
pub use shelf_life::{
    estimate, estimate_for, AdjustmentFactor, ConditionStatus, EnvironmentReading,
    RipenessClass, ShelfLifeEstimate,
};
