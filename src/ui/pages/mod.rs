pub mod analyze;
pub mod dashboard;
pub mod history;
pub mod settings;

pub use analyze::AnalyzePage;
pub use dashboard::DashboardPage;
pub use history::HistoryPage;
pub use settings::SettingsPage;
