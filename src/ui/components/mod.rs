pub mod confidence_badge;
pub mod distribution_list;
pub mod history_table;
pub mod kpi_card;
pub mod ripeness_badge;
pub mod shelf_life_card;
pub mod toast;
