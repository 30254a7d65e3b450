pub mod achievement_list;
pub mod dashboard;
pub mod menu;
pub mod progress_bar;
pub mod stats_dashboard;
