pub mod achievements;
pub mod stats;
pub mod summary;
