pub mod catalog;
pub mod rule;
pub mod selector;

pub use catalog::{Catalog, Category, Challenge};
pub use rule::{Button, Presses, Rule};
