pub mod runner;

pub use runner::{work_item_dir, Overrides, RunRequest, Runner};
