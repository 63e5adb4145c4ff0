pub mod console;
pub mod json;
pub mod leaderboard;

pub use leaderboard::{aggregate_metrics, render_report, write_report, ModelAverages};
