pub mod audio;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fingerprint;
pub mod metrics_api;
pub mod model;
pub mod process;
pub mod providers;
pub mod report;
pub mod settings;
pub mod storage;
pub mod training;
