//! Application configuration

mod app_config;

pub use app_config::{AppConfig, ExperimentSettings, LogFormat, LoggingConfig, StorageSettings};
