//! screening-providers — Notifier integrations and configuration.
//!
//! Implements the `Notifier` trait for an HTTP email API, the application
//! log and tests, and turns a `screening.toml` into a ready
//! [`AssessmentEngine`](screening_core::engine::AssessmentEngine).

pub mod config;
pub mod email;
pub mod error;
pub mod log;
pub mod mock;

pub use config::{
    build_engine, create_fallback, create_notifier, create_store, load_config, load_config_from,
    FallbackConfig, NotifierConfig, ScreeningConfig, StoreConfig,
};
pub use error::NotifierError;
