pub mod eligibility;
pub mod history;
pub mod init;
pub mod log_event;
pub mod questions;
pub mod submit;
pub mod validate;

use std::path::Path;

use anyhow::Result;

use screening_core::engine::AssessmentEngine;
use screening_providers::config::{build_engine, load_config_from, ScreeningConfig};

/// Load configuration and wire the engine for a command.
pub(crate) fn load_engine(config_path: Option<&Path>) -> Result<(ScreeningConfig, AssessmentEngine)> {
    let config = load_config_from(config_path)?;
    let engine = build_engine(&config)?;
    Ok((config, engine))
}
