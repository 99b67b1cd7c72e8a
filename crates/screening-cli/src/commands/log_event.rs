//! The `screening log-event` command.

use std::path::PathBuf;

use anyhow::Result;

pub async fn execute(email: String, event_type: String, config_path: Option<PathBuf>) -> Result<()> {
    let (_, engine) = super::load_engine(config_path.as_deref())?;
    let ack = engine.record_event(&email, &event_type).await?;
    println!("{}", serde_json::to_string(&ack)?);
    Ok(())
}
