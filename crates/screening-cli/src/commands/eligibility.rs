//! The `screening eligibility` command.

use std::path::PathBuf;

use anyhow::Result;

use screening_core::policy::Eligibility;

pub async fn execute(email: String, json: bool, config_path: Option<PathBuf>) -> Result<()> {
    let (_, engine) = super::load_engine(config_path.as_deref())?;
    let eligibility = engine.check_eligibility(&email).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&eligibility)?);
        return Ok(());
    }

    match eligibility {
        Eligibility::Eligible => println!("{email} is eligible"),
        Eligibility::Blocked { retry_at } => println!(
            "{email} is blocked until {}",
            retry_at.format("%Y-%m-%d %H:%M UTC")
        ),
    }
    Ok(())
}
