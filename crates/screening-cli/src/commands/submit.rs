//! The `screening submit` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};

use screening_core::model::{PoolSource, Submission};

pub async fn execute(
    email: String,
    answers: Option<String>,
    answers_file: Option<PathBuf>,
    duration: u32,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let raw = match (answers, answers_file) {
        (Some(inline), _) => inline,
        (None, Some(path)) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read answers: {}", path.display()))?,
        (None, None) => anyhow::bail!("answers are required (--answers or --answers-file)"),
    };
    let answers: BTreeMap<String, String> =
        serde_json::from_str(&raw).context("answers must be a JSON object of id -> label")?;

    let (_, engine) = super::load_engine(config_path.as_deref())?;
    let mut outcome = engine
        .submit(Submission {
            email,
            answers,
            duration,
        })
        .await?;

    // The process exits right after printing, so delivery is awaited here.
    if let Some(handle) = outcome.notification.take() {
        if let Err(e) = handle.await {
            tracing::warn!("notification task failed: {e}");
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    let result = &outcome.result;
    if outcome.source == PoolSource::Fallback {
        println!("NOTE: answer key unavailable, this is a provisional score");
    }
    println!("Candidate: {}", result.email);
    println!("Score:     {}%", result.score);
    println!("Status:    {}", result.status.to_string().to_uppercase());
    println!("Correct:   {}  Wrong: {}", result.correct, result.wrong);
    for (category, count) in &result.category_breakdown {
        println!("  {category}: {count}");
    }
    for (difficulty, count) in &result.difficulty_breakdown {
        println!("  {difficulty}: {count}");
    }
    if !outcome.persisted {
        println!("WARNING: result was not saved");
    }

    Ok(())
}
