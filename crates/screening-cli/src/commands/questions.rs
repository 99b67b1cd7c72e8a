//! The `screening questions` command.

use std::path::PathBuf;

use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;

use screening_core::engine::QuestionSetOutcome;
use screening_core::model::PoolSource;

pub async fn execute(
    email: String,
    seed: Option<u64>,
    json: bool,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let (_, engine) = super::load_engine(config_path.as_deref())?;

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let outcome = engine
        .issue_question_set_with_rng(&email, Utc::now(), &mut rng)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    match outcome {
        QuestionSetOutcome::Blocked { retry_at } => {
            println!(
                "{email} is not eligible until {}",
                retry_at.format("%Y-%m-%d %H:%M UTC")
            );
        }
        QuestionSetOutcome::Issued(set) => {
            if set.source == PoolSource::Fallback {
                println!("NOTE: store unavailable, serving fallback questions\n");
            }
            for (n, q) in set.questions.iter().enumerate() {
                println!("{}. [{} / {}] (id {})", n + 1, q.category, q.difficulty, q.id);
                println!("   {}", q.prompt);
                for option in &q.options {
                    println!("     {}) {}", option.label, option.text);
                }
                println!();
            }
            println!("{} question(s) issued to {email}", set.questions.len());
        }
    }

    Ok(())
}
