//! The `screening init` command.

use std::path::Path;

use anyhow::Result;

pub fn execute() -> Result<()> {
    if Path::new("screening.toml").exists() {
        println!("screening.toml already exists, skipping.");
    } else {
        std::fs::write("screening.toml", SAMPLE_CONFIG)?;
        println!("Created screening.toml");
    }

    std::fs::create_dir_all("screening-data")?;
    let bank_path = Path::new("screening-data/questions.toml");
    if bank_path.exists() {
        println!("screening-data/questions.toml already exists, skipping.");
    } else {
        std::fs::write(bank_path, SAMPLE_BANK)?;
        println!("Created screening-data/questions.toml");
    }

    println!("\nNext steps:");
    println!("  1. Replace screening-data/questions.toml with your own questions");
    println!("  2. Run: screening validate --bank screening-data/questions.toml");
    println!("  3. Run: screening questions --email candidate@example.com");

    Ok(())
}

const SAMPLE_CONFIG: &str = r#"# screening configuration

# Lock period after a reject.
reapply_cooldown_days = 42
store_timeout_ms = 5000

[store]
type = "file"
dir = "./screening-data"

# Set type = "email" with api_key = "${SCREENING_EMAIL_API_KEY}" to send
# result emails.
[notifier]
type = "log"

[fallback]
type = "synthetic"
min_score = 45
max_score = 85

[scoring]
pass_at = 70
reject_at = 40

[selection]
easy = 4
medium = 3
hard = 3
"#;

const SAMPLE_BANK: &str = include_str!("../../../../question-banks/round1.toml");
