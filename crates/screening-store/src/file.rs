//! Directory-backed store.
//!
//! Layout:
//!
//! ```text
//! <dir>/questions.toml   question bank (read once at open)
//! <dir>/results.jsonl    one AssessmentResult per line, append-only
//! <dir>/events.jsonl     one AntiCheatEvent per line, append-only
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use screening_core::model::{AntiCheatEvent, AssessmentResult, Question};
use screening_core::parser::parse_bank;
use screening_core::traits::AssessmentStore;

pub const QUESTIONS_FILE: &str = "questions.toml";
pub const RESULTS_FILE: &str = "results.jsonl";
pub const EVENTS_FILE: &str = "events.jsonl";

/// Store rooted at a directory on the local filesystem.
pub struct FileStore {
    dir: PathBuf,
    questions: Vec<Question>,
    /// Serializes appends so concurrent writers never interleave lines.
    write_lock: Mutex<()>,
}

impl FileStore {
    /// Open a store directory. The question bank must already exist; the
    /// log files are created on first write.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        let bank_path = dir.join(QUESTIONS_FILE);
        if !bank_path.is_file() {
            anyhow::bail!(
                "no question bank at {} (run `screening init` first)",
                bank_path.display()
            );
        }
        let bank = parse_bank(&bank_path)?;
        tracing::info!(
            "opened store {} with bank '{}' ({} questions)",
            dir.display(),
            bank.id,
            bank.questions.len()
        );

        Ok(Self {
            dir,
            questions: bank.questions,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    async fn append<T: Serialize>(&self, file: &str, record: &T) -> Result<()> {
        let mut line = serde_json::to_string(record)?;
        line.push('\n');

        let path = self.dir.join(file);
        let _guard = self.write_lock.lock().await;
        let mut handle = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("failed to open {}", path.display()))?;
        handle
            .write_all(line.as_bytes())
            .await
            .with_context(|| format!("failed to append to {}", path.display()))?;
        handle.flush().await?;
        Ok(())
    }

    async fn read_all<T: DeserializeOwned>(&self, file: &str) -> Result<Vec<T>> {
        let path = self.dir.join(file);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("failed to read {}", path.display()))
            }
        };

        let mut records = Vec::new();
        for (n, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(line) {
                Ok(record) => records.push(record),
                Err(e) => {
                    // A torn final line from a crash should not hide the rest.
                    tracing::warn!("{}:{}: skipping malformed record: {e}", path.display(), n + 1);
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl AssessmentStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn list_questions(&self) -> Result<Vec<Question>> {
        Ok(self.questions.clone())
    }

    async fn last_result(&self, email: &str) -> Result<Option<AssessmentResult>> {
        let results: Vec<AssessmentResult> = self.read_all(RESULTS_FILE).await?;
        Ok(results
            .into_iter()
            .filter(|r| r.email == email)
            .max_by_key(|r| r.created_at))
    }

    async fn insert_result(&self, result: &AssessmentResult) -> Result<()> {
        self.append(RESULTS_FILE, result).await
    }

    async fn append_event(&self, event: &AntiCheatEvent) -> Result<()> {
        self.append(EVENTS_FILE, event).await
    }

    async fn results_for(&self, email: &str) -> Result<Vec<AssessmentResult>> {
        let mut results: Vec<AssessmentResult> = self.read_all(RESULTS_FILE).await?;
        results.retain(|r| r.email == email);
        results.sort_by_key(|r| r.created_at);
        Ok(results)
    }

    async fn events_for(&self, email: &str) -> Result<Vec<AntiCheatEvent>> {
        let mut events: Vec<AntiCheatEvent> = self.read_all(EVENTS_FILE).await?;
        events.retain(|e| e.email == email);
        events.sort_by_key(|e| e.occurred_at);
        Ok(events)
    }
}
