//! Core trait definitions for the persistence store and the notifier.
//!
//! These async traits are implemented by the `screening-store` and
//! `screening-providers` crates respectively.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::model::{AnswerKey, AntiCheatEvent, AssessmentResult, Question, QuestionId, ResultNotice};

// ---------------------------------------------------------------------------
// Persistence store trait
// ---------------------------------------------------------------------------

/// The single point of shared mutable state. Implementations must serialize
/// conflicting writes themselves; callers never update an entity in place.
#[async_trait]
pub trait AssessmentStore: Send + Sync {
    /// Human-readable backend name (e.g. "file").
    fn name(&self) -> &str;

    /// Every question in the catalog.
    async fn list_questions(&self) -> anyhow::Result<Vec<Question>>;

    /// Answer key for the given ids. Ids not in the catalog are left out.
    async fn answer_key(&self, ids: &HashSet<QuestionId>) -> anyhow::Result<AnswerKey> {
        let questions = self.list_questions().await?;
        Ok(questions
            .iter()
            .filter(|q| ids.contains(&q.id))
            .map(|q| (q.id, q.answer_key_entry()))
            .collect())
    }

    /// The most recent result for a candidate, if any.
    async fn last_result(&self, email: &str) -> anyhow::Result<Option<AssessmentResult>>;

    /// Append a new result.
    async fn insert_result(&self, result: &AssessmentResult) -> anyhow::Result<()>;

    /// Append an anti-cheat event.
    async fn append_event(&self, event: &AntiCheatEvent) -> anyhow::Result<()>;

    /// All results for a candidate, oldest first.
    async fn results_for(&self, email: &str) -> anyhow::Result<Vec<AssessmentResult>>;

    /// All anti-cheat events for a candidate, oldest first.
    async fn events_for(&self, email: &str) -> anyhow::Result<Vec<AntiCheatEvent>>;
}

// ---------------------------------------------------------------------------
// Notifier trait
// ---------------------------------------------------------------------------

/// Outbound notification of a stored result (email in production).
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Human-readable notifier name (e.g. "email").
    fn name(&self) -> &str;

    /// Deliver the notice. Failures are logged by the caller and never
    /// affect the stored result.
    async fn notify(&self, notice: &ResultNotice) -> anyhow::Result<()>;
}

/// Notifier that drops every notice.
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    fn name(&self) -> &str {
        "noop"
    }

    async fn notify(&self, _: &ResultNotice) -> anyhow::Result<()> {
        Ok(())
    }
}
