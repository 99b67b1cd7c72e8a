//! In-memory store.

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

use screening_core::model::{AntiCheatEvent, AssessmentResult, Question};
use screening_core::traits::AssessmentStore;

/// Store that keeps everything in process memory. Contents are lost on drop.
#[derive(Default)]
pub struct MemoryStore {
    questions: Vec<Question>,
    results: RwLock<Vec<AssessmentResult>>,
    events: RwLock<Vec<AntiCheatEvent>>,
}

impl MemoryStore {
    pub fn new(questions: Vec<Question>) -> Self {
        Self {
            questions,
            ..Default::default()
        }
    }

    /// Seed prior results, e.g. to start with a locked-out candidate.
    pub fn with_results(mut self, results: Vec<AssessmentResult>) -> Self {
        self.results = RwLock::new(results);
        self
    }
}

#[async_trait]
impl AssessmentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_questions(&self) -> Result<Vec<Question>> {
        Ok(self.questions.clone())
    }

    async fn last_result(&self, email: &str) -> Result<Option<AssessmentResult>> {
        let results = self.results.read().await;
        Ok(results
            .iter()
            .filter(|r| r.email == email)
            .max_by_key(|r| r.created_at)
            .cloned())
    }

    async fn insert_result(&self, result: &AssessmentResult) -> Result<()> {
        self.results.write().await.push(result.clone());
        Ok(())
    }

    async fn append_event(&self, event: &AntiCheatEvent) -> Result<()> {
        self.events.write().await.push(event.clone());
        Ok(())
    }

    async fn results_for(&self, email: &str) -> Result<Vec<AssessmentResult>> {
        let mut out: Vec<AssessmentResult> = self
            .results
            .read()
            .await
            .iter()
            .filter(|r| r.email == email)
            .cloned()
            .collect();
        out.sort_by_key(|r| r.created_at);
        Ok(out)
    }

    async fn events_for(&self, email: &str) -> Result<Vec<AntiCheatEvent>> {
        let mut out: Vec<AntiCheatEvent> = self
            .events
            .read()
            .await
            .iter()
            .filter(|e| e.email == email)
            .cloned()
            .collect();
        out.sort_by_key(|e| e.occurred_at);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use screening_core::model::{Category, Difficulty, Status};
    use std::collections::{BTreeMap, HashSet};
    use uuid::Uuid;

    fn question(id: u32) -> Question {
        Question {
            id,
            category: Category::Aptitude,
            difficulty: Difficulty::Easy,
            prompt: format!("q{id}"),
            options: BTreeMap::from([("A".to_string(), "x".to_string()), ("B".to_string(), "y".to_string())]),
            correct_label: "B".into(),
        }
    }

    fn result(email: &str, status: Status, created_at: chrono::DateTime<Utc>) -> AssessmentResult {
        AssessmentResult {
            id: Uuid::new_v4(),
            email: email.into(),
            score: 50,
            correct: 5,
            wrong: 5,
            category_breakdown: BTreeMap::new(),
            difficulty_breakdown: BTreeMap::new(),
            duration: 300,
            status,
            created_at,
        }
    }

    #[tokio::test]
    async fn answer_key_only_covers_requested_ids() {
        let store = MemoryStore::new(vec![question(1), question(2), question(3)]);
        let key = store.answer_key(&HashSet::from([1, 3, 99])).await.unwrap();
        assert_eq!(key.len(), 2);
        assert_eq!(key[&1].correct_label, "B");
        assert!(!key.contains_key(&99));
    }

    #[tokio::test]
    async fn last_result_is_most_recent() {
        let now = Utc::now();
        let store = MemoryStore::default().with_results(vec![
            result("a@b.c", Status::Reject, now),
            result("a@b.c", Status::Pass, now - Duration::days(60)),
            result("x@y.z", Status::Pass, now + Duration::days(1)),
        ]);

        let last = store.last_result("a@b.c").await.unwrap().unwrap();
        assert_eq!(last.status, Status::Reject);
        assert!(store.last_result("nobody@b.c").await.unwrap().is_none());

        let history = store.results_for("a@b.c").await.unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].created_at < history[1].created_at);
    }

    #[tokio::test]
    async fn events_are_appended_not_deduplicated() {
        let store = MemoryStore::default();
        let at = Utc::now();
        let event = AntiCheatEvent {
            id: Uuid::new_v4(),
            email: "a@b.c".into(),
            event_type: "blur".into(),
            occurred_at: at,
        };
        store.append_event(&event).await.unwrap();
        store.append_event(&event).await.unwrap();
        assert_eq!(store.events_for("a@b.c").await.unwrap().len(), 2);
    }
}
