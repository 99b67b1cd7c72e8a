//! End-to-end engine tests wiring the real stores and notifiers together.
//!
//! These run the full request flow (issue → submit → notify → lock-out)
//! against the sample question bank.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use screening_core::engine::{AssessmentEngine, EngineConfig, QuestionSetOutcome};
use screening_core::fallback::SyntheticFallback;
use screening_core::model::{PoolSource, Status, Submission};
use screening_core::parser::parse_bank;
use screening_core::traits::AssessmentStore;
use screening_providers::mock::MockNotifier;
use screening_store::{FileStore, MemoryStore};

const BANK: &str = "../../question-banks/round1.toml";

fn memory_engine(notifier: Arc<MockNotifier>) -> (Arc<MemoryStore>, AssessmentEngine) {
    let bank = parse_bank(Path::new(BANK)).unwrap();
    let store = Arc::new(MemoryStore::new(bank.questions));
    let engine = AssessmentEngine::new(
        store.clone(),
        notifier,
        Arc::new(SyntheticFallback::default()),
        EngineConfig::default(),
    );
    (store, engine)
}

fn answers(pairs: &[(u32, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(id, label)| (id.to_string(), label.to_string()))
        .collect()
}

#[tokio::test]
async fn issue_submit_notify() {
    let notifier = Arc::new(MockNotifier::new());
    let (store, engine) = memory_engine(notifier.clone());

    let mut rng = StdRng::seed_from_u64(3);
    let outcome = engine
        .issue_question_set_with_rng("cand@example.com", Utc::now(), &mut rng)
        .await
        .unwrap();
    let QuestionSetOutcome::Issued(set) = outcome else {
        panic!("fresh candidate should get a set");
    };
    assert_eq!(set.source, PoolSource::Store);
    assert_eq!(set.questions.len(), 10);

    // Answer every issued question with the first displayed option.
    let submitted: BTreeMap<String, String> = set
        .questions
        .iter()
        .map(|q| (q.id.to_string(), q.options[0].label.clone()))
        .collect();

    let mut outcome = engine
        .submit(Submission {
            email: "cand@example.com".into(),
            answers: submitted,
            duration: 720,
        })
        .await
        .unwrap();
    assert!(outcome.persisted);
    assert_eq!(outcome.result.correct + outcome.result.wrong, 10);
    outcome.notification.take().unwrap().await.unwrap();

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].score, outcome.result.score);
    assert_eq!(sent[0].status, outcome.result.status);

    let history = store.results_for("cand@example.com").await.unwrap();
    assert_eq!(history, vec![outcome.result]);
}

#[tokio::test]
async fn reject_blocks_until_cooldown_ends() {
    let notifier = Arc::new(MockNotifier::new());
    let (_store, engine) = memory_engine(notifier);
    let submitted_at = Utc::now();

    let outcome = engine
        .submit_at(
            Submission {
                email: "low@example.com".into(),
                answers: answers(&[(1, "A"), (2, "A"), (3, "B")]),
                duration: 100,
            },
            submitted_at,
        )
        .await
        .unwrap();
    assert_eq!(outcome.result.score, 0);
    assert_eq!(outcome.result.status, Status::Reject);

    let mut rng = StdRng::seed_from_u64(0);
    let inside = submitted_at + Duration::weeks(6) - Duration::seconds(1);
    let blocked = engine
        .issue_question_set_with_rng("low@example.com", inside, &mut rng)
        .await
        .unwrap();
    assert!(matches!(blocked, QuestionSetOutcome::Blocked { .. }));

    let after = submitted_at + Duration::weeks(6);
    let issued = engine
        .issue_question_set_with_rng("low@example.com", after, &mut rng)
        .await
        .unwrap();
    assert!(matches!(issued, QuestionSetOutcome::Issued(_)));
}

#[tokio::test]
async fn failed_notification_keeps_result() {
    let notifier = Arc::new(MockNotifier::failing("mail server down"));
    let (store, engine) = memory_engine(notifier.clone());

    let mut outcome = engine
        .submit(Submission {
            email: "cand@example.com".into(),
            answers: answers(&[(1, "C"), (2, "B"), (3, "A")]),
            duration: 300,
        })
        .await
        .unwrap();
    outcome.notification.take().unwrap().await.unwrap();

    assert_eq!(outcome.result.score, 100);
    assert_eq!(notifier.call_count(), 1);
    assert_eq!(store.results_for("cand@example.com").await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_candidates_on_file_store() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::copy(BANK, dir.path().join("questions.toml")).unwrap();
    let store = Arc::new(FileStore::open(dir.path()).unwrap());
    let engine = Arc::new(AssessmentEngine::new(
        store.clone(),
        Arc::new(MockNotifier::new()),
        Arc::new(SyntheticFallback::default()),
        EngineConfig::default(),
    ));

    let submissions = (0..10).map(|i| {
        let engine = Arc::clone(&engine);
        async move {
            engine
                .submit(Submission {
                    email: format!("c{i}@example.com"),
                    answers: answers(&[(1, "C"), (2, "A")]),
                    duration: 60,
                })
                .await
        }
    });
    for outcome in futures::future::join_all(submissions).await {
        let outcome = outcome.unwrap();
        assert!(outcome.persisted);
        assert_eq!(outcome.result.score, 50);
    }

    let reopened = FileStore::open(dir.path()).unwrap();
    for i in 0..10 {
        let last = reopened
            .last_result(&format!("c{i}@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(last.status, Status::Review);
    }
}
