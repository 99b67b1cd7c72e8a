//! Central assessment engine orchestrator.
//!
//! Gates question sets behind the reapply lock, scores submissions, records
//! anti-cheat events, and routes every store failure to the fallback
//! provider instead of surfacing it.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::anticheat::{self, Ack};
use crate::error::AssessmentError;
use crate::fallback::FallbackProvider;
use crate::model::{AssessmentResult, PoolSource, QuestionSet, ResultNotice, Submission};
use crate::policy::{self, Eligibility};
use crate::scoring::{self, ScoreThresholds};
use crate::selector::{select_questions, StratumTargets};
use crate::traits::{AssessmentStore, Notifier};

/// Default bound on a single store call.
pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for the assessment engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Questions drawn per difficulty stratum.
    pub targets: StratumTargets,
    /// Pass/reject score thresholds.
    pub thresholds: ScoreThresholds,
    /// Lock period after a reject.
    pub reapply_cooldown: chrono::Duration,
    /// Bound on every store call before falling back.
    pub store_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            targets: StratumTargets::default(),
            thresholds: ScoreThresholds::default(),
            reapply_cooldown: policy::default_cooldown(),
            store_timeout: DEFAULT_STORE_TIMEOUT,
        }
    }
}

/// Response to a question-set request.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum QuestionSetOutcome {
    Issued(QuestionSet),
    Blocked { retry_at: DateTime<Utc> },
}

/// Response to a submission.
#[derive(Debug, Serialize)]
pub struct SubmissionOutcome {
    pub result: AssessmentResult,
    /// `fallback` when the score is a synthetic stand-in.
    pub source: PoolSource,
    /// Whether the result made it into the store.
    pub persisted: bool,
    /// Background delivery of the result notice, if one was sent.
    #[serde(skip)]
    pub notification: Option<JoinHandle<()>>,
}

/// The central assessment engine. Holds no mutable state; share it with
/// `Arc` across concurrent requests.
pub struct AssessmentEngine {
    store: Arc<dyn AssessmentStore>,
    notifier: Arc<dyn Notifier>,
    fallback: Arc<dyn FallbackProvider>,
    config: EngineConfig,
}

impl AssessmentEngine {
    pub fn new(
        store: Arc<dyn AssessmentStore>,
        notifier: Arc<dyn Notifier>,
        fallback: Arc<dyn FallbackProvider>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            notifier,
            fallback,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Run a store call under the configured timeout.
    async fn bounded<T>(
        &self,
        op: &str,
        fut: impl Future<Output = anyhow::Result<T>>,
    ) -> Result<T, AssessmentError> {
        match tokio::time::timeout(self.config.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(AssessmentError::StoreUnavailable(format!(
                "{op} on {}: {e:#}",
                self.store.name()
            ))),
            Err(_) => Err(AssessmentError::StoreUnavailable(format!(
                "{op} on {} timed out after {}ms",
                self.store.name(),
                self.config.store_timeout.as_millis()
            ))),
        }
    }

    /// Check the reapply lock for a candidate at the current time.
    pub async fn check_eligibility(&self, email: &str) -> Result<Eligibility, AssessmentError> {
        self.check_eligibility_at(email, Utc::now()).await
    }

    /// Check the reapply lock at an explicit instant.
    ///
    /// A candidate whose history cannot be read is treated as eligible.
    pub async fn check_eligibility_at(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Eligibility, AssessmentError> {
        let email = require(email, "email")?;
        match self.lookup_eligibility(email, now).await {
            Ok(eligibility) => Ok(eligibility),
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{e}; treating {email} as eligible");
                Ok(Eligibility::Eligible)
            }
            Err(e) => Err(e),
        }
    }

    async fn lookup_eligibility(
        &self,
        email: &str,
        now: DateTime<Utc>,
    ) -> Result<Eligibility, AssessmentError> {
        let last = self
            .bounded("last_result", self.store.last_result(email))
            .await?;
        Ok(policy::evaluate(
            last.as_ref(),
            now,
            self.config.reapply_cooldown,
        ))
    }

    /// Issue a fresh question set using a per-call random source.
    pub async fn issue_question_set(
        &self,
        email: &str,
    ) -> Result<QuestionSetOutcome, AssessmentError> {
        let mut rng = StdRng::from_entropy();
        self.issue_question_set_with_rng(email, Utc::now(), &mut rng)
            .await
    }

    /// Issue a question set with an explicit clock and random source.
    ///
    /// Blocked candidates short-circuit before the catalog is read.
    pub async fn issue_question_set_with_rng<R: Rng + Send>(
        &self,
        email: &str,
        now: DateTime<Utc>,
        rng: &mut R,
    ) -> Result<QuestionSetOutcome, AssessmentError> {
        let email = require(email, "email")?;

        match self.lookup_eligibility(email, now).await {
            Ok(Eligibility::Blocked { retry_at }) => {
                tracing::info!("{email} blocked until {retry_at}");
                return Ok(QuestionSetOutcome::Blocked { retry_at });
            }
            Ok(Eligibility::Eligible) => {}
            Err(e) if e.is_recoverable() => {
                tracing::warn!("{e}; serving fallback questions to {email}");
                return Ok(QuestionSetOutcome::Issued(self.fallback_set(rng)));
            }
            Err(e) => return Err(e),
        }

        let pool = match self
            .bounded("list_questions", self.store.list_questions())
            .await
        {
            Ok(pool) if !pool.is_empty() => pool,
            Ok(_) => {
                tracing::warn!("question catalog is empty; serving fallback questions to {email}");
                return Ok(QuestionSetOutcome::Issued(self.fallback_set(rng)));
            }
            Err(e) => {
                tracing::warn!("{e}; serving fallback questions to {email}");
                return Ok(QuestionSetOutcome::Issued(self.fallback_set(rng)));
            }
        };

        let questions = select_questions(&pool, &self.config.targets, rng);
        tracing::info!("issued {} questions to {email}", questions.len());
        Ok(QuestionSetOutcome::Issued(QuestionSet {
            questions,
            source: PoolSource::Store,
        }))
    }

    fn fallback_set<R: Rng>(&self, rng: &mut R) -> QuestionSet {
        let pool = self.fallback.questions();
        QuestionSet {
            questions: select_questions(&pool, &self.config.targets, rng),
            source: PoolSource::Fallback,
        }
    }

    /// Score a submission, persist the result and notify the candidate.
    pub async fn submit(
        &self,
        submission: Submission,
    ) -> Result<SubmissionOutcome, AssessmentError> {
        self.submit_at(submission, Utc::now()).await
    }

    /// Score a submission with an explicit clock.
    pub async fn submit_at(
        &self,
        mut submission: Submission,
        now: DateTime<Utc>,
    ) -> Result<SubmissionOutcome, AssessmentError> {
        submission.email = require(&submission.email, "email")?.to_string();

        let ids = scoring::submitted_ids(&submission);
        let key = match self.bounded("answer_key", self.store.answer_key(&ids)).await {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("{e}; using mock score for {}", submission.email);
                return Ok(self.fallback_outcome(&submission, now));
            }
        };

        let result = scoring::score_submission(&submission, &key, &self.config.thresholds, now);
        tracing::info!(
            "scored {}: {}% ({}), {} correct / {} wrong",
            result.email,
            result.score,
            result.status,
            result.correct,
            result.wrong
        );

        if let Err(e) = self
            .bounded("insert_result", self.store.insert_result(&result))
            .await
        {
            tracing::error!("{e}; result {} for {} not persisted", result.id, result.email);
            return Ok(SubmissionOutcome {
                result,
                source: PoolSource::Store,
                persisted: false,
                notification: None,
            });
        }

        let notice = ResultNotice::for_result(&result, self.config.reapply_cooldown);
        let notification = Some(self.spawn_notification(notice));
        Ok(SubmissionOutcome {
            result,
            source: PoolSource::Store,
            persisted: true,
            notification,
        })
    }

    /// A synthetic result for when answers cannot be checked. Never stored
    /// and never notified.
    fn fallback_outcome(&self, submission: &Submission, now: DateTime<Utc>) -> SubmissionOutcome {
        let mut rng = StdRng::from_entropy();
        let score = self.fallback.mock_score(&mut rng);
        let status = self.config.thresholds.classify(score);
        tracing::info!(
            "mock score for {} from {} fallback: {score}% ({status})",
            submission.email,
            self.fallback.name()
        );

        SubmissionOutcome {
            result: AssessmentResult {
                id: Uuid::new_v4(),
                email: submission.email.clone(),
                score,
                correct: 0,
                wrong: 0,
                category_breakdown: Default::default(),
                difficulty_breakdown: Default::default(),
                duration: submission.duration,
                status,
                created_at: now,
            },
            source: PoolSource::Fallback,
            persisted: false,
            notification: None,
        }
    }

    fn spawn_notification(&self, notice: ResultNotice) -> JoinHandle<()> {
        let notifier = Arc::clone(&self.notifier);
        tokio::spawn(async move {
            if let Err(e) = notifier.notify(&notice).await {
                let failure = AssessmentError::NotificationFailure(format!("{e:#}"));
                tracing::error!("{failure} ({} via {})", notice.email, notifier.name());
            }
        })
    }

    /// Record an anti-cheat event stamped with the current time.
    pub async fn record_event(&self, email: &str, event_type: &str) -> Result<Ack, AssessmentError> {
        self.record_event_at(email, event_type, Utc::now()).await
    }

    /// Record an anti-cheat event. A store failure is logged and still
    /// acknowledged.
    pub async fn record_event_at(
        &self,
        email: &str,
        event_type: &str,
        at: DateTime<Utc>,
    ) -> Result<Ack, AssessmentError> {
        let event = anticheat::new_event(email, event_type, at)?;

        match self
            .bounded("append_event", self.store.append_event(&event))
            .await
        {
            Ok(()) => {
                tracing::info!("anti-cheat: {} - {}", event.email, event.event_type);
                Ok(Ack::logged(event.id, true))
            }
            Err(e) => {
                tracing::warn!(
                    "{e}; anti-cheat (unpersisted): {} - {} at {}",
                    event.email,
                    event.event_type,
                    event.occurred_at
                );
                Ok(Ack::logged(event.id, false))
            }
        }
    }
}

fn require<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AssessmentError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AssessmentError::ValidationGap { field })
    } else {
        Ok(trimmed)
    }
}
