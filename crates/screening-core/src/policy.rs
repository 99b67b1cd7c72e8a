//! Reapply lock.
//!
//! A reject starts a cooldown during which the candidate may not take the
//! test again. Pass and review outcomes never lock.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{AssessmentResult, Status};

/// Cooldown after a reject, in weeks.
pub const REAPPLY_COOLDOWN_WEEKS: i64 = 6;

/// The default cooldown after a reject.
pub fn default_cooldown() -> Duration {
    Duration::weeks(REAPPLY_COOLDOWN_WEEKS)
}

/// Whether a candidate may start a new attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Eligibility {
    Eligible,
    Blocked { retry_at: DateTime<Utc> },
}

impl Eligibility {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

/// Decide eligibility from the candidate's most recent result.
pub fn evaluate(
    last: Option<&AssessmentResult>,
    now: DateTime<Utc>,
    cooldown: Duration,
) -> Eligibility {
    match last {
        Some(result) if result.status == Status::Reject => {
            let retry_at = result.created_at + cooldown;
            if now < retry_at {
                Eligibility::Blocked { retry_at }
            } else {
                Eligibility::Eligible
            }
        }
        _ => Eligibility::Eligible,
    }
}
