//! Anti-cheat event recording.
//!
//! Events are observational only: they never feed into scoring and are
//! never deduplicated.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AssessmentError;
use crate::model::AntiCheatEvent;

/// Acknowledgement returned to the client after an event is reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Always "logged"; the client does not need to know about storage.
    pub status: String,
    pub event_id: Uuid,
    /// `false` when the store rejected the write and the event only went to
    /// the application log.
    pub persisted: bool,
}

impl Ack {
    pub fn logged(event_id: Uuid, persisted: bool) -> Self {
        Self {
            status: "logged".to_string(),
            event_id,
            persisted,
        }
    }
}

/// Build a new event. Any non-empty event type is accepted.
pub fn new_event(
    email: &str,
    event_type: &str,
    at: DateTime<Utc>,
) -> Result<AntiCheatEvent, AssessmentError> {
    let email = email.trim();
    let event_type = event_type.trim();
    if email.is_empty() {
        return Err(AssessmentError::ValidationGap { field: "email" });
    }
    if event_type.is_empty() {
        return Err(AssessmentError::ValidationGap { field: "event_type" });
    }

    Ok(AntiCheatEvent {
        id: Uuid::new_v4(),
        email: email.to_string(),
        event_type: event_type.to_string(),
        occurred_at: at,
    })
}

/// Per-type summary of a candidate's events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventTally {
    pub total: usize,
    pub by_type: BTreeMap<String, usize>,
    pub first_at: Option<DateTime<Utc>>,
    pub last_at: Option<DateTime<Utc>>,
}

impl EventTally {
    pub fn from_events(events: &[AntiCheatEvent]) -> Self {
        let mut tally = EventTally::default();
        for event in events {
            tally.total += 1;
            *tally.by_type.entry(event.event_type.clone()).or_insert(0) += 1;
            tally.first_at = Some(match tally.first_at {
                Some(t) => t.min(event.occurred_at),
                None => event.occurred_at,
            });
            tally.last_at = Some(match tally.last_at {
                Some(t) => t.max(event.occurred_at),
                None => event.occurred_at,
            });
        }
        tally
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn accepts_any_event_type() {
        let now = Utc::now();
        for tag in ["blur", "copy", "fullscreen-exit", "devtools-opened"] {
            let event = new_event("a@b.c", tag, now).unwrap();
            assert_eq!(event.event_type, tag);
            assert_eq!(event.occurred_at, now);
        }
    }

    #[test]
    fn missing_fields_are_validation_gaps() {
        let now = Utc::now();
        let err = new_event("  ", "blur", now).unwrap_err();
        assert_eq!(err.missing_field(), Some("email"));
        let err = new_event("a@b.c", "", now).unwrap_err();
        assert_eq!(err.missing_field(), Some("event_type"));
    }

    #[test]
    fn identical_events_get_distinct_ids() {
        let now = Utc::now();
        let a = new_event("a@b.c", "blur", now).unwrap();
        let b = new_event("a@b.c", "blur", now).unwrap();
        assert_ne!(a.id, b.id);
        assert_eq!(a.occurred_at, b.occurred_at);
    }

    #[test]
    fn tally_counts_by_type() {
        let start = Utc::now();
        let events: Vec<AntiCheatEvent> = ["blur", "copy", "blur"]
            .iter()
            .enumerate()
            .map(|(i, t)| new_event("a@b.c", t, start + Duration::seconds(i as i64)).unwrap())
            .collect();
        let tally = EventTally::from_events(&events);
        assert_eq!(tally.total, 3);
        assert_eq!(tally.by_type["blur"], 2);
        assert_eq!(tally.by_type["copy"], 1);
        assert_eq!(tally.first_at, Some(start));
        assert_eq!(tally.last_at, Some(start + Duration::seconds(2)));
        assert_eq!(EventTally::from_events(&[]), EventTally::default());
    }
}
