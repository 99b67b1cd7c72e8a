//! Mock notifier for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use screening_core::model::ResultNotice;
use screening_core::traits::Notifier;

/// A notifier that records every notice it is asked to deliver.
///
/// Can be switched into a failing mode to exercise the engine's handling of
/// delivery errors.
#[derive(Default)]
pub struct MockNotifier {
    sent: Mutex<Vec<ResultNotice>>,
    call_count: AtomicU32,
    failure: Option<String>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose every delivery fails with `message`.
    pub fn failing(message: &str) -> Self {
        Self {
            failure: Some(message.to_string()),
            ..Self::default()
        }
    }

    /// Number of delivery attempts, including failed ones.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Notices delivered successfully, in order.
    pub fn sent(&self) -> Vec<ResultNotice> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn notify(&self, notice: &ResultNotice) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Some(message) = &self.failure {
            anyhow::bail!("{message}");
        }
        if let Ok(mut sent) = self.sent.lock() {
            sent.push(notice.clone());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use screening_core::model::Status;

    fn notice() -> ResultNotice {
        ResultNotice {
            email: "a@b.c".into(),
            status: Status::Review,
            score: 60,
            retry_at: None,
        }
    }

    #[tokio::test]
    async fn records_notices() {
        let mock = MockNotifier::new();
        mock.notify(&notice()).await.unwrap();
        mock.notify(&notice()).await.unwrap();
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.sent(), vec![notice(), notice()]);
    }

    #[tokio::test]
    async fn failing_mode() {
        let mock = MockNotifier::failing("smtp down");
        let err = mock.notify(&notice()).await.unwrap_err();
        assert_eq!(err.to_string(), "smtp down");
        assert_eq!(mock.call_count(), 1);
        assert!(mock.sent().is_empty());
    }
}
