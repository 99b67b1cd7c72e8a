//! Notifier that writes notices to the application log.

use async_trait::async_trait;

use screening_core::model::ResultNotice;
use screening_core::traits::Notifier;

use crate::email::{body_for, subject_for};

/// Logs each notice at info level instead of sending it anywhere.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn notify(&self, notice: &ResultNotice) -> anyhow::Result<()> {
        tracing::info!(
            to = %notice.email,
            subject = %subject_for(notice),
            "{}",
            body_for(notice)
        );
        Ok(())
    }
}
