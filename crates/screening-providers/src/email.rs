//! Email notifier backed by a Resend-style HTTP API.

use async_trait::async_trait;
use serde::Serialize;
use tracing::instrument;

use screening_core::model::{ResultNotice, Status};
use screening_core::traits::Notifier;

use crate::error::NotifierError;

const DEFAULT_BASE_URL: &str = "https://api.resend.com";
const DEFAULT_FROM: &str = "Screening <noreply@screening.example.com>";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Sends each result notice as one email.
pub struct EmailNotifier {
    api_key: String,
    from: String,
    base_url: String,
    client: reqwest::Client,
}

impl EmailNotifier {
    pub fn new(
        api_key: &str,
        from: Option<String>,
        base_url: Option<String>,
    ) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            api_key: api_key.to_string(),
            from: from.unwrap_or_else(|| DEFAULT_FROM.to_string()),
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            client,
        })
    }
}

#[derive(Serialize)]
struct SendEmailRequest<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: String,
    text: String,
}

/// Subject line for a notice. Rejects name the date the lock ends.
pub fn subject_for(notice: &ResultNotice) -> String {
    match (notice.status, notice.retry_at) {
        (Status::Pass, _) => "Round 1 Passed".to_string(),
        (Status::Review, _) => "Round 1 Under Review".to_string(),
        (Status::Reject, Some(retry_at)) => {
            format!("Round 1 Result: Reapply after {}", retry_at.format("%Y-%m-%d"))
        }
        (Status::Reject, None) => "Round 1 Result: Not Selected".to_string(),
    }
}

/// Plain-text body for a notice.
pub fn body_for(notice: &ResultNotice) -> String {
    format!(
        "Your score was {}%. Status: {}.",
        notice.score,
        notice.status.to_string().to_uppercase()
    )
}

#[async_trait]
impl Notifier for EmailNotifier {
    fn name(&self) -> &str {
        "email"
    }

    #[instrument(skip(self, notice), fields(status = %notice.status))]
    async fn notify(&self, notice: &ResultNotice) -> anyhow::Result<()> {
        let body = SendEmailRequest {
            from: &self.from,
            to: vec![notice.email.as_str()],
            subject: subject_for(notice),
            text: body_for(notice),
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifierError::Timeout(DEFAULT_TIMEOUT_SECS)
                } else {
                    NotifierError::NetworkError(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        if status == 401 || status == 403 {
            let text = response.text().await.unwrap_or_default();
            return Err(NotifierError::AuthenticationFailed(text).into());
        }
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(1)
                * 1000;
            return Err(NotifierError::RateLimited {
                retry_after_ms: retry_after,
            }
            .into());
        }
        if status >= 400 {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifierError::ApiError { status, message }.into());
        }

        tracing::info!("result email sent to {}", notice.email);
        Ok(())
    }
}
