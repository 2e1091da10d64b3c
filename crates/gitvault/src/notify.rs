//! Webhook notification for run summaries.
//!
//! Sends one Slack-compatible incoming-webhook message per run: a short
//! headline plus an attachment carrying the counters and, on failure, the
//! list of repositories that could not be synced. Delivery is best-effort
//! and never retried; the run's exit code does not depend on it.

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

use crate::http::{HttpError, HttpMethod, HttpRequest, HttpTransport};
use crate::run::RunReport;

const USERNAME: &str = "gitvault";
const ICON_EMOJI: &str = ":floppy_disk:";
const COLOR_GOOD: &str = "good";
const COLOR_DANGER: &str = "danger";

/// Slack incoming-webhook payload.
#[derive(Debug, Serialize)]
struct WebhookMessage {
    text: String,
    username: &'static str,
    icon_emoji: &'static str,
    attachments: Vec<Attachment>,
}

#[derive(Debug, Serialize)]
struct Attachment {
    color: &'static str,
    title: String,
    fields: Vec<Field>,
    footer: &'static str,
    ts: i64,
}

#[derive(Debug, Serialize)]
struct Field {
    title: &'static str,
    value: String,
    short: bool,
}

#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("failed to encode webhook payload: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to deliver notification: {0}")]
    Transport(#[from] HttpError),

    #[error("webhook endpoint returned status {0}")]
    Status(u16),
}

/// Posts run summaries to a webhook endpoint.
pub struct Notifier {
    transport: Arc<dyn HttpTransport>,
}

impl Notifier {
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self { transport }
    }

    /// Send `report` to `endpoint` as a single JSON POST.
    pub async fn notify(&self, endpoint: &str, report: &RunReport) -> Result<(), DeliveryError> {
        let message = build_message(report);
        let body = serde_json::to_vec(&message)?;

        let request = HttpRequest {
            method: HttpMethod::Post,
            url: endpoint.to_string(),
            headers: vec![(
                "Content-Type".to_string(),
                "application/json".to_string(),
            )],
            body,
        };

        let response = self.transport.send(request).await?;
        if !(200..300).contains(&response.status) {
            return Err(DeliveryError::Status(response.status));
        }
        Ok(())
    }
}

fn build_message(report: &RunReport) -> WebhookMessage {
    let (text, color, title) = if report.success() {
        (
            "Backup run completed successfully".to_string(),
            COLOR_GOOD,
            "All repositories backed up".to_string(),
        )
    } else {
        (
            "Backup run finished with errors".to_string(),
            COLOR_DANGER,
            format!("{} repositories failed", report.error_count()),
        )
    };

    let mut fields = vec![
        Field {
            title: "Repositories",
            value: report.processed.to_string(),
            short: true,
        },
        Field {
            title: "Errors",
            value: report.error_count().to_string(),
            short: true,
        },
        Field {
            title: "Duration",
            value: format_duration(report.duration()),
            short: true,
        },
        Field {
            title: "Started",
            value: report
                .started_at
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            short: true,
        },
    ];

    if !report.failed.is_empty() {
        fields.push(Field {
            title: "Failed repositories",
            value: report.failed.join("\n"),
            short: false,
        });
    }

    WebhookMessage {
        text,
        username: USERNAME,
        icon_emoji: ICON_EMOJI,
        attachments: vec![Attachment {
            color,
            title,
            fields,
            footer: "gitvault",
            ts: report.finished_at.timestamp(),
        }],
    }
}

/// Render a duration as `1h 2m 3s`, omitting leading zero units.
fn format_duration(duration: chrono::Duration) -> String {
    let total = duration.num_seconds().max(0);
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;

    if hours > 0 {
        format!("{hours}h {minutes}m {seconds}s")
    } else if minutes > 0 {
        format!("{minutes}m {seconds}s")
    } else {
        format!("{seconds}s")
    }
}
