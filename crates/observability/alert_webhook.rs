use super::notifier::{NotificationEvent, NotificationProvider};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::Client;
use serde_json::json;
use url::Url;

/// Posts error events as `{"text": …}` payloads to a generic alert
/// webhook (Slack-compatible incoming-webhook shape).
pub(crate) struct AlertWebhookProvider {
    webhook_url: Url,
    client: Client,
}

impl AlertWebhookProvider {
    pub(crate) fn new(webhook_url: Url) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(3))
            .build()
            .expect("reqwest client must build");

        Self {
            webhook_url,
            client,
        }
    }

    fn format_text(&self, event: &NotificationEvent) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "[{}] {} {} ({})",
            event.level.as_str(),
            event.service_name,
            event.component,
            event.environment
        ));

        lines.push(format!(
            "{} {}",
            event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            event.target
        ));

        if let Some(message) = event.message.as_ref().filter(|m| !m.trim().is_empty()) {
            lines.push(format!("> {}", message.trim()));
        }

        for (key, value) in &event.fields {
            lines.push(format!("- {key} = {value}"));
        }

        truncate_for_webhook(lines.join("\n"))
    }
}

#[async_trait]
impl NotificationProvider for AlertWebhookProvider {
    async fn send(&self, event: &NotificationEvent) -> Result<()> {
        let text = self.format_text(event);

        let response = self
            .client
            .post(self.webhook_url.clone())
            .json(&json!({ "text": text }))
            .send()
            .await
            .map_err(sanitize_reqwest_error)?;

        if response.status().is_success() {
            return Ok(());
        }

        Err(anyhow!(
            "alert webhook returned non-success status: {}",
            response.status()
        ))
    }

    fn provider_name(&self) -> &'static str {
        "alert_webhook"
    }
}

// Webhook URLs are secrets; strip them from transport errors.
fn sanitize_reqwest_error(error: reqwest::Error) -> anyhow::Error {
    if error.is_timeout() {
        return anyhow!("alert webhook request timed out");
    }
    if error.is_connect() {
        return anyhow!("alert webhook connection failed");
    }
    anyhow!("alert webhook request failed")
}

fn truncate_for_webhook(mut content: String) -> String {
    const LIMIT: usize = 4000;
    const SUFFIX: &str = "\n… (truncated)";

    if content.chars().count() <= LIMIT {
        return content;
    }

    let allowed = LIMIT.saturating_sub(SUFFIX.chars().count());
    let truncated: String = content.chars().take(allowed).collect();
    content.clear();
    content.push_str(&truncated);
    content.push_str(SUFFIX);
    content
}
