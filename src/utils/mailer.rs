use serde_json::json;

use crate::config::Mail;

/// Outbound mail collaborator. Delivery is best-effort by contract: the
/// reset flow must answer the client the same way whether or not the mail
/// actually went out, so failures are logged and swallowed here.
#[derive(Debug, Clone)]
pub struct Mailer {
    client: reqwest::Client,
    endpoint: Option<String>,
    from: String,
    reset_link_base: String,
}

impl Mailer {
    pub fn from_config(mail: &Mail) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: mail.endpoint().map(String::from),
            from: mail.from().to_string(),
            reset_link_base: mail.reset_link_base().to_string(),
        }
    }

    pub fn reset_link(&self, token: &str) -> String {
        format!("{}?token={}", self.reset_link_base, token)
    }

    pub async fn send(&self, to: &str, subject: &str, text: &str, html: &str) {
        let Some(endpoint) = &self.endpoint else {
            tracing::info!(to, subject, "mail endpoint not configured, logging only");
            return;
        };

        let body = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "text": text,
            "html": html,
        });

        match self.client.post(endpoint).json(&body).send().await {
            Ok(resp) if resp.status().is_success() => {
                tracing::debug!(to, subject, "mail dispatched");
            }
            Ok(resp) => {
                tracing::warn!(to, status = %resp.status(), "mail endpoint rejected message");
            }
            Err(e) => {
                tracing::warn!(to, error = %e, "mail dispatch failed");
            }
        }
    }
}
