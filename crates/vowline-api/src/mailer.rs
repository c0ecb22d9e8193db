use anyhow::{Context, Result, bail};
use tracing::info;

/// Outbound email. Picked once at startup: an HTTP mail API when one is
/// configured, otherwise log-only so dev setups keep working without
/// credentials.
pub enum Mailer {
    Http(HttpMailer),
    Log,
}

pub struct HttpMailer {
    client: reqwest::Client,
    api_url: String,
    api_key: Option<String>,
    from: String,
}

impl Mailer {
    pub fn new(api_url: Option<String>, api_key: Option<String>, from: String) -> Self {
        match api_url {
            Some(api_url) => Mailer::Http(HttpMailer {
                client: reqwest::Client::new(),
                api_url,
                api_key,
                from,
            }),
            None => Mailer::Log,
        }
    }

    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        match self {
            Mailer::Http(mailer) => mailer.send(to, subject, body).await,
            Mailer::Log => {
                info!("Mail (log only) to {}: {}", to, subject);
                Ok(())
            }
        }
    }
}

impl HttpMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> Result<()> {
        let mut request = self.client.post(&self.api_url).json(&serde_json::json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "text": body,
        }));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.context("mail API request failed")?;
        if !response.status().is_success() {
            bail!("mail API returned {}", response.status());
        }
        Ok(())
    }
}
