use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

#[derive(Debug, Clone)]
pub struct EmailConfig {
    pub provider: EmailProviderType,
    pub sendgrid_api_key: Option<String>,
    pub from_address: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailProviderType {
    SendGrid,
    Mock,
    None,
}

#[derive(Debug, Error)]
pub enum EmailError {
    #[error("email not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// A message accepted by the mock provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
}

pub struct EmailService {
    config: EmailConfig,
    client: reqwest::Client,
    outbox: Mutex<Vec<SentEmail>>,
}

#[derive(Serialize)]
struct SendGridPayload<'a> {
    personalizations: Vec<SendGridPersonalization<'a>>,
    from: SendGridAddress<'a>,
    subject: &'a str,
    content: Vec<SendGridContent<'a>>,
}

#[derive(Serialize)]
struct SendGridPersonalization<'a> {
    to: Vec<SendGridAddress<'a>>,
}

#[derive(Serialize)]
struct SendGridAddress<'a> {
    email: &'a str,
}

#[derive(Serialize)]
struct SendGridContent<'a> {
    #[serde(rename = "type")]
    content_type: &'a str,
    value: &'a str,
}

impl EmailService {
    pub fn new(config: EmailConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            outbox: Mutex::new(Vec::new()),
        }
    }

    pub fn from_env() -> Self {
        let provider = match env_string("EMAIL_PROVIDER").as_deref() {
            Some("sendgrid") => EmailProviderType::SendGrid,
            Some("mock") => EmailProviderType::Mock,
            _ => EmailProviderType::None,
        };

        Self::new(EmailConfig {
            provider,
            sendgrid_api_key: env_string("SENDGRID_API_KEY"),
            from_address: env_string("EMAIL_FROM")
                .unwrap_or_else(|| "noreply@lexilist.app".into()),
        })
    }

    pub fn mock() -> Self {
        Self::new(EmailConfig {
            provider: EmailProviderType::Mock,
            sendgrid_api_key: None,
            from_address: "noreply@lexilist.app".into(),
        })
    }

    pub fn is_available(&self) -> bool {
        match self.config.provider {
            EmailProviderType::SendGrid => self.config.sendgrid_api_key.is_some(),
            EmailProviderType::Mock => true,
            EmailProviderType::None => false,
        }
    }

    pub fn provider_type(&self) -> EmailProviderType {
        self.config.provider
    }

    /// Messages accepted by the mock provider, oldest first.
    pub fn sent(&self) -> Vec<SentEmail> {
        self.outbox.lock().clone()
    }

    pub async fn send_email(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        match self.config.provider {
            EmailProviderType::SendGrid => self.send_via_sendgrid(to, subject, html_body).await,
            EmailProviderType::Mock => {
                tracing::info!(to, subject, "mock email accepted");
                self.outbox.lock().push(SentEmail {
                    to: to.to_string(),
                    subject: subject.to_string(),
                    body: html_body.to_string(),
                });
                Ok(())
            }
            EmailProviderType::None => Err(EmailError::NotConfigured("EMAIL_PROVIDER")),
        }
    }

    pub async fn send_password_reset(&self, to: &str, reset_link: &str) -> Result<(), EmailError> {
        let body = format!(
            "<p>We received a request to reset your LexiList password.</p>\
             <p><a href=\"{reset_link}\">Reset your password</a></p>\
             <p>The link expires in 15 minutes. If you did not ask for this, ignore this email.</p>"
        );
        self.send_email(to, "Reset your LexiList password", &body).await
    }

    async fn send_via_sendgrid(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        let api_key = self
            .config
            .sendgrid_api_key
            .as_deref()
            .ok_or(EmailError::NotConfigured("SENDGRID_API_KEY"))?;

        let payload = SendGridPayload {
            personalizations: vec![SendGridPersonalization {
                to: vec![SendGridAddress { email: to }],
            }],
            from: SendGridAddress {
                email: &self.config.from_address,
            },
            subject,
            content: vec![SendGridContent {
                content_type: "text/html",
                value: html_body,
            }],
        };

        let resp = self
            .client
            .post(SENDGRID_ENDPOINT)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(EmailError::HttpStatus { status, body });
        }

        Ok(())
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
