//! Delivery of search results: SendGrid mail, or the terminal when mail is
//! not configured

use async_trait::async_trait;
use courtwatch_browser::{Error, Notifier, Result};
use lazy_static::lazy_static;
use regex::Regex;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

const SENDGRID_ENDPOINT: &str = "https://api.sendgrid.com/v3/mail/send";

lazy_static! {
    static ref EMAIL_PATTERN: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
}

pub fn is_valid_email(address: &str) -> bool {
    EMAIL_PATTERN.is_match(address)
}

/// Mail settings as supplied on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct MailSettings {
    pub api_key: Option<String>,
    pub from: Option<String>,
    pub to: Vec<String>,
}

impl MailSettings {
    pub fn new(api_key: Option<String>, from: Option<String>, to: Option<String>) -> Self {
        let to = to
            .map(|list| {
                list.split(',')
                    .map(|address| address.trim().to_string())
                    .collect()
            })
            .unwrap_or_default();

        Self {
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            from: from.map(|address| address.trim().to_string()),
            to,
        }
    }

    /// Why mail cannot be sent with these settings, if anything
    pub fn problem(&self) -> Option<&'static str> {
        if self.api_key.is_none() {
            return Some("BADMINTON_SENDGRID_APIKEY is not set");
        }
        if !self.from.as_deref().is_some_and(is_valid_email) {
            return Some("BADMINTON_FROM_EMAIL is not set or not a valid email");
        }
        if self.to.is_empty() || !self.to.iter().all(|address| is_valid_email(address)) {
            return Some("BADMINTON_TO_EMAILS is not set or are not all valid emails");
        }
        None
    }

    /// SendGrid when fully configured, the console otherwise
    pub fn notifier(&self) -> Result<Box<dyn Notifier>> {
        if let Some(reason) = self.problem() {
            tracing::warn!("Skipping sending email. {}", reason);
            return Ok(Box::new(ConsoleNotifier));
        }

        let (Some(api_key), Some(from)) = (&self.api_key, &self.from) else {
            return Ok(Box::new(ConsoleNotifier));
        };
        let notifier = SendGridNotifier::new(api_key, from, self.to.clone())?;
        Ok(Box::new(notifier))
    }
}

#[derive(Debug, Serialize)]
struct Address<'a> {
    email: &'a str,
    name: &'a str,
}

#[derive(Debug, Serialize)]
struct Personalization<'a> {
    to: Vec<Address<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(rename = "type")]
    mime: &'a str,
    value: &'a str,
}

#[derive(Debug, Serialize)]
struct MailRequest<'a> {
    personalizations: Vec<Personalization<'a>>,
    from: Address<'a>,
    subject: &'a str,
    content: Vec<Content<'a>>,
}

/// Sends results through the SendGrid v3 mail API
///
/// Each recipient gets a separate personalization, so nobody sees the
/// other addresses.
pub struct SendGridNotifier {
    client: Client,
    endpoint: String,
    api_key: String,
    from: String,
    to: Vec<String>,
}

impl SendGridNotifier {
    pub fn new(api_key: &str, from: &str, to: Vec<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Notification(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: SENDGRID_ENDPOINT.to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
            to,
        })
    }

    fn request<'a>(&'a self, subject: &'a str, body: &'a str) -> MailRequest<'a> {
        MailRequest {
            personalizations: self
                .to
                .iter()
                .map(|address| Personalization {
                    to: vec![Address {
                        email: address,
                        name: address,
                    }],
                })
                .collect(),
            from: Address {
                email: &self.from,
                name: &self.from,
            },
            subject,
            content: vec![
                Content {
                    mime: "text/plain",
                    value: body,
                },
                Content {
                    mime: "text/html",
                    value: body,
                },
            ],
        }
    }
}

#[async_trait]
impl Notifier for SendGridNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        tracing::debug!("Mailing results to {} recipients", self.to.len());

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request(subject, body))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Notification("SendGrid request timed out".to_string())
                } else {
                    Error::Notification(format!("SendGrid request failed: {}", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Notification(format!(
                "SendGrid rejected the mail ({}): {}",
                status, detail
            )));
        }

        tracing::info!("Sent results email to {}", self.to.join(", "));
        Ok(())
    }
}

/// Writes the mail that would have been sent to stderr
pub struct ConsoleNotifier;

#[async_trait]
impl Notifier for ConsoleNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        eprintln!("{}", subject);
        eprint!("{}", body);
        Ok(())
    }
}
