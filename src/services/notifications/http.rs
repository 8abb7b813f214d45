//! HTTP-backed delivery for every channel kind.
//!
//! Email goes through SendGrid, push through Pushover, SMS through Twilio;
//! Discord and Slack are plain webhooks; Telegram uses the bot API.
//! Transient failures (transport errors, 429, 5xx) are retried with
//! exponential backoff.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use serde_json::json;
use tracing::warn;

use super::Notifier;
use crate::config::NotifierConfig;
use crate::error::NotifyError;
use crate::models::Channel;

pub struct HttpNotifier {
    client: reqwest::Client,
    config: NotifierConfig,
}

impl HttpNotifier {
    pub fn new(config: NotifierConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self::with_client(config, client))
    }

    pub fn with_client(config: NotifierConfig, client: reqwest::Client) -> Self {
        Self { client, config }
    }

    fn url(base: &str, path: &str) -> Result<url::Url, NotifyError> {
        Ok(url::Url::parse(&format!(
            "{}/{}",
            base.trim_end_matches('/'),
            path.trim_start_matches('/')
        ))?)
    }

    async fn check(response: reqwest::Response) -> Result<(), NotifyError> {
        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        let body = response.text().await.unwrap_or_default();
        Err(NotifyError::Rejected {
            status: status.as_u16(),
            body,
        })
    }

    async fn send_once(
        &self,
        channel: &Channel,
        subject: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        let request = match channel {
            Channel::Email { to } => {
                let api_key = self
                    .config
                    .sendgrid_api_key
                    .as_deref()
                    .ok_or(NotifyError::MissingCredential("SENDGRID_API_KEY"))?;
                self.client
                    .post(Self::url(&self.config.sendgrid_base_url, "v3/mail/send")?)
                    .bearer_auth(api_key)
                    .json(&json!({
                        "personalizations": [{ "to": [{ "email": to }] }],
                        "from": { "email": self.config.email_from },
                        "subject": subject,
                        "content": [{ "type": "text/plain", "value": message }],
                    }))
            }
            Channel::Discord { webhook_url } => self
                .client
                .post(url::Url::parse(webhook_url)?)
                .json(&json!({ "content": message })),
            Channel::Slack { webhook_url } => self
                .client
                .post(url::Url::parse(webhook_url)?)
                .json(&json!({ "text": message })),
            Channel::Push { user_key } => {
                let token = self
                    .config
                    .pushover_api_token
                    .as_deref()
                    .ok_or(NotifyError::MissingCredential("PUSHOVER_API_TOKEN"))?;
                self.client
                    .post(Self::url(&self.config.pushover_base_url, "1/messages.json")?)
                    .form(&[
                        ("token", token),
                        ("user", user_key.as_str()),
                        ("title", subject),
                        ("message", message),
                    ])
            }
            Channel::Telegram { bot_token, chat_id } => self
                .client
                .post(Self::url(
                    &self.config.telegram_base_url,
                    &format!("bot{}/sendMessage", bot_token),
                )?)
                .json(&json!({ "chat_id": chat_id, "text": message })),
            Channel::Sms {
                account_sid,
                auth_token,
                from,
                to,
            } => self
                .client
                .post(Self::url(
                    &self.config.twilio_base_url,
                    &format!("2010-04-01/Accounts/{}/Messages.json", account_sid),
                )?)
                .basic_auth(account_sid, Some(auth_token))
                .form(&[("From", from.as_str()), ("To", to.as_str()), ("Body", message)]),
        };

        Self::check(request.send().await?).await
    }
}

#[async_trait]
impl Notifier for HttpNotifier {
    async fn deliver(
        &self,
        channel: &Channel,
        subject: &str,
        message: &str,
    ) -> Result<(), NotifyError> {
        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.config.retry_min_delay)
            .with_max_times(self.config.retry_attempts);

        (|| self.send_once(channel, subject, message))
            .retry(backoff)
            .when(NotifyError::is_transient)
            .notify(|e, delay| {
                warn!(
                    channel = channel.kind().as_str(),
                    error = %e,
                    retry_in_ms = delay.as_millis() as u64,
                    "Notification attempt failed, retrying"
                );
            })
            .await
    }
}
