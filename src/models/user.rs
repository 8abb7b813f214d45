use serde::{Deserialize, Serialize};

/// Notification recipient. Each populated field enables one channel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Discord webhook URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    /// Pushover user key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub push: Option<String>,
    /// Slack webhook URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<String>,
    /// Write-only: never echoed back to clients.
    #[serde(default, skip_serializing)]
    pub telegram_bot_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub telegram_chat_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_sid: Option<String>,
    /// Write-only, like `telegram_bot_token`.
    #[serde(default, skip_serializing)]
    pub sms_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sms_to: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Email,
    Discord,
    Push,
    Slack,
    Telegram,
    Sms,
}

impl ChannelKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ChannelKind::Email => "email",
            ChannelKind::Discord => "discord",
            ChannelKind::Push => "push",
            ChannelKind::Slack => "slack",
            ChannelKind::Telegram => "telegram",
            ChannelKind::Sms => "sms",
        }
    }
}

/// A single deliverable destination derived from a user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Email { to: String },
    Discord { webhook_url: String },
    Push { user_key: String },
    Slack { webhook_url: String },
    Telegram { bot_token: String, chat_id: String },
    Sms {
        account_sid: String,
        auth_token: String,
        from: String,
        to: String,
    },
}

impl Channel {
    pub fn kind(&self) -> ChannelKind {
        match self {
            Channel::Email { .. } => ChannelKind::Email,
            Channel::Discord { .. } => ChannelKind::Discord,
            Channel::Push { .. } => ChannelKind::Push,
            Channel::Slack { .. } => ChannelKind::Slack,
            Channel::Telegram { .. } => ChannelKind::Telegram,
            Channel::Sms { .. } => ChannelKind::Sms,
        }
    }

    /// Identifier reported in `notifiedUsers`.
    pub fn recipient(&self) -> &str {
        match self {
            Channel::Email { to } => to,
            Channel::Discord { webhook_url } | Channel::Slack { webhook_url } => webhook_url,
            Channel::Push { user_key } => user_key,
            Channel::Telegram { chat_id, .. } => chat_id,
            Channel::Sms { to, .. } => to,
        }
    }
}

fn present(value: &Option<String>) -> Option<String> {
    value
        .as_ref()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

impl User {
    /// Every channel this record can be reached on. Telegram needs both the
    /// bot token and chat id; SMS needs all four Twilio fields.
    pub fn channels(&self) -> Vec<Channel> {
        let mut channels = Vec::new();

        if let Some(to) = present(&self.email) {
            channels.push(Channel::Email { to });
        }
        if let Some(webhook_url) = present(&self.discord) {
            channels.push(Channel::Discord { webhook_url });
        }
        if let Some(user_key) = present(&self.push) {
            channels.push(Channel::Push { user_key });
        }
        if let Some(webhook_url) = present(&self.slack) {
            channels.push(Channel::Slack { webhook_url });
        }
        if let (Some(bot_token), Some(chat_id)) = (
            present(&self.telegram_bot_token),
            present(&self.telegram_chat_id),
        ) {
            channels.push(Channel::Telegram { bot_token, chat_id });
        }
        if let (Some(account_sid), Some(auth_token), Some(from), Some(to)) = (
            present(&self.sms_sid),
            present(&self.sms_token),
            present(&self.sms_from),
            present(&self.sms_to),
        ) {
            channels.push(Channel::Sms {
                account_sid,
                auth_token,
                from,
                to,
            });
        }

        channels
    }
}
