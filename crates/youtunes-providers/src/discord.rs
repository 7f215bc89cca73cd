//! Discord webhook client for run progress embeds.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::Serialize;

use crate::error::ProviderResult;
use crate::http::{build_client, ensure_success};

const SERVICE: &str = "discord";

pub const EMBED_TITLE: &str = "🎵 YouTunes Generation Log";
pub const EMBED_FOOTER: &str = "YouTunes AI Music Generator";

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    embeds: [&'a Embed; 1],
}

/// One embed as rendered by Discord.
#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
    /// RFC 3339 timestamp
    pub timestamp: String,
    pub footer: Footer,
}

#[derive(Debug, Clone, Serialize)]
pub struct Footer {
    pub text: String,
}

impl Embed {
    /// Progress embed stamped with the current time.
    pub fn progress(description: impl Into<String>, color: u32) -> Self {
        Self {
            title: EMBED_TITLE.to_string(),
            description: description.into(),
            color,
            timestamp: Utc::now().to_rfc3339(),
            footer: Footer {
                text: EMBED_FOOTER.to_string(),
            },
        }
    }
}

/// Webhook sender.
#[derive(Clone)]
pub struct DiscordWebhook {
    http: Client,
    url: String,
}

impl DiscordWebhook {
    pub fn new(url: impl Into<String>) -> ProviderResult<Self> {
        Ok(Self {
            http: build_client(Duration::from_secs(10))?,
            url: url.into(),
        })
    }

    /// Webhook from `DISCORD_WEBHOOK_URL`; `None` when unset or empty.
    pub fn from_env() -> ProviderResult<Option<Self>> {
        match std::env::var("DISCORD_WEBHOOK_URL") {
            Ok(url) if !url.trim().is_empty() => Self::new(url.trim()).map(Some),
            _ => Ok(None),
        }
    }

    /// Post a single embed.
    pub async fn send(&self, embed: &Embed) -> ProviderResult<()> {
        let payload = WebhookPayload { embeds: [embed] };
        let response = self.http.post(&self.url).json(&payload).send().await?;
        ensure_success(SERVICE, response).await?;
        Ok(())
    }
}
