//! REST-backed chat platform client.
//!
//! Implements both collaborator traits against the platform's HTTP API:
//! membership lookups via `GET /guilds/{guild}/members/{user}` and
//! direct messages via `POST /users/{user}/messages`, authenticated with
//! the bot token as a bearer credential.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::{Membership, Messenger};
use crate::domain::{GuildId, UserId};
use crate::error::BotError;

/// Chat platform REST client.
#[derive(Debug, Clone)]
pub struct RestChatClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// Member payload returned by the membership endpoint.
#[derive(Debug, Deserialize)]
struct MemberPayload {
    display_name: Option<String>,
}

/// Direct-message request body.
#[derive(Debug, Serialize)]
struct DmPayload<'a> {
    content: &'a str,
}

impl RestChatClient {
    /// Creates a client from a preconfigured `reqwest` client, API base
    /// URL (no trailing slash), and bot token.
    #[must_use]
    pub fn new(http: reqwest::Client, base_url: String, token: String) -> Self {
        let base_url = base_url.trim_end_matches('/').to_string();
        Self {
            http,
            base_url,
            token,
        }
    }

    async fn fetch_member(
        &self,
        guild: GuildId,
        user: UserId,
    ) -> Result<Option<MemberPayload>, BotError> {
        let url = format!("{}/guilds/{}/members/{}", self.base_url, guild, user);
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .map_err(|e| BotError::ChatApi(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let payload = response
                    .json::<MemberPayload>()
                    .await
                    .map_err(|e| BotError::ChatApi(e.to_string()))?;
                Ok(Some(payload))
            }
            status => Err(BotError::ChatApi(format!(
                "membership lookup returned {status}"
            ))),
        }
    }
}

#[async_trait]
impl Membership for RestChatClient {
    async fn is_member(&self, guild: GuildId, user: UserId) -> Result<bool, BotError> {
        Ok(self.fetch_member(guild, user).await?.is_some())
    }

    async fn display_name(&self, guild: GuildId, user: UserId) -> String {
        match self.fetch_member(guild, user).await {
            Ok(Some(MemberPayload {
                display_name: Some(name),
            })) => name,
            Ok(_) => user.fallback_name(),
            Err(err) => {
                tracing::warn!(%err, %user, "display name lookup failed");
                user.fallback_name()
            }
        }
    }
}

#[async_trait]
impl Messenger for RestChatClient {
    async fn send_dm(&self, user: UserId, text: &str) -> Result<(), BotError> {
        let url = format!("{}/users/{}/messages", self.base_url, user);
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(&DmPayload { content: text })
            .send()
            .await
            .map_err(|e| BotError::ChatApi(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(BotError::ChatApi(format!(
                "direct message to {user} returned {}",
                response.status()
            )))
        }
    }
}
