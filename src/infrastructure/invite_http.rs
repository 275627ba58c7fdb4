/// Invite notifier posting to the Flexinets callback API

use crate::domain::entities::InviteMessage;
use crate::domain::repositories::{InviteNotifier, NotificationError};
use async_trait::async_trait;
use std::time::Duration;

pub const DEFAULT_INVITE_ENDPOINT: &str = "https://api.flexinets.se/api/ipass/sendinvite";

/// Basic auth credentials for the callback API
#[derive(Clone)]
pub struct ApiCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for ApiCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Sends invites as a JSON array over HTTP
#[derive(Clone)]
pub struct HttpInviteNotifier {
    client: reqwest::Client,
    endpoint: String,
    credentials: ApiCredentials,
}

impl HttpInviteNotifier {
    pub fn new(endpoint: impl Into<String>, credentials: ApiCredentials) -> Result<Self, NotificationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credentials,
        })
    }
}

#[async_trait]
impl InviteNotifier for HttpInviteNotifier {
    async fn notify(&self, invites: &[InviteMessage]) -> Result<(), NotificationError> {
        if invites.is_empty() {
            return Ok(());
        }

        tracing::debug!("Posting {} invite(s) to {}", invites.len(), self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .basic_auth(&self.credentials.username, Some(&self.credentials.password))
            .json(invites)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(NotificationError::Rejected(response.status().as_u16()));
        }

        tracing::info!("Sent {} invite(s)", invites.len());
        Ok(())
    }
}
