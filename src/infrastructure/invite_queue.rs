//! Invite notifier publishing to an SQS queue

use crate::domain::entities::InviteMessage;
use crate::domain::repositories::{InviteNotifier, NotificationError};
use async_trait::async_trait;
use aws_sdk_sqs::Client as SqsClient;

/// Sends each batch of invites as one queue message holding the JSON array
#[derive(Clone)]
pub struct QueueInviteNotifier {
    client: SqsClient,
    queue_url: String,
}

impl QueueInviteNotifier {
    pub fn new(client: SqsClient, queue_url: impl Into<String>) -> Self {
        Self {
            client,
            queue_url: queue_url.into(),
        }
    }

    /// Build the SQS client from the ambient AWS environment
    pub async fn from_env(queue_url: impl Into<String>) -> Self {
        let shared_config = aws_config::from_env().load().await;
        Self::new(SqsClient::new(&shared_config), queue_url)
    }
}

/// Queue message body for a batch of invites
pub fn message_body(invites: &[InviteMessage]) -> Result<String, NotificationError> {
    serde_json::to_string(invites).map_err(|e| NotificationError::Serialization(e.to_string()))
}

#[async_trait]
impl InviteNotifier for QueueInviteNotifier {
    async fn notify(&self, invites: &[InviteMessage]) -> Result<(), NotificationError> {
        if invites.is_empty() {
            return Ok(());
        }

        let body = message_body(invites)?;
        tracing::debug!("Queueing {} invite(s) on {}", invites.len(), self.queue_url);

        self.client
            .send_message()
            .queue_url(&self.queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| NotificationError::SendFailed(format!("Failed to send message to SQS: {}", e)))?;

        tracing::info!("Queued {} invite(s)", invites.len());
        Ok(())
    }
}
