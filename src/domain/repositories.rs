/// Port interfaces - define contracts without implementation
/// These follow the Dependency Inversion Principle

use crate::domain::entities::{CustomerId, InviteMessage, IpassService};
use async_trait::async_trait;
use thiserror::Error;

/// Outbound access to the iPass provisioning API
#[async_trait]
pub trait ProvisioningApi: Send + Sync {
    /// POST an XML document to a service and return the response document
    async fn post_document(
        &self,
        customer: CustomerId,
        service: IpassService,
        document: String,
    ) -> Result<String, ProvisioningError>;

    /// Run a user search and return the response document
    async fn search(
        &self,
        customer: CustomerId,
        criteria: &str,
        page: u32,
        limit: u32,
    ) -> Result<String, ProvisioningError>;
}

/// Channel that delivers invitation notifications
#[async_trait]
pub trait InviteNotifier: Send + Sync {
    async fn notify(&self, invites: &[InviteMessage]) -> Result<(), NotificationError>;
}

/// Provisioning API errors
#[derive(Debug, Error)]
pub enum ProvisioningError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("iPass returned error {code}: {message}")]
    Api { code: String, message: String },

    #[error("Response is missing element <{0}>")]
    MissingElement(&'static str),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Failed to build request document: {0}")]
    Document(String),

    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ProvisioningError {
    /// iPass rejects a create when the email already belongs to another end user
    pub fn is_duplicate_email(&self) -> bool {
        match self {
            ProvisioningError::Api { code, message } => {
                let message = message.to_ascii_lowercase();
                code.eq_ignore_ascii_case(DUPLICATE_EMAIL_CODE)
                    || (message.contains("email") && message.contains("already"))
            }
            _ => false,
        }
    }
}

/// Error code iPass answers with when an email address is taken
pub const DUPLICATE_EMAIL_CODE: &str = "DUPLICATE_EMAIL";

/// Notification errors
#[derive(Debug, Error)]
pub enum NotificationError {
    #[error("Serialization failed: {0}")]
    Serialization(String),

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Rejected with status {0}")]
    Rejected(u16),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_email_by_code() {
        let err = ProvisioningError::Api {
            code: "duplicate_email".to_string(),
            message: "rejected".to_string(),
        };
        assert!(err.is_duplicate_email());
    }

    #[test]
    fn test_duplicate_email_by_message() {
        let err = ProvisioningError::Api {
            code: "EU_400".to_string(),
            message: "Email address already exists".to_string(),
        };
        assert!(err.is_duplicate_email());
    }

    #[test]
    fn test_other_errors_are_not_duplicate_email() {
        let err = ProvisioningError::Api {
            code: "EU_401".to_string(),
            message: "Unauthorized".to_string(),
        };
        assert!(!err.is_duplicate_email());
        assert!(!ProvisioningError::MissingElement("endUserId").is_duplicate_email());
    }
}
