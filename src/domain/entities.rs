//! Domain entities - pure business logic with no external dependencies

use serde::{Deserialize, Serialize};

/// Full name used when a user is created without one
pub const DEFAULT_FULL_NAME: &str = "Jone Doe";

const MAX_FULL_NAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 150;

/// iPass company identifier, sent with every authenticated call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CustomerId(i32);

impl CustomerId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i32 {
        self.0
    }
}

impl std::fmt::Display for CustomerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Value object for the iPass login, `username@domain`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UsernameDomain(String);

impl UsernameDomain {
    pub fn new(username: &str, domain: &str) -> Result<Self, DomainError> {
        if username.is_empty() {
            return Err(DomainError::InvalidUsername("Username cannot be empty".to_string()));
        }
        if domain.is_empty() {
            return Err(DomainError::InvalidDomain("Domain cannot be empty".to_string()));
        }
        Ok(Self(format!("{}@{}", username, domain)))
    }

    /// Parse an already combined login such as `jdoe@example.com`
    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        match value.rsplit_once('@') {
            Some((username, domain)) => Self::new(username, domain),
            None => Err(DomainError::InvalidUsername(format!(
                "'{}' is not in username@domain form",
                value
            ))),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for UsernameDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A hosted user account as known locally
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedUser {
    pub username: String,
    pub domain: String,
    pub email: String,
    pub full_name: String,
    pub password: Option<String>,
    /// iPass `endUserId`, set once the account exists at iPass
    pub hosted_auth_id: Option<String>,
    /// Self service activation url handed out by iPass
    pub hosted_auth_url: Option<String>,
}

impl HostedUser {
    pub fn new(
        username: impl Into<String>,
        domain: impl Into<String>,
        email: impl Into<String>,
        full_name: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let user = Self {
            username: username.into(),
            domain: domain.into(),
            email: email.into(),
            full_name: full_name.into(),
            password: None,
            hosted_auth_id: None,
            hosted_auth_url: None,
        };
        user.validate()?;
        Ok(user)
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        UsernameDomain::new(&self.username, &self.domain)?;

        if self.full_name.chars().count() > MAX_FULL_NAME_LEN {
            return Err(DomainError::InvalidFullName(format!(
                "Maximum length {} characters",
                MAX_FULL_NAME_LEN
            )));
        }

        if self.email.chars().count() > MAX_EMAIL_LEN {
            return Err(DomainError::InvalidEmail(format!(
                "Maximum length {} characters",
                MAX_EMAIL_LEN
            )));
        }
        if !self.email.contains('@') {
            return Err(DomainError::InvalidEmail(format!("'{}' is not an email address", self.email)));
        }

        Ok(())
    }

    pub fn username_domain(&self) -> String {
        format!("{}@{}", self.username, self.domain)
    }
}

/// First and last name as iPass wants them
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PersonName {
    pub first: String,
    pub last: String,
}

/// Invitation relayed to the notification channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InviteMessage {
    pub email: String,
    #[serde(rename = "activationUrl")]
    pub activation_url: String,
}

impl InviteMessage {
    pub fn new(email: impl Into<String>, activation_url: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            activation_url: activation_url.into(),
        }
    }
}

/// Outcome of creating a hosted user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedUser {
    pub hosted_user_id: String,
    pub activation_url: String,
    /// Email actually registered, differs from the requested one after a duplicate email retry
    pub email: String,
    /// False when the account was created but the invite could not be delivered
    pub invite_sent: bool,
}

/// Outcome of activating a hosted user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationResult {
    pub raw: String,
    pub activation_url: Option<String>,
}

/// The provider services addressed through the `service` query parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpassService {
    Create,
    Update,
    Search,
    Suspend,
    Delete,
    Activate,
}

impl IpassService {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpassService::Create => "create",
            IpassService::Update => "update",
            IpassService::Search => "search",
            IpassService::Suspend => "suspend",
            IpassService::Delete => "delete",
            IpassService::Activate => "activate",
        }
    }
}

/// Domain errors
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(clippy::enum_variant_names)]
pub enum DomainError {
    InvalidUsername(String),
    InvalidDomain(String),
    InvalidFullName(String),
    InvalidEmail(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::InvalidUsername(msg) => write!(f, "Invalid username: {}", msg),
            DomainError::InvalidDomain(msg) => write!(f, "Invalid domain: {}", msg),
            DomainError::InvalidFullName(msg) => write!(f, "Invalid full name: {}", msg),
            DomainError::InvalidEmail(msg) => write!(f, "Invalid email: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}
