use crate::adapters::DocumentSettings;
use crate::infrastructure::http_client::DEFAULT_API_BASE_URL;
use crate::infrastructure::invite_http::DEFAULT_INVITE_ENDPOINT;
use anyhow::{bail, Context};
use serde::Deserialize;
use std::path::PathBuf;

pub const ENV_API_KEY: &str = "IPASS_API_KEY";
pub const ENV_INVITE_USERNAME: &str = "IPASS_INVITE_USERNAME";
pub const ENV_INVITE_PASSWORD: &str = "IPASS_INVITE_PASSWORD";
pub const ENV_INVITE_QUEUE_URL: &str = "IPASS_INVITE_QUEUE_URL";

/// Represents the provisioning.xml configuration file
#[derive(Deserialize, Clone)]
#[serde(rename = "provisioning")]
pub struct ProvisioningConfig {
    /// iPass api key, sent as `x-ipass-key`
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_home_country")]
    pub home_country: String,

    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default)]
    pub invite: InviteConfig,
}

/// How invitations are delivered
#[derive(Deserialize, Clone, Default)]
pub struct InviteConfig {
    /// Delivery mode: "http" or "queue" (default: "http")
    #[serde(default)]
    pub mode: Option<String>,

    /// Callback endpoint for http mode
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// SQS queue url for queue mode
    #[serde(default)]
    pub queue_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InviteMode {
    Http {
        endpoint: String,
        username: String,
        password: String,
    },
    Queue {
        queue_url: String,
    },
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_home_country() -> String {
    DocumentSettings::default().home_country
}

fn default_locale() -> String {
    DocumentSettings::default().locale
}

impl ProvisioningConfig {
    /// Load configuration from XML file
    pub fn from_file(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let path = path.into();
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: ProvisioningConfig = serde_xml_rs::from_str(&contents)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(config)
    }

    /// Load from file, then let the environment override secrets
    pub fn load(path: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup(ENV_API_KEY) {
            self.api_key = api_key;
        }
        if let Some(username) = lookup(ENV_INVITE_USERNAME) {
            self.invite.username = Some(username);
        }
        if let Some(password) = lookup(ENV_INVITE_PASSWORD) {
            self.invite.password = Some(password);
        }
        if let Some(queue_url) = lookup(ENV_INVITE_QUEUE_URL) {
            self.invite.queue_url = Some(queue_url);
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.api_key.trim().is_empty() {
            bail!("api_key is not configured (set it in the file or {})", ENV_API_KEY);
        }
        self.invite_mode()?;
        Ok(())
    }

    pub fn document_settings(&self) -> DocumentSettings {
        DocumentSettings {
            home_country: self.home_country.clone(),
            locale: self.locale.clone(),
        }
    }

    pub fn invite_mode(&self) -> anyhow::Result<InviteMode> {
        match self.invite.mode.as_deref() {
            Some("http") | None => Ok(InviteMode::Http {
                endpoint: self
                    .invite
                    .endpoint
                    .clone()
                    .unwrap_or_else(|| DEFAULT_INVITE_ENDPOINT.to_string()),
                username: self.invite.username.clone().unwrap_or_default(),
                password: self.invite.password.clone().unwrap_or_default(),
            }),
            Some("queue") => match self.invite.queue_url.as_deref() {
                Some(url) if !url.is_empty() => Ok(InviteMode::Queue {
                    queue_url: url.to_string(),
                }),
                _ => bail!("Invite mode 'queue' needs a queue_url (or {})", ENV_INVITE_QUEUE_URL),
            },
            Some(other) => bail!("Invalid invite mode: {}. Must be 'http' or 'queue'", other),
        }
    }
}

impl std::fmt::Debug for ProvisioningConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProvisioningConfig")
            .field("api_key", &"<redacted>")
            .field("api_base_url", &self.api_base_url)
            .field("home_country", &self.home_country)
            .field("locale", &self.locale)
            .field("invite_mode", &self.invite.mode)
            .finish()
    }
}
