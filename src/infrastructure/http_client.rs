/// iPass provisioning adapter
/// Implements ProvisioningApi over HTTP

use crate::adapters::documents::response::root_element_name;
use crate::domain::entities::{CustomerId, IpassService};
use crate::domain::repositories::{ProvisioningApi, ProvisioningError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use std::time::Duration;

pub const DEFAULT_API_BASE_URL: &str = "https://api.ipass.com/v1/users";

const API_KEY_HEADER: &str = "x-ipass-key";
const COMPANY_ID_HEADER: &str = "x-ipass-company-id";
const MAX_SNIPPET_CHARS: usize = 200;

/// Trimmed start of a failed response body, or the fallback when it is empty
fn body_snippet(body: &str, fallback: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return fallback.to_string();
    }
    trimmed.chars().take(MAX_SNIPPET_CHARS).collect()
}

/// HTTP client for the iPass users API
#[derive(Clone)]
pub struct IpassHttpClient {
    client: reqwest::Client,
    base_url: String,
}

impl IpassHttpClient {
    pub fn new(api_key: &str) -> Result<Self, ProvisioningError> {
        Self::with_base_url(api_key, DEFAULT_API_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: impl Into<String>) -> Result<Self, ProvisioningError> {
        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(api_key)
            .map_err(|e| ProvisioningError::Configuration(format!("Invalid api key: {}", e)))?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()
            .map_err(|e| ProvisioningError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn read_body(response: reqwest::Response) -> Result<String, ProvisioningError> {
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProvisioningError::ConnectionFailed(e.to_string()))?;

        // iPass reports most failures as an <error> document, which the caller parses
        if !status.is_success() && !matches!(root_element_name(&body).as_deref(), Ok("error")) {
            return Err(ProvisioningError::Api {
                code: status.as_u16().to_string(),
                message: body_snippet(&body, status.canonical_reason().unwrap_or("HTTP error")),
            });
        }

        Ok(body)
    }
}

#[async_trait]
impl ProvisioningApi for IpassHttpClient {
    async fn post_document(
        &self,
        customer: CustomerId,
        service: IpassService,
        document: String,
    ) -> Result<String, ProvisioningError> {
        tracing::debug!("POST {}?service={} for customer {}", self.base_url, service.as_str(), customer);

        let response = self
            .client
            .post(&self.base_url)
            .query(&[("service", service.as_str())])
            .header(COMPANY_ID_HEADER, customer.to_string())
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(document)
            .send()
            .await
            .map_err(|e| ProvisioningError::ConnectionFailed(e.to_string()))?;

        Self::read_body(response).await
    }

    async fn search(
        &self,
        customer: CustomerId,
        criteria: &str,
        page: u32,
        limit: u32,
    ) -> Result<String, ProvisioningError> {
        tracing::debug!("GET {}?service=search for '{}' as customer {}", self.base_url, criteria, customer);

        let page = page.to_string();
        let limit = limit.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("service", IpassService::Search.as_str()),
                ("searchCriteria", criteria),
                ("page", page.as_str()),
                ("limit", limit.as_str()),
            ])
            .header(COMPANY_ID_HEADER, customer.to_string())
            .send()
            .await
            .map_err(|e| ProvisioningError::ConnectionFailed(e.to_string()))?;

        Self::read_body(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_api_key_is_a_configuration_error() {
        let result = IpassHttpClient::new("bad\nkey");
        assert!(matches!(result, Err(ProvisioningError::Configuration(_))));
    }

    #[test]
    fn test_body_snippet() {
        assert_eq!(body_snippet("  ", "Service Unavailable"), "Service Unavailable");
        assert_eq!(body_snippet(" <html>down</html> ", "x"), "<html>down</html>");
        assert_eq!(body_snippet(&"a".repeat(500), "x").len(), MAX_SNIPPET_CHARS);
    }
}
