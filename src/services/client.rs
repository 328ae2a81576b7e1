//! Shared HTTP client for the data providers.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::FetchError;

const USER_AGENT: &str = concat!("user_weather/", env!("CARGO_PKG_VERSION"));

/// Thin JSON GET client. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
}

impl ApiClient {
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http })
    }

    /// GETs `url` with `query` and decodes the JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let response = self.http.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("{} returned status {}", url, status);
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Rejects `data` with a validation error unless `condition` holds.
pub fn validate<T>(data: &T, condition: impl FnOnce(&T) -> bool, message: &str) -> Result<(), FetchError> {
    if condition(data) {
        Ok(())
    } else {
        Err(FetchError::Validation(message.to_string()))
    }
}
