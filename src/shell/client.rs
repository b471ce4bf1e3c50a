use log::info;
use serde_json::Value;
use std::time::Duration;
use url::Url;

use super::ShellError;
use crate::models::chat::ChatRequest;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Blocking-per-submission HTTP client for the relay's chat endpoint.
#[derive(Clone, Debug)]
pub struct RelayClient {
    http: reqwest::Client,
    url: Url,
}

impl RelayClient {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, ShellError> {
        let url = Url::parse(url).map_err(|e| ShellError::InvalidUrl(format!("{}: {}", url, e)))?;
        let http = reqwest::Client::builder().timeout(timeout).build().map_err(ShellError::Request)?;
        Ok(Self { http, url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sends one request and returns the decoded JSON body of a 2xx reply.
    pub async fn send(&self, payload: &ChatRequest) -> Result<Value, ShellError> {
        info!("Sending request with payload: {:?}", payload);
        let resp = self.http
            .post(self.url.clone())
            .json(payload)
            .send().await?
            .error_for_status()?;

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(ShellError::Decode)
    }
}
