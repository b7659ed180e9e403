//! HTTP implementation of the backend API
//!
//! Talks to the `/integrations` routes of the TallySync backend. Server
//! error bodies carry a JSON `detail` field; when present it is surfaced
//! verbatim so the user sees the backend's own explanation.

use std::collections::HashMap;

use anyhow::{anyhow, Context as _, Result};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use tallysync_core::{Provider, ProviderStatusEntry, StatusPayload};

use super::{IntegrationsBackend, TestOutcome, ToggleOutcome};
use crate::config::BrokerConfig;

#[derive(Debug, Deserialize)]
struct AuthUrlResponse {
    auth_url: String,
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    message: String,
}

#[derive(Debug, Deserialize)]
struct ToggleResponse {
    is_active: bool,
    message: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Client for the backend's `/integrations` API
pub struct HttpIntegrationsBackend {
    base_url: String,
    bearer_token: Option<String>,
    client: reqwest::Client,
}

impl HttpIntegrationsBackend {
    pub fn new(config: &BrokerConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent("TallySync/1.0")
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            bearer_token: config.bearer_token.clone(),
            client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let mut builder = self.client.request(method, self.url(path));
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    /// Turn a non-success response into an error carrying the server's
    /// `detail` text verbatim, with a generic fallback.
    async fn error_from_response(response: reqwest::Response) -> anyhow::Error {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        match serde_json::from_str::<ErrorBody>(&body) {
            Ok(err) => anyhow!(err.detail),
            Err(_) => anyhow!("Request failed with HTTP {}", status),
        }
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(Self::error_from_response(response).await)
        }
    }
}

#[async_trait]
impl IntegrationsBackend for HttpIntegrationsBackend {
    async fn status(&self) -> Result<StatusPayload> {
        let response = self
            .request(reqwest::Method::GET, "/integrations/status")
            .send()
            .await
            .context("Failed to reach integrations status endpoint")?;
        let response = Self::check(response).await?;

        // Unknown provider keys are skipped rather than failing the whole
        // payload; the server may be ahead of this client.
        let raw: HashMap<String, ProviderStatusEntry> = response
            .json()
            .await
            .context("Invalid integrations status payload")?;

        let mut payload = StatusPayload::new();
        for (key, entry) in raw {
            match Provider::parse(&key) {
                Some(provider) => {
                    payload.insert(provider, entry);
                }
                None => debug!(provider = %key, "[Api] Skipping unknown provider in status payload"),
            }
        }
        Ok(payload)
    }

    async fn auth_url(&self, provider: Provider) -> Result<String> {
        let path = format!("/integrations/{}/auth", provider);
        let response = self
            .request(reqwest::Method::GET, &path)
            .send()
            .await
            .context("Failed to reach authorization endpoint")?;
        let response = Self::check(response).await?;
        let body: AuthUrlResponse = response
            .json()
            .await
            .context("Invalid authorization URL payload")?;
        Ok(body.auth_url)
    }

    async fn disconnect(&self, provider: Provider) -> Result<String> {
        let path = format!("/integrations/{}/disconnect", provider);
        let response = self
            .request(reqwest::Method::DELETE, &path)
            .send()
            .await
            .context("Failed to reach disconnect endpoint")?;
        let response = Self::check(response).await?;
        let body: MessageResponse = response
            .json()
            .await
            .context("Invalid disconnect payload")?;
        Ok(body.message)
    }

    async fn test(&self, provider: Provider) -> Result<TestOutcome> {
        let path = format!("/integrations/{}/test", provider);
        let response = self
            .request(reqwest::Method::POST, &path)
            .send()
            .await
            .context("Failed to reach test endpoint")?;
        let response = Self::check(response).await?;
        let outcome: TestOutcome = response.json().await.context("Invalid test payload")?;
        Ok(outcome)
    }

    async fn sync(&self, provider: Provider) -> Result<()> {
        let path = format!("/integrations/{}/sync", provider);
        let response = self
            .request(reqwest::Method::POST, &path)
            .send()
            .await
            .context("Failed to reach sync endpoint")?;
        Self::check(response).await?;
        Ok(())
    }

    async fn toggle(&self, provider: Provider) -> Result<ToggleOutcome> {
        let path = format!("/integrations/{}/toggle", provider);
        let response = self
            .request(reqwest::Method::POST, &path)
            .send()
            .await
            .context("Failed to reach toggle endpoint")?;
        let response = Self::check(response).await?;
        let body: ToggleResponse = response.json().await.context("Invalid toggle payload")?;
        Ok(ToggleOutcome {
            is_active: body.is_active,
            message: body.message,
        })
    }
}
