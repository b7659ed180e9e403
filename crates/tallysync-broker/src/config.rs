//! Broker configuration

use std::time::Duration;

use tallysync_core::{branding, Origin};

/// Default HTTP timeout for backend requests
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the connection broker
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Backend API base URL
    pub base_url: String,
    /// The application's own origin; relayed messages from any other
    /// origin are discarded
    pub app_origin: Origin,
    /// Bearer token attached to backend requests
    pub bearer_token: Option<String>,
    /// Timeout applied to each backend request
    pub http_timeout: Duration,
}

impl BrokerConfig {
    pub fn new(base_url: impl Into<String>, app_origin: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            app_origin: Origin::new(app_origin.into()),
            bearer_token: None,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }

    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = timeout;
        self
    }

    /// Load configuration from the environment
    ///
    /// Reads `TALLYSYNC_API_URL`, `TALLYSYNC_APP_ORIGIN` and
    /// `TALLYSYNC_API_TOKEN`, falling back to the development defaults.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let base_url = std::env::var("TALLYSYNC_API_URL")
            .unwrap_or_else(|_| branding::DEFAULT_API_URL.to_string());
        let app_origin = std::env::var("TALLYSYNC_APP_ORIGIN")
            .unwrap_or_else(|_| branding::DEFAULT_APP_ORIGIN.to_string());

        let mut config = Self::new(base_url, app_origin);
        if let Ok(token) = std::env::var("TALLYSYNC_API_TOKEN") {
            if !token.is_empty() {
                config.bearer_token = Some(token);
            }
        }
        config
    }

    /// The callback URL on the application origin
    pub fn callback_url(&self) -> String {
        branding::callback_url(self.app_origin.as_str())
    }
}
