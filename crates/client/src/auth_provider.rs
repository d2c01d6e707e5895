//! Channel authorization for private and presence channels.

use async_trait::async_trait;
use reqwest::Client;
use reverb_tester_shared::{AuthConfig, AuthError};
use serde::Serialize;
use serde_json::Value;

/// Produces the signed payload a private/presence subscribe frame needs.
///
/// Called once per channel join; retries are the caller's business.
#[async_trait]
pub trait ChannelAuthorizer: Send + Sync {
    async fn authorize(&self, socket_id: &str, channel_name: &str) -> Result<Value, AuthError>;
}

#[derive(Debug, Serialize)]
struct AuthRequest<'a> {
    socket_id: &'a str,
    channel_name: &'a str,
}

/// Authorizer that POSTs to a broadcasting auth endpoint.
#[derive(Debug, Clone)]
pub struct HttpAuthorizer {
    client: Client,
    endpoint: String,
    bearer_token: Option<String>,
    csrf_token: Option<String>,
}

impl HttpAuthorizer {
    pub fn new(config: &AuthConfig) -> Self {
        // Cookies are kept so session-authenticated endpoints work.
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .unwrap_or_else(|e| {
                crate::log_warn!("auth: falling back to default HTTP client: {}", e);
                Client::new()
            });
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: &AuthConfig) -> Self {
        let non_empty = |s: &str| {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        };
        Self {
            client,
            endpoint: config.endpoint.trim().to_string(),
            bearer_token: non_empty(&config.bearer_token),
            csrf_token: non_empty(&config.csrf_token),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChannelAuthorizer for HttpAuthorizer {
    async fn authorize(&self, socket_id: &str, channel_name: &str) -> Result<Value, AuthError> {
        crate::log_debug!(
            "auth: authorizing channel '{}' for socket '{}' via {}",
            channel_name,
            socket_id,
            self.endpoint
        );

        let body = AuthRequest {
            socket_id,
            channel_name,
        };

        let mut rb = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .json(&body);

        if let Some(token) = &self.bearer_token {
            rb = rb.header("Authorization", format!("Bearer {}", token));
        }
        if let Some(token) = &self.csrf_token {
            rb = rb.header("X-CSRF-TOKEN", token);
        }

        let resp = rb.send().await.map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status().as_u16();
        let is_success = resp.status().is_success();
        let text = resp
            .text()
            .await
            .map_err(|e| AuthError::Network(format!("failed to read body: {e}")))?;

        crate::log_debug!("auth: response {} for '{}': {}", status, channel_name, text);

        if !is_success {
            return Err(AuthError::Http { status, body: text });
        }

        serde_json::from_str(&text).map_err(|_| AuthError::InvalidJson(text))
    }
}
