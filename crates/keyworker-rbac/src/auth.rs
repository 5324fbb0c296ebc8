//! Remote RBAC authentication — Bearer token and `OAuth2` client credentials.

use reqwest::RequestBuilder;
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{RbacError, RbacResult};

/// Refresh the cached token this long before it actually expires.
const EXPIRY_MARGIN_SECS: u64 = 30;

/// Credentials for the remote RBAC API.
///
/// The [`Debug`] impl redacts sensitive fields (tokens and secrets) to prevent
/// accidental credential exposure in log output.
#[derive(Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type")]
pub enum GatewayCredentials {
    /// No authentication (test environments only).
    #[serde(rename = "none")]
    None,

    /// Static Bearer token authentication.
    #[serde(rename = "bearer")]
    Bearer { token: String },

    /// `OAuth2` client credentials grant against the platform token endpoint.
    #[serde(rename = "oauth2")]
    OAuth2 {
        client_id: String,
        client_secret: String,
        token_endpoint: String,
        #[serde(default)]
        scopes: Vec<String>,
    },
}

impl std::fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => f.debug_struct("None").finish(),
            Self::Bearer { .. } => f
                .debug_struct("Bearer")
                .field("token", &"[REDACTED]")
                .finish(),
            Self::OAuth2 {
                client_id,
                token_endpoint,
                scopes,
                ..
            } => f
                .debug_struct("OAuth2")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .field("token_endpoint", token_endpoint)
                .field("scopes", scopes)
                .finish(),
        }
    }
}

/// `OAuth2` token response from the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<u64>,
}

/// Cached `OAuth2` access token with expiry.
#[derive(Debug, Clone)]
struct CachedToken {
    access_token: String,
    expires_at: Option<Instant>,
}

impl CachedToken {
    fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(exp) => Instant::now() >= exp,
            None => false,
        }
    }
}

/// Authentication handler for the remote RBAC API.
///
/// Supports a static Bearer token and `OAuth2` client credentials with an
/// in-memory token cache shared across clones.
#[derive(Debug, Clone)]
pub struct GatewayAuth {
    credentials: GatewayCredentials,
    cached_token: Arc<RwLock<Option<CachedToken>>>,
    /// HTTP client used only for token requests.
    http_client: reqwest::Client,
}

impl GatewayAuth {
    /// Create a new auth handler.
    pub fn new(credentials: GatewayCredentials, http_client: reqwest::Client) -> Self {
        Self {
            credentials,
            cached_token: Arc::new(RwLock::new(None)),
            http_client,
        }
    }

    /// Apply authentication to an outgoing request.
    pub async fn apply(&self, builder: RequestBuilder) -> RbacResult<RequestBuilder> {
        match self.bearer_token().await? {
            Some(token) => Ok(builder.bearer_auth(token)),
            None => Ok(builder),
        }
    }

    /// Get the Bearer token to use for requests.
    ///
    /// For Bearer auth, returns the static token. For `OAuth2` client
    /// credentials, fetches a fresh access token unless a live one is cached.
    pub async fn bearer_token(&self) -> RbacResult<Option<String>> {
        match &self.credentials {
            GatewayCredentials::None => Ok(None),
            GatewayCredentials::Bearer { token } => Ok(Some(token.clone())),
            GatewayCredentials::OAuth2 {
                client_id,
                client_secret,
                token_endpoint,
                scopes,
            } => {
                {
                    let cache = self.cached_token.read().await;
                    if let Some(cached) = cache.as_ref() {
                        if !cached.is_expired() {
                            return Ok(Some(cached.access_token.clone()));
                        }
                    }
                }

                let token = self
                    .fetch_token(token_endpoint, client_id, client_secret, scopes)
                    .await?;

                {
                    let mut cache = self.cached_token.write().await;
                    *cache = Some(token.clone());
                }

                Ok(Some(token.access_token))
            }
        }
    }

    async fn fetch_token(
        &self,
        token_endpoint: &str,
        client_id: &str,
        client_secret: &str,
        scopes: &[String],
    ) -> RbacResult<CachedToken> {
        debug!(token_endpoint = %token_endpoint, "Fetching OAuth2 access token");

        let mut form = vec![("grant_type", "client_credentials".to_string())];
        if !scopes.is_empty() {
            form.push(("scope", scopes.join(" ")));
        }

        let response = self
            .http_client
            .post(token_endpoint)
            .basic_auth(client_id, Some(client_secret))
            .form(&form)
            .send()
            .await
            .map_err(|e| RbacError::AuthenticationFailed(format!("token request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(RbacError::AuthenticationFailed(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            RbacError::AuthenticationFailed(format!("failed to parse token response: {e}"))
        })?;

        let expires_at = token.expires_in.map(|secs| {
            Instant::now() + Duration::from_secs(secs.saturating_sub(EXPIRY_MARGIN_SECS))
        });

        Ok(CachedToken {
            access_token: token.access_token,
            expires_at,
        })
    }
}
