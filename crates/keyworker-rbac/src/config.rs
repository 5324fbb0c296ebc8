//! Remote RBAC gateway configuration.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::auth::GatewayCredentials;
use crate::error::{RbacError, RbacResult};

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_tls_verify() -> bool {
    true
}

/// Configuration for the remote RBAC HTTP adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Base URL of the remote RBAC API (e.g. `https://prison-api.example.com/api`).
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection establishment timeout in seconds.
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Whether to verify the target's TLS certificate.
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,

    /// Credentials for the remote API.
    pub credentials: GatewayCredentials,
}

impl GatewayConfig {
    /// Create a configuration with defaults for everything but the endpoint
    /// and credentials.
    pub fn new(base_url: impl Into<String>, credentials: GatewayCredentials) -> Self {
        Self {
            base_url: base_url.into(),
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            tls_verify: default_tls_verify(),
            credentials,
        }
    }

    /// Validate the configuration before building a client from it.
    pub fn validate(&self) -> RbacResult<()> {
        let url = Url::parse(&self.base_url)
            .map_err(|e| RbacError::invalid_configuration(format!("invalid base URL: {e}")))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(RbacError::invalid_configuration(format!(
                    "unsupported scheme: {other}"
                )))
            }
        }

        if url.host_str().is_none() {
            return Err(RbacError::invalid_configuration("base URL has no host"));
        }

        if self.request_timeout_secs == 0 {
            return Err(RbacError::invalid_configuration(
                "request timeout must be greater than zero",
            ));
        }

        Ok(())
    }
}
