//! Remote RBAC HTTP adapter (reqwest-based).
//!
//! The single production implementation of [`RoleGateway`], talking to the
//! prison platform's staff access-role endpoints.

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

use crate::auth::GatewayAuth;
use crate::config::GatewayConfig;
use crate::error::{RbacError, RbacResult};
use crate::gateway::RoleGateway;
use crate::types::StaffId;

/// HTTP adapter for the remote RBAC API.
#[derive(Debug, Clone)]
pub struct RemoteRoleGateway {
    /// Base URL without trailing slash.
    base_url: String,
    auth: GatewayAuth,
    http_client: Client,
}

impl RemoteRoleGateway {
    /// Build a gateway from validated configuration.
    pub fn new(config: &GatewayConfig) -> RbacResult<Self> {
        config.validate()?;

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .danger_accept_invalid_certs(!config.tls_verify)
            .user_agent("keyworker-rbac/0.1")
            .build()
            .map_err(|e| {
                RbacError::invalid_configuration(format!("failed to build HTTP client: {e}"))
            })?;

        let auth = GatewayAuth::new(config.credentials.clone(), http_client.clone());

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            auth,
            http_client,
        })
    }

    /// Create a gateway with a pre-built `reqwest::Client` (for testing).
    pub fn with_http_client(
        base_url: impl Into<String>,
        auth: GatewayAuth,
        http_client: Client,
    ) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            auth,
            http_client,
        }
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> RbacResult<Response> {
        let builder = self.auth.apply(builder).await?;
        builder.send().await.map_err(|e| {
            if e.is_connect() {
                RbacError::connection_failed_with_source("request failed to connect", e)
            } else {
                RbacError::network_with_source("request failed", e)
            }
        })
    }

    /// Map a non-success status to the gateway error taxonomy.
    async fn error_for_status(response: Response, operation: &str) -> RbacError {
        let status = response.status();
        match status {
            StatusCode::UNAUTHORIZED => {
                RbacError::AuthenticationFailed("remote API returned 401".to_string())
            }
            StatusCode::FORBIDDEN => RbacError::AuthorizationFailed {
                operation: operation.to_string(),
            },
            _ => {
                let message = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "<no body>".to_string());
                RbacError::RemoteApi {
                    status: status.as_u16(),
                    message,
                }
            }
        }
    }
}

#[async_trait]
impl RoleGateway for RemoteRoleGateway {
    async fn find_staff_matching_caseload_and_role(
        &self,
        caseload: &str,
        role_code: &str,
    ) -> RbacResult<HashSet<StaffId>> {
        let url = format!(
            "{}/staff/access-roles/caseload/{caseload}/access-role/{role_code}",
            self.base_url
        );
        debug!(caseload = %caseload, role_code = %role_code, "Finding staff by caseload and role");

        let response = self.send(self.http_client.get(&url)).await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "find staff").await);
        }

        let staff_ids: Vec<StaffId> = response.json().await.map_err(|e| {
            RbacError::InvalidResponse {
                message: format!("failed to parse staff id list: {e}"),
            }
        })?;

        Ok(staff_ids.into_iter().collect())
    }

    async fn assign_role(
        &self,
        staff_id: StaffId,
        caseload: &str,
        role_code: &str,
    ) -> RbacResult<()> {
        let url = format!(
            "{}/staff/{staff_id}/access-roles/caseload/{caseload}",
            self.base_url
        );
        debug!(staff_id = %staff_id, caseload = %caseload, role_code = %role_code, "Assigning role");

        let response = self.send(self.http_client.post(&url).json(role_code)).await?;
        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "assign role").await);
        }

        Ok(())
    }

    async fn remove_role(
        &self,
        staff_id: StaffId,
        caseload: &str,
        role_code: &str,
    ) -> RbacResult<()> {
        let url = format!(
            "{}/staff/{staff_id}/access-roles/caseload/{caseload}/access-role/{role_code}",
            self.base_url
        );
        debug!(staff_id = %staff_id, caseload = %caseload, role_code = %role_code, "Removing role");

        let response = self.send(self.http_client.delete(&url)).await?;

        // 404 means the staff member never held the role; callers classify
        // that as ignored, not failed.
        if response.status() == StatusCode::NOT_FOUND {
            return Err(RbacError::RoleNotHeld {
                staff_id,
                caseload: caseload.to_string(),
                role_code: role_code.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(Self::error_for_status(response, "remove role").await);
        }

        Ok(())
    }
}
