//! Tenant access token exchange and in-process caching.
//!
//! Tokens live only in process memory and are re-fetched on every cold
//! start. A cached token is served while it is still inside its validity
//! window minus a fixed safety margin; replacement is last-writer-wins.

use super::BitableClient;
use clipbase_core::Error;
use serde::Deserialize;
use std::time::{Duration, Instant};

/// Seconds subtracted from the reported lifetime to avoid races near expiry.
const TOKEN_SAFETY_MARGIN_SECS: i64 = 300;

/// A cached tenant access token with its effective expiry.
#[derive(Debug, Clone)]
pub(crate) struct CachedToken {
    pub value: String,
    pub expires_at: Instant,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    code: i64,
    #[serde(default)]
    msg: String,
    tenant_access_token: Option<String>,
    expire: Option<i64>,
}

impl BitableClient {
    /// Get a tenant access token, exchanging credentials only when the
    /// cached token is missing or past its safety window.
    pub async fn access_token(&self) -> Result<String, Error> {
        let mut cache = self.token.lock().await;

        if let Some(cached) = cache.as_ref()
            && Instant::now() < cached.expires_at
        {
            return Ok(cached.value.clone());
        }

        tracing::debug!("exchanging app credentials for tenant access token");

        let url = self.endpoint("/auth/v3/tenant_access_token/internal");
        let response = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "app_id": self.config.app_id,
                "app_secret": self.config.app_secret,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::Timeout("token exchange timed out".to_string())
                } else {
                    Error::Auth { message: format!("network error: {e}"), detail: None }
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::Auth { message: format!("failed to read response: {e}"), detail: None })?;

        if !status.is_success() {
            return Err(Error::Auth { message: format!("status {}", status.as_u16()), detail: Some(body) });
        }

        let parsed: TokenResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Auth { message: format!("invalid token response: {e}"), detail: Some(body.clone()) })?;

        if parsed.code != 0 {
            return Err(Error::Auth {
                message: format!("token exchange rejected: {} (code {})", parsed.msg, parsed.code),
                detail: Some(body),
            });
        }

        let value = parsed.tenant_access_token.ok_or_else(|| Error::Auth {
            message: "token response missing tenant_access_token".to_string(),
            detail: Some(body),
        })?;

        let ttl = (parsed.expire.unwrap_or(0) - TOKEN_SAFETY_MARGIN_SECS).max(0) as u64;
        *cache = Some(CachedToken { value: value.clone(), expires_at: Instant::now() + Duration::from_secs(ttl) });

        tracing::debug!(expire = parsed.expire, "cached tenant access token");

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use crate::bitable::{BitableClient, BitableConfig};
    use clipbase_core::Error;
    use mockito::Server;

    fn client_for(server: &Server) -> BitableClient {
        BitableClient::new(BitableConfig {
            app_id: "cli_test".to_string(),
            app_secret: "secret".to_string(),
            base_url: server.url(),
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_token_cached_within_validity_window() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v3/tenant_access_token/internal")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":7200}"#)
            .expect(1)
            .create_async()
            .await;

        let client = client_for(&server);
        let first = client.access_token().await.unwrap();
        let second = client.access_token().await.unwrap();

        assert_eq!(first, "t-abc");
        assert_eq!(second, "t-abc");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_refreshed_after_expiry() {
        let mut server = Server::new_async().await;
        // expire equals the safety margin, so the cached token is already
        // outside its window by the time of the next call.
        let mock = server
            .mock("POST", "/auth/v3/tenant_access_token/internal")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"ok","tenant_access_token":"t-abc","expire":300}"#)
            .expect(2)
            .create_async()
            .await;

        let client = client_for(&server);
        client.access_token().await.unwrap();
        client.access_token().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v3/tenant_access_token/internal")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":10003,"msg":"invalid app_secret"}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.access_token().await;

        match result {
            Err(Error::Auth { message, detail }) => {
                assert!(message.contains("invalid app_secret"));
                assert!(message.contains("10003"));
                assert!(detail.is_some());
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_missing_token_field() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/auth/v3/tenant_access_token/internal")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"code":0,"msg":"ok","expire":7200}"#)
            .create_async()
            .await;

        let client = client_for(&server);
        let result = client.access_token().await;
        assert!(matches!(result, Err(Error::Auth { message, .. }) if message.contains("tenant_access_token")));
    }
}
