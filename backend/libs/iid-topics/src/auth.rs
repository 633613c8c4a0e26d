use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use tracing::debug;

use crate::errors::IidError;
use crate::models::{GoogleTokenResponse, JwtClaims, ServiceAccountKey, TokenCache};

/// OAuth2 scope required by the IID batch API
pub const FIREBASE_MESSAGING_SCOPE: &str = "https://www.googleapis.com/auth/firebase.messaging";

/// Seconds of remaining lifetime below which a cached token is refreshed
const TOKEN_REFRESH_MARGIN_SECS: i64 = 60;

/// HTTP client bound to one set of credentials.
///
/// Every request built through [`AuthenticatedClient::post`] carries the
/// bearer token, when there is one.
#[derive(Debug, Clone)]
pub struct AuthenticatedClient {
    http_client: reqwest::Client,
    bearer_token: Option<String>,
}

impl AuthenticatedClient {
    pub fn new(http_client: reqwest::Client, bearer_token: Option<String>) -> Self {
        Self {
            http_client,
            bearer_token,
        }
    }

    pub fn bearer_token(&self) -> Option<&str> {
        self.bearer_token.as_deref()
    }

    pub fn post(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.http_client.post(url);
        match &self.bearer_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// Turns raw credential material into an authenticated client
#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn acquire_client(&self, credentials: &[u8]) -> Result<AuthenticatedClient, IidError>;
}

/// Google service account authenticator
///
/// Signs a JWT with the account's private key and exchanges it for an
/// OAuth2 access token, caching the token until shortly before it expires.
pub struct ServiceAccountAuthenticator {
    scope: String,
    token_cache: Mutex<Option<TokenCache>>,
    http_client: reqwest::Client,
}

impl ServiceAccountAuthenticator {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self::with_scope(http_client, FIREBASE_MESSAGING_SCOPE)
    }

    pub fn with_scope(http_client: reqwest::Client, scope: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            token_cache: Mutex::new(None),
            http_client,
        }
    }

    fn cached_token(&self, client_email: &str) -> Option<String> {
        let cache = self.token_cache.lock();
        cache.as_ref().and_then(|cached| {
            let now = Utc::now().timestamp();
            (cached.client_email == client_email
                && cached.expires_at > now + TOKEN_REFRESH_MARGIN_SECS)
                .then(|| cached.access_token.clone())
        })
    }

    /// Get access token for the service account (with caching)
    pub async fn get_access_token(&self, key: &ServiceAccountKey) -> Result<String, IidError> {
        if let Some(token) = self.cached_token(&key.client_email) {
            return Ok(token);
        }

        let now = Utc::now();
        let claims = JwtClaims {
            iss: key.client_email.clone(),
            sub: key.client_email.clone(),
            scope: self.scope.clone(),
            aud: key.token_uri.clone(),
            exp: (now + Duration::hours(1)).timestamp(),
            iat: now.timestamp(),
        };

        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| IidError::Auth(format!("failed to parse private key: {}", e)))?;

        let mut header = Header::new(Algorithm::RS256);
        if !key.private_key_id.is_empty() {
            header.kid = Some(key.private_key_id.clone());
        }

        let assertion = encode(&header, &claims, &encoding_key)
            .map_err(|e| IidError::Auth(format!("failed to encode JWT: {}", e)))?;

        let params = [
            ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
            ("assertion", assertion.as_str()),
        ];

        let response = self
            .http_client
            .post(&key.token_uri)
            .form(&params)
            .send()
            .await
            .map_err(|e| IidError::Transport(format!("failed to get access token: {}", e)))?;

        if !response.status().is_success() {
            return Err(IidError::Auth(format!(
                "token request failed with status: {}",
                response.status()
            )));
        }

        let token_response: GoogleTokenResponse = response
            .json()
            .await
            .map_err(|e| IidError::Auth(format!("failed to parse token response: {}", e)))?;

        debug!(
            client_email = %key.client_email,
            expires_in = token_response.expires_in,
            "Obtained IID access token"
        );

        *self.token_cache.lock() = Some(TokenCache {
            client_email: key.client_email.clone(),
            access_token: token_response.access_token.clone(),
            expires_at: Utc::now()
                .timestamp()
                .saturating_add(token_response.expires_in),
        });

        Ok(token_response.access_token)
    }
}

#[async_trait]
impl Authenticator for ServiceAccountAuthenticator {
    async fn acquire_client(&self, credentials: &[u8]) -> Result<AuthenticatedClient, IidError> {
        let key: ServiceAccountKey = serde_json::from_slice(credentials)
            .map_err(|e| IidError::Auth(format!("invalid service account JSON: {}", e)))?;

        let access_token = self.get_access_token(&key).await?;
        Ok(AuthenticatedClient::new(
            self.http_client.clone(),
            Some(access_token),
        ))
    }
}

/// Attaches a fixed bearer token, e.g. for staging or emulators
pub struct StaticTokenAuthenticator {
    token: String,
    http_client: reqwest::Client,
}

impl StaticTokenAuthenticator {
    pub fn new(http_client: reqwest::Client, token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            http_client,
        }
    }
}

#[async_trait]
impl Authenticator for StaticTokenAuthenticator {
    async fn acquire_client(&self, _credentials: &[u8]) -> Result<AuthenticatedClient, IidError> {
        Ok(AuthenticatedClient::new(
            self.http_client.clone(),
            Some(self.token.clone()),
        ))
    }
}

/// Sends requests without an `Authorization` header.
///
/// Only useful against local mock servers that accept any caller.
pub struct NoAuthAuthenticator {
    http_client: reqwest::Client,
}

impl NoAuthAuthenticator {
    pub fn new(http_client: reqwest::Client) -> Self {
        Self { http_client }
    }
}

impl Default for NoAuthAuthenticator {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl Authenticator for NoAuthAuthenticator {
    async fn acquire_client(&self, _credentials: &[u8]) -> Result<AuthenticatedClient, IidError> {
        Ok(AuthenticatedClient::new(self.http_client.clone(), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> ServiceAccountKey {
        ServiceAccountKey {
            project_id: "test-project".to_string(),
            private_key_id: "key-id".to_string(),
            private_key: "private-key".to_string(),
            client_email: "test@test.iam.gserviceaccount.com".to_string(),
            client_id: "123456".to_string(),
            token_uri: "http://127.0.0.1:1/token".to_string(),
        }
    }

    #[tokio::test]
    async fn test_empty_json_credentials_rejected() {
        let auth = ServiceAccountAuthenticator::new(reqwest::Client::new());
        let err = auth.acquire_client(b"{}").await.unwrap_err();
        assert!(err.is_auth(), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_invalid_private_key_rejected() {
        let auth = ServiceAccountAuthenticator::new(reqwest::Client::new());
        let creds = serde_json::to_vec(&test_key()).unwrap();
        let err = auth.acquire_client(&creds).await.unwrap_err();
        assert!(err.is_auth(), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_cached_token_reused() {
        let auth = ServiceAccountAuthenticator::new(reqwest::Client::new());
        let key = test_key();
        *auth.token_cache.lock() = Some(TokenCache {
            client_email: key.client_email.clone(),
            access_token: "cached-token".to_string(),
            expires_at: Utc::now().timestamp() + 3600,
        });

        let creds = serde_json::to_vec(&key).unwrap();
        let client = auth.acquire_client(&creds).await.unwrap();
        assert_eq!(client.bearer_token(), Some("cached-token"));
    }

    #[tokio::test]
    async fn test_cache_ignored_when_expiring_or_for_other_account() {
        let auth = ServiceAccountAuthenticator::new(reqwest::Client::new());
        let key = test_key();

        *auth.token_cache.lock() = Some(TokenCache {
            client_email: key.client_email.clone(),
            access_token: "stale-token".to_string(),
            expires_at: Utc::now().timestamp() + 30,
        });
        assert!(auth.cached_token(&key.client_email).is_none());

        *auth.token_cache.lock() = Some(TokenCache {
            client_email: "other@test.iam.gserviceaccount.com".to_string(),
            access_token: "other-token".to_string(),
            expires_at: Utc::now().timestamp() + 3600,
        });
        assert!(auth.cached_token(&key.client_email).is_none());
    }

    #[tokio::test]
    async fn test_static_and_no_auth_clients() {
        let static_auth = StaticTokenAuthenticator::new(reqwest::Client::new(), "abc");
        let client = static_auth.acquire_client(b"").await.unwrap();
        assert_eq!(client.bearer_token(), Some("abc"));

        let client = NoAuthAuthenticator::default()
            .acquire_client(b"{}")
            .await
            .unwrap();
        assert!(client.bearer_token().is_none());
    }
}
