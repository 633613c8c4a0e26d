/// IID Configuration
///
/// The base endpoint is injected into each `BatchManager` so tests and
/// staging deployments can point at a different host without code changes.
use serde::{Deserialize, Serialize};
use std::env;

use crate::errors::IidError;

pub const DEFAULT_IID_BASE_URL: &str = "https://iid.googleapis.com/iid/v1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IidConfig {
    /// IID API base URL; `:batchAdd` / `:batchRemove` are appended to it
    pub base_url: String,

    /// Path to the service account JSON used for OAuth2
    pub credentials_file: Option<String>,
}

impl Default for IidConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_IID_BASE_URL.to_string(),
            credentials_file: None,
        }
    }
}

impl IidConfig {
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(base_url.into()),
            ..Self::default()
        }
    }

    /// Load from `IID_BASE_URL` and `IID_CREDENTIALS_FILE`
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            base_url: normalize_base_url(
                env::var("IID_BASE_URL").unwrap_or_else(|_| DEFAULT_IID_BASE_URL.to_string()),
            ),
            credentials_file: env::var("IID_CREDENTIALS_FILE")
                .ok()
                .filter(|p| !p.trim().is_empty()),
        }
    }

    /// Endpoint for one batch operation
    pub fn endpoint(&self, method_suffix: &str) -> String {
        format!("{}{}", self.base_url, method_suffix)
    }

    /// Read the configured credentials file, if any
    pub fn load_credentials(&self) -> Result<Option<Vec<u8>>, IidError> {
        match &self.credentials_file {
            Some(path) => std::fs::read(path).map(Some).map_err(|e| {
                IidError::Config(format!("failed to read credentials file {}: {}", path, e))
            }),
            None => Ok(None),
        }
    }
}

fn normalize_base_url(url: String) -> String {
    url.trim().trim_end_matches('/').to_string()
}
