use serde::{Deserialize, Serialize};

/// Status code recorded for tokens the service did not report as failed
pub const STATUS_OK: u16 = 200;

/// Status code left on failed tokens; the IID batch API reports no HTTP
/// status per token.
pub const STATUS_UNSET: u16 = 0;

/// Subscription operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Add,
    Remove,
}

impl Operation {
    pub fn from_add(add: bool) -> Self {
        if add {
            Operation::Add
        } else {
            Operation::Remove
        }
    }

    pub fn is_add(self) -> bool {
        matches!(self, Operation::Add)
    }

    /// Custom method suffix appended to the IID base URL
    pub fn method_suffix(self) -> &'static str {
        match self {
            Operation::Add => ":batchAdd",
            Operation::Remove => ":batchRemove",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Add => write!(f, "add"),
            Operation::Remove => write!(f, "remove"),
        }
    }
}

impl std::str::FromStr for Operation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "add" | "subscribe" => Ok(Operation::Add),
            "remove" | "unsubscribe" => Ok(Operation::Remove),
            other => Err(format!("unknown operation: {}", other)),
        }
    }
}

/// One batch subscription change for a single topic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    pub topic: String,
    pub tokens: Vec<String>,
    pub operation: Operation,
}

impl BatchRequest {
    pub fn new(topic: impl Into<String>, tokens: Vec<String>, operation: Operation) -> Self {
        Self {
            topic: topic.into(),
            tokens,
            operation,
        }
    }
}

/// IID batchAdd / batchRemove request body
#[derive(Debug, Serialize)]
pub struct BatchManageBody<'a> {
    pub to: String,
    pub registration_tokens: &'a [String],
}

impl<'a> BatchManageBody<'a> {
    pub fn new(topic: &str, tokens: &'a [String]) -> Self {
        Self {
            to: format!("/topics/{}", topic),
            registration_tokens: tokens,
        }
    }
}

/// Per-token entry of an IID batch response.
///
/// `error` is kept as a raw JSON value so that an odd entry does not
/// invalidate the rest of the envelope. Unknown keys are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTokenResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl RawTokenResult {
    pub fn failed(code: impl Into<String>) -> Self {
        Self {
            error: Some(serde_json::Value::String(code.into())),
        }
    }

    /// Error code, if this entry carries a non-empty string error
    pub fn error_code(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    pub fn is_failure(&self) -> bool {
        self.error_code().is_some()
    }
}

/// IID batch response body
#[derive(Debug, Default, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub results: Option<Vec<RawTokenResult>>,
}

impl ResponseEnvelope {
    pub fn from_slice(body: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(body)
    }

    pub fn into_results(self) -> Vec<RawTokenResult> {
        self.results.unwrap_or_default()
    }
}

/// Outcome for one token of a batch, aligned with the request order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenOutcome {
    pub token_index: usize,
    pub success: bool,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub status_code: u16,
}

impl TokenOutcome {
    pub fn success(token_index: usize) -> Self {
        Self {
            token_index,
            success: true,
            error_code: None,
            error_message: None,
            status_code: STATUS_OK,
        }
    }

    pub fn failure(token_index: usize, code: &str) -> Self {
        Self {
            token_index,
            success: false,
            error_code: Some(code.to_string()),
            error_message: Some(code.to_string()),
            status_code: STATUS_UNSET,
        }
    }
}

/// Per-token outcomes of one batch call plus aggregate counts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub outcomes: Vec<TokenOutcome>,
    pub success_count: usize,
    pub failure_count: usize,
}

impl BatchOutcome {
    pub fn is_complete_success(&self) -> bool {
        self.failure_count == 0
    }

    /// Indices into the original token list of every failed token
    pub fn failed_indices(&self) -> Vec<usize> {
        self.outcomes
            .iter()
            .filter(|o| !o.success)
            .map(|o| o.token_index)
            .collect()
    }
}

/// Firebase Service Account Key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceAccountKey {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub private_key_id: String,
    pub private_key: String,
    pub client_email: String,
    #[serde(default)]
    pub client_id: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// OAuth2 Token Cache
#[derive(Debug, Clone)]
pub struct TokenCache {
    pub client_email: String,
    pub access_token: String,
    pub expires_at: i64,
}

/// JWT Claims for Google OAuth2
#[derive(Debug, Serialize)]
pub struct JwtClaims {
    pub iss: String,
    pub sub: String,
    pub scope: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
}

/// Google OAuth2 Token Response
#[derive(Debug, Deserialize)]
pub struct GoogleTokenResponse {
    pub access_token: String,
    pub expires_in: i64,
}
