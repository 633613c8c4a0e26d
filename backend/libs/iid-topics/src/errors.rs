use thiserror::Error;

/// IID Client Error Types
///
/// Only failures that prevent obtaining a usable response are represented
/// here. Per-token failures reported by the service live in
/// [`crate::models::TokenOutcome`].
#[derive(Error, Debug)]
pub enum IidError {
    /// Credentials missing, malformed, or rejected during token exchange.
    #[error("IID auth error: {0}")]
    Auth(String),

    /// Connect/timeout/DNS/TLS failure talking to a remote endpoint.
    #[error("IID transport error: {0}")]
    Transport(String),

    #[error("IID configuration error: {0}")]
    Config(String),
}

impl IidError {
    pub fn missing_credentials() -> Self {
        IidError::Auth("missing credentials".to_string())
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, IidError::Auth(_))
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, IidError::Transport(_))
    }
}

impl From<IidError> for String {
    fn from(err: IidError) -> Self {
        err.to_string()
    }
}
