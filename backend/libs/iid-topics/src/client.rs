use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::auth::Authenticator;
use crate::config::IidConfig;
use crate::errors::IidError;
use crate::mapper::to_batch_outcome;
use crate::models::*;

/// Instance ID batch topic manager
///
/// Adds registration tokens to, or removes them from, a topic's subscription
/// list with one `:batchAdd` / `:batchRemove` call per invocation. Holds no
/// mutable state, so one manager may serve concurrent calls.
#[derive(Clone)]
pub struct BatchManager {
    config: IidConfig,
    credentials: Option<Arc<[u8]>>,
    authenticator: Arc<dyn Authenticator>,
}

impl BatchManager {
    /// Create new IID batch manager
    ///
    /// # Arguments
    /// * `config` - Base endpoint configuration
    /// * `credentials` - Raw service account JSON; `None` makes every
    ///   non-empty call fail with an auth error
    /// * `authenticator` - Turns `credentials` into an authenticated client
    pub fn new(
        config: IidConfig,
        credentials: Option<Vec<u8>>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Self {
        Self {
            config,
            credentials: credentials.map(Arc::from),
            authenticator,
        }
    }

    /// Create a manager, rejecting absent credentials up front
    pub fn from_credentials(
        config: IidConfig,
        credentials: Option<Vec<u8>>,
        authenticator: Arc<dyn Authenticator>,
    ) -> Result<Self, IidError> {
        if credentials.is_none() {
            return Err(IidError::missing_credentials());
        }
        Ok(Self::new(config, credentials, authenticator))
    }

    pub fn config(&self) -> &IidConfig {
        &self.config
    }

    /// Add (`add == true`) or remove registration tokens for a topic.
    ///
    /// Returns the per-token results exactly as the service sent them. A
    /// body that cannot be parsed yields an empty list; HTTP error statuses
    /// are not treated as call failures.
    pub async fn manage(
        &self,
        topic: &str,
        tokens: &[String],
        add: bool,
    ) -> Result<Vec<RawTokenResult>, IidError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let credentials = self
            .credentials
            .as_ref()
            .ok_or_else(IidError::missing_credentials)?;

        let client = self.authenticator.acquire_client(credentials).await?;

        let operation = Operation::from_add(add);
        let url = self.config.endpoint(operation.method_suffix());

        debug!(
            topic = %topic,
            token_count = tokens.len(),
            operation = %operation,
            "Sending IID batch request"
        );

        let response = client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("access_token_auth", "true")
            .json(&BatchManageBody::new(topic, tokens))
            .send()
            .await
            .map_err(|e| IidError::Transport(format!("IID batch request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| IidError::Transport(format!("failed to read IID response: {}", e)))?;

        if !status.is_success() {
            warn!(
                topic = %topic,
                status = %status,
                "IID batch request returned non-success status"
            );
        }

        let results = match ResponseEnvelope::from_slice(&body) {
            Ok(envelope) => envelope.into_results(),
            Err(e) => {
                warn!(
                    topic = %topic,
                    status = %status,
                    error = %e,
                    "Unparseable IID response body, treating as empty results"
                );
                Vec::new()
            }
        };

        info!(
            topic = %topic,
            operation = %operation,
            token_count = tokens.len(),
            result_count = results.len(),
            "IID batch request completed"
        );

        Ok(results)
    }

    /// Run a [`BatchRequest`]
    pub async fn execute(&self, request: &BatchRequest) -> Result<Vec<RawTokenResult>, IidError> {
        self.manage(
            &request.topic,
            &request.tokens,
            request.operation.is_add(),
        )
        .await
    }

    /// Subscribe tokens to a topic and map the results per token
    pub async fn subscribe(&self, topic: &str, tokens: &[String]) -> Result<BatchOutcome, IidError> {
        let results = self.manage(topic, tokens, true).await?;
        Ok(to_batch_outcome(&results, tokens))
    }

    /// Unsubscribe tokens from a topic and map the results per token
    pub async fn unsubscribe(
        &self,
        topic: &str,
        tokens: &[String],
    ) -> Result<BatchOutcome, IidError> {
        let results = self.manage(topic, tokens, false).await?;
        Ok(to_batch_outcome(&results, tokens))
    }
}
