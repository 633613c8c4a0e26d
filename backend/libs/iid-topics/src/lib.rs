/// IID Topics Library
///
/// Manages push topic subscriptions for registration tokens through the
/// Instance ID (IID) batch API, and maps the per-token results back onto the
/// caller's token order.
///
/// It handles:
/// - Batch add/remove of registration tokens for a topic
/// - OAuth2 access tokens from Google service accounts
/// - Tolerant parsing of partial or malformed batch responses
/// - Per-token outcomes with success/failure counts

pub mod auth;
pub mod client;
pub mod config;
pub mod errors;
pub mod mapper;
pub mod models;

pub use auth::{
    AuthenticatedClient, Authenticator, NoAuthAuthenticator, ServiceAccountAuthenticator,
    StaticTokenAuthenticator,
};
pub use client::BatchManager;
pub use config::IidConfig;
pub use errors::IidError;
pub use mapper::to_batch_outcome;
pub use models::{BatchOutcome, BatchRequest, Operation, RawTokenResult, TokenOutcome};
