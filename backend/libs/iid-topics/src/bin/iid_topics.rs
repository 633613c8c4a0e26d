use anyhow::{bail, Context, Result};
use iid_topics::{BatchManager, IidConfig, Operation, ServiceAccountAuthenticator};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const USAGE: &str = "usage: iid-topics <add|remove> <topic> <token>...";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut args = std::env::args().skip(1);
    let operation: Operation = match args.next() {
        Some(op) => op.parse::<Operation>().map_err(anyhow::Error::msg)?,
        None => bail!(USAGE),
    };
    let topic = match args.next() {
        Some(topic) if !topic.is_empty() => topic,
        _ => bail!(USAGE),
    };
    let tokens: Vec<String> = args.collect();

    let config = IidConfig::from_env();
    let credentials = config
        .load_credentials()
        .context("Failed to load IID credentials")?;

    tracing::info!(
        topic = %topic,
        operation = %operation,
        token_count = tokens.len(),
        base_url = %config.base_url,
        "Starting IID topic update"
    );

    let authenticator = Arc::new(ServiceAccountAuthenticator::new(reqwest::Client::new()));
    let manager = BatchManager::new(config, credentials, authenticator);

    let outcome = match operation {
        Operation::Add => manager.subscribe(&topic, &tokens).await,
        Operation::Remove => manager.unsubscribe(&topic, &tokens).await,
    }
    .context("IID batch request failed")?;

    println!("{}", serde_json::to_string_pretty(&outcome)?);

    Ok(())
}
