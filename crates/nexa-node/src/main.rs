//! Nexa Node binary
//!
//! Serves profile form sessions and stores submitted profiles.

use nexa_node::{NexaNode, NodeConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nexa_node=info,nexa_profile=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Nexa Node");

    let config = NodeConfig::from_env()?;

    let node = NexaNode::new(config)?;
    node.run().await?;

    Ok(())
}
