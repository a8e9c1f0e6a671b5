//! Pricing server binary.

use clap::Parser;
use pricing::config::PricingConfig;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pricing-server")]
#[command(about = "Price prediction HTTP server")]
struct Args {
    /// Configuration file
    #[arg(short, long, env = "PRICING_CONFIG")]
    config: Option<PathBuf>,

    /// HTTP bind address
    #[arg(long)]
    bind: Option<String>,

    /// Model artifact path
    #[arg(long)]
    artifact: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load or create configuration
    let mut config = if let Some(config_path) = args.config {
        PricingConfig::from_file(&config_path)?
    } else {
        PricingConfig::default()
    };

    // Override with CLI args
    if let Some(bind) = args.bind {
        config.server.bind_addr = bind.parse()?;
    }
    if let Some(artifact) = args.artifact {
        config.model.artifact_path = artifact;
    }

    // Run the server
    pricing::run(config).await?;

    Ok(())
}
