//! Command-line interface for the pricing service.

use crate::config::PricingConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Pricing - serve a fitted price regression pipeline over HTTP.
#[derive(Parser)]
#[command(name = "pricing")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "PRICING_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); defaults to the config file value
    #[arg(short, long, env = "PRICING_LOG_LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Bind address for the HTTP listener
        #[arg(long, env = "PRICING_BIND_ADDR")]
        bind: Option<String>,

        /// Path to the model artifact
        #[arg(long, env = "PRICING_ARTIFACT")]
        artifact: Option<PathBuf>,

        /// Keep serving (with 503 on /predict) when the artifact fails to load
        #[arg(long)]
        no_fail_fast: bool,

        /// Emit logs as JSON
        #[arg(long)]
        json_logs: bool,
    },

    /// Load and check a model artifact without serving it
    Check {
        /// Path to the model artifact
        #[arg(long, env = "PRICING_ARTIFACT")]
        artifact: Option<PathBuf>,
    },

    /// Run one prediction offline and print the JSON result
    Predict {
        /// Path to the model artifact
        #[arg(long, env = "PRICING_ARTIFACT")]
        artifact: Option<PathBuf>,

        /// Age value
        #[arg(long, allow_hyphen_values = true)]
        edad: i64,

        /// Location category
        #[arg(long)]
        ubicacion: String,
    },

    /// Show version information
    Version,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply global flags on top of a loaded configuration.
    pub fn apply_overrides(&self, config: &mut PricingConfig) {
        if let Some(level) = &self.log_level {
            config.observability.log_level = level.clone();
        }
    }
}
