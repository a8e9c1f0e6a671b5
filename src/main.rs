//! Pricing CLI - Main entry point.

use pricing::cli::{Cli, Commands};
use pricing::compute::{ArtifactLoader, PredictionService};
use pricing::config::PricingConfig;
use pricing::validation::PredictionInput;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => PricingConfig::from_file(path)?,
        None => PricingConfig::default(),
    };
    cli.apply_overrides(&mut config);

    match cli.command {
        Commands::Serve {
            bind,
            artifact,
            no_fail_fast,
            json_logs,
        } => {
            if let Some(bind) = bind {
                config.server.bind_addr = bind.parse()?;
            }
            if let Some(artifact) = artifact {
                config.model.artifact_path = artifact;
            }
            if no_fail_fast {
                config.startup.fail_fast = false;
            }
            config.observability.json_logs |= json_logs;

            if let Err(e) = pricing::run(config).await {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }

        Commands::Check { artifact } => {
            let path = artifact.unwrap_or(config.model.artifact_path);
            match ArtifactLoader::load(&path) {
                Ok(model) => {
                    println!("Artifact: {}", path.display());
                    println!("Model: {}", model.info.name);
                    println!("Format version: {}", model.info.format_version);
                    println!("Columns: {}", model.info.columns.join(", "));
                    println!("Categories: {}", model.info.categories.join(", "));
                    println!("Features: {}", model.info.n_features);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Predict {
            artifact,
            edad,
            ubicacion,
        } => {
            let path = artifact.unwrap_or(config.model.artifact_path);
            let model = ArtifactLoader::load(&path)?;
            let input = PredictionInput::new(edad, ubicacion)?;

            match PredictionService::loaded(model).predict(&input) {
                Ok(prediction) => println!("{}", serde_json::to_string(&prediction)?),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Version => {
            println!("pricing v{}", env!("CARGO_PKG_VERSION"));
            println!("HTTP serving for a fitted tabular price regression pipeline");
        }
    }

    Ok(())
}
