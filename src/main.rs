//! hyperexplainer CLI entry point.

use anyhow::Result;
use clap::Parser;

use hyperexplainer::cli::commands::{self, correlate, env, explain, extract, predict, serve};
use hyperexplainer::cli::{handle_error, Cli, Commands};
use hyperexplainer::infrastructure::credentials;
use hyperexplainer::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        handle_error(err, json);
    }
}

async fn run(cli: Cli) -> Result<()> {
    credentials::load_dotenv();

    // Environment commands must work without a valid configuration.
    match &cli.command {
        Commands::CheckEnv => return env::check(cli.json),
        Commands::SetupCredentials { dir } => return env::setup_credentials(dir, cli.json),
        _ => {}
    }

    let config = commands::load_config(cli.config.as_deref())?;
    let _logger = LoggerImpl::init(&config.logging)?;

    match cli.command {
        Commands::Serve { host, port } => serve::execute(&config, host, port).await,
        Commands::Extract { file, strategy } => {
            extract::execute(&config, file.as_deref(), strategy.as_deref(), cli.json).await
        }
        Commands::Explain { name, value } => {
            explain::execute(&config, &name, &value, cli.json).await
        }
        Commands::Predict { name, value } => {
            predict::execute(&config, &name, &value, cli.json).await
        }
        Commands::Correlate { parameters } => {
            correlate::execute(&config, &parameters, cli.json).await
        }
        Commands::CheckEnv | Commands::SetupCredentials { .. } => Ok(()),
    }
}
