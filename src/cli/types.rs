//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hyperexplainer")]
#[command(about = "Extract and explain machine-learning hyperparameters", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file (defaults to .hyperexplainer/config.yaml)
    #[arg(short, long, global = true, env = "HYPEREXPLAINER_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API
    Serve {
        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Extract hyperparameters from training code
    Extract {
        /// Source file; reads stdin when omitted
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Extraction strategy: pattern, heuristic or model
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Explain a single hyperparameter
    Explain {
        /// Parameter name
        name: String,
        /// Current value
        value: String,
    },

    /// Predict how performance varies with a hyperparameter
    Predict {
        /// Parameter name
        name: String,
        /// Current value
        value: String,
    },

    /// Correlation matrix for a set of hyperparameters
    Correlate {
        /// Parameters as name=value pairs
        #[arg(required = true, value_parser = parse_pair)]
        parameters: Vec<(String, String)>,
    },

    /// Report which credentials are present in the environment
    CheckEnv,

    /// Decode GOOGLE_SERVICE_ACCOUNT_KEY and write it to disk
    SetupCredentials {
        /// Target directory
        #[arg(short, long, default_value = "credentials")]
        dir: PathBuf,
    },
}

/// `name=value`; the value may be empty.
fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!("expected name=value, got '{raw}'")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pair() {
        assert_eq!(
            parse_pair("learning_rate=0.01"),
            Ok(("learning_rate".to_string(), "0.01".to_string()))
        );
        assert_eq!(parse_pair("flag="), Ok(("flag".to_string(), String::new())));
        assert!(parse_pair("=3").is_err());
        assert!(parse_pair("novalue").is_err());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let cli = Cli::try_parse_from(["hyperexplainer", "--json", "correlate", "a=1", "b=2"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Correlate { parameters } => assert_eq!(parameters.len(), 2),
            _ => panic!("expected correlate"),
        }

        let cli = Cli::try_parse_from(["hyperexplainer", "serve", "--port", "8080"]).unwrap();
        assert!(matches!(cli.command, Commands::Serve { port: Some(8080), host: None }));

        assert!(Cli::try_parse_from(["hyperexplainer", "correlate"]).is_err());
    }
}
