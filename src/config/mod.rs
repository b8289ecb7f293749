pub mod environment;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::config::environment::{Destination, Environment};
#[cfg(feature = "cli")]
use crate::config::toml_config::EnvironmentFile;
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use clap::Parser;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "frame-ingest")]
#[command(about = "Fetch frames, transform them and land them in storage")]
pub struct CliConfig {
    /// Built-in environment to run (default, production)
    #[arg(short, long, conflicts_with = "config")]
    pub environment: Option<String>,

    /// TOML file describing the environment
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Override the filesystem destination of the environment
    #[arg(long)]
    pub output: Option<PathBuf>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON lines")]
    pub json_logs: bool,

    #[arg(long, help = "Log CPU and memory usage per stage")]
    pub monitor: bool,

    #[arg(long, help = "Resolve the environment without running it")]
    pub dry_run: bool,

    #[arg(long, help = "List the registered implementations and exit")]
    pub list: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// The environment selected on the command line, with overrides applied.
    pub fn load_environment(&self) -> Result<Environment> {
        let environment = match (&self.config, &self.environment) {
            (Some(path), _) => EnvironmentFile::from_file(path)?.into_environment()?,
            (None, Some(name)) => Environment::named(name)?,
            (None, None) => Environment::default_environment(),
        };

        Ok(match &self.output {
            Some(output) => {
                let destination = Destination {
                    file_path: output.clone(),
                    ..environment.destination().clone()
                };
                environment.with_destination(destination)
            }
            None => environment,
        })
    }
}

#[cfg(all(test, feature = "cli"))]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_default_environment() {
        let config = CliConfig::parse_from(["frame-ingest"]);
        assert_eq!(
            config.load_environment().unwrap(),
            Environment::default_environment()
        );
    }

    #[test]
    fn test_named_environment_with_output_override() {
        let config =
            CliConfig::parse_from(["frame-ingest", "-e", "production", "--output", "/tmp/x.json"]);

        let env = config.load_environment().unwrap();

        assert_eq!(env.name(), "prod");
        assert_eq!(env.destination().file_path, PathBuf::from("/tmp/x.json"));
    }

    #[test]
    fn test_environment_and_config_conflict() {
        let result =
            CliConfig::try_parse_from(["frame-ingest", "-e", "default", "-c", "env.toml"]);
        assert!(result.is_err());
    }
}
