//! Command line arguments of the operator, parsed with `clap`.
//!
//! ```rust
//! use clap::Parser;
//! use syndesis_operator::cli::Command;
//!
//! let command = Command::<syndesis_operator::cli::OperatorOptions>::parse_from([
//!     "syndesis-operator",
//!     "run",
//!     "--template",
//!     "/conf/config.yaml",
//! ]);
//! assert!(matches!(command, Command::Run(_)));
//! ```
use std::path::PathBuf;

use clap::{Args, Parser};

use crate::{logging::LogFormat, secret_generator::SecretGenerator};

/// Location of the configuration template in the operator image
pub const DEFAULT_TEMPLATE: &str = "/conf/config.yaml";

/// Commands of the operator.
///
/// Generic over the arguments of [`Command::Run`], so that a binary can extend [`OperatorOptions`].
#[derive(Debug, PartialEq, Eq, Parser)]
pub enum Command<Run: Args = OperatorOptions> {
    /// Print the Syndesis CRD with all served versions.
    Crd,

    /// Run the operator.
    Run(Run),
}

#[derive(Debug, PartialEq, Eq, Parser)]
#[command(long_about = "")]
pub struct OperatorOptions {
    /// Path of the configuration template, YAML or JSON
    #[arg(long, short = 't', value_name = "FILE", env = "SYNDESIS_TEMPLATE_CONFIG", default_value = DEFAULT_TEMPLATE)]
    pub template: PathBuf,

    /// Provides a specific namespace to watch (instead of watching all namespaces)
    #[arg(long, env)]
    pub watch_namespace: Option<String>,

    /// Seed for generated passwords and keys, only meant for reproducible test installations
    #[arg(long, hide = true)]
    pub secret_seed: Option<u64>,

    /// Format of the log output
    #[arg(long, value_enum, env = "SYNDESIS_LOG_FORMAT", default_value_t)]
    pub log_format: LogFormat,
}

impl OperatorOptions {
    /// The generator for missing passwords and keys, seeded from `--secret-seed` if given
    pub fn secret_generator(&self) -> SecretGenerator {
        self.secret_seed
            .map_or_else(SecretGenerator::from_time_seed, SecretGenerator::with_seed)
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_cli() {
        OperatorOptions::command().debug_assert();
        Command::<OperatorOptions>::command().debug_assert();
    }

    #[test]
    fn run_arguments_are_parsed() {
        let command = Command::<OperatorOptions>::try_parse_from([
            "syndesis-operator",
            "run",
            "--template",
            "/tmp/config.json",
            "--watch-namespace",
            "syndesis",
            "--secret-seed",
            "42",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(
            command,
            Command::Run(OperatorOptions {
                template: PathBuf::from("/tmp/config.json"),
                watch_namespace: Some("syndesis".to_string()),
                secret_seed: Some(42),
                log_format: LogFormat::Json,
            })
        );
    }

    #[test]
    fn seeded_generator_is_reproducible() {
        let options = OperatorOptions {
            template: PathBuf::from(DEFAULT_TEMPLATE),
            watch_namespace: None,
            secret_seed: Some(42),
            log_format: LogFormat::Plain,
        };
        assert_eq!(
            options.secret_generator().generate(16),
            SecretGenerator::with_seed(42).generate(16)
        );
    }
}
