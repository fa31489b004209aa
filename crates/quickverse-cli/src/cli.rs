//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use quickverse_common_config::{vars, ClientConfig, ConfigLoader};
use quickverse_sdk::{QuickVerse, Substitution};
use tracing::debug;

use crate::error::CliError;
use crate::output::{
    print_output, transmission_label, ConfigOutput, FetchOutput, LookupOutput, Resolved,
};

/// QuickVerse - fetch localizations and resolve keys from the terminal
#[derive(Debug, Parser)]
#[command(
    name = "quickverse",
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = vars::CONFIG_PATH, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch localizations and print how many were received
    Fetch(FetchArgs),

    /// Fetch localizations and resolve keys, reporting usage afterwards
    Lookup(LookupArgs),

    /// Show the effective configuration
    Config,
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Language code to request; defaults to the device language
    #[arg(short, long)]
    pub language: Option<String>,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    /// Keys to resolve
    #[arg(required = true)]
    pub keys: Vec<String>,

    /// Language code to request; defaults to the device language
    #[arg(short, long)]
    pub language: Option<String>,

    /// Value printed and reported for keys that are not found
    #[arg(short, long)]
    pub default: Option<String>,

    /// Placeholder replacement applied to found values (PLACEHOLDER=VALUE)
    #[arg(short, long = "set", value_name = "PLACEHOLDER=VALUE", value_parser = parse_substitution)]
    pub substitutions: Vec<Substitution>,
}

fn parse_substitution(raw: &str) -> Result<Substitution, String> {
    match raw.split_once('=') {
        Some((placeholder, _)) if placeholder.is_empty() => {
            Err("placeholder must not be empty".to_string())
        }
        Some((placeholder, value)) => Ok(Substitution::new(placeholder, value)),
        None => Err(format!("expected PLACEHOLDER=VALUE, got {raw:?}")),
    }
}

impl Cli {
    /// Load configuration from `--config`, or from `.quickverse/config.yaml`
    /// in the working directory, with environment overrides applied.
    pub fn load_config(&self) -> Result<ClientConfig, CliError> {
        let config = match &self.config {
            Some(path) => {
                let mut config = ConfigLoader::load_file(path)?;
                ConfigLoader::apply_env(&mut config)?;
                ConfigLoader::validate(&config)?;
                config
            }
            None => ConfigLoader::new(std::env::current_dir()?).load()?,
        };
        debug!(base_url = %config.base_url, package = %config.package_name, "configuration loaded");
        Ok(config)
    }

    /// Run the selected subcommand.
    pub async fn execute(self, config: ClientConfig) -> Result<(), CliError> {
        match &self.command {
            Command::Fetch(args) => {
                let quickverse = QuickVerse::from_config(&config)?;
                let count = fetch(&quickverse, args.language.as_deref()).await?;
                let output = FetchOutput {
                    language: quickverse.current_language().unwrap_or_default(),
                    count,
                };
                print_output(self.format, &output)
            }
            Command::Lookup(args) => {
                let quickverse = Arc::new(QuickVerse::from_config(&config)?);
                let _flush = config
                    .flush_interval()
                    .map(|period| quickverse.spawn_periodic_flush(period));

                fetch(&quickverse, args.language.as_deref()).await?;

                let values = args
                    .keys
                    .iter()
                    .map(|key| Resolved {
                        key: key.clone(),
                        value: match &args.default {
                            Some(default) => Some(quickverse.string_for_or_with(
                                key,
                                default,
                                &args.substitutions,
                            )),
                            None => quickverse.string_for_with(key, &args.substitutions),
                        },
                    })
                    .collect();

                // Deliver usage before exiting.
                quickverse.settle().await;
                let report = quickverse.flush().await;
                debug!(?report, "usage flushed");

                let output = LookupOutput {
                    language: quickverse.current_language().unwrap_or_default(),
                    values,
                    report: transmission_label(report),
                };
                print_output(self.format, &output)
            }
            Command::Config => print_output(self.format, &ConfigOutput { config: &config }),
        }
    }
}

async fn fetch(quickverse: &QuickVerse, language: Option<&str>) -> Result<usize, CliError> {
    let count = match language {
        Some(language) => quickverse.fetch_specific(language).await?,
        None => quickverse.fetch_for_device_language().await?,
    };
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_lookup() {
        let cli = Cli::try_parse_from([
            "quickverse",
            "lookup",
            "Greeting",
            "Farewell",
            "--language",
            "fr",
            "--set",
            "{name}=Ada",
            "-d",
            "n/a",
        ])
        .unwrap();

        let Command::Lookup(args) = cli.command else {
            panic!("expected lookup");
        };
        assert_eq!(args.keys, vec!["Greeting", "Farewell"]);
        assert_eq!(args.language.as_deref(), Some("fr"));
        assert_eq!(args.default.as_deref(), Some("n/a"));
        assert_eq!(args.substitutions, vec![Substitution::new("{name}", "Ada")]);
    }

    #[test]
    fn test_parse_substitution() {
        assert_eq!(
            parse_substitution("{count}=a=b").unwrap(),
            Substitution::new("{count}", "a=b")
        );
        assert!(parse_substitution("=x").is_err());
        assert!(parse_substitution("novalue").is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["quickverse", "-q", "-v", "config"]).is_err());
    }
}
