//! Entry point for the `quickverse` binary.

use std::process::ExitCode;

use clap::Parser;
use quickverse_cli::cli::Cli;
use quickverse_cli::CliError;
use quickverse_common_config::Environment;
use quickverse_common_log::{vars as log_vars, LogConfig, LogError, LogLevel};

/// Application exit codes
#[repr(u8)]
pub enum Exit {
    Success = 0,
    GeneralError = 1,
}

impl From<Exit> for ExitCode {
    fn from(exit: Exit) -> Self {
        ExitCode::from(exit as u8)
    }
}

fn main() -> ExitCode {
    // .env files may name the config file or set logging variables.
    let _env = Environment::init();
    let cli = Cli::parse();

    if let Err(e) = init_logging(&cli) {
        eprintln!("{}", CliError::from(e).render());
        return Exit::GeneralError.into();
    }

    let runtime = match tokio::runtime::Builder::new_multi_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("failed to create tokio runtime: {e}");
            return Exit::GeneralError.into();
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => Exit::Success.into(),
        Err(e) => {
            eprintln!("{}", e.render());
            e.exit_code()
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = cli.load_config()?;
    cli.execute(config).await
}

fn init_logging(cli: &Cli) -> Result<(), LogError> {
    let mut config = LogConfig::from_env();
    if cli.quiet {
        config.level = LogLevel::Error;
    } else if std::env::var_os(log_vars::LOG_LEVEL).is_none() {
        config.level = LogLevel::Warn;
    }
    quickverse_common_log::init(config.verbose(cli.verbose))
}
