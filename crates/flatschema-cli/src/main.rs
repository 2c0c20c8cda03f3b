//! flatschema CLI.

mod cli;
mod logging;

use crate::{
    cli::{Cli, LogFormatArg},
    logging::{LogConfig, LogFormat, init_logging},
};
use clap::Parser;
use flatschema_build::{Generated, Options, process};
use flatschema_config_build::{Config, ConfigError};
use std::{
    io::{self, IsTerminal},
    path::Path,
    process::ExitCode,
};
use thiserror::Error as ThisError;

/// Exit status of a failed run.
const EXIT_FAILURE: u8 = 2;

///
/// CliError
///

#[remain::sorted]
#[derive(Debug, ThisError)]
enum CliError {
    #[error(transparent)]
    Build(#[from] flatschema_build::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&log_config_from_cli(&cli));

    match run(&cli) {
        Ok(generated) => {
            print_summary(&cli, &generated);
            ExitCode::SUCCESS
        }
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn run(cli: &Cli) -> Result<Generated, CliError> {
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => {
            let dir = cli.source.parent().unwrap_or_else(|| Path::new(""));
            let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
            Config::discover(dir)?
        }
    };

    let options = options_from(cli, config);
    tracing::debug!(?options, "resolved options");

    Ok(process(&options)?)
}

/// Flags win over config file values.
fn options_from(cli: &Cli, config: Config) -> Options {
    Options {
        source_file: cli.source.clone(),
        model_file: cli.model_file.clone().or(config.model_file),
        namespace: cli.namespace.clone().or(config.namespace),
        id_strategy: cli.id_strategy.or(config.id_strategy).unwrap_or_default(),
        binding_file: cli.binding.clone().or(config.binding_file),
    }
}

fn print_summary(cli: &Cli, generated: &Generated) {
    if cli.verbosity.is_silent() {
        return;
    }

    let properties: usize = generated.model.entities.iter().map(|e| e.properties.len()).sum();
    let retired = generated.snapshot.entities.len() - generated.snapshot.live_entities().count();

    println!(
        "{}: {} entities, {} properties, {} retired{}",
        cli.source.display(),
        generated.model.entities.len(),
        properties,
        retired,
        if generated.snapshot_written { "" } else { " (model unchanged)" },
    );
}

fn log_config_from_cli(cli: &Cli) -> LogConfig {
    LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        use_env_filter: !cli.verbosity.is_present(),
        with_ansi: io::stderr().is_terminal(),
        format: match cli.log_format {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        },
    }
}

///
/// TESTS
///
