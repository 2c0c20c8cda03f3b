//! Command-line arguments.

use clap::{Parser, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use flatschema_schema::identity::IdStrategy;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(
    name = "flatschema",
    version,
    about = "Derive stable entity identifiers and vtable layouts from annotated Rust structs",
    long_about = "Reads the structs in one Rust source file, assigns stable IDs and UIDs \
                  to every entity and property against the model file, computes vtable \
                  offsets and writes the merged model file back.\n\n\
                  Settings come from flatschema.toml next to the source file unless \
                  --config is given; flags override the file."
)]
pub struct Cli {
    /// Rust source file holding the entity structs.
    #[arg(long, value_name = "FILE", env = "SOURCE_FILE")]
    pub source: PathBuf,

    /// Model file to read and update (default: flatschema-model.json next to the source).
    #[arg(long = "model-file", alias = "persist", value_name = "FILE")]
    pub model_file: Option<PathBuf>,

    /// Namespace mixed into entity hashes (default: the source file stem).
    #[arg(long, value_name = "NAME")]
    pub namespace: Option<String>,

    /// Numeric ID scheme for new entities: hashed or sequential.
    #[arg(long = "id-strategy", value_name = "STRATEGY")]
    pub id_strategy: Option<IdStrategy>,

    /// Also write the finalized model as JSON for an external emitter.
    #[arg(long, value_name = "FILE")]
    pub binding: Option<PathBuf>,

    /// Config file to use instead of flatschema.toml next to the source.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Adjust log verbosity (-v info, -vv debug, -q silent).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Log output format.
    #[arg(long = "log-format", value_enum, default_value = "pretty")]
    pub log_format: LogFormatArg,
}

/// CLI log format choices.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_all_flags() {
        let cli = Cli::try_parse_from([
            "flatschema",
            "--source",
            "model.rs",
            "--persist",
            "ids.json",
            "--namespace",
            "shop",
            "--id-strategy",
            "sequential",
            "--binding",
            "out.json",
            "-vv",
            "--log-format",
            "json",
        ])
        .unwrap();

        assert_eq!(cli.source, PathBuf::from("model.rs"));
        assert_eq!(cli.model_file, Some(PathBuf::from("ids.json")));
        assert_eq!(cli.id_strategy, Some(IdStrategy::Sequential));
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        assert!(cli.verbosity.is_present());
    }

    #[test]
    fn rejects_unknown_strategy() {
        let err = Cli::try_parse_from([
            "flatschema",
            "--source",
            "m.rs",
            "--id-strategy",
            "random",
        ]);

        assert!(err.is_err());
    }
}
