//! Logging setup using `tracing-subscriber`.
//!
//! Levels used by the generator:
//! - `warn`: retired entities and properties
//! - `info`: run summary, files written
//! - `debug`: per entity and property decisions (minted or reused IDs)

use std::io;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

///
/// LogFormat
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Compact,
    Json,
}

///
/// LogConfig
///

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level_filter: LevelFilter,

    /// Let `RUST_LOG` decide when no verbosity flag was given.
    pub use_env_filter: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: false,
            format: LogFormat::default(),
        }
    }
}

/// Install the global subscriber, writing to stderr.
pub fn init_logging(config: &LogConfig) {
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Json => {
            let layer = fmt::layer().json().with_writer(io::stderr).with_target(false);
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Compact => {
            let layer = fmt::layer()
                .compact()
                .with_writer(io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
        LogFormat::Pretty => {
            let layer = fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(config.with_ansi)
                .with_target(false)
                .without_time();
            tracing_subscriber::registry().with(filter).with(layer).init();
        }
    }
}

// Our crates log at the requested level, everything else stays at warn.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let fallback = || {
        let level = config.level_filter.to_string().to_lowercase();
        EnvFilter::new(format!(
            "warn,flatschema={level},flatschema_build={level},flatschema_schema={level},\
             flatschema_config_build={level}"
        ))
    };

    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| fallback())
    } else {
        fallback()
    }
}
