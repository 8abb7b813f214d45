//! Tracing subscriber setup.
//!
//! Production emits one JSON object per event with the current span flattened
//! in; everything else gets compact ANSI output for a terminal.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Filter applied when neither `RUST_LOG` nor `LOG_LEVEL` is set.
const DEFAULT_DIRECTIVES: &str = "info,tower_http=warn,hyper=warn,reqwest=warn";

fn filter_for(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = config.log_level.as_deref().unwrap_or(DEFAULT_DIRECTIVES);
        EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES))
    })
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_logging(config: &Config) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(filter_for(config));

    if config.is_production() {
        registry
            .with(
                fmt::layer()
                    .json()
                    .flatten_event(true)
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_target(true)
                    .with_writer(std::io::stdout),
            )
            .try_init()
    } else {
        registry
            .with(
                fmt::layer()
                    .compact()
                    .with_target(false)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .try_init()
    }
}
