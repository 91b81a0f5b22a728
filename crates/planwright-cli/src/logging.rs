//! Log subscriber setup

use crate::config::CliConfig;
use tracing_subscriber::EnvFilter;

/// Filter from `RUST_LOG`, falling back to the verbosity's directive
#[must_use]
pub fn env_filter(config: &CliConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.log_directive()))
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// reserved for listings and JSON reports. A second call is a no-op.
pub fn init(config: &CliConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_writer(std::io::stderr)
        .with_target(false);
    let result = if config.json_logs {
        builder.json().try_init()
    } else {
        builder.with_ansi(config.color.should_color()).try_init()
    };
    if let Err(e) = result {
        tracing::debug!(error = %e, "log subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Verbosity;

    #[test]
    fn test_filter_follows_verbosity() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }
        let filter = env_filter(&CliConfig::new().with_verbosity(Verbosity::Verbose));
        assert_eq!(filter.to_string(), "info");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = CliConfig::new().with_verbosity(Verbosity::Quiet);
        init(&config);
        init(&config);
    }
}
