//! Subscriber installation for the operator binary

use crate::config::ScalarConfig;
use anyhow::{bail, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber. `RUST_LOG` wins over the configured level.
pub fn init_logging(config: &ScalarConfig) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // Logs go to stderr so command output stays clean.
    match config.log_format.as_str() {
        "json" => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .try_init()?,
        "compact" => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().compact().with_writer(std::io::stderr))
            .try_init()?,
        "pretty" => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init()?,
        other => bail!("unknown log format {other:?} (expected pretty, compact or json)"),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_format_installs_and_unknown_is_rejected() {
        let unknown = ScalarConfig {
            log_format: "xml".to_string(),
            ..ScalarConfig::default()
        };
        let err = init_logging(&unknown).unwrap_err();
        assert!(err.to_string().contains("unknown log format"));

        let json = ScalarConfig {
            log_format: "json".to_string(),
            ..ScalarConfig::default()
        };
        init_logging(&json).unwrap();
        tracing::info!(target: "token", "json subscriber installed");
    }
}
