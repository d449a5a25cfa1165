use crate::config::TelemetryConfig;
use std::fmt;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
pub enum TelemetryError {
    Filter { directive: String, source: ParseError },
    Init(Box<dyn std::error::Error + Send + Sync>),
}

impl fmt::Display for TelemetryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TelemetryError::Filter { directive, .. } => {
                write!(f, "APP_LOG_LEVEL produced an unusable filter '{directive}'")
            }
            TelemetryError::Init(err) => write!(f, "failed to install log subscriber: {err}"),
        }
    }
}

impl std::error::Error for TelemetryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TelemetryError::Filter { source, .. } => Some(source),
            TelemetryError::Init(err) => Some(&**err),
        }
    }
}

/// Scopes the configured level to the dashboard crates; dependencies stay at
/// `warn` so a `debug` run is not drowned out by hyper/tower chatter.
fn default_directive(log_level: &str) -> String {
    format!("warn,leadlens={log_level},leadlens_api={log_level}")
}

/// Install the global subscriber. An explicit `RUST_LOG` wins; otherwise the
/// level from [`TelemetryConfig`] applies via [`default_directive`].
pub fn init(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => {
            let directive = default_directive(&config.log_level);
            EnvFilter::try_new(&directive)
                .map_err(|source| TelemetryError::Filter { directive, source })?
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .try_init()
        .map_err(TelemetryError::Init)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_level_scopes_to_workspace_crates() {
        assert_eq!(
            default_directive("debug"),
            "warn,leadlens=debug,leadlens_api=debug"
        );
        assert!(EnvFilter::try_new(default_directive("info")).is_ok());
    }

    #[test]
    fn garbage_level_fails_filter_construction() {
        assert!(EnvFilter::try_new(default_directive("shouty")).is_err());
    }
}
