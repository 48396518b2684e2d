use std::sync::Once;

use env_logger::{Builder, TimestampPrecision, WriteStyle};

const DEFAULT_FILTER: &str = "info";

/// Debug sink configuration.
///
/// `env_filter` uses `env_logger` directive syntax ("warn",
/// "vellum_engine::resource=debug"). When unset, `RUST_LOG` is consulted and
/// then `info`.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub env_filter: Option<String>,
    pub write_style: WriteStyle,
    /// Prefix records with a millisecond timestamp.
    pub timestamps: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            env_filter: None,
            write_style: WriteStyle::Auto,
            timestamps: true,
        }
    }
}

impl LoggingConfig {
    /// Config with an explicit filter, ignoring `RUST_LOG`.
    pub fn with_filter(filter: impl Into<String>) -> Self {
        Self {
            env_filter: Some(filter.into()),
            ..Self::default()
        }
    }

    /// Filter directives this config resolves to.
    pub fn filter(&self) -> String {
        resolve_filter(self.env_filter.as_deref(), std::env::var("RUST_LOG").ok())
    }

    fn builder(&self) -> Builder {
        let mut builder = Builder::new();
        builder.parse_filters(&self.filter());
        builder.write_style(self.write_style);
        builder.format_timestamp(self.timestamps.then_some(TimestampPrecision::Millis));
        builder
    }
}

fn resolve_filter(explicit: Option<&str>, env: Option<String>) -> String {
    explicit
        .map(str::to_owned)
        .or(env.filter(|s| !s.trim().is_empty()))
        .unwrap_or_else(|| DEFAULT_FILTER.to_owned())
}

static INIT: Once = Once::new();

/// Installs `env_logger` behind the `log` facade.
///
/// Only the first call has any effect. A logger the host installed earlier
/// is left in place.
pub fn init_logging(config: &LoggingConfig) {
    INIT.call_once(|| {
        if config.builder().try_init().is_ok() {
            log::debug!("logging initialized ({})", config.filter());
        }
    });
}
