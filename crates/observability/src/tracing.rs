//! Tracing/logging initialization.
//!
//! Filtering comes from `RUST_LOG` (default `info`). Output is JSON unless
//! `GATEKEEP_LOG_FORMAT=pretty`.

use tracing_subscriber::EnvFilter;

/// Env var selecting the log output format.
pub const LOG_FORMAT_ENV: &str = "GATEKEEP_LOG_FORMAT";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Json,
    Pretty,
}

impl LogFormat {
    /// Anything other than `pretty` (case-insensitive) means JSON.
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            Some(v) if v.eq_ignore_ascii_case("pretty") => Self::Pretty,
            _ => Self::Json,
        }
    }
}

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops).
pub fn init() {
    let format = LogFormat::parse(std::env::var(LOG_FORMAT_ENV).ok().as_deref());
    init_with(format);
}

pub fn init_with(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false);

    let _ = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_defaults_to_json() {
        assert_eq!(LogFormat::parse(None), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some("compact")), LogFormat::Json);
        assert_eq!(LogFormat::parse(Some(" Pretty ")), LogFormat::Pretty);
    }

    #[test]
    fn init_twice_is_a_no_op() {
        init_with(LogFormat::Json);
        init_with(LogFormat::Pretty);
    }
}
