// Tracing log adapter - Structured logging using tracing crate

use tracing_subscriber::EnvFilter;

use crate::error::{CompressError, CompressResult};

/// Parse a log level name
pub fn parse_level(level_str: &str) -> CompressResult<tracing::Level> {
    match level_str.trim().to_lowercase().as_str() {
        "trace" => Ok(tracing::Level::TRACE),
        "debug" => Ok(tracing::Level::DEBUG),
        "info" => Ok(tracing::Level::INFO),
        "warn" => Ok(tracing::Level::WARN),
        "error" => Ok(tracing::Level::ERROR),
        _ => Err(CompressError::Config {
            message: format!(
                "Invalid log level: {}. Valid levels: trace, debug, info, warn, error",
                level_str
            ),
        }),
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when set. Output goes to stderr so that
/// JSON progress on stdout stays clean. Calling this twice is harmless.
pub fn init_logging(level: &str, json: bool) -> CompressResult<()> {
    let level = parse_level(level)?;
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_string().to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    // Already initialized (tests, embedding apps) is fine
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("INFO").unwrap(), tracing::Level::INFO);
        assert_eq!(parse_level(" debug ").unwrap(), tracing::Level::DEBUG);
        assert!(parse_level("verbose").is_err());
    }

    #[test]
    fn test_init_logging_is_idempotent() {
        assert!(init_logging("warn", false).is_ok());
        assert!(init_logging("debug", true).is_ok());
        assert!(init_logging("nope", false).is_err());
    }
}
