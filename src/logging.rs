//! Diagnostics via tracing, kept off stdout.
//!
//! Stdout carries only the two-marker output contract, so every log
//! line goes to stderr. `RUST_LOG` takes precedence and supports full
//! per-target directives; otherwise `LOG_LEVEL` sets the global level.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initializes the tracing subscriber.
///
/// Reads `RUST_LOG` first; if unset or invalid, falls back to
/// `LOG_LEVEL`, then to `info`. Output: stderr, compact format.
pub fn init() {
    let directive = normalize_level(std::env::var("LOG_LEVEL").ok().as_deref());
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}

/// Maps a `LOG_LEVEL` value onto a directive `EnvFilter` understands.
/// Python-style level names are accepted for compatibility with task
/// environments that set `LOG_LEVEL=WARNING`.
fn normalize_level(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return "info".to_string();
    };
    let level = raw.trim().to_lowercase();
    match level.as_str() {
        "" => "info".to_string(),
        "warning" => "warn".to_string(),
        "critical" | "fatal" => "error".to_string(),
        _ => level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_info() {
        assert_eq!(normalize_level(None), "info");
        assert_eq!(normalize_level(Some("")), "info");
        assert_eq!(normalize_level(Some("  ")), "info");
    }

    #[test]
    fn accepts_python_style_level_names() {
        assert_eq!(normalize_level(Some("WARNING")), "warn");
        assert_eq!(normalize_level(Some("CRITICAL")), "error");
        assert_eq!(normalize_level(Some("INFO")), "info");
        assert_eq!(normalize_level(Some("Debug")), "debug");
    }

    #[test]
    fn passes_directives_through_unchanged() {
        assert_eq!(normalize_level(Some("trace")), "trace");
        assert_eq!(normalize_level(Some("error")), "error");
    }
}
