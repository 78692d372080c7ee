use tracing_subscriber::EnvFilter;

fn fallback_level(raw: &str) -> &'static str {
    match raw.trim().to_ascii_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "error" => "error",
        "off" => "off",
        _ => "warn",
    }
}

/// Sends tracing output to stderr; stdout carries only the result protocol.
pub(crate) fn init_logging(log_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(fallback_level(log_level)))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod logging_tests {
    use super::*;

    #[test]
    fn unknown_levels_fall_back_to_warn() {
        assert_eq!(fallback_level("DEBUG"), "debug");
        assert_eq!(fallback_level(" info "), "info");
        assert_eq!(fallback_level("loud"), "warn");
    }

    #[test]
    fn init_twice_is_harmless() {
        init_logging("error");
        init_logging("debug");
    }
}
