//! Logging and tracing utilities for the export pipeline
//!
//! Structured logging goes through `tracing`; the binary installs a
//! `tracing-subscriber` registry once at startup.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

/// Whether tracing has been initialized
static TRACING_INITIALIZED: AtomicBool = AtomicBool::new(false);

/// Configuration for tracing initialization
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Default log level filter (e.g., "info", "debug", "warn")
    pub default_level: String,
    /// Show the target (module path) in log output
    pub show_target: bool,
    /// Show thread IDs in log output
    pub show_thread_ids: bool,
    /// Show source file in log output
    pub show_file: bool,
    /// Show line number in log output
    pub show_line_number: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            default_level: "warn,gltfcomp=info,gltfcomp_export=info".to_string(),
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TracingConfig {
    /// Config whose default filter is `level` for gltfcomp crates, `warn` elsewhere
    pub fn with_level(level: &str) -> Self {
        Self {
            default_level: format!(
                "warn,gltfcomp={level},gltfcomp_export={level},gltfcomp_core={level}"
            ),
            ..Self::default()
        }
    }
}

/// Initialize the default tracing subscriber
///
/// Multiple calls are safe and will be ignored.
pub fn init_default() -> bool {
    init_with_config(TracingConfig::default())
}

/// Initialize tracing with a custom configuration
///
/// `RUST_LOG` overrides `config.default_level`. Returns `false` when tracing
/// was already initialized by an earlier call.
pub fn init_with_config(config: TracingConfig) -> bool {
    if TRACING_INITIALIZED
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::Relaxed)
        .is_err()
    {
        return false;
    }

    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.default_level));

    let fmt_layer = fmt::layer()
        .with_target(config.show_target)
        .with_thread_ids(config.show_thread_ids)
        .with_file(config.show_file)
        .with_line_number(config.show_line_number)
        .with_writer(std::io::stderr);

    // A host may already have installed its own global subscriber
    tracing_subscriber::registry().with(fmt_layer).with(filter).try_init().is_ok()
}

/// Run one pipeline stage inside a span and log its duration
pub fn instrument_stage<T, F>(name: &str, f: F) -> T
where
    F: FnOnce() -> T,
{
    let span = tracing::debug_span!("stage", stage = %name);
    let _guard = span.enter();

    let start = Instant::now();
    let result = f();
    let duration = start.elapsed();

    tracing::debug!(duration_us = %duration.as_micros(), "Stage complete");

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_config_default() {
        let config = TracingConfig::default();
        assert!(config.default_level.contains("info"));
        assert!(config.show_target);
        assert!(!config.show_thread_ids);
    }

    #[test]
    fn test_tracing_config_with_level() {
        let config = TracingConfig::with_level("trace");
        assert!(config.default_level.contains("gltfcomp_export=trace"));
        assert!(config.default_level.starts_with("warn"));
    }

    #[test]
    fn test_instrument_stage() {
        let result = instrument_stage("test", || 42);
        assert_eq!(result, 42);
    }

    #[test]
    fn test_init_is_idempotent() {
        init_default();
        assert!(!init_default());
    }
}
