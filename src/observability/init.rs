//! Tracing initialization and subscriber setup.

use super::file_writer::RotatingLog;
use crate::Config;
use std::sync::Arc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log file name inside the data directory.
const LOG_FILE: &str = "fesnuk.log";

/// Installs the global tracing subscriber.
///
/// Sets up a subscriber pipeline that:
/// 1. Filters events by `RUST_LOG`, or by `config.trace_level` when unset
/// 2. Formats each event as one JSON line
/// 3. Appends to `fesnuk.log` in the data directory, rotating at 10 MB
///
/// # Initialization Behavior
///
/// - Creates the data directory if it doesn't exist
/// - Silently does nothing if the directory cannot be created
/// - Idempotent: only the first call installs a subscriber
///
/// # Example
///
/// ```rust,no_run
/// use fesnuk::observability::init_tracing;
/// use fesnuk::Config;
///
/// let config = Config {
///     trace_level: Some("debug".to_string()),
///     ..Default::default()
/// };
///
/// init_tracing(&config);
///
/// tracing::debug!("tracing is now active");
/// ```
pub fn init_tracing(config: &Config) {
    let level = config.trace_level.clone().unwrap_or_else(|| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if std::fs::create_dir_all(&config.data_dir).is_err() {
        return;
    }

    let log = Arc::new(RotatingLog::new(config.data_dir.join(LOG_FILE)));
    let layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(false)
        .with_writer(log);

    let _ = tracing_subscriber::registry().with(filter).with(layer).try_init();
}
