//! Diagnostic logging.
//!
//! Thin macros over `tracing` so call sites read the same everywhere, plus
//! the subscriber setup used by the binary. Event-log entries are mirrored
//! here at debug level so a terminal shows the same story as the UI.

use reverb_tester_shared::{EventLogEntry, LogKind};

pub fn log_info_impl(msg: &str) {
    tracing::info!("{}", msg);
}

pub fn log_error_impl(msg: &str) {
    tracing::error!("{}", msg);
}

pub fn log_warn_impl(msg: &str) {
    tracing::warn!("{}", msg);
}

pub fn log_debug_impl(msg: &str) {
    tracing::debug!("{}", msg);
}

/// Mirror an appended event-log entry to the tracing output.
pub fn mirror_entry(entry: &EventLogEntry) {
    let channel = entry.channel.as_deref().unwrap_or("-");
    let event = entry.event.as_deref().unwrap_or("-");
    let message = entry.message.as_deref().unwrap_or("");
    match entry.kind {
        LogKind::Error => tracing::warn!(
            target: "reverb_tester_client::event_log",
            channel, event, "[{}] {}", entry.kind.label(), message
        ),
        _ => tracing::debug!(
            target: "reverb_tester_client::event_log",
            channel, event, "[{}] {}", entry.kind.label(), message
        ),
    }
}

/// Install the global `tracing` subscriber.
///
/// `RUST_LOG` wins; otherwise `default_filter` is used.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .try_init();
}

/// Log an info message
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::logging::log_info_impl(&format!($($arg)*))
    };
}

/// Log an error message
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::logging::log_error_impl(&format!($($arg)*))
    };
}

/// Log a warning message
#[macro_export]
macro_rules! log_warn {
    ($($arg:tt)*) => {
        $crate::logging::log_warn_impl(&format!($($arg)*))
    };
}

/// Log a debug message
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::logging::log_debug_impl(&format!($($arg)*))
    };
}
