/// Centralized logging macros for the connection controller
///
/// These macros provide consistent logging across the workspace with:
/// - A single `tracing` target (`serial_link`) for easy filtering
/// - Structured fields passed straight through to `tracing`
/// - No direct `tracing` dependency needed in calling crates
///
/// Log debug-level message
///
/// # Example
/// ```
/// use link_runtime::link_debug;
/// link_debug!("ConnectionController: {:?} → {:?}", "Disconnected", "Connecting");
/// ```
#[macro_export]
macro_rules! link_debug {
    ($($arg:tt)*) => {
        $crate::tracing::debug!(target: $crate::logging::TARGET, $($arg)*)
    };
}

/// Log trace-level message
///
/// Use for per-event chatter such as filtered broadcast traffic
#[macro_export]
macro_rules! link_trace {
    ($($arg:tt)*) => {
        $crate::tracing::trace!(target: $crate::logging::TARGET, $($arg)*)
    };
}

/// Log info-level message
///
/// Use for state changes a user would care about
#[macro_export]
macro_rules! link_info {
    ($($arg:tt)*) => {
        $crate::tracing::info!(target: $crate::logging::TARGET, $($arg)*)
    };
}

/// Log warning-level message
///
/// Use for recoverable errors and unexpected conditions
#[macro_export]
macro_rules! link_warn {
    ($($arg:tt)*) => {
        $crate::tracing::warn!(target: $crate::logging::TARGET, $($arg)*)
    };
}

/// Log error-level message
///
/// Use for precondition violations and other caller bugs
#[macro_export]
macro_rules! link_error {
    ($($arg:tt)*) => {
        $crate::tracing::error!(target: $crate::logging::TARGET, $($arg)*)
    };
}

/// `tracing` target every macro in this module logs under
pub const TARGET: &str = "serial_link";

use tracing_subscriber::EnvFilter;

/// Install a global fmt subscriber filtered by `RUST_LOG`
///
/// Falls back to `default_directive` (e.g. `"serial_link=info"`) when
/// `RUST_LOG` is unset or unparsable. Returns false if a subscriber was
/// already installed, so repeated calls are harmless.
pub fn init(default_directive: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .is_ok()
}

/// Like [`init`], but writes through the test harness so output is captured per test
pub fn init_for_tests() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{TARGET}=debug")));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
