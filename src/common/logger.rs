//! Structured logging with visual formatting.
//!
//! This module provides the logging macros used throughout brightr. Output is
//! structured with Unicode box drawing characters: a version header opens the
//! log, `log_block_start!` begins each conceptual block, and `log_decorated!` /
//! `log_indented!` continue it. Semantic macros (`log_warning!`, `log_error!`,
//! `log_info!`, `log_debug!`) carry a colored `[LEVEL]` prefix.
//!
//! Logging can be disabled at runtime for quiet operation during tests.

use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

static LOGGING_ENABLED: AtomicBool = AtomicBool::new(true);

/// Main logging interface.
///
/// Conventions: start a new conceptual block (settings loaded, cycle result,
/// backend detected) with `log_block_start!`; continue it with
/// `log_decorated!` or `log_indented!`; insert `log_pipe!` for vertical
/// spacing before a `log_warning!` or `log_error!` that opens its own block.
pub struct Log;

impl Log {
    /// Enable or disable logging temporarily.
    pub fn set_enabled(enabled: bool) {
        LOGGING_ENABLED.store(enabled, Ordering::SeqCst);
    }

    /// Check if logging is currently enabled.
    pub fn is_enabled() -> bool {
        LOGGING_ENABLED.load(Ordering::SeqCst)
    }
}

// Public function that routes output (needed by macros)
pub fn write_output(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

// # Logging Macros

/// Log the application version header.
#[macro_export]
macro_rules! log_version {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let version = env!("CARGO_PKG_VERSION");
            $crate::common::logger::write_output(&format!("┏ brightr v{version} ━━╸\n"));
        }
    }};
}

/// Log the final termination marker.
#[macro_export]
macro_rules! log_end {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            $crate::common::logger::write_output("╹\n");
        }
    }};
}

/// Log a visual pipe separator for vertical spacing.
#[macro_export]
macro_rules! log_pipe {
    () => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            $crate::common::logger::write_output("┃\n");
        }
    }};
}

/// Log a block start message, initiating a new conceptual block of information.
#[macro_export]
macro_rules! log_block_start {
    ($($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::common::logger::write_output(&format!("┃\n┣ {message}\n"));
        }
    }};
}

/// Log a decorated message, typically as part of an existing block.
#[macro_export]
macro_rules! log_decorated {
    ($($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::common::logger::write_output(&format!("┣ {message}\n"));
        }
    }};
}

/// Log an indented message for sub-items or details within a block.
#[macro_export]
macro_rules! log_indented {
    ($($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::common::logger::write_output(&format!("┃   {message}\n"));
        }
    }};
}

/// Log a warning message with pipe prefix and yellow-colored text.
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::common::logger::write_output(&format!(
                "┣[\x1b[33mWARNING\x1b[0m] {message}\n"
            ));
        }
    }};
}

/// Log an error message with pipe prefix and red-colored text.
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::common::logger::write_output(&format!("┣[\x1b[31mERROR\x1b[0m] {message}\n"));
        }
    }};
}

/// Log an informational message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::common::logger::write_output(&format!("┣[\x1b[32mINFO\x1b[0m] {message}\n"));
        }
    }};
}

/// Log a debug/operational message with pipe prefix and green-colored text.
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {{
        use $crate::common::logger::Log;
        if Log::is_enabled() {
            let message = format!($($arg)*);
            $crate::common::logger::write_output(&format!("┣[\x1b[32mDEBUG\x1b[0m] {message}\n"));
        }
    }};
}
