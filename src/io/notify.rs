//! User notification sink.
//!
//! The engine reports soft failures (location unavailable, brightness apply
//! failed) through this trait. They fire only for user-initiated cycles;
//! unattended periodic cycles stay quiet apart from the log.

/// Receives human-readable warnings for surfacing to the user.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationSink: Send {
    fn warn(&self, message: &str);
}

/// Default sink that routes warnings into the structured log.
pub struct LogNotifier;

impl NotificationSink for LogNotifier {
    fn warn(&self, message: &str) {
        log_pipe!();
        log_warning!("{message}");
    }
}
