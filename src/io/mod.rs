// Process-facing infrastructure: signal handling and user notifications
pub mod notify;
pub mod signals;
