//! User-facing notifications.
//!
//! The store and the commands report outcomes through a `Notifier` rather
//! than printing directly, so tests can capture the messages.

/// Fire-and-forget sink for user-facing messages.
pub trait Notifier {
    fn notify(&self, message: &str);
}

/// Prints notifications to stdout, one per line.
#[derive(Debug, Default)]
pub struct Toast;

impl Notifier for Toast {
    fn notify(&self, message: &str) {
        println!("{}", message);
    }
}
