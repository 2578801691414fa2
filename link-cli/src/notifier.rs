//! Terminal diagnostics.

use pairlink_client::Notifier;
use std::io::Write;

/// Writes diagnostics straight to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &[u8]) {
        let mut stderr = std::io::stderr().lock();
        // Nowhere left to report a failing stderr.
        let _ = stderr.write_all(message);
        let _ = stderr.flush();
    }
}
