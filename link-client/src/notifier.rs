//! User-facing diagnostic sink.

use tokio::sync::mpsc;

/// Fire-and-forget delivery of a human-readable message to the local user.
///
/// Supplied by the caller. Passing no notifier is valid and suppresses the
/// diagnostic only, never the error it accompanies.
pub trait Notifier: Send + Sync {
    /// Deliver `message` to the user.
    fn notify(&self, message: &[u8]);
}

/// Notifier that forwards messages into an unbounded channel.
///
/// Useful when diagnostics are rendered somewhere else (a UI task, a
/// socket to an attached terminal) and in tests.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelNotifier {
    /// Create a notifier and the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Notifier for ChannelNotifier {
    fn notify(&self, message: &[u8]) {
        if self.tx.send(message.to_vec()).is_err() {
            tracing::debug!("notifier receiver dropped, discarding diagnostic");
        }
    }
}
