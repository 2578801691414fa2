//! Skew detector for the receive path.

use pairlink_core::{classify_receive_failure, clock_skew_diagnostic, ReceiveFailure};
use std::fmt;

use crate::notifier::Notifier;

/// Tell the user to fix their clock if `error` is a clock-skew rejection.
///
/// Inert without a notifier or with an empty error description. Emits at
/// most one diagnostic per call and never touches the error itself; the
/// caller still propagates it. Returns whether a diagnostic was sent.
pub fn notify_if_clock_skew(error: &dyn fmt::Display, notifier: Option<&dyn Notifier>) -> bool {
    let Some(notifier) = notifier else {
        return false;
    };
    let description = error.to_string();
    if description.is_empty() {
        return false;
    }

    match classify_receive_failure(&description) {
        ReceiveFailure::ClockSkew => {
            tracing::warn!(error = %description, "relay rejected request signature, clock out of sync");
            notifier.notify(clock_skew_diagnostic().as_bytes());
            true
        }
        ReceiveFailure::Other => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifier::ChannelNotifier;

    #[test]
    fn matching_error_notifies_once() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        let error = "InvalidSignatureException: Signature expired: 20261018T000000Z";

        assert!(notify_if_clock_skew(&error, Some(&notifier)));

        let message = rx.try_recv().unwrap();
        assert_eq!(message, clock_skew_diagnostic().into_bytes());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn missing_notifier_is_inert() {
        assert!(!notify_if_clock_skew(&"Signature expired", None));
    }

    #[test]
    fn non_matching_error_is_inert() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        assert!(!notify_if_clock_skew(&"throttled", Some(&notifier)));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn empty_error_is_inert() {
        let (notifier, mut rx) = ChannelNotifier::channel();
        assert!(!notify_if_clock_skew(&"", Some(&notifier)));
        assert!(rx.try_recv().is_err());
    }
}
