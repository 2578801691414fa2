//! Clock-skew classification for relay receive failures.
//!
//! The queue backend signs every request with the local clock. When the
//! clock drifts too far it rejects the request, and the only trace of that
//! is the text of the error. Matching on that text is brittle, so it lives
//! behind [`classify_receive_failure`] alone; swap the body if the backend
//! ever exposes a structured error kind.

/// Substring the backend puts in request-signing rejections caused by
/// clock drift.
pub const SIGNATURE_EXPIRED_MARKER: &str = "Signature expired";

const RED: &str = "\x1b[0;31m";
const YELLOW: &str = "\x1b[0;33m";
const RESET: &str = "\x1b[0m";

/// What a failed receive call was caused by, as far as we can tell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReceiveFailure {
    /// The backend rejected the request signature because the local clock
    /// is out of sync.
    ClockSkew,
    /// Anything else.
    Other,
}

/// Classify a receive failure from the backend's error description.
pub fn classify_receive_failure(description: &str) -> ReceiveFailure {
    if description.contains(SIGNATURE_EXPIRED_MARKER) {
        ReceiveFailure::ClockSkew
    } else {
        ReceiveFailure::Other
    }
}

/// Command that resynchronizes the system clock on this platform.
pub fn ntp_update_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "sudo sntp -sS time.apple.com"
    } else {
        "sudo ntpdate pool.ntp.org"
    }
}

/// The terminal-ready diagnostic shown when clock skew is detected.
pub fn clock_skew_diagnostic() -> String {
    format!(
        "{RED}pairlink ▶ Your system time is out of sync! pairlink will not work until you have synchronized your system time. Please run {RESET}{YELLOW}{cmd}{RESET}{RED} and try again.{RESET}\r\n",
        cmd = ntp_update_command(),
    )
}
