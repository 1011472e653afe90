//! Recoverable collaborator faults and the boundary that captures them.
//!
//! Displayer callbacks, listeners and action handlers are foreign code. A
//! failure in any of them (returned error or panic) becomes a
//! [`DisplayFault`] that the controller shows in an error frame; the session
//! keeps running.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use thiserror::Error;

use crate::source::ListenerId;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DisplayFault {
    #[error("summary render failed: {0}")]
    Summary(String),

    #[error("match failed for keyword {keyword:?}: {reason}")]
    Match { keyword: String, reason: String },

    #[error("detail view {view:?} failed: {reason}")]
    Detail { view: String, reason: String },

    #[error("action {key:?} failed: {reason}")]
    Action { key: String, reason: String },

    #[error("{listener} failed: {reason}")]
    Listener { listener: ListenerId, reason: String },
}

impl DisplayFault {
    /// Short label for error frame titles.
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::Summary(_) => "Summary error",
            Self::Match { .. } => "Filter error",
            Self::Detail { .. } => "Detail error",
            Self::Action { .. } => "Action error",
            Self::Listener { .. } => "Listener error",
        }
    }
}

/// Run a collaborator callback, turning a panic into an `Err` carrying the
/// panic message.
pub fn contain<T, F>(call: F) -> Result<T, String>
where
    F: FnOnce() -> Result<T, String>,
{
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(result) => result,
        Err(payload) => Err(format!("panicked: {}", panic_payload_message(payload))),
    }
}

pub(crate) fn panic_payload_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(message) => normalize_message(*message),
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(message) => normalize_message((*message).to_owned()),
            Err(_) => "unknown panic payload".to_owned(),
        },
    }
}

fn normalize_message(message: String) -> String {
    let trimmed = message.trim();
    if trimmed.is_empty() {
        "unknown panic payload".to_owned()
    } else {
        trimmed.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contain_passes_results_through() {
        assert_eq!(contain(|| Ok::<_, String>(3)), Ok(3));
        assert_eq!(
            contain(|| Err::<u8, _>("bad".to_owned())),
            Err("bad".to_owned())
        );
    }

    #[test]
    fn contain_captures_str_panic() {
        let result: Result<(), String> = contain(|| panic!("boom"));
        assert_eq!(result, Err("panicked: boom".to_owned()));
    }

    #[test]
    fn contain_captures_formatted_panic() {
        let n = 7;
        let result: Result<(), String> = contain(|| panic!("bad index {n}"));
        assert_eq!(result, Err("panicked: bad index 7".to_owned()));
    }

    #[test]
    fn blank_payload_is_normalized() {
        assert_eq!(
            panic_payload_message(Box::new("   ".to_owned())),
            "unknown panic payload"
        );
        assert_eq!(panic_payload_message(Box::new(5u8)), "unknown panic payload");
    }

    #[test]
    fn fault_messages() {
        let fault = DisplayFault::Action {
            key: "a".into(),
            reason: "nope".into(),
        };
        assert_eq!(fault.to_string(), "action \"a\" failed: nope");
        assert_eq!(fault.title(), "Action error");
        let fault = DisplayFault::Summary("bad message".into());
        assert_eq!(fault.to_string(), "summary render failed: bad message");
    }
}
