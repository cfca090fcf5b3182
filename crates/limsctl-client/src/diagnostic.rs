// ── Endpoint diagnostics ──
//
// The automation interface reports failures as a message/detail pair
// rather than structured error codes. The pair travels inside the error
// value; callers that want to show it later keep their own copy.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Human-readable message/detail pair from a failing endpoint call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Short operator-facing message.
    pub message: String,
    /// Longer detail aimed at the person at the console.
    pub user_message: String,
}

impl Diagnostic {
    pub fn new(message: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_message: user_message.into(),
        }
    }

    /// Display form: `message`, then `user_message`, newline-joined,
    /// skipping whichever parts are empty.
    pub fn display_text(&self) -> String {
        match (self.message.is_empty(), self.user_message.is_empty()) {
            (false, false) => format!("{}\n{}", self.message, self.user_message),
            (false, true) => self.message.clone(),
            (true, false) => self.user_message.clone(),
            (true, true) => String::new(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Failure of a single endpoint call.
///
/// `Refused` is the ordinary operational case: the instrument or records
/// server rejected the call and said why. `Silent` covers the endpoint
/// failing with nothing to show — a valid state, not a defect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndpointError {
    #[error("{0}")]
    Refused(Diagnostic),

    #[error("endpoint call failed without a diagnostic")]
    Silent,
}

impl EndpointError {
    /// Convenience constructor for the common rejection case.
    pub fn refused(message: impl Into<String>, user_message: impl Into<String>) -> Self {
        Self::Refused(Diagnostic::new(message, user_message))
    }

    /// The attached diagnostic, if the endpoint produced one.
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Refused(diagnostic) => Some(diagnostic),
            Self::Silent => None,
        }
    }
}
