// ── Core error types ──
//
// Two kinds only, and neither is fatal: expected endpoint failures and
// precondition violations. Both end as a message on the attached
// surface; nothing propagates past the dispatcher boundary.

use thiserror::Error;

use limsctl_client::EndpointError;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The endpoint reported an ordinary operational failure (not
    /// connected, instrument busy, hardware refusal).
    #[error("{operation} failed")]
    Endpoint {
        operation: &'static str,
        #[source]
        source: EndpointError,
    },

    /// An operation ran while its lifecycle precondition was false.
    /// Unreachable when the presentation honors the capability
    /// projection, but never a crash when it doesn't.
    #[error("{operation} requires {required}")]
    Precondition {
        operation: &'static str,
        required: &'static str,
    },
}
