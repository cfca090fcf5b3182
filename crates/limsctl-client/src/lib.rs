//! Endpoint seam between the limsctl core and the instrument's remote
//! automation interface.
//!
//! This crate owns the narrow contract the rest of the workspace programs
//! against:
//!
//! - **[`Endpoint`]** — the full automation surface (library load, login,
//!   reservation, chamber commands, record queries, export) as a trait.
//!   The vendor binding lives outside this repository; anything that
//!   implements the trait can drive the core.
//! - **[`Diagnostic`] / [`EndpointError`]** — failures as a human-readable
//!   message/detail pair. Endpoint calls fail with a value, never a panic,
//!   and a failure with no diagnostic attached is a legal outcome.
//! - **Query model** — [`QueryParameters`], [`DateFilter`], [`QueryRecord`]:
//!   the read-only records interface, endpoint ordering preserved.
//! - **[`SimulatedInstrument`]** — an in-process endpoint with the same
//!   lifecycle rules a real instrument server enforces. Used by the
//!   `limsctl` binary and by integration tests.

pub mod diagnostic;
pub mod endpoint;
pub mod query;
pub mod sim;

pub use diagnostic::{Diagnostic, EndpointError};
pub use endpoint::Endpoint;
pub use query::{DateFilter, QueryParameters, QueryRecord};
pub use sim::SimulatedInstrument;
