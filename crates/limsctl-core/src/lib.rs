//! Session/capability core for the limsctl instrument front-end.
//!
//! This crate owns the one piece of real engineering in the workspace:
//! the rules that decide, at every moment, which operations are legal,
//! and the protocol that keeps the presentation surface honest about it.
//!
//! - **[`Session`]** — single source of truth for lifecycle state. The
//!   state is an explicit chain ([`SessionState`]:
//!   `Idle → Loaded → Connected → Reserved`) that collapses downward on
//!   teardown, so the cascade rules (unload clears connection and
//!   reservation, disconnect clears reservation) are structural rather
//!   than ad hoc. Every endpoint call routes through it so state and the
//!   last [`Diagnostic`](limsctl_client::Diagnostic) stay consistent.
//!
//! - **[`Dispatcher`]** — uniform execution wrapper: invoke the session
//!   operation, emit a success message or the last diagnostic, then
//!   unconditionally re-project capabilities. Expected failures never
//!   escape it.
//!
//! - **[`project`]** — pure function from [`SessionState`] to
//!   [`CapabilitySet`]; the single authoritative derivation of every
//!   enabled/disabled flag. Nothing toggles a capability incrementally.
//!
//! - **[`Surface`] / [`ExportChooser`]** — the seams to the external
//!   presentation layer and file-destination picker.

pub mod capability;
pub mod command;
pub mod dispatch;
pub mod error;
pub mod session;
pub mod surface;

#[cfg(test)]
mod testing;

pub use capability::{Capability, CapabilitySet, project};
pub use command::{Command, LoginRequest};
pub use dispatch::Dispatcher;
pub use error::CoreError;
pub use session::{Session, SessionState};
pub use surface::{ExportChooser, Surface};
