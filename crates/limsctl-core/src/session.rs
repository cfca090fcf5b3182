// ── Session lifecycle state machine ──
//
// Single source of truth for lifecycle state. All endpoint calls route
// through here so the state and the last diagnostic stay consistent.

use std::path::Path;

use secrecy::SecretString;
use tracing::{debug, warn};

use limsctl_client::{Diagnostic, Endpoint, EndpointError, QueryParameters, QueryRecord};

use crate::error::CoreError;

/// Where the session sits on the lifecycle chain.
///
/// The chain is strictly ordered: `Idle < Loaded < Connected < Reserved`.
/// The three lifecycle booleans of the original front-end are derived
/// views of the position, which makes the invariants
/// `connected ⇒ libraryLoaded` and `reserved ⇒ connected` structural —
/// no state outside the chain is representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SessionState {
    /// Nothing acquired yet.
    Idle,
    /// Automation library loaded.
    Loaded,
    /// Authenticated against the instrument server.
    Connected,
    /// Instrument reserved for this session.
    Reserved,
}

impl SessionState {
    pub fn library_loaded(self) -> bool {
        self >= Self::Loaded
    }

    pub fn connected(self) -> bool {
        self >= Self::Connected
    }

    pub fn reserved(self) -> bool {
        self == Self::Reserved
    }
}

/// Lifecycle state plus the last diagnostic, guarding one endpoint.
///
/// Created at [`SessionState::Idle`] and alive for the process lifetime.
/// Not safe for concurrent mutation — owned by exactly one execution
/// context at a time; one operation runs to completion (endpoint
/// round-trip included) before the next starts.
pub struct Session {
    endpoint: Box<dyn Endpoint>,
    state: SessionState,
    last_diagnostic: Option<Diagnostic>,
}

impl Session {
    pub fn new(endpoint: Box<dyn Endpoint>) -> Self {
        Self {
            endpoint,
            state: SessionState::Idle,
            last_diagnostic: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// The diagnostic from the most recent endpoint call, if any.
    /// Overwritten on every call: cleared on success, set on failure.
    /// Absent after a failure is a valid state — nothing to show.
    pub fn last_diagnostic(&self) -> Option<&Diagnostic> {
        self.last_diagnostic.as_ref()
    }

    // ── Lifecycle transitions ────────────────────────────────────────

    /// Load the automation library. Calling when already loaded is
    /// endpoint-defined, not special-cased here.
    pub fn load_library(&mut self) -> Result<(), CoreError> {
        self.call("load library", |ep| ep.load_library())?;
        if self.state < SessionState::Loaded {
            self.state = SessionState::Loaded;
        }
        Ok(())
    }

    /// Release the automation library. Unconditional: the state
    /// collapses to [`SessionState::Idle`] even if the endpoint call
    /// failed, because releasing the library invalidates everything
    /// built on top of it.
    pub fn unload_library(&mut self) -> Result<(), CoreError> {
        let result = self.call("unload library", |ep| ep.unload_library());
        self.state = SessionState::Idle;
        result
    }

    pub fn connect(
        &mut self,
        hostname: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<(), CoreError> {
        self.require("connect", SessionState::Loaded, "a loaded automation library")?;
        self.call("connect", |ep| ep.connect(hostname, username, password))?;
        if self.state < SessionState::Connected {
            self.state = SessionState::Connected;
        }
        Ok(())
    }

    /// Disconnect. Losing the session invalidates any reservation, so
    /// success collapses the state back to [`SessionState::Loaded`].
    pub fn disconnect(&mut self) -> Result<(), CoreError> {
        self.call("disconnect", |ep| ep.disconnect())?;
        if self.state > SessionState::Loaded {
            self.state = SessionState::Loaded;
        }
        Ok(())
    }

    pub fn reserve(&mut self) -> Result<(), CoreError> {
        self.require("reserve", SessionState::Connected, "an authenticated connection")?;
        self.call("reserve", |ep| ep.reserve_instrument())?;
        self.state = SessionState::Reserved;
        Ok(())
    }

    pub fn unreserve(&mut self) -> Result<(), CoreError> {
        self.require("unreserve", SessionState::Connected, "an authenticated connection")?;
        self.call("unreserve", |ep| ep.unreserve_instrument())?;
        self.state = SessionState::Connected;
        Ok(())
    }

    // ── Pass-through commands ────────────────────────────────────────
    //
    // No session-side precondition and no state change: legality is the
    // capability projection's job, and the endpoint refuses illegal
    // calls when the gating is bypassed.

    pub fn open_door(&mut self) -> Result<(), CoreError> {
        self.call("open door", |ep| ep.open_door())
    }

    pub fn close_door(&mut self) -> Result<(), CoreError> {
        self.call("close door", |ep| ep.close_door())
    }

    pub fn abort_experiment(&mut self) -> Result<(), CoreError> {
        self.call("abort experiment", |ep| ep.abort_experiment())
    }

    pub fn container_barcode(&mut self) -> Result<String, CoreError> {
        self.call("read container barcode", |ep| ep.container_barcode())
    }

    pub fn read_sensor(&mut self) -> Result<bool, CoreError> {
        self.call("read sensor", |ep| ep.sensor())
    }

    pub fn set_sensor(&mut self, value: bool) -> Result<(), CoreError> {
        self.call("set sensor", |ep| ep.set_sensor(value))
    }

    pub fn status(&mut self) -> Result<String, CoreError> {
        self.call("read status", |ep| ep.status())
    }

    pub fn experiment_status(&mut self, name: &str) -> Result<String, CoreError> {
        self.call("read experiment status", |ep| ep.experiment_status(name))
    }

    pub fn experiment_summary(&mut self, name: &str) -> Result<String, CoreError> {
        self.call("read experiment summary", |ep| ep.experiment_summary(name))
    }

    /// Run a records query. Row order is whatever the endpoint returned.
    pub fn execute_query(
        &mut self,
        params: &QueryParameters,
    ) -> Result<Vec<QueryRecord>, CoreError> {
        self.call("execute query", |ep| ep.execute_query(params))
    }

    pub fn export_experiment(
        &mut self,
        name: &str,
        destination: &Path,
    ) -> Result<(), CoreError> {
        self.call("export experiment", |ep| ep.export_experiment(name, destination))
    }

    // ── Private helpers ──────────────────────────────────────────────

    /// Route one endpoint call, keeping `last_diagnostic` in sync.
    fn call<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut dyn Endpoint) -> Result<T, EndpointError>,
    ) -> Result<T, CoreError> {
        match f(self.endpoint.as_mut()) {
            Ok(value) => {
                self.last_diagnostic = None;
                Ok(value)
            }
            Err(source) => {
                debug!(operation, error = %source, "endpoint call failed");
                self.last_diagnostic = source.diagnostic().cloned();
                Err(CoreError::Endpoint { operation, source })
            }
        }
    }

    /// Guard a state-changing operation. A violation stores a synthetic
    /// diagnostic so the display protocol surfaces it exactly like an
    /// expected failure.
    fn require(
        &mut self,
        operation: &'static str,
        floor: SessionState,
        required: &'static str,
    ) -> Result<(), CoreError> {
        if self.state >= floor {
            return Ok(());
        }
        warn!(operation, state = ?self.state, "operation invoked below its lifecycle floor");
        self.last_diagnostic = Some(Diagnostic::new(
            format!("Cannot {operation}"),
            format!("This operation requires {required}."),
        ));
        Err(CoreError::Precondition { operation, required })
    }
}
