//! Shared test doubles for the unit tests in this crate.

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use secrecy::SecretString;

use limsctl_client::{
    Diagnostic, Endpoint, EndpointError, QueryParameters, QueryRecord,
};

use crate::capability::CapabilitySet;
use crate::surface::{ExportChooser, Surface};

pub(crate) fn password() -> SecretString {
    SecretString::from("hunter2")
}

// ── Scripted endpoint ───────────────────────────────────────────────

/// Endpoint whose per-operation outcomes are scripted up front and
/// whose call order is observable afterwards.
pub(crate) struct ScriptedEndpoint {
    fail: HashSet<&'static str>,
    silent: HashSet<&'static str>,
    sensor: bool,
    records: Vec<QueryRecord>,
    calls: Rc<RefCell<Vec<&'static str>>>,
}

impl ScriptedEndpoint {
    pub(crate) fn new() -> Self {
        Self {
            fail: HashSet::new(),
            silent: HashSet::new(),
            sensor: false,
            records: Vec::new(),
            calls: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// Script `operation` to fail with a diagnostic.
    pub(crate) fn failing(mut self, operation: &'static str) -> Self {
        self.fail.insert(operation);
        self
    }

    /// Script `operation` to fail with no diagnostic at all.
    pub(crate) fn failing_silently(mut self, operation: &'static str) -> Self {
        self.silent.insert(operation);
        self
    }

    pub(crate) fn with_records(mut self, records: Vec<QueryRecord>) -> Self {
        self.records = records;
        self
    }

    /// Shared handle onto the call log.
    pub(crate) fn calls(&self) -> Rc<RefCell<Vec<&'static str>>> {
        Rc::clone(&self.calls)
    }

    fn invoke(&mut self, operation: &'static str) -> Result<(), EndpointError> {
        self.calls.borrow_mut().push(operation);
        if self.silent.contains(operation) {
            return Err(EndpointError::Silent);
        }
        if self.fail.contains(operation) {
            return Err(EndpointError::Refused(Diagnostic::new(
                "scripted failure",
                format!("{operation} was scripted to fail."),
            )));
        }
        Ok(())
    }
}

impl Endpoint for ScriptedEndpoint {
    fn load_library(&mut self) -> Result<(), EndpointError> {
        self.invoke("load_library")
    }

    fn unload_library(&mut self) -> Result<(), EndpointError> {
        self.invoke("unload_library")
    }

    fn connect(
        &mut self,
        _hostname: &str,
        _username: &str,
        _password: &SecretString,
    ) -> Result<(), EndpointError> {
        self.invoke("connect")
    }

    fn disconnect(&mut self) -> Result<(), EndpointError> {
        self.invoke("disconnect")
    }

    fn reserve_instrument(&mut self) -> Result<(), EndpointError> {
        self.invoke("reserve_instrument")
    }

    fn unreserve_instrument(&mut self) -> Result<(), EndpointError> {
        self.invoke("unreserve_instrument")
    }

    fn open_door(&mut self) -> Result<(), EndpointError> {
        self.invoke("open_door")
    }

    fn close_door(&mut self) -> Result<(), EndpointError> {
        self.invoke("close_door")
    }

    fn abort_experiment(&mut self) -> Result<(), EndpointError> {
        self.invoke("abort_experiment")
    }

    fn container_barcode(&mut self) -> Result<String, EndpointError> {
        self.invoke("container_barcode")?;
        Ok("CNT-TEST".into())
    }

    fn sensor(&mut self) -> Result<bool, EndpointError> {
        self.invoke("sensor")?;
        Ok(self.sensor)
    }

    fn set_sensor(&mut self, value: bool) -> Result<(), EndpointError> {
        self.invoke("set_sensor")?;
        self.sensor = value;
        Ok(())
    }

    fn status(&mut self) -> Result<String, EndpointError> {
        self.invoke("status")?;
        Ok("status-ok".into())
    }

    fn experiment_status(&mut self, name: &str) -> Result<String, EndpointError> {
        self.invoke("experiment_status")?;
        Ok(format!("status of {name}"))
    }

    fn experiment_summary(&mut self, name: &str) -> Result<String, EndpointError> {
        self.invoke("experiment_summary")?;
        Ok(format!("summary of {name}"))
    }

    fn execute_query(
        &mut self,
        _params: &QueryParameters,
    ) -> Result<Vec<QueryRecord>, EndpointError> {
        self.invoke("execute_query")?;
        Ok(self.records.clone())
    }

    fn export_experiment(
        &mut self,
        _name: &str,
        _destination: &Path,
    ) -> Result<(), EndpointError> {
        self.invoke("export_experiment")
    }
}

// ── Recording surface ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SurfaceEvent {
    Replace(String),
    Append(String),
    Capabilities(CapabilitySet),
}

/// Surface that records everything pushed at it.
pub(crate) struct RecordingSurface {
    events: Rc<RefCell<Vec<SurfaceEvent>>>,
}

impl RecordingSurface {
    pub(crate) fn new() -> (Self, Rc<RefCell<Vec<SurfaceEvent>>>) {
        let events = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                events: Rc::clone(&events),
            },
            events,
        )
    }
}

impl Surface for RecordingSurface {
    fn replace(&mut self, text: &str) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Replace(text.into()));
    }

    fn append(&mut self, text: &str) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Append(text.into()));
    }

    fn capabilities(&mut self, capabilities: &CapabilitySet) {
        self.events
            .borrow_mut()
            .push(SurfaceEvent::Capabilities(capabilities.clone()));
    }
}

// ── Scripted export chooser ─────────────────────────────────────────

/// Chooser whose answer is scripted and whose received `initial` values
/// are observable.
pub(crate) struct ScriptedChooser {
    next: Rc<RefCell<Option<PathBuf>>>,
    initials: Rc<RefCell<Vec<Option<PathBuf>>>>,
}

impl ScriptedChooser {
    pub(crate) fn new(
        next: Option<PathBuf>,
    ) -> (Self, Rc<RefCell<Option<PathBuf>>>, Rc<RefCell<Vec<Option<PathBuf>>>>) {
        let next = Rc::new(RefCell::new(next));
        let initials = Rc::new(RefCell::new(Vec::new()));
        (
            Self {
                next: Rc::clone(&next),
                initials: Rc::clone(&initials),
            },
            next,
            initials,
        )
    }
}

impl ExportChooser for ScriptedChooser {
    fn choose(&mut self, initial: Option<&Path>) -> Option<PathBuf> {
        self.initials
            .borrow_mut()
            .push(initial.map(Path::to_path_buf));
        self.next.borrow().clone()
    }
}
