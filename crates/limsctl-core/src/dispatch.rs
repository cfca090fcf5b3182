// ── Command dispatch ──
//
// Uniform execution wrapper: every user action follows the same
// three-step protocol. (a) invoke the session operation, (b) on success
// emit the fixed success message plus any formatted payload, on failure
// emit the last diagnostic, (c) unconditionally re-project capabilities
// and push them to the surface.
//
// Expected failures never escape: the worst outcome of any single
// command is a failure message in the log and an unchanged (or
// collapsed) session state.

use std::path::PathBuf;

use tracing::debug;

use limsctl_client::{QueryParameters, QueryRecord};

use crate::capability::{CapabilitySet, project};
use crate::command::Command;
use crate::error::CoreError;
use crate::session::Session;
use crate::surface::{ExportChooser, Surface};

/// Routes typed commands through the session and keeps the attached
/// surface synchronized.
///
/// The surface is optional: detached (headless) dispatch still executes
/// commands, it just has nowhere to show the result. The export chooser
/// is consulted before the session for export commands; the last chosen
/// path is remembered for the process lifetime.
pub struct Dispatcher {
    session: Session,
    surface: Option<Box<dyn Surface>>,
    chooser: Box<dyn ExportChooser>,
    last_export_path: Option<PathBuf>,
}

impl Dispatcher {
    pub fn new(session: Session, chooser: Box<dyn ExportChooser>) -> Self {
        Self {
            session,
            surface: None,
            chooser,
            last_export_path: None,
        }
    }

    /// Attach a presentation surface and push the initial projection.
    pub fn attach(&mut self, surface: Box<dyn Surface>) {
        self.surface = Some(surface);
        self.resync();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The capability set for the current session state.
    pub fn capabilities(&self) -> CapabilitySet {
        project(self.session.state())
    }

    /// Execute one command to completion, protocol steps (a)–(c).
    pub fn dispatch(&mut self, command: Command) {
        debug!(?command, "dispatching command");
        match command {
            Command::AcquireLibrary => {
                let result = self.session.load_library();
                self.finish(result, "Automation library loaded.");
            }
            Command::ReleaseLibrary => self.release_library(),
            Command::Login(request) => {
                let result = self.session.connect(
                    &request.hostname,
                    &request.username,
                    &request.password,
                );
                self.finish(result, "Logged in.");
            }
            Command::Logout => self.logout(),
            Command::Reserve => {
                let result = self.session.reserve();
                self.finish(result, "Instrument reserved.");
            }
            Command::Unreserve => {
                let result = self.session.unreserve();
                self.finish(result, "Instrument released.");
            }
            Command::OpenDoor => {
                let result = self.session.open_door();
                self.finish(result, "Door opened.");
            }
            Command::CloseDoor => {
                let result = self.session.close_door();
                self.finish(result, "Door closed.");
            }
            Command::AbortRun => {
                let result = self.session.abort_experiment();
                self.finish(result, "Experiment aborted.");
            }
            Command::InstrumentStatus => self.instrument_status(),
            Command::ContainerBarcode => self.container_barcode(),
            Command::ReadSensor => self.read_sensor(),
            Command::ToggleSensor => self.toggle_sensor(),
            Command::ExperimentStatus { name } => self.experiment_status(&name),
            Command::ExperimentSummary { name } => self.experiment_summary(&name),
            Command::ExportExperiment { name } => self.export_experiment(&name),
            Command::ExecuteQuery(params) => self.execute_query(&params),
        }
    }

    // ── Command handlers ─────────────────────────────────────────────

    fn release_library(&mut self) {
        // Teardown is unconditional from the caller's point of view.
        let _ = self.session.unload_library();
        self.replace("Automation library released.");
        self.resync();
    }

    fn logout(&mut self) {
        // Quiet on failure, but capabilities resynchronize either way.
        if self.session.disconnect().is_ok() {
            self.replace("Logged out.");
        }
        self.resync();
    }

    fn instrument_status(&mut self) {
        let result = self.session.status();
        match result {
            Ok(status) => self.replace(&format!("Status message: {status}")),
            Err(_) => self.report_failure(Some("Failed to obtain status message.")),
        }
        self.resync();
    }

    fn container_barcode(&mut self) {
        let result = self.session.container_barcode();
        match result {
            Ok(barcode) => self.replace(&format!("Container barcode: {barcode}")),
            Err(_) => self.report_failure(Some("Failed to obtain container barcode.")),
        }
        self.resync();
    }

    fn read_sensor(&mut self) {
        let result = self.session.read_sensor();
        match result {
            Ok(value) => self.replace(&format!(
                "Container sensor: {}",
                if value { "ON" } else { "OFF" }
            )),
            Err(_) => self.report_failure(Some("Failed to obtain sensor value.")),
        }
        self.resync();
    }

    /// Compound: read the sensor, then set its negation. A failed read
    /// aborts before the set — there is no value to negate.
    fn toggle_sensor(&mut self) {
        match self.session.read_sensor() {
            Ok(value) => match self.session.set_sensor(!value) {
                Ok(()) => self.replace("Container sensor value toggled."),
                Err(_) => {
                    self.report_failure(Some("Failed to set new container sensor value."));
                }
            },
            Err(_) => self.report_failure(Some("Failed to read container sensor value.")),
        }
        self.resync();
    }

    fn experiment_status(&mut self, name: &str) {
        let result = self.session.experiment_status(name);
        match result {
            Ok(status) => {
                self.replace("Experiment status:");
                self.append(&status);
            }
            Err(_) => self.report_failure(None),
        }
        self.resync();
    }

    fn experiment_summary(&mut self, name: &str) {
        let result = self.session.experiment_summary(name);
        match result {
            Ok(summary) => {
                self.replace("Experiment summary:");
                self.append(&summary);
            }
            Err(_) => self.report_failure(None),
        }
        self.resync();
    }

    fn execute_query(&mut self, params: &QueryParameters) {
        let result = self.session.execute_query(params);
        match result {
            Ok(records) => {
                self.replace(&format!("Query returned {} records.", records.len()));
                for record in &records {
                    self.append(&format_record(record));
                }
            }
            Err(_) => self.report_failure(None),
        }
        self.resync();
    }

    fn export_experiment(&mut self, name: &str) {
        let initial = self.last_export_path.clone();
        let Some(destination) = self.chooser.choose(initial.as_deref()) else {
            // Cancelled: nothing was invoked, nothing to resynchronize.
            self.replace("Export cancelled.");
            return;
        };
        self.last_export_path = Some(destination.clone());

        let result = self.session.export_experiment(name, &destination);
        match result {
            Ok(()) => {
                self.replace(&format!("Experiment exported to {}.", destination.display()));
            }
            Err(_) => self.report_failure(None),
        }
        self.resync();
    }

    // ── Protocol helpers ─────────────────────────────────────────────

    /// Steps (b) and (c) for operations with a fixed success message.
    fn finish(&mut self, result: Result<(), CoreError>, success: &str) {
        match result {
            Ok(()) => self.replace(success),
            Err(_) => self.report_failure(None),
        }
        self.resync();
    }

    /// Emit the last diagnostic — `message` then `user_message`,
    /// newline-joined, empty string if there is none — optionally under
    /// a contextual failure line.
    fn report_failure(&mut self, context: Option<&str>) {
        let text = self
            .session
            .last_diagnostic()
            .map(|d| d.display_text())
            .unwrap_or_default();
        match context {
            Some(line) => {
                self.replace(line);
                self.append(&text);
            }
            None => self.replace(&text),
        }
    }

    fn replace(&mut self, text: &str) {
        if let Some(surface) = self.surface.as_deref_mut() {
            surface.replace(text);
        }
    }

    fn append(&mut self, text: &str) {
        if let Some(surface) = self.surface.as_deref_mut() {
            surface.append(text);
        }
    }

    /// Step (c): full recomputation, never an incremental patch.
    fn resync(&mut self) {
        let capabilities = project(self.session.state());
        if let Some(surface) = self.surface.as_deref_mut() {
            surface.capabilities(&capabilities);
        }
    }
}

fn format_record(record: &QueryRecord) -> String {
    format!(
        "  {} / {} / {} / {} / {}",
        record.name,
        record.path,
        record.object_type,
        record.created.format("%Y-%m-%d %H:%M:%S"),
        record.modified.format("%Y-%m-%d %H:%M:%S"),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::capability::Capability;
    use crate::command::LoginRequest;
    use crate::session::SessionState;
    use crate::testing::{
        RecordingSurface, ScriptedChooser, ScriptedEndpoint, SurfaceEvent, password,
    };
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;

    fn login_request() -> Command {
        Command::Login(LoginRequest {
            hostname: "lims.lab".into(),
            username: "kchen".into(),
            password: password(),
        })
    }

    fn record(name: &str) -> QueryRecord {
        QueryRecord {
            name: name.into(),
            path: format!("/experiments/{name}"),
            object_type: "Assay".into(),
            created: Utc.with_ymd_and_hms(2024, 5, 12, 11, 15, 0).unwrap(),
            modified: Utc.with_ymd_and_hms(2024, 5, 12, 19, 45, 0).unwrap(),
        }
    }

    /// Dispatcher over a scripted endpoint, surface attached, with the
    /// attach-time projection already drained from the event log.
    fn attached(endpoint: ScriptedEndpoint) -> (Dispatcher, std::rc::Rc<std::cell::RefCell<Vec<SurfaceEvent>>>) {
        let (chooser, _, _) = ScriptedChooser::new(None);
        let mut dispatcher = Dispatcher::new(Session::new(Box::new(endpoint)), Box::new(chooser));
        let (surface, events) = RecordingSurface::new();
        dispatcher.attach(Box::new(surface));
        events.borrow_mut().clear();
        (dispatcher, events)
    }

    #[test]
    fn attach_pushes_the_initial_projection() {
        let (chooser, _, _) = ScriptedChooser::new(None);
        let mut dispatcher = Dispatcher::new(
            Session::new(Box::new(ScriptedEndpoint::new())),
            Box::new(chooser),
        );
        let (surface, events) = RecordingSurface::new();
        dispatcher.attach(Box::new(surface));

        assert_eq!(
            *events.borrow(),
            vec![SurfaceEvent::Capabilities(project(SessionState::Idle))]
        );
    }

    #[test]
    fn success_emits_message_then_resyncs() {
        let (mut dispatcher, events) = attached(ScriptedEndpoint::new());
        dispatcher.dispatch(Command::AcquireLibrary);

        assert_eq!(
            *events.borrow(),
            vec![
                SurfaceEvent::Replace("Automation library loaded.".into()),
                SurfaceEvent::Capabilities(project(SessionState::Loaded)),
            ]
        );
    }

    #[test]
    fn failure_emits_diagnostic_then_resyncs() {
        let (mut dispatcher, events) =
            attached(ScriptedEndpoint::new().failing("load_library"));
        dispatcher.dispatch(Command::AcquireLibrary);

        assert_eq!(
            *events.borrow(),
            vec![
                SurfaceEvent::Replace(
                    "scripted failure\nload_library was scripted to fail.".into()
                ),
                SurfaceEvent::Capabilities(project(SessionState::Idle)),
            ]
        );
    }

    #[test]
    fn silent_failure_emits_empty_string() {
        let (mut dispatcher, events) =
            attached(ScriptedEndpoint::new().failing_silently("load_library"));
        dispatcher.dispatch(Command::AcquireLibrary);

        assert_eq!(
            events.borrow().first(),
            Some(&SurfaceEvent::Replace(String::new()))
        );
    }

    #[test]
    fn precondition_violation_surfaces_like_any_failure() {
        let (mut dispatcher, events) = attached(ScriptedEndpoint::new());
        dispatcher.dispatch(Command::Reserve);

        assert_eq!(
            events.borrow().first(),
            Some(&SurfaceEvent::Replace(
                "Cannot reserve\nThis operation requires an authenticated connection.".into()
            ))
        );
    }

    #[test]
    fn logout_is_quiet_on_failure_but_still_resyncs() {
        let endpoint = ScriptedEndpoint::new().failing("disconnect");
        let (mut dispatcher, events) = attached(endpoint);
        dispatcher.dispatch(Command::AcquireLibrary);
        dispatcher.dispatch(login_request());
        events.borrow_mut().clear();

        dispatcher.dispatch(Command::Logout);
        assert_eq!(
            *events.borrow(),
            vec![SurfaceEvent::Capabilities(project(SessionState::Connected))]
        );
    }

    #[test]
    fn toggle_sensor_read_failure_never_sets() {
        let endpoint = ScriptedEndpoint::new().failing("sensor");
        let calls = endpoint.calls();
        let (mut dispatcher, events) = attached(endpoint);
        dispatcher.dispatch(Command::AcquireLibrary);
        dispatcher.dispatch(login_request());
        dispatcher.dispatch(Command::Reserve);
        events.borrow_mut().clear();

        dispatcher.dispatch(Command::ToggleSensor);

        assert!(!calls.borrow().contains(&"set_sensor"));
        assert_eq!(
            *events.borrow(),
            vec![
                SurfaceEvent::Replace("Failed to read container sensor value.".into()),
                SurfaceEvent::Append("scripted failure\nsensor was scripted to fail.".into()),
                SurfaceEvent::Capabilities(project(SessionState::Reserved)),
            ]
        );
    }

    #[test]
    fn toggle_sensor_sets_the_negated_value() {
        let endpoint = ScriptedEndpoint::new();
        let calls = endpoint.calls();
        let (mut dispatcher, events) = attached(endpoint);
        dispatcher.dispatch(Command::AcquireLibrary);
        dispatcher.dispatch(login_request());
        dispatcher.dispatch(Command::Reserve);
        events.borrow_mut().clear();

        dispatcher.dispatch(Command::ToggleSensor);

        assert_eq!(
            calls.borrow().as_slice().last(),
            Some(&"set_sensor")
        );
        assert_eq!(
            events.borrow().first(),
            Some(&SurfaceEvent::Replace("Container sensor value toggled.".into()))
        );
    }

    #[test]
    fn export_cancelled_short_circuits() {
        let endpoint = ScriptedEndpoint::new();
        let calls = endpoint.calls();
        let (chooser, _, _) = ScriptedChooser::new(None);
        let mut dispatcher =
            Dispatcher::new(Session::new(Box::new(endpoint)), Box::new(chooser));
        let (surface, events) = RecordingSurface::new();
        dispatcher.attach(Box::new(surface));
        dispatcher.dispatch(Command::AcquireLibrary);
        dispatcher.dispatch(login_request());
        let calls_before = calls.borrow().len();
        events.borrow_mut().clear();

        dispatcher.dispatch(Command::ExportExperiment {
            name: "assay-panel-a".into(),
        });

        // The single cancellation message, zero session calls, no resync.
        assert_eq!(
            *events.borrow(),
            vec![SurfaceEvent::Replace("Export cancelled.".into())]
        );
        assert_eq!(calls.borrow().len(), calls_before);
    }

    #[test]
    fn export_remembers_the_chosen_path() {
        let endpoint = ScriptedEndpoint::new();
        let (chooser, next, initials) =
            ScriptedChooser::new(Some(PathBuf::from("/tmp/assay.json")));
        let mut dispatcher =
            Dispatcher::new(Session::new(Box::new(endpoint)), Box::new(chooser));
        dispatcher.dispatch(Command::AcquireLibrary);
        dispatcher.dispatch(login_request());

        dispatcher.dispatch(Command::ExportExperiment {
            name: "assay-panel-a".into(),
        });
        *next.borrow_mut() = Some(PathBuf::from("/tmp/assay-2.json"));
        dispatcher.dispatch(Command::ExportExperiment {
            name: "assay-panel-a".into(),
        });

        assert_eq!(
            *initials.borrow(),
            vec![None, Some(PathBuf::from("/tmp/assay.json"))]
        );
    }

    #[test]
    fn query_emits_summary_then_rows_in_endpoint_order() {
        let endpoint = ScriptedEndpoint::new().with_records(vec![
            record("run-c"),
            record("run-a"),
            record("run-b"),
        ]);
        let (mut dispatcher, events) = attached(endpoint);
        dispatcher.dispatch(Command::AcquireLibrary);
        dispatcher.dispatch(login_request());
        events.borrow_mut().clear();

        dispatcher.dispatch(Command::ExecuteQuery(QueryParameters::default()));

        let events = events.borrow();
        assert_eq!(events.len(), 5);
        assert_eq!(
            events[0],
            SurfaceEvent::Replace("Query returned 3 records.".into())
        );
        assert_eq!(
            events[1],
            SurfaceEvent::Append(
                "  run-c / /experiments/run-c / Assay / 2024-05-12 11:15:00 / 2024-05-12 19:45:00"
                    .into()
            )
        );
        assert!(matches!(&events[2], SurfaceEvent::Append(l) if l.contains("run-a")));
        assert!(matches!(&events[3], SurfaceEvent::Append(l) if l.contains("run-b")));
        assert!(matches!(&events[4], SurfaceEvent::Capabilities(_)));
    }

    #[test]
    fn headless_dispatch_still_executes() {
        let (chooser, _, _) = ScriptedChooser::new(None);
        let mut dispatcher = Dispatcher::new(
            Session::new(Box::new(ScriptedEndpoint::new())),
            Box::new(chooser),
        );

        dispatcher.dispatch(Command::AcquireLibrary);
        assert_eq!(dispatcher.session().state(), SessionState::Loaded);
    }

    #[test]
    fn capabilities_accessor_matches_projection() {
        let (mut dispatcher, _) = attached(ScriptedEndpoint::new());
        dispatcher.dispatch(Command::AcquireLibrary);

        let caps = dispatcher.capabilities();
        assert!(caps.enabled(Capability::ReleaseLibrary));
        assert!(!caps.enabled(Capability::AcquireLibrary));
        assert_eq!(caps, project(dispatcher.session().state()));
    }
}
