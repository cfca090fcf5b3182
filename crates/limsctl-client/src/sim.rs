// ── Simulated instrument endpoint ──
//
// In-process stand-in for the vendor automation binding. Enforces the
// same lifecycle the real server does: load before connect, connect
// before reserve, reserve before chamber commands. Illegal calls are
// refused with diagnostics, never panics.

use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use tracing::debug;

use crate::diagnostic::EndpointError;
use crate::endpoint::Endpoint;
use crate::query::{DateFilter, QueryParameters, QueryRecord};

/// One experiment record held by the simulated records server.
#[derive(Debug, Clone, Serialize)]
struct Experiment {
    name: String,
    path: String,
    object_type: String,
    owner: String,
    created: DateTime<Utc>,
    modified: DateTime<Utc>,
    status: String,
    summary: String,
}

/// A complete in-process instrument + records server.
///
/// Tracks its own lifecycle booleans independently of any session that
/// drives it, so a caller that skips the capability gating gets the
/// same refusals a real server would produce.
pub struct SimulatedInstrument {
    loaded: bool,
    connected: bool,
    reserved: bool,
    door_open: bool,
    sensor: bool,
    barcode: String,
    experiments: Vec<Experiment>,
}

impl SimulatedInstrument {
    pub fn new() -> Self {
        Self {
            loaded: false,
            connected: false,
            reserved: false,
            door_open: false,
            sensor: false,
            barcode: "CNT-004217".into(),
            experiments: seed_experiments(),
        }
    }

    // ── Server-side lifecycle guards ─────────────────────────────────

    fn require_loaded(&self) -> Result<(), EndpointError> {
        if self.loaded {
            Ok(())
        } else {
            Err(EndpointError::refused(
                "Automation library not loaded",
                "Acquire the library before using the instrument.",
            ))
        }
    }

    fn require_connected(&self) -> Result<(), EndpointError> {
        if self.connected {
            Ok(())
        } else {
            Err(EndpointError::refused(
                "Not connected",
                "Log in to the instrument server first.",
            ))
        }
    }

    fn require_reserved(&self) -> Result<(), EndpointError> {
        if self.reserved {
            Ok(())
        } else {
            Err(EndpointError::refused(
                "Instrument not reserved",
                "Reserve the instrument before issuing chamber commands.",
            ))
        }
    }

    fn find_experiment(&self, name: &str) -> Result<&Experiment, EndpointError> {
        self.experiments
            .iter()
            .find(|e| e.name == name)
            .ok_or_else(|| {
                EndpointError::refused(
                    format!("Unknown experiment '{name}'"),
                    "Check the experiment name and try again.",
                )
            })
    }
}

impl Default for SimulatedInstrument {
    fn default() -> Self {
        Self::new()
    }
}

impl Endpoint for SimulatedInstrument {
    fn load_library(&mut self) -> Result<(), EndpointError> {
        self.loaded = true;
        Ok(())
    }

    fn unload_library(&mut self) -> Result<(), EndpointError> {
        self.loaded = false;
        self.connected = false;
        self.reserved = false;
        Ok(())
    }

    fn connect(
        &mut self,
        hostname: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<(), EndpointError> {
        self.require_loaded()?;
        if username.is_empty() {
            return Err(EndpointError::refused(
                "Login rejected",
                "A username is required.",
            ));
        }
        if password.expose_secret().is_empty() {
            return Err(EndpointError::refused(
                "Login rejected",
                "A password is required.",
            ));
        }
        debug!(hostname, username, "simulated login accepted");
        self.connected = true;
        Ok(())
    }

    fn disconnect(&mut self) -> Result<(), EndpointError> {
        self.connected = false;
        self.reserved = false;
        Ok(())
    }

    fn reserve_instrument(&mut self) -> Result<(), EndpointError> {
        self.require_connected()?;
        self.reserved = true;
        Ok(())
    }

    fn unreserve_instrument(&mut self) -> Result<(), EndpointError> {
        self.require_connected()?;
        self.reserved = false;
        Ok(())
    }

    fn open_door(&mut self) -> Result<(), EndpointError> {
        self.require_reserved()?;
        if self.door_open {
            return Err(EndpointError::refused(
                "Door is already open",
                "Close the door before opening it again.",
            ));
        }
        self.door_open = true;
        Ok(())
    }

    fn close_door(&mut self) -> Result<(), EndpointError> {
        self.require_reserved()?;
        if !self.door_open {
            return Err(EndpointError::refused(
                "Door is already closed",
                "Open the door before closing it again.",
            ));
        }
        self.door_open = false;
        Ok(())
    }

    fn abort_experiment(&mut self) -> Result<(), EndpointError> {
        self.require_reserved()
    }

    fn container_barcode(&mut self) -> Result<String, EndpointError> {
        self.require_reserved()?;
        Ok(self.barcode.clone())
    }

    fn sensor(&mut self) -> Result<bool, EndpointError> {
        self.require_reserved()?;
        Ok(self.sensor)
    }

    fn set_sensor(&mut self, value: bool) -> Result<(), EndpointError> {
        self.require_reserved()?;
        self.sensor = value;
        Ok(())
    }

    fn status(&mut self) -> Result<String, EndpointError> {
        self.require_reserved()?;
        Ok(format!(
            "Instrument idle; door {}; container sensor {}",
            if self.door_open { "open" } else { "closed" },
            if self.sensor { "ON" } else { "OFF" },
        ))
    }

    fn experiment_status(&mut self, name: &str) -> Result<String, EndpointError> {
        self.require_connected()?;
        Ok(self.find_experiment(name)?.status.clone())
    }

    fn experiment_summary(&mut self, name: &str) -> Result<String, EndpointError> {
        self.require_connected()?;
        Ok(self.find_experiment(name)?.summary.clone())
    }

    fn execute_query(
        &mut self,
        params: &QueryParameters,
    ) -> Result<Vec<QueryRecord>, EndpointError> {
        self.require_connected()?;
        let rows = self
            .experiments
            .iter()
            .filter(|e| {
                matches(&params.name, &e.name)
                    && matches(&params.object_type, &e.object_type)
                    && matches(&params.owner, &e.owner)
                    && in_date_range(params, e)
            })
            .map(|e| QueryRecord {
                name: e.name.clone(),
                path: e.path.clone(),
                object_type: e.object_type.clone(),
                created: e.created,
                modified: e.modified,
            })
            .collect();
        Ok(rows)
    }

    fn export_experiment(
        &mut self,
        name: &str,
        destination: &Path,
    ) -> Result<(), EndpointError> {
        self.require_connected()?;
        let experiment = self.find_experiment(name)?.clone();
        let body = serde_json::to_string_pretty(&experiment).map_err(|e| {
            EndpointError::refused("Export failed", e.to_string())
        })?;
        std::fs::write(destination, body).map_err(|e| {
            EndpointError::refused(
                format!("Export to {} failed", destination.display()),
                e.to_string(),
            )
        })?;
        debug!(name, destination = %destination.display(), "experiment exported");
        Ok(())
    }
}

/// Empty filter matches everything; otherwise case-insensitive substring.
fn matches(filter: &str, value: &str) -> bool {
    filter.is_empty() || value.to_lowercase().contains(&filter.to_lowercase())
}

fn in_date_range(params: &QueryParameters, experiment: &Experiment) -> bool {
    let probe = match params.date_filter {
        DateFilter::All => return true,
        DateFilter::Created => experiment.created,
        DateFilter::Modified => experiment.modified,
    };
    params.date_from <= probe && probe <= params.date_to
}

fn seed_experiments() -> Vec<Experiment> {
    vec![
        Experiment {
            name: "calibration-2024".into(),
            path: "/experiments/calibration-2024".into(),
            object_type: "Calibration".into(),
            owner: "kchen".into(),
            created: ts(2024, 3, 1, 9, 0),
            modified: ts(2024, 3, 4, 16, 30),
            status: "Complete".into(),
            summary: "Quarterly optics calibration; all channels within tolerance.".into(),
        },
        Experiment {
            name: "assay-panel-a".into(),
            path: "/experiments/assay-panel-a".into(),
            object_type: "Assay".into(),
            owner: "mrivera".into(),
            created: ts(2024, 5, 12, 11, 15),
            modified: ts(2024, 5, 12, 19, 45),
            status: "Running".into(),
            summary: "Panel A compound screen, 96-well layout, run 2 of 3.".into(),
        },
        Experiment {
            name: "stability-q3".into(),
            path: "/experiments/stability-q3".into(),
            object_type: "Stability".into(),
            owner: "kchen".into(),
            created: ts(2024, 7, 2, 8, 0),
            modified: ts(2024, 8, 20, 14, 10),
            status: "Scheduled".into(),
            summary: "Q3 accelerated stability series awaiting chamber time.".into(),
        },
    ]
}

fn ts(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .unwrap_or_default()
}
