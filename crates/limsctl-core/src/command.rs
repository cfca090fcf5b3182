// ── Command API ──
//
// Every user-initiated action arrives as a typed request. Operations
// that need input carry it explicitly — the dispatcher never reads
// presentation state.

use secrecy::SecretString;

use limsctl_client::QueryParameters;

/// Credentials passed through to the endpoint at login.
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub hostname: String,
    pub username: String,
    pub password: SecretString,
}

/// All user-initiated actions against the session.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Library lifecycle ────────────────────────────────────────────
    AcquireLibrary,
    ReleaseLibrary,

    // ── Connection ───────────────────────────────────────────────────
    Login(LoginRequest),
    Logout,

    // ── Reservation ──────────────────────────────────────────────────
    Reserve,
    Unreserve,

    // ── Chamber commands ─────────────────────────────────────────────
    OpenDoor,
    CloseDoor,
    AbortRun,
    InstrumentStatus,
    ContainerBarcode,
    ReadSensor,
    ToggleSensor,

    // ── Experiments & records ────────────────────────────────────────
    ExperimentStatus { name: String },
    ExperimentSummary { name: String },
    ExportExperiment { name: String },
    ExecuteQuery(QueryParameters),
}
