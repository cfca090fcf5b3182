// ── Capability projection ──
//
// Pure derivation of every enabled/disabled flag from the current
// session state. The match in `allows` is the single authoritative
// derivation: no other code path ever sets a capability, which is what
// keeps the displayed affordances from drifting away from true
// legality.

use std::collections::BTreeMap;

use strum::{Display, EnumIter, IntoEnumIterator};

use crate::session::SessionState;

/// A named operation (or input field group) whose enabled/disabled
/// status is derived from session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumIter)]
#[strum(serialize_all = "kebab-case")]
pub enum Capability {
    AcquireLibrary,
    ReleaseLibrary,
    /// Login action and the credential fields feeding it.
    Login,
    Logout,
    Reserve,
    Unreserve,
    OpenDoor,
    CloseDoor,
    InstrumentStatus,
    ContainerBarcode,
    ReadSensor,
    ToggleSensor,
    /// Projected for the run-start affordance; the endpoint contract
    /// exposes no start operation, only abort.
    StartRun,
    AbortRun,
    QueryFields,
    ClearQuery,
    ExecuteQuery,
    /// Experiment-name input field.
    ExperimentFields,
    ExperimentStatus,
    ExperimentSummary,
    ExportExperiment,
}

/// Full mapping from capability to enabled flag.
///
/// Always recomputed in full via [`project`] — never patched
/// incrementally. The `Default` value has everything disabled, which is
/// what a surface shows before the first projection arrives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    enabled: BTreeMap<Capability, bool>,
}

impl CapabilitySet {
    pub fn enabled(&self, capability: Capability) -> bool {
        self.enabled.get(&capability).copied().unwrap_or(false)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.enabled.iter().map(|(cap, on)| (*cap, *on))
    }
}

/// Project the complete capability set from the current session state.
///
/// Pure and total: depends only on the state passed in, not on history,
/// so re-running it is always safe and always idempotent.
pub fn project(state: SessionState) -> CapabilitySet {
    let enabled = Capability::iter()
        .map(|capability| (capability, allows(state, capability)))
        .collect();
    CapabilitySet { enabled }
}

fn allows(state: SessionState, capability: Capability) -> bool {
    use Capability::{
        AbortRun, AcquireLibrary, ClearQuery, CloseDoor, ContainerBarcode, ExecuteQuery,
        ExperimentFields, ExperimentStatus, ExperimentSummary, ExportExperiment,
        InstrumentStatus, Login, Logout, OpenDoor, QueryFields, ReadSensor, ReleaseLibrary,
        Reserve, StartRun, ToggleSensor, Unreserve,
    };

    match capability {
        AcquireLibrary => !state.library_loaded(),
        ReleaseLibrary | Login => state.library_loaded() && !state.connected(),
        Logout | Reserve | Unreserve | QueryFields | ClearQuery | ExecuteQuery
        | ExperimentFields | ExperimentStatus | ExperimentSummary | ExportExperiment => {
            state.connected()
        }
        OpenDoor | CloseDoor | InstrumentStatus | ContainerBarcode | ReadSensor
        | ToggleSensor | StartRun | AbortRun => state.reserved(),
    }
}
