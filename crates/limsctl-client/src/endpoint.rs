// ── Automation endpoint contract ──

use std::path::Path;

use secrecy::SecretString;

use crate::diagnostic::EndpointError;
use crate::query::{QueryParameters, QueryRecord};

/// The remote automation interface to the instrument and its records
/// system.
///
/// This is the one seam the core drives. Every method is a synchronous
/// round-trip: the call blocks until the endpoint answers, and ordinary
/// operational refusals (not connected, instrument busy, hardware
/// refusal) come back as [`EndpointError`] values — implementations
/// never panic for those.
///
/// Lifecycle legality (load before connect, connect before reserve,
/// reserve before chamber commands) is enforced endpoint-side; callers
/// that bypass the capability gating simply get a refusal.
pub trait Endpoint {
    fn load_library(&mut self) -> Result<(), EndpointError>;
    fn unload_library(&mut self) -> Result<(), EndpointError>;

    fn connect(
        &mut self,
        hostname: &str,
        username: &str,
        password: &SecretString,
    ) -> Result<(), EndpointError>;
    fn disconnect(&mut self) -> Result<(), EndpointError>;

    fn reserve_instrument(&mut self) -> Result<(), EndpointError>;
    fn unreserve_instrument(&mut self) -> Result<(), EndpointError>;

    fn open_door(&mut self) -> Result<(), EndpointError>;
    fn close_door(&mut self) -> Result<(), EndpointError>;
    fn abort_experiment(&mut self) -> Result<(), EndpointError>;

    fn container_barcode(&mut self) -> Result<String, EndpointError>;
    fn sensor(&mut self) -> Result<bool, EndpointError>;
    fn set_sensor(&mut self, value: bool) -> Result<(), EndpointError>;
    fn status(&mut self) -> Result<String, EndpointError>;

    fn experiment_status(&mut self, name: &str) -> Result<String, EndpointError>;
    fn experiment_summary(&mut self, name: &str) -> Result<String, EndpointError>;

    fn execute_query(
        &mut self,
        params: &QueryParameters,
    ) -> Result<Vec<QueryRecord>, EndpointError>;

    fn export_experiment(&mut self, name: &str, destination: &Path)
    -> Result<(), EndpointError>;
}
