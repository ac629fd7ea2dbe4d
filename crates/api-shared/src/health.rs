use crate::dto::HealthRes;

/// Simple health service used by the REST API and the CLI `check` command
///
/// Reports liveness of the proxy process only; it does not contact the design-file service.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "figproxy is alive".into(),
        }
    }
}
