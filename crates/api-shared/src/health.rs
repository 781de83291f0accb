use crate::messages::HealthRes;

/// Simple health service shared by the REST API and the CLI.
///
/// Provides a standardised way to check that the Dority service is up.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Check health without creating an instance.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Dority is alive".into(),
        }
    }
}
