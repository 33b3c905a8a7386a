//! Injected dependencies shared by every booking reducer.

use crate::api::BookingApi;
use crate::tenant::TenantProfile;
use std::sync::Arc;
use voa_core::environment::Clock;

/// Environment dependencies for the booking reducers.
///
/// All components reduce the same `SessionState` with the same action
/// enum, so they share one environment: the remote API collaborator, a
/// clock for hold timestamps, and the active tenant's profile.
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Remote marketplace API.
    pub api: Arc<dyn BookingApi>,
    /// Clock for generating timestamps.
    pub clock: Arc<dyn Clock>,
    /// Branding and capability record of the active tenant.
    pub tenant: TenantProfile,
}

impl BookingEnvironment {
    /// Creates a new `BookingEnvironment`.
    #[must_use]
    pub fn new(api: Arc<dyn BookingApi>, clock: Arc<dyn Clock>, tenant: TenantProfile) -> Self {
        Self { api, clock, tenant }
    }
}

impl std::fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("tenant", &self.tenant)
            .finish_non_exhaustive()
    }
}
