//! Per-tenant branding and capability data.
//!
//! The three original front ends forked the whole lifecycle per carrier;
//! here the lifecycle is one core and the tenants are configuration. The
//! profile carries only data the front end needs to brand and gate itself;
//! no rendering concern enters the reducers.

use crate::types::Company;

/// Brand colors of a tenant front end.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ColorTheme {
    /// Primary accent color as a CSS hex string.
    pub primary_hex: &'static str,
}

/// Which optional screens a tenant ships.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeatureFlags {
    /// The map-based route browser.
    pub route_map: bool,
    /// The ticket-cancellation screen.
    pub ticket_cancellation: bool,
}

/// Branding and capability record of one tenant.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TenantProfile {
    /// The carrier this tenant fronts.
    pub company: Company,
    /// Display label of the carrier.
    pub company_label: &'static str,
    /// Brand colors.
    pub theme: ColorTheme,
    /// Shipped screens.
    pub features: FeatureFlags,
}

impl TenantProfile {
    /// The Giro tenant: cart-centric, no route map.
    #[must_use]
    pub const fn giro() -> Self {
        Self {
            company: Company::Giro,
            company_label: "Giro Linhas Aéreas",
            theme: ColorTheme {
                primary_hex: "#5ad733",
            },
            features: FeatureFlags {
                route_map: false,
                ticket_cancellation: true,
            },
        }
    }

    /// The Boreal tenant: map-centric, ships no cancellation screen.
    #[must_use]
    pub const fn boreal() -> Self {
        Self {
            company: Company::Boreal,
            company_label: "Boreal Linhas Aéreas",
            theme: ColorTheme {
                primary_hex: "#3675e2",
            },
            features: FeatureFlags {
                route_map: true,
                ticket_cancellation: false,
            },
        }
    }

    /// The Rumos tenant: full feature set.
    #[must_use]
    pub const fn rumos() -> Self {
        Self {
            company: Company::Rumos,
            company_label: "Rumos Linhas Aéreas",
            theme: ColorTheme {
                primary_hex: "#bd1616",
            },
            features: FeatureFlags {
                route_map: true,
                ticket_cancellation: true,
            },
        }
    }

    /// The profile for a carrier.
    #[must_use]
    pub const fn for_company(company: Company) -> Self {
        match company {
            Company::Giro => Self::giro(),
            Company::Boreal => Self::boreal(),
            Company::Rumos => Self::rumos(),
        }
    }
}
