//! HTTP transport for the booking domain.
//!
//! Implements [`voa_booking::BookingApi`] over the marketplace tenants'
//! JSON feed with `reqwest`. Everything tenant-specific about the wire —
//! the `{Data, error, status}` envelope, field-name divergences, the raw
//! `Authorization` credential, server error phrasings — is absorbed here;
//! the domain core sees only canonical types and classified
//! [`voa_booking::ApiError`] values.
//!
//! ```no_run
//! use voa_http::HttpBookingApi;
//!
//! let api = HttpBookingApi::new("http://localhost:9999");
//! // api implements voa_booking::BookingApi; hand it to the environment.
//! ```

pub mod client;
pub mod token;
mod wire;

pub use client::HttpBookingApi;
pub use token::{InMemoryTokenStore, TokenStore};
