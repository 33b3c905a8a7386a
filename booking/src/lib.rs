//! # Voa Booking
//!
//! The booking-session domain: catalog, cart, purchase, ticket ledger and
//! session lifecycle for an airline-ticket marketplace client.
//!
//! All business logic lives in pure reducers over one shared
//! [`SessionState`]; remote calls are described as effects and executed by
//! a store runtime. The remote API is abstracted behind the [`BookingApi`]
//! trait so the same reducers run against HTTP in production and against
//! the deterministic [`StaticApi`] in tests.
//!
//! ## Layout
//!
//! - [`types`] — value types and the four state components
//! - [`actions`] — the single flat action enum
//! - [`error`] — classified remote-failure taxonomy
//! - [`api`] — the remote API trait and its in-memory test double
//! - [`catalog`] — airports and route search
//! - [`cart`] — server-mirrored seat holds
//! - [`purchase`] — hold-to-ticket conversion
//! - [`ledger`] — purchased tickets
//! - [`session`] — login, logout and global auth teardown
//! - [`tenant`] — per-carrier branding and feature flags
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use voa_booking::{booking_reducer, BookingAction, BookingEnvironment, SessionState};
//! use voa_booking::tenant::TenantProfile;
//! use voa_core::SystemClock;
//! use voa_runtime::Store;
//!
//! let env = BookingEnvironment::new(api, Arc::new(SystemClock), TenantProfile::giro());
//! let store = Store::new(SessionState::default(), booking_reducer(), env);
//! store.send(BookingAction::Login {
//!     username: "ana".into(),
//!     password: "secret".into(),
//! })?;
//! ```

pub mod actions;
pub mod api;
pub mod cart;
pub mod catalog;
pub mod environment;
pub mod error;
pub mod ledger;
pub mod purchase;
pub mod session;
pub mod tenant;
pub mod types;

pub use actions::BookingAction;
pub use api::{ApiFuture, ApiOp, BookingApi, StaticApi};
pub use cart::CartReducer;
pub use catalog::CatalogReducer;
pub use environment::BookingEnvironment;
pub use error::ApiError;
pub use ledger::LedgerReducer;
pub use purchase::PurchaseReducer;
pub use session::{BookingReducer, SessionReducer, booking_reducer};
pub use tenant::TenantProfile;
pub use types::{
    Airport, AirportId, AuthToken, CartState, CartView, CatalogState, City, Company, Flight,
    FlightId, Hold, HoldOp, HoldPhase, LedgerState, RequestSeq, RouteEndpoint, SessionPhase,
    SessionState, Ticket, TicketId, UserProfile, WishlistSeed,
};
