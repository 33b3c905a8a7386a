//! Domain types for the booking session.
//!
//! The session tracks one authenticated user's view of the marketplace:
//! the airport/flight catalog, the cart of held seats, and the purchased
//! tickets. Holds carry the per-flight serialization machinery (phase,
//! removal flag, one-deep operation queue) that keeps local state
//! consistent with the remote API under unordered responses.

use crate::error::ApiError;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use voa_core::{DateTime, Utc};

// ═══════════════════════════════════════════════════════════════════════
// Identifiers
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a flight.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct FlightId(u64);

impl FlightId {
    /// Creates a `FlightId` from its numeric value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for FlightId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a purchased ticket.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct TicketId(u64);

impl TicketId {
    /// Creates a `TicketId` from its numeric value.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for TicketId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for an airport.
///
/// The remote feed carries a single airport name which serves as both
/// identifier and display name, so the identifier is that name verbatim.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AirportId(String);

impl AirportId {
    /// Creates an `AirportId` from a feed name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for AirportId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Catalog value types
// ═══════════════════════════════════════════════════════════════════════

/// Operating carrier of a flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Company {
    /// Giro Linhas Aéreas.
    Giro,
    /// Boreal Linhas Aéreas.
    Boreal,
    /// Rumos Linhas Aéreas.
    Rumos,
}

impl Company {
    /// Carrier used when the feed names an unknown company or omits it.
    #[must_use]
    pub const fn fallback() -> Self {
        Self::Rumos
    }

    /// Returns the display label.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Giro => "Giro",
            Self::Boreal => "Boreal",
            Self::Rumos => "Rumos",
        }
    }

    /// Parses a carrier from a feed string, case-insensitively.
    ///
    /// Unknown names map to [`Company::fallback`] rather than failing;
    /// the feed is not authoritative about its own carrier labels.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_lowercase().as_str() {
            "giro" => Self::Giro,
            "boreal" => Self::Boreal,
            "rumos" => Self::Rumos,
            _ => Self::fallback(),
        }
    }
}

impl std::fmt::Display for Company {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Geographic city record attached to an airport.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct City {
    /// City name.
    pub name: String,
    /// State or region abbreviation.
    pub state: String,
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

/// An airport as exposed by the catalog.
///
/// Immutable once fetched; the airport list is replaced wholesale on each
/// load, never patched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Canonical identifier (the feed name).
    pub id: AirportId,
    /// Display name.
    pub name: String,
    /// City the airport serves.
    pub city: City,
}

impl Airport {
    /// Builds the canonical airport record from a feed name and city.
    ///
    /// The single feed name becomes both identifier and display name;
    /// every internal consumer sees only this canonical shape.
    pub fn canonical(name: impl Into<String>, city: City) -> Self {
        let name = name.into();
        Self {
            id: AirportId::new(name.clone()),
            name,
            city,
        }
    }
}

/// A sellable flight between two airports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    /// Flight identifier.
    pub id: FlightId,
    /// Operating carrier.
    pub company: Company,
    /// Price in whole currency units.
    pub price: u64,
    /// Remaining seat count. Advisory for client-side filtering only;
    /// the authoritative check happens server-side at purchase time.
    pub seats: u32,
    /// Departure airport.
    pub origin: Airport,
    /// Arrival airport.
    pub destination: Airport,
}

impl Flight {
    /// Whether this flight may appear in a sellable view.
    #[must_use]
    pub const fn is_sellable(&self) -> bool {
        self.seats > 0
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Ticket value types
// ═══════════════════════════════════════════════════════════════════════

/// One end of a purchased route.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteEndpoint {
    /// City name.
    pub city: String,
    /// State or region abbreviation.
    pub state: String,
}

/// A confirmed purchase record.
///
/// Created only by a successful purchase, destroyed only by explicit
/// cancellation. The ticket feed omits the carrier on some tenants; a
/// missing carrier maps to [`Company::fallback`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: TicketId,
    /// Departure city and state.
    pub origin: RouteEndpoint,
    /// Arrival city and state.
    pub destination: RouteEndpoint,
    /// Operating carrier.
    pub company: Company,
}

// ═══════════════════════════════════════════════════════════════════════
// Session value types
// ═══════════════════════════════════════════════════════════════════════

/// Profile of the authenticated user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Display name.
    pub name: String,
}

/// Opaque credential returned by login.
///
/// The domain treats the token as session identity only; attaching it to
/// outgoing requests is the transport implementation's concern.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthToken(String);

impl AuthToken {
    /// Wraps a raw token string.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Returns the raw token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Request sequencing
// ═══════════════════════════════════════════════════════════════════════

/// Monotonically increasing tag for full-replace load requests.
///
/// Every response to a catalog, ticket or wishlist load carries the
/// sequence value of the request that produced it; a response whose value
/// no longer matches the latest issued one is stale and must be discarded
/// (last-request-wins, not first-response-wins).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestSeq(u64);

impl RequestSeq {
    /// Returns the numeric value.
    #[must_use]
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Advances to the next sequence value and returns it.
    pub fn advance(&mut self) -> Self {
        self.0 += 1;
        *self
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Holds (cart entries)
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle phase of a hold. The phase machine only moves forward:
/// Pending → ConfirmedRemote → Purchasing → (removed on success), with
/// Failed reachable from Pending or Purchasing and re-entrant via retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldPhase {
    /// The "add to wishlist" round-trip is in flight.
    Pending,
    /// The server has acknowledged the hold.
    ConfirmedRemote,
    /// The "buy ticket" round-trip is in flight.
    Purchasing,
    /// The last remote operation on this hold failed; the user may retry
    /// or remove it.
    Failed,
}

/// Kind of operation that can run against a single hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HoldOp {
    /// Create the remote hold (add to wishlist).
    Add,
    /// Delete the remote hold (remove from wishlist).
    Remove,
    /// Convert the hold into a ticket (buy).
    Purchase,
}

/// A client-tracked, server-mirrored seat reservation prior to purchase.
///
/// At most one hold exists per flight per session. While a remote
/// round-trip is in flight the hold is *busy*: a second command of the
/// same kind attaches to the in-flight one, a command of a different kind
/// parks in the one-deep queue, and a third concurrent command is
/// rejected. Operations on one flight's hold are thereby serialized,
/// never raced.
#[derive(Clone, Debug, PartialEq)]
pub struct Hold {
    /// Flight this hold reserves.
    pub flight_id: FlightId,
    /// Client-generated insertion position, for stable display order.
    pub position: u64,
    /// Current lifecycle phase.
    pub phase: HoldPhase,
    /// A removal round-trip is in flight. Removal is a flag rather than a
    /// phase because the phase machine only moves forward.
    pub removing: bool,
    /// Parked operation awaiting completion of the in-flight one.
    pub queued: Option<HoldOp>,
    /// When the hold was created locally.
    pub created_at: DateTime<Utc>,
}

impl Hold {
    /// Creates a hold in the given phase with empty queue machinery.
    #[must_use]
    pub const fn new(
        flight_id: FlightId,
        position: u64,
        phase: HoldPhase,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            flight_id,
            position,
            phase,
            removing: false,
            queued: None,
            created_at,
        }
    }

    /// The operation currently in flight against this hold, if any.
    #[must_use]
    pub const fn in_flight_op(&self) -> Option<HoldOp> {
        match self.phase {
            HoldPhase::Pending => Some(HoldOp::Add),
            HoldPhase::Purchasing => Some(HoldOp::Purchase),
            HoldPhase::ConfirmedRemote | HoldPhase::Failed => {
                if self.removing {
                    Some(HoldOp::Remove)
                } else {
                    None
                }
            }
        }
    }

    /// Whether a remote round-trip is in flight for this hold.
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.in_flight_op().is_some()
    }

    /// Whether the hold counts towards the displayed cart badge.
    #[must_use]
    pub const fn is_displayed(&self) -> bool {
        matches!(
            self.phase,
            HoldPhase::Pending | HoldPhase::ConfirmedRemote | HoldPhase::Failed
        )
    }

    /// Parks `op` in the one-deep queue.
    ///
    /// Parking the same kind again attaches to the already-queued
    /// operation and is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Conflict`] when a different operation is
    /// already queued; the slot holds exactly one entry.
    pub fn park(&mut self, op: HoldOp) -> Result<(), ApiError> {
        match self.queued {
            None => {
                self.queued = Some(op);
                Ok(())
            }
            Some(existing) if existing == op => Ok(()),
            Some(_) => Err(ApiError::conflict(format!(
                "another operation is already queued for flight {}",
                self.flight_id
            ))),
        }
    }

    /// Takes the parked operation, leaving the queue empty.
    pub const fn take_queued(&mut self) -> Option<HoldOp> {
        self.queued.take()
    }
}

/// A hold joined with the last known snapshot of its flight, for display.
///
/// The snapshot may be absent when the flight was never part of a search
/// result or hydration response; the hold is still listed with
/// identifier-only data, never silently dropped.
#[derive(Clone, Debug, PartialEq)]
pub struct CartView {
    /// The hold itself.
    pub hold: Hold,
    /// Last known flight details, if any.
    pub flight: Option<Flight>,
}

// ═══════════════════════════════════════════════════════════════════════
// Catalog state
// ═══════════════════════════════════════════════════════════════════════

/// Cached view of airports and route search results.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogState {
    /// Current airport list, replaced wholesale on each load.
    pub airports: Vec<Airport>,
    /// Flights of the most recent route search, already filtered to
    /// sellable ones. Replaced wholesale; retained on search failure.
    pub search_results: Vec<Flight>,
    /// Last known snapshot of every flight seen in any search result or
    /// hydration response. Snapshots accumulate and are only ever
    /// overwritten by newer data for the same flight.
    pub flights_by_id: HashMap<FlightId, Flight>,
    airports_seq: RequestSeq,
    search_seq: RequestSeq,
}

impl CatalogState {
    /// Starts a new airport load, invalidating responses to earlier ones.
    pub fn begin_airports_load(&mut self) -> RequestSeq {
        self.airports_seq.advance()
    }

    /// Whether an airport response with this tag is still current.
    #[must_use]
    pub fn is_current_airports(&self, seq: RequestSeq) -> bool {
        self.airports_seq == seq
    }

    /// Starts a new route search, invalidating responses to earlier ones.
    pub fn begin_search(&mut self) -> RequestSeq {
        self.search_seq.advance()
    }

    /// Whether a search response with this tag is still current.
    #[must_use]
    pub fn is_current_search(&self, seq: RequestSeq) -> bool {
        self.search_seq == seq
    }

    /// Invalidates any in-flight search without touching current results.
    pub fn invalidate_search(&mut self) {
        self.search_seq.advance();
    }

    /// Merges flight snapshots into the by-id map.
    pub fn record_flights<I>(&mut self, flights: I)
    where
        I: IntoIterator<Item = Flight>,
    {
        for flight in flights {
            self.flights_by_id.insert(flight.id, flight);
        }
    }

    /// Last known snapshot for a flight.
    #[must_use]
    pub fn flight(&self, id: FlightId) -> Option<&Flight> {
        self.flights_by_id.get(&id)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Cart state
// ═══════════════════════════════════════════════════════════════════════

/// Result of rebuilding the hold set from the server-side wishlist.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WishlistSeed {
    /// Flights newly held because the server listed them.
    pub added: Vec<FlightId>,
    /// Local holds dropped because the server no longer lists them.
    pub dropped: Vec<FlightId>,
}

/// The set of held seats, keyed by flight.
///
/// Fields are private so every mutation goes through methods that uphold
/// the cart invariants: one hold per flight, insertion-order positions,
/// and a badge count derived from the set rather than counted alongside
/// it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CartState {
    holds: HashMap<FlightId, Hold>,
    next_position: u64,
    wishlist_seq: RequestSeq,
    leaked: HashSet<FlightId>,
}

impl CartState {
    /// Number of holds the cart badge shows.
    ///
    /// Always derived from the hold set; holds mid-purchase are excluded
    /// so a bought seat disappears from the badge the moment the purchase
    /// is issued.
    #[must_use]
    pub fn displayed_count(&self) -> usize {
        self.holds.values().filter(|h| h.is_displayed()).count()
    }

    /// Total number of holds, including busy ones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.holds.len()
    }

    /// Whether the cart holds nothing at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.holds.is_empty()
    }

    /// The hold for a flight, if any.
    #[must_use]
    pub fn hold(&self, flight_id: FlightId) -> Option<&Hold> {
        self.holds.get(&flight_id)
    }

    /// Mutable access to the hold for a flight, if any.
    pub fn hold_mut(&mut self, flight_id: FlightId) -> Option<&mut Hold> {
        self.holds.get_mut(&flight_id)
    }

    /// Holds in insertion order.
    #[must_use]
    pub fn holds_in_order(&self) -> Vec<&Hold> {
        let mut holds: Vec<&Hold> = self.holds.values().collect();
        holds.sort_by_key(|h| h.position);
        holds
    }

    /// Flight identifiers of all holds, in insertion order.
    #[must_use]
    pub fn flight_ids(&self) -> Vec<FlightId> {
        self.holds_in_order().iter().map(|h| h.flight_id).collect()
    }

    /// Inserts a hold in [`HoldPhase::Pending`], or returns the existing
    /// hold unchanged. Creating a second hold for an already-held flight
    /// is a no-op.
    pub fn insert_pending(&mut self, flight_id: FlightId, created_at: DateTime<Utc>) -> &Hold {
        self.insert_with_phase(flight_id, HoldPhase::Pending, created_at)
    }

    /// Inserts a hold already acknowledged by the server, or returns the
    /// existing hold unchanged. Used when seeding from the wishlist feed.
    pub fn insert_confirmed(&mut self, flight_id: FlightId, created_at: DateTime<Utc>) -> &Hold {
        self.insert_with_phase(flight_id, HoldPhase::ConfirmedRemote, created_at)
    }

    fn insert_with_phase(
        &mut self,
        flight_id: FlightId,
        phase: HoldPhase,
        created_at: DateTime<Utc>,
    ) -> &Hold {
        let next_position = &mut self.next_position;
        self.holds.entry(flight_id).or_insert_with(|| {
            let position = *next_position;
            *next_position += 1;
            Hold::new(flight_id, position, phase, created_at)
        })
    }

    /// Deletes the hold for a flight, returning it (queue machinery
    /// included) so the caller can dispatch any parked operation.
    pub fn remove(&mut self, flight_id: FlightId) -> Option<Hold> {
        self.holds.remove(&flight_id)
    }

    /// Starts a new wishlist load, invalidating responses to earlier ones.
    pub fn begin_wishlist_load(&mut self) -> RequestSeq {
        self.wishlist_seq.advance()
    }

    /// Whether a wishlist response with this tag is still current.
    #[must_use]
    pub fn is_current_wishlist(&self, seq: RequestSeq) -> bool {
        self.wishlist_seq == seq
    }

    /// Rebuilds the hold set from the server-side wishlist.
    ///
    /// Server-listed flights not held locally become confirmed holds in
    /// server order; flights already held are left untouched; local holds
    /// absent from the server feed are dropped unless busy (their
    /// in-flight operation will reconcile them on completion).
    pub fn seed_from_server(
        &mut self,
        server_order: &[FlightId],
        now: DateTime<Utc>,
    ) -> WishlistSeed {
        let server: HashSet<FlightId> = server_order.iter().copied().collect();

        let mut dropped = Vec::new();
        self.holds.retain(|id, hold| {
            let keep = server.contains(id) || hold.is_busy();
            if !keep {
                dropped.push(*id);
            }
            keep
        });
        dropped.sort_unstable();

        let mut added = Vec::new();
        for &id in server_order {
            if !self.holds.contains_key(&id) {
                self.insert_with_phase(id, HoldPhase::ConfirmedRemote, now);
                added.push(id);
            }
        }

        WishlistSeed { added, dropped }
    }

    /// Records a remote hold that outlived its purchase because the
    /// best-effort cleanup failed.
    pub fn mark_leaked(&mut self, flight_id: FlightId) {
        self.leaked.insert(flight_id);
    }

    /// Whether a flight is recorded as a leaked remote hold.
    #[must_use]
    pub fn is_leaked(&self, flight_id: FlightId) -> bool {
        self.leaked.contains(&flight_id)
    }

    /// Takes the leaked-hold set, leaving it empty.
    ///
    /// Leaked ids are retried exactly once at the next wishlist load and
    /// forgotten regardless of outcome.
    pub fn take_leaked(&mut self) -> HashSet<FlightId> {
        std::mem::take(&mut self.leaked)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Ledger state
// ═══════════════════════════════════════════════════════════════════════

/// The purchased-tickets view.
///
/// Server-authoritative: always re-fetched at session start and reloaded
/// after a successful purchase.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LedgerState {
    /// Current ticket list, replaced wholesale on each load.
    pub tickets: Vec<Ticket>,
    tickets_seq: RequestSeq,
}

impl LedgerState {
    /// Number of tickets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    /// Whether the ledger holds no tickets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }

    /// The ticket with this identifier, if present.
    #[must_use]
    pub fn ticket(&self, id: TicketId) -> Option<&Ticket> {
        self.tickets.iter().find(|t| t.id == id)
    }

    /// Whether a ticket with this identifier is present.
    #[must_use]
    pub fn contains(&self, id: TicketId) -> bool {
        self.ticket(id).is_some()
    }

    /// Removes the ticket with this identifier, returning it.
    pub fn remove(&mut self, id: TicketId) -> Option<Ticket> {
        let index = self.tickets.iter().position(|t| t.id == id)?;
        Some(self.tickets.remove(index))
    }

    /// Starts a new ticket load, invalidating responses to earlier ones.
    pub fn begin_tickets_load(&mut self) -> RequestSeq {
        self.tickets_seq.advance()
    }

    /// Whether a ticket response with this tag is still current.
    #[must_use]
    pub fn is_current_tickets(&self, seq: RequestSeq) -> bool {
        self.tickets_seq == seq
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Session state
// ═══════════════════════════════════════════════════════════════════════

/// Authentication phase of the session.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum SessionPhase {
    /// No credential; all in-memory state is discarded on entry.
    #[default]
    LoggedOut,
    /// The login round-trip is in flight.
    LoggingIn,
    /// Authenticated session.
    Active {
        /// Credential returned by login.
        token: AuthToken,
        /// Profile of the authenticated user, filled by a follow-up load.
        user: Option<UserProfile>,
    },
}

/// Process-wide state of one user's booking session.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SessionState {
    /// Authentication phase.
    pub phase: SessionPhase,
    /// Airport and flight catalog.
    pub catalog: CatalogState,
    /// Held seats.
    pub cart: CartState,
    /// Purchased tickets.
    pub ledger: LedgerState,
    /// Most recent surfaced failure, for display.
    pub last_error: Option<ApiError>,
}

impl SessionState {
    /// Whether the session is authenticated.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.phase, SessionPhase::Active { .. })
    }

    /// The session credential, when authenticated.
    #[must_use]
    pub const fn token(&self) -> Option<&AuthToken> {
        match &self.phase {
            SessionPhase::Active { token, .. } => Some(token),
            SessionPhase::LoggedOut | SessionPhase::LoggingIn => None,
        }
    }

    /// The authenticated user's profile, once loaded.
    #[must_use]
    pub const fn user(&self) -> Option<&UserProfile> {
        match &self.phase {
            SessionPhase::Active {
                user: Some(user), ..
            } => Some(user),
            _ => None,
        }
    }

    /// Holds in insertion order, each joined with the last known flight
    /// snapshot for display.
    #[must_use]
    pub fn cart_views(&self) -> Vec<CartView> {
        self.cart
            .holds_in_order()
            .into_iter()
            .map(|hold| CartView {
                flight: self.catalog.flight(hold.flight_id).cloned(),
                hold: hold.clone(),
            })
            .collect()
    }

    /// Discards all in-memory state, optionally recording the failure
    /// that forced the teardown. Tickets are not lost: the ledger is
    /// server-authoritative and re-fetched at the next session start.
    pub fn teardown(&mut self, error: Option<ApiError>) {
        *self = Self {
            last_error: error,
            ..Self::default()
        };
    }
}
