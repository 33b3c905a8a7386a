//! Remote collaborator boundary.
//!
//! [`BookingApi`] is the domain's view of the marketplace server: twelve
//! operations, canonical types in and out, failures already classified
//! into [`ApiError`]. The HTTP implementation lives in the transport
//! crate; [`StaticApi`] here implements the same trait over in-memory
//! tables for tests and demos.

use crate::error::ApiError;
use crate::types::{
    Airport, AuthToken, Flight, FlightId, RouteEndpoint, Ticket, TicketId, UserProfile,
};
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Boxed future returned by every [`BookingApi`] operation.
pub type ApiFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, ApiError>> + Send + 'a>>;

/// The remote booking API as the domain consumes it.
///
/// # Dyn Compatibility
///
/// This trait uses explicit `Pin<Box<dyn Future>>` returns instead of
/// `async fn` to enable trait object usage (`Arc<dyn BookingApi>`). This
/// is required for the effect system, where reducers build effects that
/// capture the collaborator and resolve to feedback actions.
///
/// # Credentials
///
/// Implementations attach the session credential themselves; only
/// [`login`](Self::login) deals in credentials explicitly. The domain
/// keeps the returned token as session identity and never threads it
/// through individual calls.
pub trait BookingApi: Send + Sync {
    /// Authenticates and returns the session credential.
    ///
    /// # Errors
    ///
    /// [`ApiError::Auth`] for unknown accounts or wrong passwords,
    /// [`ApiError::Conflict`] when the account is already logged in
    /// elsewhere, [`ApiError::Transport`] when the server is unreachable.
    fn login(&self, username: String, password: String) -> ApiFuture<'_, AuthToken>;

    /// Invalidates the session credential server-side.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`]; callers treat logout as best-effort.
    fn logout(&self) -> ApiFuture<'_, ()>;

    /// Fetches the authenticated user's profile.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    fn current_user(&self) -> ApiFuture<'_, UserProfile>;

    /// Fetches the full airport list.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    fn airports(&self) -> ApiFuture<'_, Vec<Airport>>;

    /// Searches flights between two cities.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] for unknown city names, plus the usual
    /// transport and auth failures.
    fn search_routes(&self, origin: String, destination: String) -> ApiFuture<'_, Vec<Flight>>;

    /// Fetches full flight records for a set of identifiers.
    ///
    /// # Errors
    ///
    /// [`ApiError::Validation`] when any identifier is unknown.
    fn flights_by_id(&self, ids: Vec<FlightId>) -> ApiFuture<'_, Vec<Flight>>;

    /// Fetches the server-side hold list, in server order.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    fn wishlist(&self) -> ApiFuture<'_, Vec<FlightId>>;

    /// Creates a server-side hold for a flight.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] for unknown flights, plus transport and
    /// auth failures.
    fn add_to_wishlist(&self, flight_id: FlightId) -> ApiFuture<'_, ()>;

    /// Deletes the server-side hold for a flight.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the hold is already gone; callers
    /// treat that as the desired end state.
    fn remove_from_wishlist(&self, flight_id: FlightId) -> ApiFuture<'_, ()>;

    /// Buys a ticket for a flight. The ticket record is not returned;
    /// the ledger is re-fetched to observe it.
    ///
    /// # Errors
    ///
    /// [`ApiError::Conflict`] when no seats remain at purchase time,
    /// [`ApiError::NotFound`] for unknown flights.
    fn buy_ticket(&self, flight_id: FlightId) -> ApiFuture<'_, ()>;

    /// Fetches the purchased-tickets list.
    ///
    /// # Errors
    ///
    /// Any [`ApiError`].
    fn tickets(&self) -> ApiFuture<'_, Vec<Ticket>>;

    /// Cancels a purchased ticket.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the ticket no longer exists
    /// server-side.
    fn cancel_ticket(&self, ticket_id: TicketId) -> ApiFuture<'_, ()>;
}

/// One remote operation, for call counting and failure scripting on
/// [`StaticApi`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApiOp {
    /// `login`
    Login,
    /// `logout`
    Logout,
    /// `current_user`
    CurrentUser,
    /// `airports`
    Airports,
    /// `search_routes`
    SearchRoutes,
    /// `flights_by_id`
    FlightsById,
    /// `wishlist`
    Wishlist,
    /// `add_to_wishlist`
    AddToWishlist,
    /// `remove_from_wishlist`
    RemoveFromWishlist,
    /// `buy_ticket`
    BuyTicket,
    /// `tickets`
    Tickets,
    /// `cancel_ticket`
    CancelTicket,
}

impl ApiOp {
    const COUNT: usize = 12;

    const fn index(self) -> usize {
        self as usize
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Deterministic in-memory [`BookingApi`] for tests and demos.
///
/// Behaves like a tiny marketplace server: seats decrement on purchase,
/// the wishlist and ticket tables mutate like their remote counterparts,
/// and error strings mirror the real server's phrasing. Every call is
/// counted per operation, and any operation's next call can be scripted
/// to fail, which makes partial-failure paths reproducible.
pub struct StaticApi {
    credentials: Option<(String, String)>,
    user_name: String,
    airports: Vec<Airport>,
    flights: Mutex<HashMap<FlightId, Flight>>,
    wishlist: Mutex<Vec<FlightId>>,
    tickets: Mutex<Vec<Ticket>>,
    next_ticket_id: AtomicU64,
    calls: [AtomicUsize; ApiOp::COUNT],
    fail_next: Mutex<HashMap<ApiOp, ApiError>>,
}

impl StaticApi {
    /// Creates an empty API accepting any credentials.
    #[must_use]
    pub fn new() -> Self {
        Self {
            credentials: None,
            user_name: "Demo User".to_string(),
            airports: Vec::new(),
            flights: Mutex::new(HashMap::new()),
            wishlist: Mutex::new(Vec::new()),
            tickets: Mutex::new(Vec::new()),
            next_ticket_id: AtomicU64::new(1),
            calls: std::array::from_fn(|_| AtomicUsize::new(0)),
            fail_next: Mutex::new(HashMap::new()),
        }
    }

    /// Requires these exact credentials at login.
    #[must_use]
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the profile name returned by the current-user operation.
    #[must_use]
    pub fn with_user_name(mut self, name: impl Into<String>) -> Self {
        self.user_name = name.into();
        self
    }

    /// Seeds the airport table.
    #[must_use]
    pub fn with_airports(mut self, airports: Vec<Airport>) -> Self {
        self.airports = airports;
        self
    }

    /// Seeds the flight table.
    #[must_use]
    pub fn with_flights(self, flights: Vec<Flight>) -> Self {
        {
            let mut table = lock(&self.flights);
            for flight in flights {
                table.insert(flight.id, flight);
            }
        }
        self
    }

    /// Seeds the server-side wishlist, in server order.
    #[must_use]
    pub fn with_wishlist(self, flight_ids: Vec<FlightId>) -> Self {
        *lock(&self.wishlist) = flight_ids;
        self
    }

    /// Seeds the ticket table and advances the ticket id counter past it.
    #[must_use]
    pub fn with_tickets(self, tickets: Vec<Ticket>) -> Self {
        let max_id = tickets.iter().map(|t| t.id.value()).max().unwrap_or(0);
        self.next_ticket_id.store(max_id + 1, Ordering::SeqCst);
        *lock(&self.tickets) = tickets;
        self
    }

    /// Scripts the next call to `op` to fail with `error`. Consumed by
    /// that one call; later calls succeed again.
    pub fn fail_next(&self, op: ApiOp, error: ApiError) {
        lock(&self.fail_next).insert(op, error);
    }

    /// Number of calls made to `op` so far, scripted failures included.
    #[must_use]
    pub fn calls(&self, op: ApiOp) -> usize {
        self.calls[op.index()].load(Ordering::SeqCst)
    }

    /// Current server-side wishlist, for assertions.
    #[must_use]
    pub fn server_wishlist(&self) -> Vec<FlightId> {
        lock(&self.wishlist).clone()
    }

    /// Current server-side ticket table, for assertions.
    #[must_use]
    pub fn server_tickets(&self) -> Vec<Ticket> {
        lock(&self.tickets).clone()
    }

    /// Remaining seats for a flight, for assertions.
    #[must_use]
    pub fn server_seats(&self, flight_id: FlightId) -> Option<u32> {
        lock(&self.flights).get(&flight_id).map(|f| f.seats)
    }

    fn record(&self, op: ApiOp) -> Result<(), ApiError> {
        self.calls[op.index()].fetch_add(1, Ordering::SeqCst);
        if let Some(err) = lock(&self.fail_next).remove(&op) {
            return Err(err);
        }
        Ok(())
    }

    fn city_known(&self, city: &str) -> bool {
        self.airports.iter().any(|a| a.city.name == city)
    }
}

impl Default for StaticApi {
    fn default() -> Self {
        Self::new()
    }
}

impl BookingApi for StaticApi {
    fn login(&self, username: String, password: String) -> ApiFuture<'_, AuthToken> {
        Box::pin(async move {
            self.record(ApiOp::Login)?;
            match &self.credentials {
                Some((expected_user, _)) if *expected_user != username => {
                    Err(ApiError::auth("client not found"))
                }
                Some((_, expected_password)) if *expected_password != password => {
                    Err(ApiError::auth("invalid credentials"))
                }
                _ => Ok(AuthToken::new("static-session-token")),
            }
        })
    }

    fn logout(&self) -> ApiFuture<'_, ()> {
        Box::pin(async move { self.record(ApiOp::Logout) })
    }

    fn current_user(&self) -> ApiFuture<'_, UserProfile> {
        Box::pin(async move {
            self.record(ApiOp::CurrentUser)?;
            Ok(UserProfile {
                name: self.user_name.clone(),
            })
        })
    }

    fn airports(&self) -> ApiFuture<'_, Vec<Airport>> {
        Box::pin(async move {
            self.record(ApiOp::Airports)?;
            Ok(self.airports.clone())
        })
    }

    fn search_routes(&self, origin: String, destination: String) -> ApiFuture<'_, Vec<Flight>> {
        Box::pin(async move {
            self.record(ApiOp::SearchRoutes)?;
            if !self.city_known(&origin) || !self.city_known(&destination) {
                return Err(ApiError::validation("not valid city name"));
            }
            let mut found: Vec<Flight> = lock(&self.flights)
                .values()
                .filter(|f| f.origin.city.name == origin && f.destination.city.name == destination)
                .cloned()
                .collect();
            found.sort_by_key(|f| f.id);
            Ok(found)
        })
    }

    fn flights_by_id(&self, ids: Vec<FlightId>) -> ApiFuture<'_, Vec<Flight>> {
        Box::pin(async move {
            self.record(ApiOp::FlightsById)?;
            let table = lock(&self.flights);
            let mut found = Vec::with_capacity(ids.len());
            for id in ids {
                match table.get(&id) {
                    Some(flight) => found.push(flight.clone()),
                    None => {
                        return Err(ApiError::validation(format!(
                            "some flight doesn't exist: {id}"
                        )));
                    }
                }
            }
            Ok(found)
        })
    }

    fn wishlist(&self) -> ApiFuture<'_, Vec<FlightId>> {
        Box::pin(async move {
            self.record(ApiOp::Wishlist)?;
            Ok(lock(&self.wishlist).clone())
        })
    }

    fn add_to_wishlist(&self, flight_id: FlightId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.record(ApiOp::AddToWishlist)?;
            if !lock(&self.flights).contains_key(&flight_id) {
                return Err(ApiError::not_found("flight not found"));
            }
            let mut wishlist = lock(&self.wishlist);
            if !wishlist.contains(&flight_id) {
                wishlist.push(flight_id);
            }
            Ok(())
        })
    }

    fn remove_from_wishlist(&self, flight_id: FlightId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.record(ApiOp::RemoveFromWishlist)?;
            let mut wishlist = lock(&self.wishlist);
            match wishlist.iter().position(|id| *id == flight_id) {
                Some(index) => {
                    wishlist.remove(index);
                    Ok(())
                }
                None => Err(ApiError::not_found("wish not found")),
            }
        })
    }

    fn buy_ticket(&self, flight_id: FlightId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.record(ApiOp::BuyTicket)?;
            let ticket = {
                let mut flights = lock(&self.flights);
                let Some(flight) = flights.get_mut(&flight_id) else {
                    return Err(ApiError::not_found("flight not found"));
                };
                if flight.seats == 0 {
                    return Err(ApiError::conflict("not available seats"));
                }
                flight.seats -= 1;
                Ticket {
                    id: TicketId::new(self.next_ticket_id.fetch_add(1, Ordering::SeqCst)),
                    origin: RouteEndpoint {
                        city: flight.origin.city.name.clone(),
                        state: flight.origin.city.state.clone(),
                    },
                    destination: RouteEndpoint {
                        city: flight.destination.city.name.clone(),
                        state: flight.destination.city.state.clone(),
                    },
                    company: flight.company,
                }
            };
            lock(&self.tickets).push(ticket);
            Ok(())
        })
    }

    fn tickets(&self) -> ApiFuture<'_, Vec<Ticket>> {
        Box::pin(async move {
            self.record(ApiOp::Tickets)?;
            Ok(lock(&self.tickets).clone())
        })
    }

    fn cancel_ticket(&self, ticket_id: TicketId) -> ApiFuture<'_, ()> {
        Box::pin(async move {
            self.record(ApiOp::CancelTicket)?;
            let mut tickets = lock(&self.tickets);
            match tickets.iter().position(|t| t.id == ticket_id) {
                Some(index) => {
                    tickets.remove(index);
                    Ok(())
                }
                None => Err(ApiError::not_found("ticket not found")),
            }
        })
    }
}
