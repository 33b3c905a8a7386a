//! Actions driving the booking session.
//!
//! One flat enum covers every component so the combined reducer (and the
//! session teardown sweep that runs last) can observe all of them. Each
//! component's reducer matches its own variants and ignores the rest.
//! Commands express user intent; response variants carry the classified
//! result of the remote call that the command's effect issued.

use crate::error::ApiError;
use crate::types::{
    Airport, AuthToken, Flight, FlightId, RequestSeq, Ticket, TicketId, UserProfile,
};

/// Input to the booking reducer.
#[derive(Debug, Clone, PartialEq)]
pub enum BookingAction {
    // ═══════════════════════════════════════════════════════════════════
    // Catalog
    // ═══════════════════════════════════════════════════════════════════
    /// Fetch the airport list.
    LoadAirports,

    /// The airport load came back.
    AirportsLoaded {
        /// Tag of the request that produced this response.
        seq: RequestSeq,
        /// Classified outcome.
        result: Result<Vec<Airport>, ApiError>,
    },

    /// Search flights between two cities.
    ///
    /// Origin and destination must both be selected; the UI's placeholder
    /// sentinel arrives here as `None` and short-circuits without a
    /// network call.
    SearchRoutes {
        /// Selected origin city, if any.
        origin: Option<String>,
        /// Selected destination city, if any.
        destination: Option<String>,
    },

    /// The route search came back.
    SearchResponded {
        /// Tag of the request that produced this response.
        seq: RequestSeq,
        /// Classified outcome.
        result: Result<Vec<Flight>, ApiError>,
    },

    /// Abort the in-flight search; its response will be discarded on
    /// arrival. Current results are unaffected.
    CancelSearch,

    /// A flights-by-id hydration came back. Snapshots merge into the
    /// catalog map; the search result set is never touched.
    FlightsHydrated {
        /// Classified outcome.
        result: Result<Vec<Flight>, ApiError>,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Cart
    // ═══════════════════════════════════════════════════════════════════
    /// Hold a seat on a flight (add to the wishlist).
    AddHold {
        /// Flight to hold.
        flight_id: FlightId,
    },

    /// The remote "add to wishlist" call came back.
    HoldAddResponded {
        /// Flight the call was issued for.
        flight_id: FlightId,
        /// Classified outcome.
        result: Result<(), ApiError>,
    },

    /// Release a held seat (remove from the wishlist).
    RemoveHold {
        /// Flight to release.
        flight_id: FlightId,
    },

    /// The remote "remove from wishlist" call came back.
    HoldRemovalResponded {
        /// Flight the call was issued for.
        flight_id: FlightId,
        /// Classified outcome.
        result: Result<(), ApiError>,
    },

    /// Fetch the server-side wishlist and rebuild the hold set from it.
    LoadWishlist,

    /// The wishlist load came back.
    WishlistLoaded {
        /// Tag of the request that produced this response.
        seq: RequestSeq,
        /// Server-side hold list in server order.
        result: Result<Vec<FlightId>, ApiError>,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Purchase
    // ═══════════════════════════════════════════════════════════════════
    /// Convert a held flight into a ticket.
    ///
    /// Requires an existing hold for the flight; purchasing without one
    /// is a caller error and fails fast without a network call.
    Purchase {
        /// Flight to buy.
        flight_id: FlightId,
    },

    /// The remote "buy ticket" call came back.
    PurchaseResponded {
        /// Flight the call was issued for.
        flight_id: FlightId,
        /// Classified outcome.
        result: Result<(), ApiError>,
    },

    /// The best-effort removal of the now-redundant hold came back.
    /// Failure marks the flight as a leaked remote hold for one lazy
    /// retry at the next wishlist load; it never fails the purchase.
    CleanupResponded {
        /// Flight the cleanup was issued for.
        flight_id: FlightId,
        /// Classified outcome.
        result: Result<(), ApiError>,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Ledger
    // ═══════════════════════════════════════════════════════════════════
    /// Fetch the purchased-tickets list.
    LoadTickets,

    /// The ticket load came back.
    TicketsLoaded {
        /// Tag of the request that produced this response.
        seq: RequestSeq,
        /// Classified outcome.
        result: Result<Vec<Ticket>, ApiError>,
    },

    /// Cancel a purchased ticket.
    CancelTicket {
        /// Ticket to cancel.
        ticket_id: TicketId,
    },

    /// The remote cancellation came back.
    CancellationResponded {
        /// Ticket the call was issued for.
        ticket_id: TicketId,
        /// Classified outcome.
        result: Result<(), ApiError>,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Session
    // ═══════════════════════════════════════════════════════════════════
    /// Log in with credentials.
    ///
    /// # Flow
    ///
    /// 1. Both fields are validated non-empty, else the command fails
    ///    fast with a validation error.
    /// 2. The login effect is issued and the session enters `LoggingIn`.
    /// 3. On success the session becomes `Active` and the airport,
    ///    ticket, wishlist and user loads fan out in parallel.
    Login {
        /// Account username.
        username: String,
        /// Account password.
        password: String,
    },

    /// The login call came back.
    LoginResponded {
        /// Classified outcome carrying the session credential.
        result: Result<AuthToken, ApiError>,
    },

    /// The current-user load came back.
    CurrentUserLoaded {
        /// Classified outcome.
        result: Result<UserProfile, ApiError>,
    },

    /// End the session. Local state is discarded immediately; the remote
    /// logout is best-effort and its failure is only logged.
    Logout,
}

impl BookingAction {
    /// The failure carried by this action, if it is a failed response.
    ///
    /// The session reducer sweeps every action through this to spot
    /// authentication failures that force teardown.
    #[must_use]
    pub const fn failure(&self) -> Option<&ApiError> {
        match self {
            Self::AirportsLoaded {
                result: Err(err), ..
            }
            | Self::SearchResponded {
                result: Err(err), ..
            }
            | Self::FlightsHydrated {
                result: Err(err), ..
            }
            | Self::HoldAddResponded {
                result: Err(err), ..
            }
            | Self::HoldRemovalResponded {
                result: Err(err), ..
            }
            | Self::WishlistLoaded {
                result: Err(err), ..
            }
            | Self::PurchaseResponded {
                result: Err(err), ..
            }
            | Self::CleanupResponded {
                result: Err(err), ..
            }
            | Self::TicketsLoaded {
                result: Err(err), ..
            }
            | Self::CancellationResponded {
                result: Err(err), ..
            }
            | Self::LoginResponded {
                result: Err(err), ..
            }
            | Self::CurrentUserLoaded {
                result: Err(err), ..
            } => Some(err),
            _ => None,
        }
    }
}
