//! End-to-end booking-session flows through the store runtime.
//!
//! These tests drive the full combined reducer against the in-memory
//! [`StaticApi`], exercising the feedback loop: commands issue effects,
//! effects resolve to response actions, and those responses are reduced
//! and broadcast.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use std::sync::Arc;
use std::time::Duration;

use voa_booking::tenant::TenantProfile;
use voa_booking::{
    Airport, ApiError, ApiOp, BookingAction, BookingEnvironment, BookingReducer, City, Company,
    Flight, FlightId, HoldPhase, SessionState, StaticApi, booking_reducer,
};
use voa_core::SystemClock;
use voa_runtime::Store;

const WAIT: Duration = Duration::from_secs(5);

type BookingStore = Store<SessionState, BookingAction, BookingEnvironment, BookingReducer>;

fn airport(name: &str, city: &str, state: &str) -> Airport {
    Airport::canonical(
        name,
        City {
            name: city.to_string(),
            state: state.to_string(),
            latitude: 0.0,
            longitude: 0.0,
        },
    )
}

fn flight(id: u64, seats: u32) -> Flight {
    Flight {
        id: FlightId::new(id),
        company: Company::Giro,
        price: 350,
        seats,
        origin: airport("GRU", "São Paulo", "SP"),
        destination: airport("GIG", "Rio de Janeiro", "RJ"),
    }
}

fn seeded_api() -> StaticApi {
    StaticApi::new()
        .with_credentials("ana", "secret")
        .with_user_name("Ana")
        .with_airports(vec![
            airport("GRU", "São Paulo", "SP"),
            airport("GIG", "Rio de Janeiro", "RJ"),
        ])
        .with_flights(vec![flight(1, 2), flight(2, 1)])
}

fn store_with(api: Arc<StaticApi>) -> BookingStore {
    let env = BookingEnvironment::new(api, Arc::new(SystemClock), TenantProfile::giro());
    Store::with_broadcast_capacity(SessionState::default(), booking_reducer(), env, 64)
}

/// Polls state until `check` holds. Actions are broadcast before they are
/// reduced, so assertions about the state written by the awaited action
/// must tolerate a short settling window.
async fn settled<F>(store: &BookingStore, check: F)
where
    F: Fn(&SessionState) -> bool,
{
    tokio::time::timeout(WAIT, async {
        loop {
            if store.state(&check).await {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("state did not settle in time");
}

async fn login(store: &BookingStore) {
    store
        .send_and_wait_for(
            BookingAction::Login {
                username: "ana".to_string(),
                password: "secret".to_string(),
            },
            |a| matches!(a, BookingAction::CurrentUserLoaded { .. }),
            WAIT,
        )
        .await
        .unwrap();
    settled(store, |s| s.is_active() && s.user().is_some()).await;
}

async fn add_hold(store: &BookingStore, flight_id: FlightId) {
    store
        .send_and_wait_for(
            BookingAction::AddHold { flight_id },
            |a| matches!(a, BookingAction::HoldAddResponded { result: Ok(()), .. }),
            WAIT,
        )
        .await
        .unwrap();
    settled(store, |s| {
        s.cart
            .hold(flight_id)
            .is_some_and(|h| h.phase == HoldPhase::ConfirmedRemote)
    })
    .await;
}

#[tokio::test]
async fn login_fans_out_the_session_loads() {
    let api = Arc::new(seeded_api());
    let store = store_with(Arc::clone(&api));

    login(&store).await;

    // The airport, ticket and wishlist loads fan out from the login
    // response without further commands.
    settled(&store, |s| s.catalog.airports.len() == 2).await;
    tokio::time::timeout(WAIT, async {
        while api.calls(ApiOp::Tickets) == 0 || api.calls(ApiOp::Wishlist) == 0 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap();
    assert_eq!(api.calls(ApiOp::Airports), 1);

    let name = store.state(|s| s.user().map(|u| u.name.clone())).await;
    assert_eq!(name.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn failed_login_surfaces_and_stays_logged_out() {
    let api = Arc::new(seeded_api());
    let store = store_with(Arc::clone(&api));

    store
        .send_and_wait_for(
            BookingAction::Login {
                username: "ana".to_string(),
                password: "wrong".to_string(),
            },
            |a| matches!(a, BookingAction::LoginResponded { .. }),
            WAIT,
        )
        .await
        .unwrap();

    settled(&store, |s| {
        matches!(s.last_error, Some(ApiError::Auth { .. }))
    })
    .await;
    let active = store.state(SessionState::is_active).await;
    assert!(!active);
}

#[tokio::test]
async fn hold_then_purchase_produces_a_ticket_and_empties_the_cart() {
    let api = Arc::new(seeded_api());
    let store = store_with(Arc::clone(&api));
    login(&store).await;

    add_hold(&store, FlightId::new(1)).await;
    assert_eq!(api.server_wishlist(), vec![FlightId::new(1)]);

    // Purchase: hold retires, cleanup removes the remote hold, and the
    // ledger reload brings the new ticket in.
    store
        .send_and_wait_for(
            BookingAction::Purchase {
                flight_id: FlightId::new(1),
            },
            |a| matches!(a, BookingAction::TicketsLoaded { result: Ok(_), .. }),
            WAIT,
        )
        .await
        .unwrap();

    settled(&store, |s| s.cart.is_empty() && s.ledger.len() == 1).await;
    assert!(api.server_wishlist().is_empty());
    assert_eq!(api.server_seats(FlightId::new(1)), Some(1));
}

#[tokio::test]
async fn failed_purchase_marks_the_hold_and_surfaces_the_conflict() {
    let api = Arc::new(seeded_api());
    let store = store_with(Arc::clone(&api));
    login(&store).await;

    add_hold(&store, FlightId::new(2)).await;
    api.fail_next(ApiOp::BuyTicket, ApiError::conflict("not available seats"));

    store
        .send_and_wait_for(
            BookingAction::Purchase {
                flight_id: FlightId::new(2),
            },
            |a| matches!(a, BookingAction::PurchaseResponded { result: Err(_), .. }),
            WAIT,
        )
        .await
        .unwrap();

    settled(&store, |s| {
        s.cart
            .hold(FlightId::new(2))
            .is_some_and(|h| h.phase == HoldPhase::Failed)
            && matches!(s.last_error, Some(ApiError::Conflict { .. }))
    })
    .await;

    // The hold is still displayed for retry or removal.
    let count = store.state(|s| s.cart.displayed_count()).await;
    assert_eq!(count, 1);
}

#[tokio::test]
async fn leaked_cleanup_is_retried_at_the_next_wishlist_load() {
    let api = Arc::new(seeded_api());
    let store = store_with(Arc::clone(&api));
    login(&store).await;

    add_hold(&store, FlightId::new(1)).await;

    // Purchase succeeds but the post-purchase hold cleanup fails.
    api.fail_next(
        ApiOp::RemoveFromWishlist,
        ApiError::transport("connection reset"),
    );
    store
        .send_and_wait_for(
            BookingAction::Purchase {
                flight_id: FlightId::new(1),
            },
            |a| matches!(a, BookingAction::CleanupResponded { result: Err(_), .. }),
            WAIT,
        )
        .await
        .unwrap();

    settled(&store, |s| s.cart.is_leaked(FlightId::new(1))).await;
    assert_eq!(api.server_wishlist(), vec![FlightId::new(1)]);

    // The next wishlist load culls the leaked id and retries the removal.
    store
        .send_and_wait_for(
            BookingAction::LoadWishlist,
            |a| matches!(a, BookingAction::WishlistLoaded { result: Ok(_), .. }),
            WAIT,
        )
        .await
        .unwrap();

    // The fire-and-forget removal settles shortly after the load.
    tokio::time::timeout(WAIT, async {
        while !api.server_wishlist().is_empty() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .unwrap();

    settled(&store, |s| {
        s.cart.hold(FlightId::new(1)).is_none() && !s.cart.is_leaked(FlightId::new(1))
    })
    .await;
}

#[tokio::test]
async fn wishlist_seed_hydrates_unknown_flights() {
    let api = Arc::new(seeded_api().with_wishlist(vec![FlightId::new(2), FlightId::new(1)]));
    let store = store_with(Arc::clone(&api));

    store
        .send_and_wait_for(
            BookingAction::LoadWishlist,
            |a| matches!(a, BookingAction::FlightsHydrated { result: Ok(_), .. }),
            WAIT,
        )
        .await
        .unwrap();

    settled(&store, |s| s.catalog.flight(FlightId::new(2)).is_some()).await;

    // Server order is preserved and every view carries flight details.
    let order = store.state(|s| s.cart.flight_ids()).await;
    assert_eq!(order, vec![FlightId::new(2), FlightId::new(1)]);

    let views = store.state(SessionState::cart_views).await;
    assert_eq!(views.len(), 2);
    assert!(views.iter().all(|v| v.flight.is_some()));
}

#[tokio::test]
async fn auth_failure_on_a_load_tears_the_session_down() {
    let api = Arc::new(seeded_api());
    let store = store_with(Arc::clone(&api));
    login(&store).await;
    add_hold(&store, FlightId::new(1)).await;

    api.fail_next(ApiOp::Tickets, ApiError::auth("not authorized"));

    store
        .send_and_wait_for(
            BookingAction::LoadTickets,
            |a| matches!(a, BookingAction::TicketsLoaded { result: Err(_), .. }),
            WAIT,
        )
        .await
        .unwrap();

    settled(&store, |s| {
        !s.is_active() && s.cart.is_empty() && matches!(s.last_error, Some(ApiError::Auth { .. }))
    })
    .await;
}

#[tokio::test]
async fn cancellation_removes_the_ticket_on_both_sides() {
    let api = Arc::new(seeded_api());
    let store = store_with(Arc::clone(&api));
    login(&store).await;

    // Buy a seat so there is a ticket to cancel.
    add_hold(&store, FlightId::new(1)).await;
    store
        .send_and_wait_for(
            BookingAction::Purchase {
                flight_id: FlightId::new(1),
            },
            |a| matches!(a, BookingAction::TicketsLoaded { result: Ok(_), .. }),
            WAIT,
        )
        .await
        .unwrap();
    settled(&store, |s| s.ledger.len() == 1).await;

    let ticket_id = store.state(|s| s.ledger.tickets[0].id).await;
    store
        .send_and_wait_for(
            BookingAction::CancelTicket { ticket_id },
            |a| matches!(a, BookingAction::CancellationResponded { result: Ok(()), .. }),
            WAIT,
        )
        .await
        .unwrap();

    settled(&store, |s| s.ledger.is_empty()).await;
    assert!(api.server_tickets().is_empty());
}

#[tokio::test]
async fn logout_discards_state_and_notifies_the_server() {
    let api = Arc::new(seeded_api());
    let store = store_with(Arc::clone(&api));
    login(&store).await;

    let mut handle = store.send(BookingAction::Logout).await.unwrap();
    handle.wait_with_timeout(WAIT).await.unwrap();

    let (active, error) = store.state(|s| (s.is_active(), s.last_error.clone())).await;
    assert!(!active);
    assert!(error.is_none());
    assert_eq!(api.calls(ApiOp::Logout), 1);
}
