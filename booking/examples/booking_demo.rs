//! Drives a complete booking session against the in-memory API.
//!
//! ```sh
//! cargo run -p voa-booking --example booking_demo
//! ```

#![allow(clippy::unwrap_used, clippy::expect_used)] // Demo code

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use voa_booking::tenant::TenantProfile;
use voa_booking::{
    Airport, BookingAction, BookingEnvironment, City, Company, Flight, FlightId, SessionState,
    StaticApi, booking_reducer,
};
use voa_core::SystemClock;
use voa_runtime::Store;

const WAIT: Duration = Duration::from_secs(5);

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

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,voa_booking=debug")),
        )
        .init();

    let gru = airport("GRU", "São Paulo", "SP");
    let gig = airport("GIG", "Rio de Janeiro", "RJ");

    let api = Arc::new(
        StaticApi::new()
            .with_credentials("ana", "secret")
            .with_user_name("Ana")
            .with_airports(vec![gru.clone(), gig.clone()])
            .with_flights(vec![
                Flight {
                    id: FlightId::new(1),
                    company: Company::Giro,
                    price: 350,
                    seats: 2,
                    origin: gru.clone(),
                    destination: gig.clone(),
                },
                Flight {
                    id: FlightId::new(2),
                    company: Company::Boreal,
                    price: 410,
                    seats: 1,
                    origin: gru,
                    destination: gig,
                },
            ]),
    );

    let tenant = TenantProfile::giro();
    tracing::info!(tenant = tenant.company_label, theme = tenant.theme.primary_hex, "starting");

    let env = BookingEnvironment::new(api, Arc::new(SystemClock), tenant);
    let store = Store::with_broadcast_capacity(SessionState::default(), booking_reducer(), env, 64);

    // Log in; airports, tickets and the wishlist fan out automatically.
    store
        .send_and_wait_for(
            BookingAction::Login {
                username: "ana".into(),
                password: "secret".into(),
            },
            |a| matches!(a, BookingAction::CurrentUserLoaded { .. }),
            WAIT,
        )
        .await?;

    // Search the route and hold a seat on the cheapest flight.
    store
        .send_and_wait_for(
            BookingAction::SearchRoutes {
                origin: Some("São Paulo".into()),
                destination: Some("Rio de Janeiro".into()),
            },
            |a| matches!(a, BookingAction::SearchResponded { result: Ok(_), .. }),
            WAIT,
        )
        .await?;

    let cheapest = store
        .state(|s| {
            s.catalog
                .search_results
                .iter()
                .min_by_key(|f| f.price)
                .map(|f| f.id)
        })
        .await
        .expect("seeded flights should match the route");

    store
        .send_and_wait_for(
            BookingAction::AddHold {
                flight_id: cheapest,
            },
            |a| matches!(a, BookingAction::HoldAddResponded { .. }),
            WAIT,
        )
        .await?;

    // Buy it; the ledger reload brings the ticket in.
    store
        .send_and_wait_for(
            BookingAction::Purchase {
                flight_id: cheapest,
            },
            |a| matches!(a, BookingAction::TicketsLoaded { result: Ok(_), .. }),
            WAIT,
        )
        .await?;

    // Let the response reductions settle before reading the summary.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let (user, cart, tickets) = store
        .state(|s| {
            (
                s.user().map(|u| u.name.clone()),
                s.cart.displayed_count(),
                s.ledger.tickets.clone(),
            )
        })
        .await;

    tracing::info!(
        user = user.as_deref().unwrap_or("<unknown>"),
        held = cart,
        tickets = tickets.len(),
        "session summary"
    );
    for ticket in tickets {
        tracing::info!(
            id = ticket.id.value(),
            route = %format!("{} to {}", ticket.origin.city, ticket.destination.city),
            carrier = %ticket.company,
            "ticket"
        );
    }

    store.send(BookingAction::Logout).await?;
    store.shutdown(WAIT).await?;
    Ok(())
}
