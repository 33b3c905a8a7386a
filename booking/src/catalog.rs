//! Catalog cache: airports and route search.
//!
//! The catalog owns the airport list and the most recent route search
//! result set, both replaced wholesale on each load. Every load is tagged
//! with a request sequence so responses arriving out of order are
//! discarded (last-request-wins). Flight snapshots seen in any response
//! accumulate in `CatalogState::flights_by_id` for cart-view enrichment.

use crate::actions::BookingAction;
use crate::environment::BookingEnvironment;
use crate::error::ApiError;
use crate::types::{Flight, SessionState};
use std::sync::Arc;
use voa_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

/// Reducer for the airport list and route search.
#[derive(Clone, Debug, Default)]
pub struct CatalogReducer;

impl CatalogReducer {
    /// Creates a new `CatalogReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for CatalogReducer {
    type State = SessionState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingAction::LoadAirports => {
                let seq = state.catalog.begin_airports_load();
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.airports().await;
                    Some(BookingAction::AirportsLoaded { seq, result })
                }]
            }

            BookingAction::AirportsLoaded { seq, result } => {
                if !state.catalog.is_current_airports(seq) {
                    tracing::debug!(seq = seq.value(), "discarding stale airport response");
                    return SmallVec::new();
                }
                match result {
                    Ok(airports) => {
                        tracing::debug!(count = airports.len(), "airport list replaced");
                        state.catalog.airports = airports;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "airport load failed, keeping previous list");
                    }
                }
                SmallVec::new()
            }

            BookingAction::SearchRoutes {
                origin,
                destination,
            } => {
                // The UI's "unselected" placeholder arrives as None or an
                // empty string; either way no network call is made.
                let origin = origin.filter(|city| !city.trim().is_empty());
                let destination = destination.filter(|city| !city.trim().is_empty());
                let (Some(origin), Some(destination)) = (origin, destination) else {
                    state.last_error = Some(ApiError::validation(
                        "origin and destination must both be selected",
                    ));
                    return SmallVec::new();
                };

                let seq = state.catalog.begin_search();
                tracing::debug!(%origin, %destination, seq = seq.value(), "searching routes");
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.search_routes(origin, destination).await;
                    Some(BookingAction::SearchResponded { seq, result })
                }]
            }

            BookingAction::SearchResponded { seq, result } => {
                if !state.catalog.is_current_search(seq) {
                    tracing::debug!(seq = seq.value(), "discarding stale search response");
                    return SmallVec::new();
                }
                match result {
                    Ok(flights) => {
                        state.catalog.record_flights(flights.iter().cloned());
                        // Zero-seat flights are dropped from the sellable
                        // view, not flagged.
                        state.catalog.search_results =
                            flights.into_iter().filter(Flight::is_sellable).collect();
                        tracing::debug!(
                            count = state.catalog.search_results.len(),
                            "search results replaced"
                        );
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "route search failed, keeping previous results");
                    }
                }
                SmallVec::new()
            }

            BookingAction::CancelSearch => {
                state.catalog.invalidate_search();
                SmallVec::new()
            }

            BookingAction::FlightsHydrated { result } => {
                match result {
                    // Snapshots merge into the by-id map; the search
                    // result set is never touched by hydration.
                    Ok(flights) => state.catalog.record_flights(flights),
                    Err(err) => {
                        tracing::warn!(error = %err, "flight hydration failed");
                    }
                }
                SmallVec::new()
            }

            _ => SmallVec::new(),
        }
    }
}
