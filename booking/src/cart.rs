//! Cart / hold manager: server-mirrored seat holds.
//!
//! Every hold mutation is a remote round-trip against the server-side
//! wishlist. While one round-trip is in flight the hold is busy; a second
//! command of the same kind attaches to it, a command of a different kind
//! parks in the hold's one-deep queue, and the parked operation is
//! dispatched when the in-flight one completes. Operations on a single
//! flight's hold are thereby serialized, never raced.

use crate::actions::BookingAction;
use crate::environment::BookingEnvironment;
use crate::error::ApiError;
use crate::types::{FlightId, HoldOp, HoldPhase, SessionState};
use std::sync::Arc;
use voa_core::environment::Clock;
use voa_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

/// Reducer for the hold set and the wishlist mirror.
#[derive(Clone, Debug, Default)]
pub struct CartReducer;

impl CartReducer {
    /// Creates a new `CartReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Effect issuing the remote "add to wishlist" call for a flight.
fn add_effect(env: &BookingEnvironment, flight_id: FlightId) -> Effect<BookingAction> {
    let api = Arc::clone(&env.api);
    async_effect! {
        let result = api.add_to_wishlist(flight_id).await;
        Some(BookingAction::HoldAddResponded { flight_id, result })
    }
}

/// Effect issuing the remote "remove from wishlist" call for a flight.
fn remove_effect(env: &BookingEnvironment, flight_id: FlightId) -> Effect<BookingAction> {
    let api = Arc::clone(&env.api);
    async_effect! {
        let result = api.remove_from_wishlist(flight_id).await;
        Some(BookingAction::HoldRemovalResponded { flight_id, result })
    }
}

/// Effect re-dispatching a parked operation as its command action.
fn dispatch_queued(flight_id: FlightId, op: HoldOp) -> Effect<BookingAction> {
    let command = match op {
        HoldOp::Add => BookingAction::AddHold { flight_id },
        HoldOp::Remove => BookingAction::RemoveHold { flight_id },
        HoldOp::Purchase => BookingAction::Purchase { flight_id },
    };
    Effect::Future(Box::pin(async move { Some(command) }))
}

impl Reducer for CartReducer {
    type State = SessionState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            BookingAction::AddHold { flight_id } => {
                if let Some(hold) = state.cart.hold_mut(flight_id) {
                    if hold.is_busy() {
                        if hold.in_flight_op() == Some(HoldOp::Add) {
                            // Attaches to the round-trip already in flight.
                            return SmallVec::new();
                        }
                        if let Err(err) = hold.park(HoldOp::Add) {
                            state.last_error = Some(err);
                        }
                        return SmallVec::new();
                    }
                    if hold.phase == HoldPhase::Failed {
                        // Retry: the failed hold re-enters Pending.
                        hold.phase = HoldPhase::Pending;
                        return smallvec![add_effect(env, flight_id)];
                    }
                    // Already held; adding again is a no-op.
                    return SmallVec::new();
                }

                state.cart.insert_pending(flight_id, env.clock.now());
                tracing::debug!(%flight_id, "holding seat");
                smallvec![add_effect(env, flight_id)]
            }

            BookingAction::HoldAddResponded { flight_id, result } => {
                let Some(hold) = state.cart.hold_mut(flight_id) else {
                    tracing::debug!(%flight_id, "add response for a hold no longer tracked");
                    return SmallVec::new();
                };
                match result {
                    Ok(()) => {
                        if hold.phase == HoldPhase::Pending {
                            hold.phase = HoldPhase::ConfirmedRemote;
                        }
                        if let Some(op) = hold.take_queued() {
                            return smallvec![dispatch_queued(flight_id, op)];
                        }
                        SmallVec::new()
                    }
                    Err(err) => {
                        tracing::warn!(%flight_id, error = %err, "holding seat failed");
                        hold.phase = HoldPhase::Failed;
                        hold.queued = None;
                        SmallVec::new()
                    }
                }
            }

            BookingAction::RemoveHold { flight_id } => {
                let Some(hold) = state.cart.hold_mut(flight_id) else {
                    state.last_error = Some(ApiError::validation(format!(
                        "no hold for flight {flight_id}"
                    )));
                    return SmallVec::new();
                };
                if hold.is_busy() {
                    if hold.in_flight_op() == Some(HoldOp::Remove) {
                        return SmallVec::new();
                    }
                    if let Err(err) = hold.park(HoldOp::Remove) {
                        state.last_error = Some(err);
                    }
                    return SmallVec::new();
                }
                hold.removing = true;
                tracing::debug!(%flight_id, "releasing held seat");
                smallvec![remove_effect(env, flight_id)]
            }

            BookingAction::HoldRemovalResponded { flight_id, result } => {
                if state.cart.hold(flight_id).is_none() {
                    tracing::debug!(%flight_id, "removal response for a hold no longer tracked");
                    return SmallVec::new();
                }
                match result {
                    Ok(()) | Err(ApiError::NotFound { .. }) => {
                        if matches!(result, Err(ApiError::NotFound { .. })) {
                            tracing::debug!(%flight_id, "remote hold already gone, reconciling");
                        }
                        let removed = state.cart.remove(flight_id);
                        if let Some(op) = removed.and_then(|hold| hold.queued) {
                            return smallvec![dispatch_queued(flight_id, op)];
                        }
                        SmallVec::new()
                    }
                    Err(err) => {
                        tracing::warn!(%flight_id, error = %err, "releasing held seat failed");
                        if let Some(hold) = state.cart.hold_mut(flight_id) {
                            hold.removing = false;
                            hold.queued = None;
                        }
                        SmallVec::new()
                    }
                }
            }

            BookingAction::LoadWishlist => {
                let seq = state.cart.begin_wishlist_load();
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.wishlist().await;
                    Some(BookingAction::WishlistLoaded { seq, result })
                }]
            }

            BookingAction::WishlistLoaded { seq, result } => {
                if !state.cart.is_current_wishlist(seq) {
                    tracing::debug!(seq = seq.value(), "discarding stale wishlist response");
                    return SmallVec::new();
                }
                let ids = match result {
                    Ok(ids) => ids,
                    Err(err) => {
                        tracing::warn!(error = %err, "wishlist load failed, keeping local holds");
                        return SmallVec::new();
                    }
                };

                // Leaked holds from failed purchase cleanups are retried
                // exactly once here, then forgotten. A leaked id the user has
                // since held again is no longer a leak: the remote hold is
                // wanted, so the mark is simply dropped.
                let leaked = state.cart.take_leaked();
                let mut effects: SmallVec<[Effect<BookingAction>; 4]> = SmallVec::new();
                let mut live = Vec::with_capacity(ids.len());
                for id in ids {
                    if leaked.contains(&id) && state.cart.hold(id).is_none() {
                        let api = Arc::clone(&env.api);
                        effects.push(async_effect! {
                            if let Err(err) = api.remove_from_wishlist(id).await {
                                tracing::warn!(flight_id = %id, error = %err, "leaked hold cleanup failed, giving up");
                            }
                            None::<BookingAction>
                        });
                    } else {
                        live.push(id);
                    }
                }

                let seed = state.cart.seed_from_server(&live, env.clock.now());
                tracing::debug!(
                    added = seed.added.len(),
                    dropped = seed.dropped.len(),
                    "hold set rebuilt from wishlist"
                );

                // Holds whose flight was never seen in a search result get
                // hydrated so the cart can show full details.
                let unknown: Vec<FlightId> = live
                    .iter()
                    .copied()
                    .filter(|&id| state.catalog.flight(id).is_none())
                    .collect();
                if !unknown.is_empty() {
                    let api = Arc::clone(&env.api);
                    effects.push(async_effect! {
                        let result = api.flights_by_id(unknown).await;
                        Some(BookingAction::FlightsHydrated { result })
                    });
                }
                effects
            }

            _ => SmallVec::new(),
        }
    }
}
