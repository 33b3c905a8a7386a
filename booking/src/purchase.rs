//! Purchase orchestrator: converts a held flight into a ticket.
//!
//! A purchase runs against an existing hold. On success the hold is
//! retired optimistically, the now-redundant remote hold is cleaned up on
//! a best-effort basis, and the ticket ledger is reloaded so the new
//! ticket appears with its server-assigned identity. Cleanup failure
//! never fails the purchase; the flight is marked as a leaked remote hold
//! and retried once at the next wishlist load.

use crate::actions::BookingAction;
use crate::environment::BookingEnvironment;
use crate::error::ApiError;
use crate::types::{HoldOp, HoldPhase, SessionState};
use std::sync::Arc;
use voa_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

/// Reducer for the purchase flow.
#[derive(Clone, Debug, Default)]
pub struct PurchaseReducer;

impl PurchaseReducer {
    /// Creates a new `PurchaseReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for PurchaseReducer {
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
            BookingAction::Purchase { flight_id } => {
                let Some(hold) = state.cart.hold_mut(flight_id) else {
                    state.last_error = Some(ApiError::validation(format!(
                        "no hold for flight {flight_id}"
                    )));
                    return SmallVec::new();
                };
                if hold.is_busy() {
                    if hold.in_flight_op() == Some(HoldOp::Purchase) {
                        return SmallVec::new();
                    }
                    if let Err(err) = hold.park(HoldOp::Purchase) {
                        state.last_error = Some(err);
                    }
                    return SmallVec::new();
                }
                hold.phase = HoldPhase::Purchasing;
                tracing::debug!(%flight_id, "buying ticket");
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.buy_ticket(flight_id).await;
                    Some(BookingAction::PurchaseResponded { flight_id, result })
                }]
            }

            BookingAction::PurchaseResponded { flight_id, result } => {
                if state.cart.hold(flight_id).is_none() {
                    tracing::debug!(%flight_id, "purchase response for a hold no longer tracked");
                    return SmallVec::new();
                }
                match result {
                    Ok(()) => {
                        // Optimistic retirement: the hold leaves the cart
                        // now, before cleanup or the ledger reload land.
                        if let Some(op) =
                            state.cart.remove(flight_id).and_then(|hold| hold.queued)
                        {
                            tracing::debug!(
                                %flight_id,
                                ?op,
                                "dropping operation parked behind a completed purchase"
                            );
                        }
                        let api = Arc::clone(&env.api);
                        smallvec![
                            async_effect! {
                                let result = api.remove_from_wishlist(flight_id).await;
                                Some(BookingAction::CleanupResponded { flight_id, result })
                            },
                            Effect::Future(Box::pin(async move {
                                Some(BookingAction::LoadTickets)
                            })),
                        ]
                    }
                    Err(err) => {
                        tracing::warn!(%flight_id, error = %err, "purchase failed");
                        if let Some(hold) = state.cart.hold_mut(flight_id) {
                            hold.phase = HoldPhase::Failed;
                            hold.queued = None;
                        }
                        SmallVec::new()
                    }
                }
            }

            BookingAction::CleanupResponded { flight_id, result } => {
                match result {
                    Ok(()) | Err(ApiError::NotFound { .. }) => {
                        tracing::debug!(%flight_id, "post-purchase hold cleanup settled");
                    }
                    Err(err) => {
                        tracing::warn!(
                            %flight_id,
                            error = %err,
                            "post-purchase hold cleanup failed, will retry at next wishlist load"
                        );
                        state.cart.mark_leaked(flight_id);
                    }
                }
                SmallVec::new()
            }

            _ => SmallVec::new(),
        }
    }
}
