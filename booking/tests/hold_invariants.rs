//! Property tests for the hold-set invariants.
//!
//! Random interleavings of cart commands and response actions are reduced
//! synchronously (effects discarded, so "responses" may arrive for calls
//! that were never issued, which the reducers must tolerate) and the
//! structural invariants of the hold set are checked after every step.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code can use unwrap/expect/panic

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use voa_booking::tenant::TenantProfile;
use voa_booking::{
    ApiError, BookingAction, BookingEnvironment, FlightId, HoldPhase, SessionState, StaticApi,
    booking_reducer,
};
use voa_core::reducer::Reducer;
use voa_testing::test_clock;

#[derive(Clone, Debug)]
enum Step {
    Add(u64),
    Remove(u64),
    Purchase(u64),
    AddOk(u64),
    AddErr(u64),
    RemoveOk(u64),
    RemoveNotFound(u64),
    RemoveErr(u64),
    PurchaseOk(u64),
    PurchaseErr(u64),
    WishlistSeed(Vec<u64>),
}

impl Step {
    fn into_action(self) -> BookingAction {
        match self {
            Self::Add(id) => BookingAction::AddHold {
                flight_id: FlightId::new(id),
            },
            Self::Remove(id) => BookingAction::RemoveHold {
                flight_id: FlightId::new(id),
            },
            Self::Purchase(id) => BookingAction::Purchase {
                flight_id: FlightId::new(id),
            },
            Self::AddOk(id) => BookingAction::HoldAddResponded {
                flight_id: FlightId::new(id),
                result: Ok(()),
            },
            Self::AddErr(id) => BookingAction::HoldAddResponded {
                flight_id: FlightId::new(id),
                result: Err(ApiError::transport("connection reset")),
            },
            Self::RemoveOk(id) => BookingAction::HoldRemovalResponded {
                flight_id: FlightId::new(id),
                result: Ok(()),
            },
            Self::RemoveNotFound(id) => BookingAction::HoldRemovalResponded {
                flight_id: FlightId::new(id),
                result: Err(ApiError::not_found("wish not found")),
            },
            Self::RemoveErr(id) => BookingAction::HoldRemovalResponded {
                flight_id: FlightId::new(id),
                result: Err(ApiError::transport("timeout")),
            },
            Self::PurchaseOk(id) => BookingAction::PurchaseResponded {
                flight_id: FlightId::new(id),
                result: Ok(()),
            },
            Self::PurchaseErr(id) => BookingAction::PurchaseResponded {
                flight_id: FlightId::new(id),
                result: Err(ApiError::conflict("not available seats")),
            },
            Self::WishlistSeed(ids) => {
                // The sequence tag is retrofitted by the runner so the
                // seed is never considered stale.
                BookingAction::WishlistLoaded {
                    seq: voa_booking::RequestSeq::default(),
                    result: Ok(ids.into_iter().map(FlightId::new).collect()),
                }
            }
        }
    }
}

fn step_strategy() -> impl Strategy<Value = Step> {
    let id = 1_u64..6;
    prop_oneof![
        id.clone().prop_map(Step::Add),
        id.clone().prop_map(Step::Remove),
        id.clone().prop_map(Step::Purchase),
        id.clone().prop_map(Step::AddOk),
        id.clone().prop_map(Step::AddErr),
        id.clone().prop_map(Step::RemoveOk),
        id.clone().prop_map(Step::RemoveNotFound),
        id.clone().prop_map(Step::RemoveErr),
        id.clone().prop_map(Step::PurchaseOk),
        id.clone().prop_map(Step::PurchaseErr),
        proptest::collection::vec(id, 0..5).prop_map(Step::WishlistSeed),
    ]
}

fn test_env() -> BookingEnvironment {
    BookingEnvironment::new(
        Arc::new(StaticApi::new()),
        Arc::new(test_clock()),
        TenantProfile::giro(),
    )
}

fn check_invariants(state: &SessionState) {
    let holds = state.cart.holds_in_order();

    // One hold per flight.
    let ids: HashSet<FlightId> = holds.iter().map(|h| h.flight_id).collect();
    assert_eq!(ids.len(), holds.len(), "duplicate hold for a flight");

    // Positions are unique and holds_in_order sorts by them.
    let positions: Vec<u64> = holds.iter().map(|h| h.position).collect();
    let mut sorted = positions.clone();
    sorted.sort_unstable();
    sorted.dedup();
    assert_eq!(sorted.len(), positions.len(), "duplicate hold positions");
    assert_eq!(sorted, positions, "holds not in insertion order");

    // The badge count is derived, never negative, never above the total.
    let displayed = state.cart.displayed_count();
    assert!(displayed <= holds.len());
    let recount = holds
        .iter()
        .filter(|h| {
            matches!(
                h.phase,
                HoldPhase::Pending | HoldPhase::ConfirmedRemote | HoldPhase::Failed
            )
        })
        .count();
    assert_eq!(displayed, recount, "badge count out of sync with phases");

    // A parked operation implies a round-trip in flight.
    for hold in &holds {
        if hold.queued.is_some() {
            assert!(
                hold.is_busy(),
                "flight {} has a parked operation but nothing in flight",
                hold.flight_id
            );
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn hold_set_invariants_survive_any_interleaving(
        steps in proptest::collection::vec(step_strategy(), 1..40)
    ) {
        let reducer = booking_reducer();
        let env = test_env();
        let mut state = SessionState::default();

        for step in steps {
            let action = match step {
                // Tag wishlist seeds with the current sequence so they land.
                Step::WishlistSeed(ids) => {
                    let seq = state.cart.begin_wishlist_load();
                    BookingAction::WishlistLoaded {
                        seq,
                        result: Ok(ids.into_iter().map(FlightId::new).collect()),
                    }
                }
                other => other.into_action(),
            };
            let _ = reducer.reduce(&mut state, action, &env);
            check_invariants(&state);
        }
    }

    #[test]
    fn repeated_adds_for_one_flight_keep_a_single_hold(
        repeats in 1_usize..10
    ) {
        let reducer = booking_reducer();
        let env = test_env();
        let mut state = SessionState::default();
        let flight_id = FlightId::new(1);

        let first = reducer.reduce(&mut state, BookingAction::AddHold { flight_id }, &env);
        prop_assert_eq!(first.len(), 1, "first add issues exactly one effect");

        for _ in 0..repeats {
            let effects = reducer.reduce(&mut state, BookingAction::AddHold { flight_id }, &env);
            prop_assert!(effects.is_empty(), "duplicate add must attach, not re-issue");
        }

        prop_assert_eq!(state.cart.len(), 1);
        prop_assert_eq!(state.cart.displayed_count(), 1);
    }
}
