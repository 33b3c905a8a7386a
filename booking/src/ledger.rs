//! Ticket ledger: the purchased-tickets view.
//!
//! The ledger is server-authoritative. It is replaced wholesale on each
//! load (tagged with a request sequence for last-request-wins) and only
//! ever shrinks locally through explicit cancellation.

use crate::actions::BookingAction;
use crate::environment::BookingEnvironment;
use crate::error::ApiError;
use crate::types::SessionState;
use std::sync::Arc;
use voa_core::{SmallVec, async_effect, effect::Effect, reducer::Reducer, smallvec};

/// Reducer for the purchased-tickets list.
#[derive(Clone, Debug, Default)]
pub struct LedgerReducer;

impl LedgerReducer {
    /// Creates a new `LedgerReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Reducer for LedgerReducer {
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
            BookingAction::LoadTickets => {
                let seq = state.ledger.begin_tickets_load();
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.tickets().await;
                    Some(BookingAction::TicketsLoaded { seq, result })
                }]
            }

            BookingAction::TicketsLoaded { seq, result } => {
                if !state.ledger.is_current_tickets(seq) {
                    tracing::debug!(seq = seq.value(), "discarding stale ticket response");
                    return SmallVec::new();
                }
                match result {
                    Ok(tickets) => {
                        tracing::debug!(count = tickets.len(), "ticket list replaced");
                        state.ledger.tickets = tickets;
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "ticket load failed, keeping previous list");
                    }
                }
                SmallVec::new()
            }

            BookingAction::CancelTicket { ticket_id } => {
                if !state.ledger.contains(ticket_id) {
                    state.last_error = Some(ApiError::not_found("ticket not found"));
                    return SmallVec::new();
                }
                tracing::debug!(%ticket_id, "cancelling ticket");
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.cancel_ticket(ticket_id).await;
                    Some(BookingAction::CancellationResponded { ticket_id, result })
                }]
            }

            BookingAction::CancellationResponded { ticket_id, result } => {
                match result {
                    Ok(()) => {
                        state.ledger.remove(ticket_id);
                    }
                    Err(ApiError::NotFound { .. }) => {
                        // The server never knew it; the local copy is a
                        // phantom and goes too. The error still surfaces.
                        state.ledger.remove(ticket_id);
                    }
                    Err(err) => {
                        tracing::warn!(%ticket_id, error = %err, "cancellation failed, keeping ticket");
                    }
                }
                SmallVec::new()
            }

            _ => SmallVec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::StaticApi;
    use crate::tenant::TenantProfile;
    use crate::types::{Company, RequestSeq, RouteEndpoint, Ticket, TicketId};
    use voa_testing::{ReducerTest, assertions, test_clock};

    fn test_env() -> BookingEnvironment {
        BookingEnvironment::new(
            Arc::new(StaticApi::new()),
            Arc::new(test_clock()),
            TenantProfile::giro(),
        )
    }

    fn ticket(id: u64) -> Ticket {
        Ticket {
            id: TicketId::new(id),
            origin: RouteEndpoint {
                city: "São Paulo".to_string(),
                state: "SP".to_string(),
            },
            destination: RouteEndpoint {
                city: "Rio de Janeiro".to_string(),
                state: "RJ".to_string(),
            },
            company: Company::Giro,
        }
    }

    fn state_with_tickets(ids: &[u64]) -> SessionState {
        let mut state = SessionState::default();
        state.ledger.tickets = ids.iter().map(|&id| ticket(id)).collect();
        state
    }

    #[test]
    fn tickets_are_replaced_wholesale() {
        let mut state = state_with_tickets(&[1]);
        let seq = state.ledger.begin_tickets_load();

        ReducerTest::new(LedgerReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::TicketsLoaded {
                seq,
                result: Ok(vec![ticket(2), ticket(3)]),
            })
            .then_state(|state| {
                assert_eq!(state.ledger.len(), 2);
                assert!(state.ledger.contains(TicketId::new(2)));
                assert!(!state.ledger.contains(TicketId::new(1)));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn stale_ticket_response_is_discarded() {
        let mut state = state_with_tickets(&[1]);
        let _ = state.ledger.begin_tickets_load();

        ReducerTest::new(LedgerReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::TicketsLoaded {
                seq: RequestSeq::default(),
                result: Ok(vec![]),
            })
            .then_state(|state| {
                assert_eq!(state.ledger.len(), 1);
            })
            .run();
    }

    #[test]
    fn failed_load_retains_previous_list() {
        let mut state = state_with_tickets(&[1]);
        let seq = state.ledger.begin_tickets_load();

        ReducerTest::new(LedgerReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::TicketsLoaded {
                seq,
                result: Err(ApiError::transport("connection refused")),
            })
            .then_state(|state| {
                assert_eq!(state.ledger.len(), 1);
            })
            .run();
    }

    #[test]
    fn cancelling_an_unknown_ticket_fails_fast() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(test_env())
            .given_state(SessionState::default())
            .when_action(BookingAction::CancelTicket {
                ticket_id: TicketId::new(404),
            })
            .then_state(|state| {
                assert!(matches!(state.last_error, Some(ApiError::NotFound { .. })));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn cancelling_a_known_ticket_issues_the_call() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(test_env())
            .given_state(state_with_tickets(&[1]))
            .when_action(BookingAction::CancelTicket {
                ticket_id: TicketId::new(1),
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn successful_cancellation_removes_the_ticket() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(test_env())
            .given_state(state_with_tickets(&[1, 2]))
            .when_action(BookingAction::CancellationResponded {
                ticket_id: TicketId::new(1),
                result: Ok(()),
            })
            .then_state(|state| {
                assert!(!state.ledger.contains(TicketId::new(1)));
                assert!(state.ledger.contains(TicketId::new(2)));
            })
            .run();
    }

    #[test]
    fn not_found_cancellation_drops_the_phantom_copy() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(test_env())
            .given_state(state_with_tickets(&[1]))
            .when_action(BookingAction::CancellationResponded {
                ticket_id: TicketId::new(1),
                result: Err(ApiError::not_found("ticket not found")),
            })
            .then_state(|state| {
                assert!(state.ledger.is_empty());
            })
            .run();
    }

    #[test]
    fn failed_cancellation_keeps_the_ticket() {
        ReducerTest::new(LedgerReducer::new())
            .with_env(test_env())
            .given_state(state_with_tickets(&[1]))
            .when_action(BookingAction::CancellationResponded {
                ticket_id: TicketId::new(1),
                result: Err(ApiError::transport("timeout")),
            })
            .then_state(|state| {
                assert!(state.ledger.contains(TicketId::new(1)));
            })
            .run();
    }
}
