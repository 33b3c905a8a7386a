//! Session lifecycle: login, logout, auth teardown and error surfacing.
//!
//! The session reducer owns the authentication phase and runs *last* in
//! the combined reducer so its catch-all sweep observes every response
//! action after the domain reducers have settled the state. The sweep
//! enforces one global rule: any operation failing with an auth error
//! tears the whole session down.

use crate::actions::BookingAction;
use crate::catalog::CatalogReducer;
use crate::cart::CartReducer;
use crate::environment::BookingEnvironment;
use crate::error::ApiError;
use crate::ledger::LedgerReducer;
use crate::purchase::PurchaseReducer;
use crate::types::{SessionPhase, SessionState, UserProfile};
use std::sync::Arc;
use voa_core::{
    CombinedReducer, SmallVec, async_effect, combine_reducers, effect::Effect, reducer::Reducer,
    smallvec,
};

/// Reducer for authentication and global failure handling.
#[derive(Clone, Debug, Default)]
pub struct SessionReducer;

impl SessionReducer {
    /// Creates a new `SessionReducer`.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

/// Failures the sweep records in `last_error` for display.
///
/// Post-purchase cleanup failures and already-gone removal targets are
/// handled internally (leak tracking, reconciliation) and would only
/// confuse the user.
fn is_user_visible(action: &BookingAction) -> bool {
    !matches!(
        action,
        BookingAction::CleanupResponded { .. }
            | BookingAction::HoldRemovalResponded {
                result: Err(ApiError::NotFound { .. }),
                ..
            }
    )
}

impl Reducer for SessionReducer {
    type State = SessionState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        // The one global rule, checked before anything else: an auth
        // failure on any operation invalidates the whole session.
        if let Some(err) = action.failure() {
            if err.is_auth() {
                tracing::warn!(error = %err, "auth failure, tearing session down");
                state.teardown(Some(err.clone()));
                return SmallVec::new();
            }
        }

        match action {
            BookingAction::Login { username, password } => {
                let username = username.trim().to_string();
                if username.is_empty() || password.is_empty() {
                    state.last_error = Some(ApiError::validation(
                        "username and password must not be empty",
                    ));
                    return SmallVec::new();
                }
                if !matches!(state.phase, SessionPhase::LoggedOut) {
                    tracing::debug!("login ignored, session already active or in progress");
                    return SmallVec::new();
                }
                state.phase = SessionPhase::LoggingIn;
                state.last_error = None;
                tracing::info!(%username, "logging in");
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    let result = api.login(username, password).await;
                    Some(BookingAction::LoginResponded { result })
                }]
            }

            BookingAction::LoginResponded { result } => match result {
                Ok(token) => {
                    state.phase = SessionPhase::Active { token, user: None };
                    tracing::info!("session active");
                    // All session data loads fan out at once; each is a
                    // full-replace load and they share no ordering.
                    let api = Arc::clone(&env.api);
                    smallvec![Effect::Parallel(vec![
                        Effect::Future(Box::pin(async move {
                            Some(BookingAction::LoadAirports)
                        })),
                        Effect::Future(Box::pin(async move {
                            Some(BookingAction::LoadTickets)
                        })),
                        Effect::Future(Box::pin(async move {
                            Some(BookingAction::LoadWishlist)
                        })),
                        async_effect! {
                            let result = api.current_user().await;
                            Some(BookingAction::CurrentUserLoaded { result })
                        },
                    ])]
                }
                Err(err) => {
                    tracing::warn!(error = %err, "login failed");
                    state.teardown(Some(err));
                    SmallVec::new()
                }
            },

            BookingAction::CurrentUserLoaded { result } => {
                match result {
                    Ok(UserProfile { name }) => {
                        if let SessionPhase::Active { user, .. } = &mut state.phase {
                            *user = Some(UserProfile { name });
                        }
                    }
                    // Auth failures were swept above; anything else just
                    // means the name stays unknown.
                    Err(err) => {
                        tracing::warn!(error = %err, "current-user load failed");
                    }
                }
                SmallVec::new()
            }

            BookingAction::Logout => {
                tracing::info!("logging out");
                state.teardown(None);
                let api = Arc::clone(&env.api);
                smallvec![async_effect! {
                    if let Err(err) = api.logout().await {
                        tracing::warn!(error = %err, "remote logout failed");
                    }
                    None::<BookingAction>
                }]
            }

            other => {
                if let Some(err) = other.failure() {
                    if is_user_visible(&other) {
                        state.last_error = Some(err.clone());
                    }
                }
                SmallVec::new()
            }
        }
    }
}

/// The complete booking reducer: catalog, cart, purchase, ledger and
/// session combined over shared [`SessionState`].
///
/// The session reducer runs last so its auth sweep sees final state.
/// Cloneable so it can drive a store.
#[derive(Clone)]
pub struct BookingReducer {
    inner: Arc<CombinedReducer<SessionState, BookingAction, BookingEnvironment>>,
}

impl std::fmt::Debug for BookingReducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingReducer").finish_non_exhaustive()
    }
}

impl Reducer for BookingReducer {
    type State = SessionState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        self.inner.reduce(state, action, env)
    }
}

/// Builds the combined booking reducer.
#[must_use]
pub fn booking_reducer() -> BookingReducer {
    BookingReducer {
        inner: Arc::new(combine_reducers(vec![
            Box::new(CatalogReducer::new()),
            Box::new(CartReducer::new()),
            Box::new(PurchaseReducer::new()),
            Box::new(LedgerReducer::new()),
            Box::new(SessionReducer::new()),
        ])),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::api::StaticApi;
    use crate::tenant::TenantProfile;
    use crate::types::{AuthToken, FlightId, HoldPhase, RequestSeq};
    use voa_core::environment::Clock;
    use voa_testing::{ReducerTest, assertions, test_clock};

    fn test_env() -> BookingEnvironment {
        BookingEnvironment::new(
            Arc::new(StaticApi::new()),
            Arc::new(test_clock()),
            TenantProfile::giro(),
        )
    }

    fn active_state() -> SessionState {
        let mut state = SessionState::default();
        state.phase = SessionPhase::Active {
            token: AuthToken::new("tok-1"),
            user: None,
        };
        state
    }

    #[test]
    fn login_with_empty_credentials_fails_fast() {
        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(SessionState::default())
            .when_action(BookingAction::Login {
                username: "  ".to_string(),
                password: "secret".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.phase, SessionPhase::LoggedOut);
                assert!(matches!(
                    state.last_error,
                    Some(ApiError::Validation { .. })
                ));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn login_enters_logging_in_and_issues_the_call() {
        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(SessionState::default())
            .when_action(BookingAction::Login {
                username: "alice".to_string(),
                password: "secret".to_string(),
            })
            .then_state(|state| {
                assert_eq!(state.phase, SessionPhase::LoggingIn);
                assert!(state.last_error.is_none());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn login_while_active_is_ignored() {
        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(active_state())
            .when_action(BookingAction::Login {
                username: "alice".to_string(),
                password: "secret".to_string(),
            })
            .then_state(|state| {
                assert!(state.is_active());
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn successful_login_fans_out_the_session_loads() {
        let mut state = SessionState::default();
        state.phase = SessionPhase::LoggingIn;

        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::LoginResponded {
                result: Ok(AuthToken::new("tok-1")),
            })
            .then_state(|state| {
                assert!(state.is_active());
                assert_eq!(state.token().unwrap().as_str(), "tok-1");
                assert!(state.user().is_none());
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_parallel_effect(effects);
                if let Some(Effect::Parallel(inner)) = effects.first() {
                    assert_eq!(inner.len(), 4);
                }
            })
            .run();
    }

    #[test]
    fn failed_login_returns_to_logged_out() {
        let mut state = SessionState::default();
        state.phase = SessionPhase::LoggingIn;

        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::LoginResponded {
                result: Err(ApiError::auth("invalid credentials")),
            })
            .then_state(|state| {
                assert_eq!(state.phase, SessionPhase::LoggedOut);
                assert!(matches!(state.last_error, Some(ApiError::Auth { .. })));
            })
            .then_effects(assertions::assert_no_effects)
            .run();
    }

    #[test]
    fn current_user_fills_the_profile() {
        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(active_state())
            .when_action(BookingAction::CurrentUserLoaded {
                result: Ok(UserProfile {
                    name: "Alice".to_string(),
                }),
            })
            .then_state(|state| {
                assert_eq!(state.user().unwrap().name, "Alice");
            })
            .run();
    }

    #[test]
    fn logout_discards_state_and_fires_best_effort_remote_logout() {
        let mut state = active_state();
        state.cart.insert_confirmed(FlightId::new(1), test_clock().now());

        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::Logout)
            .then_state(|state| {
                assert_eq!(state.phase, SessionPhase::LoggedOut);
                assert!(state.cart.is_empty());
                assert!(state.last_error.is_none());
            })
            .then_effects(|effects| assertions::assert_effects_count(effects, 1))
            .run();
    }

    #[test]
    fn auth_failure_on_any_operation_tears_the_session_down() {
        let mut state = active_state();
        state.cart.insert_confirmed(FlightId::new(1), test_clock().now());

        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::TicketsLoaded {
                seq: RequestSeq::default(),
                result: Err(ApiError::auth("not authorized")),
            })
            .then_state(|state| {
                assert_eq!(state.phase, SessionPhase::LoggedOut);
                assert!(state.cart.is_empty());
                assert!(matches!(state.last_error, Some(ApiError::Auth { .. })));
            })
            .run();
    }

    #[test]
    fn non_auth_failures_surface_without_teardown() {
        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(active_state())
            .when_action(BookingAction::PurchaseResponded {
                flight_id: FlightId::new(1),
                result: Err(ApiError::conflict("not available seats")),
            })
            .then_state(|state| {
                assert!(state.is_active());
                assert!(matches!(state.last_error, Some(ApiError::Conflict { .. })));
            })
            .run();
    }

    #[test]
    fn cleanup_failures_never_surface() {
        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(active_state())
            .when_action(BookingAction::CleanupResponded {
                flight_id: FlightId::new(1),
                result: Err(ApiError::transport("timeout")),
            })
            .then_state(|state| {
                assert!(state.last_error.is_none());
            })
            .run();
    }

    #[test]
    fn reconciled_removals_never_surface() {
        ReducerTest::new(SessionReducer::new())
            .with_env(test_env())
            .given_state(active_state())
            .when_action(BookingAction::HoldRemovalResponded {
                flight_id: FlightId::new(1),
                result: Err(ApiError::not_found("wish not found")),
            })
            .then_state(|state| {
                assert!(state.last_error.is_none());
            })
            .run();
    }

    #[test]
    fn combined_reducer_settles_domain_state_before_the_sweep() {
        // A failed purchase both marks the hold Failed (purchase reducer)
        // and surfaces the error (session sweep) in one reduction.
        let mut state = active_state();
        state.cart.insert_pending(FlightId::new(1), test_clock().now());
        state.cart.hold_mut(FlightId::new(1)).unwrap().phase = HoldPhase::Purchasing;

        ReducerTest::new(booking_reducer())
            .with_env(test_env())
            .given_state(state)
            .when_action(BookingAction::PurchaseResponded {
                flight_id: FlightId::new(1),
                result: Err(ApiError::conflict("not available seats")),
            })
            .then_state(|state| {
                assert_eq!(
                    state.cart.hold(FlightId::new(1)).unwrap().phase,
                    HoldPhase::Failed
                );
                assert!(matches!(state.last_error, Some(ApiError::Conflict { .. })));
                assert!(state.is_active());
            })
            .run();
    }
}
