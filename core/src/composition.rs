//! Reducer composition utilities
//!
//! This module provides utilities for composing reducers in various ways:
//! - **`combine_reducers`**: Run multiple reducers on the same state/action
//! - **`scope_reducer`**: Focus a reducer on a subset of state
//!
//! # Examples
//!
//! ## Combining Reducers
//!
//! ```
//! use voa_core::{Effect, Reducer, SmallVec, smallvec};
//! use voa_core::composition::combine_reducers;
//!
//! #[derive(Clone, Default)]
//! struct SessionState {
//!     searches: u32,
//!     errors: u32,
//! }
//!
//! #[derive(Clone)]
//! enum SessionAction {
//!     Search,
//!     Failed,
//! }
//!
//! struct SearchReducer;
//! struct ErrorReducer;
//!
//! impl Reducer for SearchReducer {
//!     type State = SessionState;
//!     type Action = SessionAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Self::State, action: Self::Action, _env: &Self::Environment) -> SmallVec<[Effect<Self::Action>; 4]> {
//!         if matches!(action, SessionAction::Search) {
//!             state.searches += 1;
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! impl Reducer for ErrorReducer {
//!     type State = SessionState;
//!     type Action = SessionAction;
//!     type Environment = ();
//!
//!     fn reduce(&self, state: &mut Self::State, action: Self::Action, _env: &Self::Environment) -> SmallVec<[Effect<Self::Action>; 4]> {
//!         if matches!(action, SessionAction::Failed) {
//!             state.errors += 1;
//!         }
//!         smallvec![Effect::None]
//!     }
//! }
//!
//! // Every reducer sees every action; effects are concatenated
//! let combined = combine_reducers(vec![Box::new(SearchReducer), Box::new(ErrorReducer)]);
//!
//! let mut state = SessionState::default();
//! let _ = combined.reduce(&mut state, SessionAction::Search, &());
//! assert_eq!(state.searches, 1);
//! assert_eq!(state.errors, 0);
//! ```

use crate::effect::Effect;
use crate::reducer::Reducer;

/// Combines multiple reducers that operate on the same state and action types.
///
/// Each reducer is run in sequence, and all effects are collected and concatenated.
/// This is useful when you want to split reducer logic across multiple implementations
/// that share one state, e.g. independent components of a session reduced by one store.
///
/// Order matters: a reducer later in the vector observes the state writes of
/// the earlier ones for the same action.
///
/// # Type Parameters
///
/// - `S`: The state type
/// - `A`: The action type
/// - `E`: The environment type
#[must_use]
pub fn combine_reducers<S, A, E>(
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
) -> CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    CombinedReducer { reducers }
}

/// A combined reducer that runs multiple reducers in sequence.
///
/// Created by [`combine_reducers`].
pub struct CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    reducers: Vec<Box<dyn Reducer<State = S, Action = A, Environment = E> + Send + Sync>>,
}

impl<S, A, E> Reducer for CombinedReducer<S, A, E>
where
    S: 'static,
    A: Clone + 'static,
    E: 'static,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> smallvec::SmallVec<[Effect<Self::Action>; 4]> {
        let mut all_effects = smallvec::SmallVec::new();

        for reducer in &self.reducers {
            let effects = reducer.reduce(state, action.clone(), env);
            all_effects.extend(effects);
        }

        all_effects
    }
}

/// Scopes a reducer to operate on a subset of a larger state.
///
/// This allows you to reuse reducers designed for smaller state types
/// within a larger application state.
///
/// # Type Parameters
///
/// - `S`: The parent state type
/// - `SubS`: The child state type (subset of `S`)
/// - `A`: The action type
/// - `E`: The environment type
///
/// # Examples
///
/// ```
/// use voa_core::{Effect, Reducer, SmallVec, smallvec};
/// use voa_core::composition::scope_reducer;
///
/// // Child state and reducer
/// #[derive(Clone, Default)]
/// struct CartState {
///     held: u32,
/// }
///
/// #[derive(Clone)]
/// enum CartAction {
///     Hold,
///     Release,
/// }
///
/// struct CartReducer;
///
/// impl Reducer for CartReducer {
///     type State = CartState;
///     type Action = CartAction;
///     type Environment = ();
///
///     fn reduce(&self, state: &mut Self::State, action: Self::Action, _env: &Self::Environment) -> SmallVec<[Effect<Self::Action>; 4]> {
///         match action {
///             CartAction::Hold => state.held += 1,
///             CartAction::Release => state.held = state.held.saturating_sub(1),
///         }
///         smallvec![Effect::None]
///     }
/// }
///
/// // Parent state
/// #[derive(Clone, Default)]
/// struct SessionState {
///     cart: CartState,
///     user: String,
/// }
///
/// // Scope the cart reducer to work with SessionState
/// let scoped = scope_reducer(
///     CartReducer,
///     |session: &SessionState| &session.cart,
///     |session: &mut SessionState, cart: CartState| {
///         session.cart = cart;
///     },
/// );
///
/// let mut state = SessionState::default();
/// let _ = scoped.reduce(&mut state, CartAction::Hold, &());
/// assert_eq!(state.cart.held, 1);
/// ```
pub fn scope_reducer<S, SubS, A, E, R>(
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
) -> ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    ScopedReducer {
        reducer,
        get_state,
        set_state,
        _phantom: std::marker::PhantomData,
    }
}

/// A scoped reducer that operates on a subset of state.
///
/// Created by [`scope_reducer`].
pub struct ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    reducer: R,
    get_state: fn(&S) -> &SubS,
    set_state: fn(&mut S, SubS),
    _phantom: std::marker::PhantomData<(A, E)>,
}

impl<S, SubS, A, E, R> Reducer for ScopedReducer<S, SubS, A, E, R>
where
    S: 'static,
    SubS: Clone + 'static,
    A: 'static,
    E: 'static,
    R: Reducer<State = SubS, Action = A, Environment = E>,
{
    type State = S;
    type Action = A;
    type Environment = E;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> smallvec::SmallVec<[Effect<Self::Action>; 4]> {
        // Extract the sub-state
        let sub_state = (self.get_state)(state).clone();

        // Create a mutable copy
        let mut mutable_sub_state = sub_state;

        // Run the reducer on the sub-state
        let effects = self.reducer.reduce(&mut mutable_sub_state, action, env);

        // Write the updated sub-state back
        (self.set_state)(state, mutable_sub_state);

        effects
    }
}
