//! # Hanamo Runtime
//!
//! Runtime implementation for the Hanamo ordering core.
//!
//! This crate provides the [`Store`] that coordinates reducer execution and
//! effect handling. The ordering core has exactly one actor (the customer
//! composing one order), so the store is synchronous: every `send` reduces
//! the action, executes the returned effects in order and reduces any action
//! those effects feed back, all before returning.
//!
//! ## Example
//!
//! ```ignore
//! use hanamo_runtime::Store;
//!
//! let mut store = Store::new(initial_state, my_reducer, environment);
//!
//! // Send an action
//! store.send(Action::DoSomething)?;
//!
//! // Read state
//! let value = store.state(|s| s.some_field);
//! ```

use hanamo_core::{effect::Effect, reducer::Reducer};

/// Maximum number of nested feedback actions a single `send` may produce.
pub const MAX_FEEDBACK_DEPTH: usize = 32;

/// Error types for the Store runtime
pub mod error {
    use thiserror::Error;

    /// Errors that can occur during Store operations
    #[derive(Error, Debug, Clone, PartialEq, Eq)]
    pub enum StoreError {
        /// Effects kept feeding actions back into the reducer
        ///
        /// The chain is cut at the limit; state changes made up to that point
        /// are kept.
        #[error("Effect feedback exceeded {limit} nested actions")]
        FeedbackLimitExceeded {
            /// The configured nesting limit
            limit: usize,
        },
    }
}

pub use error::StoreError;

/// The Store - runtime for reducers
///
/// # Type Parameters
///
/// - `S`: State type
/// - `A`: Action type
/// - `E`: Environment type
/// - `R`: Reducer implementation
pub struct Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    state: S,
    reducer: R,
    environment: E,
}

impl<S, A, E, R> Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
{
    /// Create a new store with initial state, reducer, and environment
    #[must_use]
    pub const fn new(initial_state: S, reducer: R, environment: E) -> Self {
        Self {
            state: initial_state,
            reducer,
            environment,
        }
    }

    /// Send an action to the store
    ///
    /// Reduces the action, then executes the resulting effects depth-first.
    /// Actions produced by [`Effect::Run`] are reduced immediately, so by the
    /// time this returns the state reflects the whole feedback chain.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::FeedbackLimitExceeded`] if effects feed back more
    /// than [`MAX_FEEDBACK_DEPTH`] nested actions.
    #[tracing::instrument(skip_all, name = "store_send")]
    pub fn send(&mut self, action: A) -> Result<(), StoreError> {
        self.dispatch(action, 0)
    }

    fn dispatch(&mut self, action: A, depth: usize) -> Result<(), StoreError> {
        if depth > MAX_FEEDBACK_DEPTH {
            tracing::error!(depth, "Effect feedback chain cut off");
            return Err(StoreError::FeedbackLimitExceeded {
                limit: MAX_FEEDBACK_DEPTH,
            });
        }

        let effects = self
            .reducer
            .reduce(&mut self.state, action, &self.environment);
        metrics::counter!("store.actions.processed").increment(1);

        for effect in effects {
            self.execute(effect, depth)?;
        }

        Ok(())
    }

    fn execute(&mut self, effect: Effect<A>, depth: usize) -> Result<(), StoreError> {
        match effect {
            Effect::None => Ok(()),
            Effect::Sequential(effects) => {
                for effect in effects {
                    self.execute(effect, depth)?;
                }
                Ok(())
            },
            Effect::Run(task) => {
                metrics::counter!("store.effects.executed").increment(1);
                match task() {
                    Some(feedback) => {
                        tracing::trace!(depth = depth + 1, "Effect produced feedback action");
                        self.dispatch(feedback, depth + 1)
                    },
                    None => Ok(()),
                }
            },
        }
    }

    /// Read a value derived from the current state
    pub fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&S) -> T,
    {
        f(&self.state)
    }

    /// Borrow the current state
    #[must_use]
    pub const fn state_ref(&self) -> &S {
        &self.state
    }

    /// Borrow the injected environment
    #[must_use]
    pub const fn environment(&self) -> &E {
        &self.environment
    }

    /// Consume the store, returning its final state
    #[must_use]
    pub fn into_state(self) -> S {
        self.state
    }
}

impl<S, A, E, R> std::fmt::Debug for Store<S, A, E, R>
where
    R: Reducer<State = S, Action = A, Environment = E>,
    S: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
