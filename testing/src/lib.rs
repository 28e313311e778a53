//! # Hanamo Testing
//!
//! Testing utilities and helpers for the Hanamo ordering core.
//!
//! This crate provides:
//! - A fixed [`Clock`] for deterministic timestamps
//! - [`ReducerTest`], a Given-When-Then harness for reducers
//! - Helpers for executing effect descriptions outside a store
//!
//! ## Example
//!
//! ```ignore
//! use hanamo_testing::{test_clock, ReducerTest};
//!
//! ReducerTest::new(OrderReducer::new())
//!     .with_env(test_environment())
//!     .given_state(OrderState::new())
//!     .when_action(OrderAction::SetName { name: "Mina".into() })
//!     .then_state(|state| assert_eq!(state.draft.name, "Mina"))
//!     .run();
//! ```

use chrono::{DateTime, Utc};
use hanamo_core::effect::Effect;
use hanamo_core::environment::Clock;


pub use reducer_test::{assertions, ReducerTest};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use hanamo_testing::mocks::FixedClock;
    /// use hanamo_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// This function will panic if the hardcoded timestamp fails to parse,
    /// which should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Execute effect descriptions in order and collect the actions they feed back
///
/// Unlike the store, feedback actions are returned rather than reduced, so a
/// test can assert on exactly what a side effect produced.
pub fn run_effects<A, I>(effects: I) -> Vec<A>
where
    I: IntoIterator<Item = Effect<A>>,
{
    let mut feedback = Vec::new();
    for effect in effects {
        collect(effect, &mut feedback);
    }
    feedback
}

fn collect<A>(effect: Effect<A>, feedback: &mut Vec<A>) {
    match effect {
        Effect::None => {},
        Effect::Sequential(effects) => {
            for effect in effects {
                collect(effect, feedback);
            }
        },
        Effect::Run(task) => {
            if let Some(action) = task() {
                feedback.push(action);
            }
        },
    }
}

// Re-export commonly used items
pub use mocks::{test_clock, FixedClock};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = test_clock();
        assert_eq!(clock.now(), clock.now());
        assert_eq!(clock.now().to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn run_effects_collects_feedback_in_order() {
        let effects = vec![
            Effect::run(|| Some(1)),
            Effect::None,
            Effect::chain(vec![Effect::run(|| None), Effect::run(|| Some(2))]),
            Effect::run(|| Some(3)),
        ];

        assert_eq!(run_effects(effects), vec![1, 2, 3]);
    }
}
