//! Order identifier generation.
//!
//! An order id is a fixed prefix followed by four characters drawn
//! uniformly from `[A-Z0-9]`, e.g. `HANA-7Q2X`. Randomness comes from an
//! injected [`RandomSource`] so tests and demos can be deterministic.

use crate::types::OrderId;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

/// Characters an order id suffix is drawn from
pub const ORDER_ID_ALPHABET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Number of random characters after the prefix
pub const ORDER_ID_SUFFIX_LEN: usize = 4;

/// Prefix used unless configured otherwise
pub const DEFAULT_ORDER_PREFIX: &str = "HANA-";

/// Source of uniformly distributed indices
pub trait RandomSource: Send + Sync {
    /// Returns a value in `0..upper`; `upper` of zero yields zero
    fn next_below(&self, upper: usize) -> usize;
}

/// Thread-local OS-seeded generator, for production
#[derive(Clone, Copy, Debug, Default)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_below(&self, upper: usize) -> usize {
        rand::thread_rng().gen_range(0..upper.max(1))
    }
}

/// Seeded generator, reproducible across runs
#[derive(Debug)]
pub struct SeededRandom {
    rng: Mutex<StdRng>,
}

impl SeededRandom {
    /// Creates a generator from a fixed seed
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }
}

impl RandomSource for SeededRandom {
    fn next_below(&self, upper: usize) -> usize {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.gen_range(0..upper.max(1))
    }
}

/// Replays a fixed list of values, wrapping around at the end
///
/// Each value is reduced modulo `upper`. An empty list always yields zero.
#[derive(Debug, Default)]
pub struct SequenceRandom {
    values: Vec<usize>,
    cursor: AtomicUsize,
}

impl SequenceRandom {
    /// Creates a source replaying `values`
    #[must_use]
    pub fn new(values: impl Into<Vec<usize>>) -> Self {
        Self {
            values: values.into(),
            cursor: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for SequenceRandom {
    fn next_below(&self, upper: usize) -> usize {
        if self.values.is_empty() || upper == 0 {
            return 0;
        }
        let position = self.cursor.fetch_add(1, Ordering::Relaxed) % self.values.len();
        self.values.get(position).copied().unwrap_or_default() % upper
    }
}

/// Builds order ids with a fixed prefix
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderIdGenerator {
    prefix: String,
}

impl OrderIdGenerator {
    /// Creates a generator using `prefix`
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// The fixed prefix
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Draws a new id
    #[must_use]
    pub fn generate(&self, random: &dyn RandomSource) -> OrderId {
        let mut id = String::with_capacity(self.prefix.len() + ORDER_ID_SUFFIX_LEN);
        id.push_str(&self.prefix);
        for _ in 0..ORDER_ID_SUFFIX_LEN {
            let index = random.next_below(ORDER_ID_ALPHABET.len()) % ORDER_ID_ALPHABET.len();
            id.push(char::from(ORDER_ID_ALPHABET[index]));
        }
        OrderId::new(id)
    }

    /// Whether `id` is this prefix followed by four characters from `[A-Z0-9]`
    #[must_use]
    pub fn matches(&self, id: &OrderId) -> bool {
        id.as_str().strip_prefix(self.prefix.as_str()).is_some_and(|suffix| {
            suffix.len() == ORDER_ID_SUFFIX_LEN
                && suffix.bytes().all(|b| ORDER_ID_ALPHABET.contains(&b))
        })
    }
}

impl Default for OrderIdGenerator {
    fn default() -> Self {
        Self::new(DEFAULT_ORDER_PREFIX)
    }
}
