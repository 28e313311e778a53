//! Hanamo Home Cafe ordering core
//!
//! The state machine behind the café's single-drink ordering form. A customer
//! picks a base, a milk and toppings, leaves a pickup name and phone number,
//! and submits. Everything visual is a presentation layer that reads
//! [`OrderSession`] state and sends [`DraftEvent`]s into it.
//!
//! # Architecture
//!
//! ```text
//!   DraftEvent ──► OrderSession ──► Store ──► OrderReducer
//!                                                 │
//!                       ┌─────────────────────────┤ Effect::Run
//!                       ▼                         ▼
//!                  DraftStore                OrderState
//!         (file / memory / disabled)   (Editing ⇄ Submitted)
//! ```
//!
//! # Lifecycle
//!
//! ```text
//! start ──► Editing ──submit (valid)──► Submitted ──reset──► Editing
//!             │  ▲
//!             └──┘ edits, invalid submit
//! ```
//!
//! - Edits are accepted without validation and persisted after each change
//! - Submission checks name, phone and base in that order, first failure wins
//! - The persisted draft is restored when a session starts and cleared on reset
//! - Storage failures are logged and otherwise ignored
//!
//! # Usage
//!
//! ```ignore
//! use hanamo_order::*;
//!
//! let config = Config::from_env();
//! let env = OrderEnvironment::new(config.draft_store(), Arc::new(ThreadRandom), Arc::new(SystemClock));
//! let mut session = OrderSession::start(env);
//!
//! session.set_name("Mina")?;
//! session.set_phone("555-123-4567")?;
//! session.set_base(BaseKind::Matcha)?;
//! println!("{}", Receipt::from(session.submit()?));
//! ```

pub mod config;
pub mod draft_store;
pub mod order_id;
pub mod receipt;
pub mod reducer;
pub mod session;
pub mod types;
pub mod validation;

pub use config::{Config, StorageBackend};
pub use draft_store::{
    DisabledDraftStore, DraftStore, DraftStoreError, FileDraftStore, InMemoryDraftStore,
    SerializedDraft,
};
pub use order_id::{OrderIdGenerator, RandomSource, SeededRandom, SequenceRandom, ThreadRandom};
pub use receipt::Receipt;
pub use reducer::{OrderEnvironment, OrderReducer};
pub use session::OrderSession;
pub use types::*;
pub use validation::OrderError;
