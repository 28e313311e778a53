//! The ordering session consumed by the presentation layer.
//!
//! [`OrderSession`] owns a [`Store`] running the [`OrderReducer`] and turns
//! the reducer's recorded `last_error` into a `Result` per command, so a UI
//! can render either the updated draft or the failure message.

use crate::reducer::{OrderEnvironment, OrderReducer};
use crate::types::{
    BaseKind, DraftEvent, MilkKind, OrderAction, OrderDraft, OrderRecord, OrderState,
    SessionPhase, ToppingKind,
};
use crate::validation::OrderError;
use hanamo_runtime::Store;

type OrderStore = Store<OrderState, OrderAction, OrderEnvironment, OrderReducer>;

/// One customer composing one order at a time
#[derive(Debug)]
pub struct OrderSession {
    store: OrderStore,
}

impl OrderSession {
    /// Starts a session, restoring any draft left in storage
    ///
    /// A missing, unreadable or malformed stored draft leaves the session on
    /// an empty draft.
    #[must_use]
    pub fn start(environment: OrderEnvironment) -> Self {
        let mut session = Self {
            store: Store::new(OrderState::new(), OrderReducer::new(), environment),
        };
        session.dispatch(OrderAction::Hydrate);

        tracing::debug!(
            restored = !session.draft().is_empty(),
            "Order session started"
        );
        session
    }

    /// Applies a customer command
    ///
    /// # Errors
    ///
    /// Returns the [`OrderError`] the command was rejected with. The session
    /// stays usable after any error.
    pub fn apply_event(&mut self, event: DraftEvent) -> Result<(), OrderError> {
        self.dispatch(OrderAction::from(event));
        self.last_error().cloned().map_or(Ok(()), Err)
    }

    /// Replaces the pickup name
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotEditing`] once the order has been placed.
    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), OrderError> {
        self.apply_event(DraftEvent::SetName(name.into()))
    }

    /// Replaces the phone number
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotEditing`] once the order has been placed.
    pub fn set_phone(&mut self, phone: impl Into<String>) -> Result<(), OrderError> {
        self.apply_event(DraftEvent::SetPhone(phone.into()))
    }

    /// Picks the base
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotEditing`] once the order has been placed.
    pub fn set_base(&mut self, base: BaseKind) -> Result<(), OrderError> {
        self.apply_event(DraftEvent::SetBase(base))
    }

    /// Picks the milk
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotEditing`] once the order has been placed.
    pub fn set_milk(&mut self, milk: MilkKind) -> Result<(), OrderError> {
        self.apply_event(DraftEvent::SetMilk(milk))
    }

    /// Adds or removes a topping
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::NotEditing`] once the order has been placed.
    pub fn toggle_topping(&mut self, topping: ToppingKind) -> Result<(), OrderError> {
        self.apply_event(DraftEvent::ToggleTopping(topping))
    }

    /// Validates the draft and places the order
    ///
    /// # Errors
    ///
    /// Returns the first failed check, [`OrderError::NotEditing`] if an order
    /// is already placed, or [`OrderError::OrderIdUnavailable`].
    pub fn submit(&mut self) -> Result<&OrderRecord, OrderError> {
        self.apply_event(DraftEvent::Submit)?;
        self.record().ok_or(OrderError::NotEditing)
    }

    /// Discards the current order and starts a fresh draft
    pub fn reset(&mut self) {
        self.dispatch(OrderAction::Reset);
    }

    /// Current lifecycle phase
    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.store.state_ref().phase
    }

    /// Whether an order record is on display
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.store.state_ref().is_submitted()
    }

    /// The live draft
    #[must_use]
    pub fn draft(&self) -> &OrderDraft {
        &self.store.state_ref().draft
    }

    /// The placed order, while submitted
    #[must_use]
    pub fn record(&self) -> Option<&OrderRecord> {
        self.store.state_ref().record.as_ref()
    }

    /// Failure reported by the most recent command
    #[must_use]
    pub fn last_error(&self) -> Option<&OrderError> {
        self.store.state_ref().last_error.as_ref()
    }

    /// Full session state
    #[must_use]
    pub fn state(&self) -> &OrderState {
        self.store.state_ref()
    }

    fn dispatch(&mut self, action: OrderAction) {
        // Order effects feed back at most one action, so the limit is never hit
        if let Err(error) = self.store.send(action) {
            tracing::error!(%error, "Order action dispatch failed");
        }
    }
}
