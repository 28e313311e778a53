//! Reducer logic for an ordering session.
//!
//! Field edits mutate the draft and persist it, `Submit` validates and
//! freezes the draft into a record, `Reset` starts over. Storage access is
//! never performed here; it is returned as [`Effect::Run`] descriptions the
//! store executes afterwards.

use crate::draft_store::{DraftStore, SerializedDraft};
use crate::order_id::{OrderIdGenerator, RandomSource};
use crate::types::{OrderAction, OrderDraft, OrderId, OrderRecord, OrderState, SessionPhase};
use crate::validation::{self, OrderError};
use hanamo_core::{effect::Effect, environment::Clock, reducer::Reducer, smallvec, SmallVec};
use std::sync::Arc;

/// How many ids are drawn before giving up on finding one unused in the session
pub const MAX_ID_ATTEMPTS: usize = 16;

/// Environment dependencies for the order reducer
#[derive(Clone)]
pub struct OrderEnvironment {
    /// Where the in-progress draft is persisted
    pub draft_store: Arc<dyn DraftStore>,
    /// Randomness for order ids
    pub random: Arc<dyn RandomSource>,
    /// Clock for placement timestamps
    pub clock: Arc<dyn Clock>,
    /// Order id format
    pub id_generator: OrderIdGenerator,
}

impl OrderEnvironment {
    /// Creates an environment using the default `HANA-` id prefix
    #[must_use]
    pub fn new(
        draft_store: Arc<dyn DraftStore>,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            draft_store,
            random,
            clock,
            id_generator: OrderIdGenerator::default(),
        }
    }

    /// Replaces the order id generator
    #[must_use]
    pub fn with_id_generator(mut self, id_generator: OrderIdGenerator) -> Self {
        self.id_generator = id_generator;
        self
    }
}

/// Reducer for an ordering session
#[derive(Clone, Debug, Default)]
pub struct OrderReducer;

impl OrderReducer {
    /// Creates a new `OrderReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Applies an event to state
    pub fn apply_event(state: &mut OrderState, action: &OrderAction) {
        match action {
            OrderAction::DraftRestored { draft } => {
                if state.is_editing() {
                    state.draft.clone_from(draft);
                }
            },
            OrderAction::OrderPlaced { record } => {
                state.issued_ids.insert(record.order_id.clone());
                state.record = Some(record.clone());
                state.phase = SessionPhase::Submitted;
                state.last_error = None;
            },
            OrderAction::ValidationFailed { error } => {
                state.last_error = Some(error.clone());
            },
            // Commands are not applied to state
            OrderAction::SetName { .. }
            | OrderAction::SetPhone { .. }
            | OrderAction::SetBase { .. }
            | OrderAction::SetMilk { .. }
            | OrderAction::ToggleTopping { .. }
            | OrderAction::Submit
            | OrderAction::Reset
            | OrderAction::Hydrate => {},
        }
    }

    /// Records a rejected command and produces no effects
    fn reject(state: &mut OrderState, error: OrderError) -> SmallVec<[Effect<OrderAction>; 4]> {
        tracing::warn!(reason = error.reason(), "Order command rejected: {error}");
        metrics::counter!("orders.validation_failed", "reason" => error.reason()).increment(1);
        Self::apply_event(state, &OrderAction::ValidationFailed { error });
        SmallVec::new()
    }

    /// Applies a field edit while editing, then persists the draft
    fn edit<F>(
        state: &mut OrderState,
        env: &OrderEnvironment,
        mutate: F,
    ) -> SmallVec<[Effect<OrderAction>; 4]>
    where
        F: FnOnce(&mut OrderDraft),
    {
        if !state.is_editing() {
            return Self::reject(state, OrderError::NotEditing);
        }

        mutate(&mut state.draft);
        smallvec![Self::save_effect(&state.draft, env)]
    }

    /// Draws an order id not yet issued in this session
    fn mint_order_id(state: &OrderState, env: &OrderEnvironment) -> Result<OrderId, OrderError> {
        for attempt in 1..=MAX_ID_ATTEMPTS {
            let id = env.id_generator.generate(env.random.as_ref());
            if !state.issued_ids.contains(&id) {
                return Ok(id);
            }
            tracing::debug!(attempt, order_id = %id, "Order id already issued, drawing again");
        }
        Err(OrderError::OrderIdUnavailable)
    }

    /// Creates a fire-and-forget effect storing the draft
    fn save_effect(draft: &OrderDraft, env: &OrderEnvironment) -> Effect<OrderAction> {
        let payload = match SerializedDraft::encode(draft) {
            Ok(payload) => payload,
            Err(error) => {
                tracing::error!(%error, "Failed to encode draft, not persisting");
                return Effect::None;
            },
        };

        let store = Arc::clone(&env.draft_store);
        Effect::run(move || {
            if let Err(error) = store.save(payload) {
                tracing::warn!(%error, "Draft not saved, continuing in memory");
            }
            None
        })
    }

    /// Creates a fire-and-forget effect deleting the stored draft
    fn clear_effect(env: &OrderEnvironment) -> Effect<OrderAction> {
        let store = Arc::clone(&env.draft_store);
        Effect::run(move || {
            if let Err(error) = store.clear() {
                tracing::warn!(%error, "Stored draft not cleared");
            }
            None
        })
    }

    /// Creates an effect loading the stored draft and feeding it back
    fn load_effect(env: &OrderEnvironment) -> Effect<OrderAction> {
        let store = Arc::clone(&env.draft_store);
        Effect::run(move || match store.load() {
            Ok(Some(payload)) => payload
                .decode()
                .map(|draft| OrderAction::DraftRestored { draft }),
            Ok(None) => None,
            Err(error) => {
                tracing::warn!(%error, "Draft storage unavailable, starting with an empty draft");
                None
            },
        })
    }
}

impl Reducer for OrderReducer {
    type State = OrderState;
    type Action = OrderAction;
    type Environment = OrderEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        // Errors only ever describe the latest command
        if action.is_command() {
            state.last_error = None;
        }

        match action {
            // ========== Commands ==========
            OrderAction::SetName { name } => Self::edit(state, env, |draft| draft.set_name(name)),
            OrderAction::SetPhone { phone } => {
                Self::edit(state, env, |draft| draft.set_phone(phone))
            },
            OrderAction::SetBase { base } => Self::edit(state, env, |draft| draft.set_base(base)),
            OrderAction::SetMilk { milk } => Self::edit(state, env, |draft| draft.set_milk(milk)),
            OrderAction::ToggleTopping { topping } => Self::edit(state, env, |draft| {
                draft.toggle_topping(topping);
            }),

            OrderAction::Submit => {
                if !state.is_editing() {
                    return Self::reject(state, OrderError::NotEditing);
                }

                let base = match validation::validate_for_submit(&state.draft) {
                    Ok(base) => base,
                    Err(error) => return Self::reject(state, error),
                };

                let order_id = match Self::mint_order_id(state, env) {
                    Ok(order_id) => order_id,
                    Err(error) => return Self::reject(state, error),
                };

                let record = OrderRecord::freeze(order_id, &state.draft, base, env.clock.now());
                tracing::info!(
                    order_id = %record.order_id,
                    base = record.base.key(),
                    milk = record.milk.key(),
                    toppings = record.toppings.len(),
                    "Order placed"
                );
                metrics::counter!("orders.submitted").increment(1);

                Self::apply_event(state, &OrderAction::OrderPlaced { record });
                smallvec![Effect::None]
            },

            OrderAction::Reset => {
                state.phase = SessionPhase::Editing;
                state.draft = OrderDraft::default();
                state.record = None;
                tracing::info!("Order session reset");
                metrics::counter!("orders.reset").increment(1);
                smallvec![Self::clear_effect(env)]
            },

            OrderAction::Hydrate => {
                if !state.is_editing() {
                    tracing::debug!(phase = %state.phase, "Ignoring draft hydration outside editing");
                    return SmallVec::new();
                }
                smallvec![Self::load_effect(env)]
            },

            // ========== Events ==========
            OrderAction::DraftRestored { .. }
            | OrderAction::OrderPlaced { .. }
            | OrderAction::ValidationFailed { .. } => {
                Self::apply_event(state, &action);
                SmallVec::new()
            },
        }
    }
}
