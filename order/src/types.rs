//! Domain types for the Hanamo ordering form.
//!
//! A customer composes exactly one drink: a base, a milk and any set of
//! toppings, plus the contact details the café texts when the drink is
//! ready. The in-progress input is an [`OrderDraft`]; a successful submission
//! freezes it into an immutable [`OrderRecord`].

use crate::validation::OrderError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A menu key that did not name any known option
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown {kind} '{value}'")]
pub struct UnknownMenuKey {
    /// Which menu was searched (`base`, `milk`, `topping`)
    pub kind: &'static str,
    /// The rejected input
    pub value: String,
}

/// Drink base, the one required choice
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BaseKind {
    /// Matcha
    #[serde(rename = "matcha")]
    Matcha,
    /// Vietnamese coffee
    #[serde(rename = "viet")]
    VietCoffee,
}

impl BaseKind {
    /// Every base in menu order
    pub const ALL: [Self; 2] = [Self::Matcha, Self::VietCoffee];

    /// Stable key used in stored drafts
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Matcha => "matcha",
            Self::VietCoffee => "viet",
        }
    }

    /// Name shown on the menu and the receipt
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Matcha => "Matcha",
            Self::VietCoffee => "Viet Coffee",
        }
    }

    /// Short flavour note shown under the menu entry
    #[must_use]
    pub const fn tagline(self) -> &'static str {
        match self {
            Self::Matcha => "earthy, vibrant",
            Self::VietCoffee => "bold, sweet",
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for BaseKind {
    type Err = UnknownMenuKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .into_iter()
            .find(|base| base.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| UnknownMenuKey {
                kind: "base",
                value: s.to_string(),
            })
    }
}

/// Milk choice, always set
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum MilkKind {
    /// Whole milk
    #[default]
    Whole,
    /// Oat milk
    Oat,
}

impl MilkKind {
    /// Every milk in menu order
    pub const ALL: [Self; 2] = [Self::Whole, Self::Oat];

    /// Stable key used in stored drafts
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Whole => "whole",
            Self::Oat => "oat",
        }
    }

    /// Label on the menu button
    #[must_use]
    pub const fn menu_label(self) -> &'static str {
        match self {
            Self::Whole => "Whole milk",
            Self::Oat => "Oat milk",
        }
    }

    /// Name printed on the receipt
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Whole => "Whole",
            Self::Oat => "Oat",
        }
    }
}

impl fmt::Display for MilkKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for MilkKind {
    type Err = UnknownMenuKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .into_iter()
            .find(|milk| milk.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| UnknownMenuKey {
                kind: "milk",
                value: s.to_string(),
            })
    }
}

/// Optional add-on; any combination may be chosen
///
/// Ordering follows the menu, which is also the order toppings are listed on
/// the receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToppingKind {
    /// Strawberry
    Strawberry,
    /// Ube cream
    Ube,
    /// Egg cream
    Egg,
    /// Salted cream
    Salted,
}

impl ToppingKind {
    /// Every topping in menu order
    pub const ALL: [Self; 4] = [Self::Strawberry, Self::Ube, Self::Egg, Self::Salted];

    /// Stable key used in stored drafts
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Strawberry => "strawberry",
            Self::Ube => "ube",
            Self::Egg => "egg",
            Self::Salted => "salted",
        }
    }

    /// Name shown on the menu and the receipt
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Strawberry => "Strawberry",
            Self::Ube => "Ube cream",
            Self::Egg => "Egg cream",
            Self::Salted => "Salted cream",
        }
    }
}

impl fmt::Display for ToppingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for ToppingKind {
    type Err = UnknownMenuKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        Self::ALL
            .into_iter()
            .find(|topping| topping.key().eq_ignore_ascii_case(key))
            .ok_or_else(|| UnknownMenuKey {
                kind: "topping",
                value: s.to_string(),
            })
    }
}

/// The customer's in-progress, unsubmitted input
///
/// Mutators accept anything their types allow; all validation happens at
/// submission. Serializes to the stored draft layout
/// `{"name", "phone", "base", "milk", "toppings"}`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderDraft {
    /// Pickup name, free text
    pub name: String,
    /// Phone number to text, free text until submission
    pub phone: String,
    /// Chosen base, unset until picked
    pub base: Option<BaseKind>,
    /// Chosen milk
    pub milk: MilkKind,
    /// Chosen toppings
    pub toppings: BTreeSet<ToppingKind>,
}

impl OrderDraft {
    /// Creates an all-defaults draft
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the pickup name
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Replaces the phone number
    pub fn set_phone(&mut self, phone: impl Into<String>) {
        self.phone = phone.into();
    }

    /// Picks the drink base
    pub const fn set_base(&mut self, base: BaseKind) {
        self.base = Some(base);
    }

    /// Picks the milk
    pub const fn set_milk(&mut self, milk: MilkKind) {
        self.milk = milk;
    }

    /// Adds the topping if absent, removes it if present
    ///
    /// Returns whether the topping is selected afterwards.
    pub fn toggle_topping(&mut self, topping: ToppingKind) -> bool {
        if self.toppings.remove(&topping) {
            false
        } else {
            self.toppings.insert(topping);
            true
        }
    }

    /// Whether the topping is currently selected
    #[must_use]
    pub fn has_topping(&self, topping: ToppingKind) -> bool {
        self.toppings.contains(&topping)
    }

    /// Whether every field still holds its default
    #[must_use]
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Identifier handed to the customer after a successful submission
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderId(String);

impl OrderId {
    /// Wraps an already formatted identifier
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Immutable snapshot of a draft taken at successful submission
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Identifier shown to the barista
    pub order_id: OrderId,
    /// Pickup name as entered
    pub name: String,
    /// Phone number as entered
    pub phone: String,
    /// Drink base
    pub base: BaseKind,
    /// Milk
    pub milk: MilkKind,
    /// Toppings
    pub toppings: BTreeSet<ToppingKind>,
    /// When the order was placed
    pub placed_at: DateTime<Utc>,
}

impl OrderRecord {
    /// Freezes a draft whose base has already been validated
    #[must_use]
    pub fn freeze(
        order_id: OrderId,
        draft: &OrderDraft,
        base: BaseKind,
        placed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            order_id,
            name: draft.name.clone(),
            phone: draft.phone.clone(),
            base,
            milk: draft.milk,
            toppings: draft.toppings.clone(),
            placed_at,
        }
    }
}

/// Where the session is in its lifecycle
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// The customer is composing the draft
    #[default]
    Editing,
    /// A record has been produced and is on display until reset
    Submitted,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Editing => f.write_str("editing"),
            Self::Submitted => f.write_str("submitted"),
        }
    }
}

/// State of one ordering session
#[derive(Clone, Debug, Default)]
pub struct OrderState {
    /// Lifecycle phase
    pub phase: SessionPhase,
    /// The live draft, kept after submission until reset
    pub draft: OrderDraft,
    /// The placed order while `Submitted`
    pub record: Option<OrderRecord>,
    /// Failure reported by the most recent command, if any
    pub last_error: Option<OrderError>,
    /// Every order id handed out during this session
    pub issued_ids: HashSet<OrderId>,
}

impl OrderState {
    /// Creates a fresh session state with an empty draft
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the draft can currently be edited or submitted
    #[must_use]
    pub fn is_editing(&self) -> bool {
        self.phase == SessionPhase::Editing
    }

    /// Whether an order record is on display
    #[must_use]
    pub fn is_submitted(&self) -> bool {
        self.phase == SessionPhase::Submitted
    }
}

/// Commands dispatched by the presentation layer
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DraftEvent {
    /// The name field changed
    SetName(String),
    /// The phone field changed
    SetPhone(String),
    /// A base was picked
    SetBase(BaseKind),
    /// A milk was picked
    SetMilk(MilkKind),
    /// A topping chip was tapped
    ToggleTopping(ToppingKind),
    /// The form was submitted
    Submit,
    /// "Place another order"
    Reset,
}

/// Actions representing commands and events for an ordering session
///
/// Commands come from the customer (through [`DraftEvent`]) or the session
/// itself (`Hydrate`). Events record what happened and may be fed back by
/// effects or replayed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrderAction {
    // ========== Commands ==========
    /// Command: Replace the pickup name
    SetName {
        /// New name
        name: String,
    },

    /// Command: Replace the phone number
    SetPhone {
        /// New phone number
        phone: String,
    },

    /// Command: Pick the base
    SetBase {
        /// Picked base
        base: BaseKind,
    },

    /// Command: Pick the milk
    SetMilk {
        /// Picked milk
        milk: MilkKind,
    },

    /// Command: Toggle a topping
    ToggleTopping {
        /// Topping to add or remove
        topping: ToppingKind,
    },

    /// Command: Validate and place the order
    Submit,

    /// Command: Discard the order and start a fresh draft
    Reset,

    /// Command: Restore a previously stored draft
    Hydrate,

    // ========== Events ==========
    /// Event: A stored draft was loaded
    DraftRestored {
        /// Decoded draft
        draft: OrderDraft,
    },

    /// Event: The order was placed
    OrderPlaced {
        /// Frozen record
        record: OrderRecord,
    },

    /// Event: A command was rejected
    ValidationFailed {
        /// Why
        error: OrderError,
    },
}

impl OrderAction {
    /// Returns true if this variant is a command
    #[must_use]
    pub const fn is_command(&self) -> bool {
        !self.is_event()
    }

    /// Returns true if this variant is an event
    #[must_use]
    pub const fn is_event(&self) -> bool {
        matches!(
            self,
            Self::DraftRestored { .. } | Self::OrderPlaced { .. } | Self::ValidationFailed { .. }
        )
    }
}

impl From<DraftEvent> for OrderAction {
    fn from(event: DraftEvent) -> Self {
        match event {
            DraftEvent::SetName(name) => Self::SetName { name },
            DraftEvent::SetPhone(phone) => Self::SetPhone { phone },
            DraftEvent::SetBase(base) => Self::SetBase { base },
            DraftEvent::SetMilk(milk) => Self::SetMilk { milk },
            DraftEvent::ToggleTopping(topping) => Self::ToggleTopping { topping },
            DraftEvent::Submit => Self::Submit,
            DraftEvent::Reset => Self::Reset,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn menu_keys_parse_case_insensitively() {
        assert_eq!("Matcha".parse::<BaseKind>(), Ok(BaseKind::Matcha));
        assert_eq!(" viet ".parse::<BaseKind>(), Ok(BaseKind::VietCoffee));
        assert_eq!("OAT".parse::<MilkKind>(), Ok(MilkKind::Oat));
        assert_eq!("ube".parse::<ToppingKind>(), Ok(ToppingKind::Ube));
    }

    #[test]
    fn unknown_menu_key_is_reported() {
        let err = "boba".parse::<ToppingKind>().unwrap_err();
        assert_eq!(err.kind, "topping");
        assert_eq!(err.to_string(), "Unknown topping 'boba'");
    }

    #[test]
    fn draft_defaults() {
        let draft = OrderDraft::new();
        assert_eq!(draft.name, "");
        assert_eq!(draft.phone, "");
        assert_eq!(draft.base, None);
        assert_eq!(draft.milk, MilkKind::Whole);
        assert!(draft.toppings.is_empty());
        assert!(draft.is_empty());
    }

    #[test]
    fn toggle_topping_adds_then_removes() {
        let mut draft = OrderDraft::new();

        assert!(draft.toggle_topping(ToppingKind::Egg));
        assert!(draft.has_topping(ToppingKind::Egg));

        assert!(!draft.toggle_topping(ToppingKind::Egg));
        assert!(draft.toppings.is_empty());
    }

    #[test]
    fn draft_serializes_to_storage_layout() {
        let mut draft = OrderDraft::new();
        draft.set_name("Mina");
        draft.set_base(BaseKind::VietCoffee);
        draft.toggle_topping(ToppingKind::Salted);
        draft.toggle_topping(ToppingKind::Strawberry);

        let json = serde_json::to_value(&draft).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "name": "Mina",
                "phone": "",
                "base": "viet",
                "milk": "whole",
                "toppings": ["strawberry", "salted"],
            })
        );
    }

    #[test]
    fn record_freezes_draft_fields() {
        let mut draft = OrderDraft::new();
        draft.set_name("Mina");
        draft.set_phone("555-123-4567");
        draft.set_milk(MilkKind::Oat);
        draft.toggle_topping(ToppingKind::Ube);
        let now = Utc::now();

        let record = OrderRecord::freeze(OrderId::new("HANA-AB12"), &draft, BaseKind::Matcha, now);
        draft.set_name("Someone else");

        assert_eq!(record.name, "Mina");
        assert_eq!(record.phone, "555-123-4567");
        assert_eq!(record.base, BaseKind::Matcha);
        assert_eq!(record.milk, MilkKind::Oat);
        assert!(record.toppings.contains(&ToppingKind::Ube));
        assert_eq!(record.placed_at, now);
    }

    #[test]
    fn draft_events_map_to_commands() {
        let action = OrderAction::from(DraftEvent::ToggleTopping(ToppingKind::Egg));
        assert_eq!(
            action,
            OrderAction::ToggleTopping {
                topping: ToppingKind::Egg
            }
        );
        assert!(action.is_command());
        assert!(OrderAction::from(DraftEvent::Submit).is_command());
    }

    #[test]
    fn events_are_not_commands() {
        let action = OrderAction::ValidationFailed {
            error: OrderError::MissingName,
        };
        assert!(action.is_event());
        assert!(!action.is_command());
    }
}
