//! Draft persistence so in-progress input survives a reload.
//!
//! The session reads the store once at start, writes it after every edit and
//! clears it on reset. Storage is best effort: every failure is logged and
//! swallowed by the session, which then carries on purely in memory.
//!
//! # Implementations
//!
//! - [`FileDraftStore`]: one JSON file per key, the local-storage analogue
//! - [`InMemoryDraftStore`]: process-local slot, shareable between sessions
//! - [`DisabledDraftStore`]: storage that is never available

use crate::types::{BaseKind, MilkKind, OrderDraft, ToppingKind};
use serde_json::Value;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Key the draft is stored under unless configured otherwise
pub const DEFAULT_DRAFT_KEY: &str = "hanamo_draft";

/// Errors that can occur during draft store operations.
#[derive(Error, Debug)]
pub enum DraftStoreError {
    /// The storage medium cannot be used right now.
    #[error("Draft storage unavailable: {0}")]
    Unavailable(String),

    /// Filesystem error.
    #[error("Draft storage I/O error: {0}")]
    Io(#[from] io::Error),

    /// Draft could not be encoded.
    #[error("Draft encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// Text encoding of an [`OrderDraft`]
///
/// JSON object with keys `name`, `phone`, `base`, `milk` and `toppings`. No
/// schema version is stored, so decoding tolerates missing, extra and
/// mistyped fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SerializedDraft(String);

impl SerializedDraft {
    /// Wraps raw stored text without checking it
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Encodes a draft
    ///
    /// # Errors
    ///
    /// Returns [`DraftStoreError::Encoding`] if serialization fails.
    pub fn encode(draft: &OrderDraft) -> Result<Self, DraftStoreError> {
        Ok(Self(serde_json::to_string(draft)?))
    }

    /// Returns the stored text
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Decodes the payload field by field
    ///
    /// Returns `None` when the text is not a JSON object at all. Otherwise
    /// every field that is missing or malformed falls back to its default,
    /// unknown topping keys are dropped and duplicates collapse.
    #[must_use]
    pub fn decode(&self) -> Option<OrderDraft> {
        let value: Value = match serde_json::from_str(&self.0) {
            Ok(value) => value,
            Err(error) => {
                tracing::warn!(%error, "Stored draft is not valid JSON, ignoring it");
                return None;
            },
        };

        let Value::Object(fields) = value else {
            tracing::warn!("Stored draft is not a JSON object, ignoring it");
            return None;
        };

        let text = |key: &str| fields.get(key).and_then(Value::as_str);
        let mut draft = OrderDraft::default();

        if let Some(name) = text("name") {
            draft.name = name.to_string();
        }
        if let Some(phone) = text("phone") {
            draft.phone = phone.to_string();
        }
        draft.base = text("base").and_then(|key| key.parse::<BaseKind>().ok());
        if let Some(milk) = text("milk").and_then(|key| key.parse::<MilkKind>().ok()) {
            draft.milk = milk;
        }
        if let Some(items) = fields.get("toppings").and_then(Value::as_array) {
            draft.toppings = items
                .iter()
                .filter_map(Value::as_str)
                .filter_map(|key| key.parse::<ToppingKind>().ok())
                .collect();
        }

        Some(draft)
    }
}

/// Key-value persistence for the single in-progress draft
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so the session environment can be
/// shared, even though one session only ever uses them from one thread.
pub trait DraftStore: Send + Sync {
    /// Reads the stored draft, `Ok(None)` when nothing is stored
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium cannot be read.
    fn load(&self) -> Result<Option<SerializedDraft>, DraftStoreError>;

    /// Stores the draft, replacing any previous one
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium cannot be written.
    fn save(&self, draft: SerializedDraft) -> Result<(), DraftStoreError>;

    /// Deletes the stored draft; deleting nothing is not an error
    ///
    /// # Errors
    ///
    /// Returns an error if the storage medium cannot be written.
    fn clear(&self) -> Result<(), DraftStoreError>;
}

/// In-memory draft slot
///
/// Clones share the same slot, so a test (or a host that rebuilds sessions)
/// can keep a handle and observe what the session wrote.
///
/// # Example
///
/// ```
/// use hanamo_order::draft_store::{DraftStore, InMemoryDraftStore, SerializedDraft};
///
/// let store = InMemoryDraftStore::new();
/// let handle = store.clone();
///
/// store.save(SerializedDraft::from_raw(r#"{"name":"Mina"}"#)).unwrap();
/// assert!(handle.load().unwrap().is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct InMemoryDraftStore {
    slot: Arc<RwLock<Option<SerializedDraft>>>,
}

impl InMemoryDraftStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store already holding the given raw payload
    #[must_use]
    pub fn with_payload(raw: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(RwLock::new(Some(SerializedDraft::from_raw(raw)))),
        }
    }

    /// Returns the stored payload text, if any
    #[must_use]
    pub fn contents(&self) -> Option<String> {
        self.slot
            .read()
            .ok()
            .and_then(|slot| slot.as_ref().map(|draft| draft.as_str().to_string()))
    }

    fn poisoned() -> DraftStoreError {
        DraftStoreError::Unavailable("draft slot lock poisoned".to_string())
    }
}

impl DraftStore for InMemoryDraftStore {
    fn load(&self) -> Result<Option<SerializedDraft>, DraftStoreError> {
        let slot = self.slot.read().map_err(|_| Self::poisoned())?;
        Ok(slot.clone())
    }

    fn save(&self, draft: SerializedDraft) -> Result<(), DraftStoreError> {
        let mut slot = self.slot.write().map_err(|_| Self::poisoned())?;
        *slot = Some(draft);
        Ok(())
    }

    fn clear(&self) -> Result<(), DraftStoreError> {
        let mut slot = self.slot.write().map_err(|_| Self::poisoned())?;
        *slot = None;
        Ok(())
    }
}

/// File-backed draft store
///
/// The draft lives in `<dir>/<key>.json`. Writes go to a temporary sibling
/// first and are renamed into place, so a crash never leaves half a draft.
#[derive(Clone, Debug)]
pub struct FileDraftStore {
    dir: PathBuf,
    key: String,
}

impl FileDraftStore {
    /// Creates a store for `key` inside `dir`; nothing is touched until first use
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            key: key.into(),
        }
    }

    /// Path of the stored draft
    #[must_use]
    pub fn path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.key))
    }

    fn temp_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json.tmp", self.key))
    }

    /// Directory holding the draft
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DraftStore for FileDraftStore {
    fn load(&self) -> Result<Option<SerializedDraft>, DraftStoreError> {
        match fs::read_to_string(self.path()) {
            Ok(raw) => Ok(Some(SerializedDraft::from_raw(raw))),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(error) => Err(error.into()),
        }
    }

    fn save(&self, draft: SerializedDraft) -> Result<(), DraftStoreError> {
        fs::create_dir_all(&self.dir)?;
        let temp = self.temp_path();
        fs::write(&temp, draft.as_str())?;
        fs::rename(&temp, self.path())?;
        Ok(())
    }

    fn clear(&self) -> Result<(), DraftStoreError> {
        match fs::remove_file(self.path()) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(error.into()),
        }
    }
}

/// Storage that is never available, e.g. private browsing or a read-only disk
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledDraftStore;

impl DraftStore for DisabledDraftStore {
    fn load(&self) -> Result<Option<SerializedDraft>, DraftStoreError> {
        Err(DraftStoreError::Unavailable("storage disabled".to_string()))
    }

    fn save(&self, _draft: SerializedDraft) -> Result<(), DraftStoreError> {
        Err(DraftStoreError::Unavailable("storage disabled".to_string()))
    }

    fn clear(&self) -> Result<(), DraftStoreError> {
        Err(DraftStoreError::Unavailable("storage disabled".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(raw: &str) -> Option<OrderDraft> {
        SerializedDraft::from_raw(raw).decode()
    }

    #[test]
    fn encode_then_decode_keeps_fields() {
        let mut draft = OrderDraft::new();
        draft.set_name("Mina");
        draft.set_phone("555-123-4567");
        draft.set_base(BaseKind::Matcha);
        draft.set_milk(MilkKind::Oat);
        draft.toggle_topping(ToppingKind::Strawberry);
        draft.toggle_topping(ToppingKind::Ube);

        let encoded = SerializedDraft::encode(&draft).unwrap();

        assert_eq!(encoded.decode(), Some(draft));
    }

    #[test]
    fn decodes_payload_written_by_the_web_form() {
        let draft = decode(
            r#"{"name":"Mina","phone":"(555) 123-4567","base":"viet","milk":"oat","toppings":["ube","egg"]}"#,
        )
        .unwrap();

        assert_eq!(draft.name, "Mina");
        assert_eq!(draft.phone, "(555) 123-4567");
        assert_eq!(draft.base, Some(BaseKind::VietCoffee));
        assert_eq!(draft.milk, MilkKind::Oat);
        assert_eq!(
            draft.toppings.iter().copied().collect::<Vec<_>>(),
            vec![ToppingKind::Ube, ToppingKind::Egg]
        );
    }

    #[test]
    fn missing_toppings_default_to_empty() {
        let draft = decode(r#"{"name":"Mina","phone":"555","base":"matcha","milk":"oat"}"#).unwrap();

        assert!(draft.toppings.is_empty());
        assert_eq!(draft.base, Some(BaseKind::Matcha));
    }

    #[test]
    fn malformed_fields_fall_back_individually() {
        let draft = decode(
            r#"{"name":42,"phone":"555-123-4567","base":"boba","milk":null,"toppings":"ube","extra":true}"#,
        )
        .unwrap();

        assert_eq!(draft.name, "");
        assert_eq!(draft.phone, "555-123-4567");
        assert_eq!(draft.base, None);
        assert_eq!(draft.milk, MilkKind::Whole);
        assert!(draft.toppings.is_empty());
    }

    #[test]
    fn unknown_and_duplicate_toppings_are_dropped() {
        let draft = decode(r#"{"toppings":["ube","boba",7,"ube","salted"]}"#).unwrap();

        assert_eq!(
            draft.toppings.iter().copied().collect::<Vec<_>>(),
            vec![ToppingKind::Ube, ToppingKind::Salted]
        );
    }

    #[test]
    fn non_object_payloads_are_ignored() {
        assert_eq!(decode("not json"), None);
        assert_eq!(decode(""), None);
        assert_eq!(decode("null"), None);
        assert_eq!(decode(r#"["matcha"]"#), None);
    }

    #[test]
    fn empty_object_is_the_default_draft() {
        assert_eq!(decode("{}"), Some(OrderDraft::default()));
    }

    #[test]
    fn in_memory_store_last_write_wins() {
        let store = InMemoryDraftStore::new();
        assert!(store.load().unwrap().is_none());

        store.save(SerializedDraft::from_raw("first")).unwrap();
        store.save(SerializedDraft::from_raw("second")).unwrap();
        assert_eq!(store.contents().as_deref(), Some("second"));

        store.clear().unwrap();
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn disabled_store_always_fails() {
        let store = DisabledDraftStore;
        assert!(matches!(store.load(), Err(DraftStoreError::Unavailable(_))));
        assert!(store.save(SerializedDraft::from_raw("{}")).is_err());
        assert!(store.clear().is_err());
    }
}
