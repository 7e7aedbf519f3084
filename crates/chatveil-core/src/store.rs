//! The set of hidden message keys and its persisted mirror.

use std::collections::BTreeSet;

use crate::dom::{MessageContainer, VisibilityState};
use crate::identity::{self, MessageKey};
use crate::storage::KeyValueStorage;

/// Hidden message keys, mirrored to storage after every change.
///
/// Persistence is best-effort. A failed read starts the session empty, a
/// failed write is logged and dropped, and in both cases the in-memory set
/// keeps working for the rest of the page's life.
#[derive(Debug)]
pub struct VisibilityStore<S> {
    storage: S,
    storage_key: String,
    keys: BTreeSet<MessageKey>,
}

impl<S: KeyValueStorage> VisibilityStore<S> {
    /// Reads the persisted set. Never fails.
    pub fn load(storage: S, storage_key: impl Into<String>) -> Self {
        let storage_key = storage_key.into();
        let keys = match storage.get_item(&storage_key) {
            Ok(Some(raw)) => decode_keys(&raw),
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!(%e, key = %storage_key, "failed to read hidden messages");
                BTreeSet::new()
            }
        };
        tracing::debug!(key = %storage_key, count = keys.len(), "loaded hidden messages");
        Self {
            storage,
            storage_key,
            keys,
        }
    }

    /// Writes the current set. Returns `false` if the write was dropped.
    pub fn save(&self) -> bool {
        let payload = match serde_json::to_string(&self.keys) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::warn!(%e, "failed to encode hidden messages");
                return false;
            }
        };
        match self.storage.set_item(&self.storage_key, &payload) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(%e, key = %self.storage_key, "failed to persist hidden messages");
                false
            }
        }
    }

    pub fn hide<C: MessageContainer + ?Sized>(&mut self, container: &C) {
        let key = identity::resolve(container);
        tracing::debug!(%key, "hide");
        self.keys.insert(key);
        self.save();
        container.set_visibility(VisibilityState::Hidden);
    }

    pub fn show<C: MessageContainer + ?Sized>(&mut self, container: &C) {
        let key = identity::resolve(container);
        tracing::debug!(%key, "show");
        self.keys.remove(&key);
        self.save();
        container.set_visibility(VisibilityState::Shown);
    }

    /// Flips the container based on what it currently shows, not on whether
    /// its key is in the set.
    pub fn toggle<C: MessageContainer + ?Sized>(&mut self, container: &C) -> VisibilityState {
        match container.visibility() {
            VisibilityState::Hidden => self.show(container),
            VisibilityState::Shown => self.hide(container),
        }
        container.visibility()
    }

    /// Hides every shown container whose key is stored. Containers whose key
    /// is absent, or that are already hidden, are not touched. Returns how
    /// many changed.
    pub fn reconcile<C: MessageContainer>(&self, containers: &[C]) -> usize {
        if self.keys.is_empty() {
            return 0;
        }
        let mut hidden = 0;
        for container in containers {
            if container.visibility().is_hidden() {
                continue;
            }
            if self.keys.contains(&identity::resolve(container)) {
                container.set_visibility(VisibilityState::Hidden);
                hidden += 1;
            }
        }
        hidden
    }

    /// Hides every container that holds at least one role-bearing message.
    pub fn hide_all<C: MessageContainer>(&mut self, containers: &[C]) -> usize {
        let mut hidden = 0;
        for container in containers.iter().filter(|c| c.has_role_descendant()) {
            self.keys.insert(identity::resolve(container));
            container.set_visibility(VisibilityState::Hidden);
            hidden += 1;
        }
        self.save();
        hidden
    }

    /// Shows every container and empties the set, including keys of
    /// messages that are not on the page right now.
    pub fn show_all<C: MessageContainer>(&mut self, containers: &[C]) {
        for container in containers {
            container.set_visibility(VisibilityState::Shown);
        }
        self.keys.clear();
        self.save();
    }

    pub fn contains(&self, key: &MessageKey) -> bool {
        self.keys.contains(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &MessageKey> {
        self.keys.iter()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }
}

// Anything other than a JSON array reads as empty. Non-string entries inside
// an array are skipped.
fn decode_keys(raw: &str) -> BTreeSet<MessageKey> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(%e, "hidden messages payload is not json, starting empty");
            return BTreeSet::new();
        }
    };
    let Some(items) = value.as_array() else {
        tracing::warn!("hidden messages payload is not an array, starting empty");
        return BTreeSet::new();
    };
    items
        .iter()
        .filter_map(serde_json::Value::as_str)
        .filter_map(MessageKey::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::storage::MemoryStorage;

    const KEY: &str = "hidden";

    #[derive(Debug, Default)]
    struct Turn {
        role: Option<&'static str>,
        id: Option<&'static str>,
        text: &'static str,
        state: Cell<VisibilityState>,
    }

    impl Turn {
        fn user(id: &'static str) -> Self {
            Self {
                role: Some("user"),
                id: Some(id),
                ..Self::default()
            }
        }
    }

    impl MessageContainer for Turn {
        fn author_role(&self) -> Option<String> {
            self.role.map(str::to_string)
        }
        fn has_role_descendant(&self) -> bool {
            self.role.is_some()
        }
        fn container_message_id(&self) -> Option<String> {
            None
        }
        fn inner_message_id(&self) -> Option<String> {
            self.id.map(str::to_string)
        }
        fn element_id(&self) -> Option<String> {
            None
        }
        fn inner_text(&self) -> Option<String> {
            Some(self.text.to_string())
        }
        fn text(&self) -> String {
            self.text.to_string()
        }
        fn visibility(&self) -> VisibilityState {
            self.state.get()
        }
        fn set_visibility(&self, state: VisibilityState) {
            self.state.set(state);
        }
        fn has_toggle(&self) -> bool {
            false
        }
        fn same_node(&self, other: &Self) -> bool {
            std::ptr::eq(self, other)
        }
    }

    fn stored_keys(storage: &MemoryStorage) -> Vec<String> {
        let raw = storage.peek(KEY).expect("persisted");
        serde_json::from_str(&raw).expect("array of strings")
    }

    #[test]
    fn load_tolerates_malformed_payloads() {
        for raw in ["not json", "{\"a\":1}", "42", "null", "\"user:1\"", ""] {
            let store = VisibilityStore::load(MemoryStorage::with_item(KEY, raw), KEY);
            assert!(store.is_empty(), "payload {raw:?} should load empty");
        }

        let store = VisibilityStore::load(MemoryStorage::new(), KEY);
        assert!(store.is_empty());

        let failing = MemoryStorage::with_item(KEY, "[\"user:1\"]");
        failing.set_fail_reads(true);
        assert!(VisibilityStore::load(failing, KEY).is_empty());
    }

    #[test]
    fn load_skips_non_string_entries() {
        let raw = serde_json::json!(["user:1", 7, null, "assistant:abc", "bogus"]).to_string();
        let store = VisibilityStore::load(MemoryStorage::with_item(KEY, &raw), KEY);
        let keys: Vec<_> = store.keys().map(MessageKey::as_str).collect();
        assert_eq!(keys, vec!["assistant:abc", "user:1"]);
    }

    #[test]
    fn hide_then_show_restores_baseline() {
        let storage = MemoryStorage::new();
        let mut store = VisibilityStore::load(&storage, KEY);
        let turn = Turn::user("42");

        store.hide(&turn);
        assert!(store.contains(&MessageKey::new("user", "42")));
        assert_eq!(turn.visibility(), VisibilityState::Hidden);
        assert_eq!(stored_keys(&storage), vec!["user:42"]);

        store.show(&turn);
        assert!(store.is_empty());
        assert_eq!(turn.visibility(), VisibilityState::Shown);
        assert!(stored_keys(&storage).is_empty());
    }

    #[test]
    fn toggle_follows_container_state_not_membership() {
        let storage = MemoryStorage::new();
        let mut store = VisibilityStore::load(&storage, KEY);
        let turn = Turn::user("7");

        // Hidden by someone else without touching the store.
        turn.set_visibility(VisibilityState::Hidden);
        assert_eq!(store.toggle(&turn), VisibilityState::Shown);
        assert!(store.is_empty());

        assert_eq!(store.toggle(&turn), VisibilityState::Hidden);
        assert!(store.contains(&MessageKey::new("user", "7")));
    }

    #[test]
    fn reconcile_only_ever_hides() {
        let raw = serde_json::json!(["user:1"]).to_string();
        let store = VisibilityStore::load(MemoryStorage::with_item(KEY, &raw), KEY);
        let stored = Turn::user("1");
        let other = Turn::user("2");
        other.set_visibility(VisibilityState::Hidden);

        let turns = [stored, other];
        assert_eq!(store.reconcile(&turns), 1);
        assert_eq!(turns[0].visibility(), VisibilityState::Hidden);
        assert_eq!(turns[1].visibility(), VisibilityState::Hidden);

        // Already hidden: nothing left to change.
        assert_eq!(store.reconcile(&turns), 0);
    }

    #[test]
    fn hide_all_skips_turns_without_a_role() {
        let storage = MemoryStorage::new();
        let mut store = VisibilityStore::load(&storage, KEY);
        let turns = [
            Turn::user("1"),
            Turn {
                text: "decoration",
                ..Turn::default()
            },
        ];

        assert_eq!(store.hide_all(&turns), 1);
        assert_eq!(turns[0].visibility(), VisibilityState::Hidden);
        assert_eq!(turns[1].visibility(), VisibilityState::Shown);
        assert_eq!(stored_keys(&storage), vec!["user:1"]);
    }

    #[test]
    fn show_all_clears_keys_that_are_not_on_the_page() {
        let raw = serde_json::json!(["user:offscreen"]).to_string();
        let storage = MemoryStorage::with_item(KEY, &raw);
        let mut store = VisibilityStore::load(&storage, KEY);
        let turns = [Turn::user("1")];
        store.hide(&turns[0]);
        assert_eq!(store.len(), 2);

        store.show_all(&turns);
        assert!(store.is_empty());
        assert_eq!(turns[0].visibility(), VisibilityState::Shown);
        assert!(stored_keys(&storage).is_empty());
    }

    #[test]
    fn write_failures_keep_memory_authoritative() {
        let storage = MemoryStorage::new();
        storage.set_fail_writes(true);
        let mut store = VisibilityStore::load(&storage, KEY);
        let turn = Turn::user("9");

        store.hide(&turn);
        assert!(!store.save());
        assert!(store.contains(&MessageKey::new("user", "9")));
        assert_eq!(turn.visibility(), VisibilityState::Hidden);
        assert_eq!(storage.peek(KEY), None);
    }
}
