//! Operator session state.
//!
//! One explicit context object owns everything the original admin page kept
//! in page-global state: the admin token, the active account, the inclusion
//! scope preference, and the persisted target selection. All mutation goes
//! through this owner, so no locking is needed anywhere else.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::storage::KeyValueStore;
use crate::types::{GroupScope, ScopedListKey};

const KEY_TOKEN: &str = "adminToken";
const KEY_ACCOUNT: &str = "selectedAccount";
const KEY_INCLUDE_CHANNELS: &str = "includeChannels";
const KEY_SELECTED_IDS: &str = "selectedGroupIds";

pub struct SessionContext {
    store: Arc<dyn KeyValueStore>,
    token: Option<String>,
    account: String,
    scope: GroupScope,
    selection: BTreeSet<i64>,
}

impl SessionContext {
    /// Restore a session from the store; missing or corrupt entries fall back
    /// to defaults (no token, no account, narrow scope, empty selection).
    pub fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let token = store.get(KEY_TOKEN).filter(|t| !t.is_empty());
        let account = store.get(KEY_ACCOUNT).unwrap_or_default();
        let scope = match store.get(KEY_INCLUDE_CHANNELS).as_deref() {
            Some("1") => GroupScope::All,
            _ => GroupScope::GroupsOnly,
        };
        let selection = store
            .get(KEY_SELECTED_IDS)
            .and_then(|raw| serde_json::from_str::<Vec<i64>>(&raw).ok())
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default();
        Self {
            store,
            token,
            account,
            scope,
            selection,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        let token = token.into();
        self.store.set(KEY_TOKEN, &token);
        self.token = if token.is_empty() { None } else { Some(token) };
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn set_account(&mut self, account: impl Into<String>) {
        self.account = account.into();
        self.store.set(KEY_ACCOUNT, &self.account);
    }

    pub fn scope(&self) -> GroupScope {
        self.scope
    }

    pub fn set_scope(&mut self, scope: GroupScope) {
        self.scope = scope;
        let flag = if scope == GroupScope::All { "1" } else { "0" };
        self.store.set(KEY_INCLUDE_CHANNELS, flag);
    }

    /// The (account, scope) key current list fetches should use.
    pub fn list_key(&self) -> ScopedListKey {
        ScopedListKey::new(self.account.clone(), self.scope)
    }

    /// Selected target ids in stable order. Submission uses exactly this set
    /// at call time; it may reference ids no longer present in the listing.
    pub fn selection(&self) -> Vec<i64> {
        self.selection.iter().copied().collect()
    }

    pub fn select(&mut self, id: i64) {
        self.selection.insert(id);
        self.persist_selection();
    }

    pub fn deselect(&mut self, id: i64) {
        self.selection.remove(&id);
        self.persist_selection();
    }

    pub fn select_many(&mut self, ids: impl IntoIterator<Item = i64>) {
        self.selection.extend(ids);
        self.persist_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.persist_selection();
    }

    fn persist_selection(&self) {
        let ids: Vec<i64> = self.selection.iter().copied().collect();
        match serde_json::to_string(&ids) {
            Ok(raw) => self.store.set(KEY_SELECTED_IDS, &raw),
            Err(err) => tracing::debug!(error = %err, "selection persist skipped"),
        }
    }
}
