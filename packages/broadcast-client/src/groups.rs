//! Group directory: list fetch with automatic scope widening.
//!
//! Fetches the scoped group list through the transport, writes successful
//! results through to the local cache, and widens the scope once when a
//! narrow listing comes back empty. Many accounts have no plain groups but
//! plenty of channels/supergroups; the widening makes those visible without
//! a manual toggle, and the learned preference is persisted so a genuinely
//! empty account is not re-probed forever.

use std::sync::Arc;
use std::time::Duration;

use crate::cache::GroupCache;
use crate::error::Result;
use crate::session::SessionContext;
use crate::transport::Transport;
use crate::types::{AccountStatus, AuthStatus, GroupInfo, GroupScope, LogEntry, ScopedListKey};

/// Listing calls are cheap server-side, so they get a short fixed timeout and
/// a small retry budget.
const LIST_TIMEOUT: Duration = Duration::from_secs(5);
const LIST_ATTEMPTS: u32 = 3;

pub struct GroupDirectory {
    transport: Arc<Transport>,
    cache: GroupCache,
}

impl GroupDirectory {
    pub fn new(transport: Arc<Transport>, cache: GroupCache) -> Self {
        Self { transport, cache }
    }

    /// Optimistic local read, for painting a list before the live fetch
    /// resolves. Never performs network I/O.
    pub fn cached(&self, key: &ScopedListKey) -> Option<Vec<GroupInfo>> {
        self.cache.read(key)
    }

    /// Live fetch for the session's current (account, scope) key.
    ///
    /// Every successful fetch writes through to the cache under its key, so
    /// the cached snapshot always mirrors the last authoritative response.
    /// On an empty result at narrow scope, the same fetch is re-issued once
    /// at wide scope; if the widened fetch succeeds, the session's scope
    /// preference is persisted as widened and its result is returned instead.
    /// A failed widening attempt falls back to the empty narrow result.
    ///
    /// `force_refresh` is forwarded to the server so it bypasses its own
    /// cache; it does not affect the local one.
    pub async fn fetch(
        &self,
        session: &mut SessionContext,
        force_refresh: bool,
    ) -> Result<Vec<GroupInfo>> {
        let key = session.list_key();
        let groups = self.fetch_scoped(&key, force_refresh).await?;

        if !groups.is_empty() || key.scope != GroupScope::GroupsOnly {
            return Ok(groups);
        }

        // One-shot widening, never recursive.
        let wide_key = key.widened();
        tracing::info!(account = %wide_key.account, "narrow listing empty, retrying at wide scope");
        match self.fetch_scoped(&wide_key, force_refresh).await {
            Ok(wide_groups) => {
                session.set_scope(GroupScope::All);
                Ok(wide_groups)
            }
            Err(err) => {
                tracing::warn!(error = %err, "wide-scope fetch failed, keeping empty narrow result");
                Ok(groups)
            }
        }
    }

    async fn fetch_scoped(
        &self,
        key: &ScopedListKey,
        force_refresh: bool,
    ) -> Result<Vec<GroupInfo>> {
        let only_groups = if key.scope.only_groups() { "true" } else { "false" };
        let refresh = if force_refresh { "true" } else { "false" };
        let groups: Vec<GroupInfo> = self
            .transport
            .get_json(
                "/api/groups",
                &[
                    ("only_groups", only_groups),
                    ("account", &key.account),
                    ("refresh", refresh),
                ],
                LIST_TIMEOUT,
                LIST_ATTEMPTS,
            )
            .await?;
        // Every successful live response supersedes the cached one, an empty
        // listing included; otherwise a stale non-empty snapshot would be
        // painted forever after the account empties.
        self.cache.write(key, &groups);
        Ok(groups)
    }

    /// All configured accounts and whether each is authorized.
    pub async fn accounts(&self) -> Result<Vec<AccountStatus>> {
        self.transport
            .get_json("/api/accounts/status", &[], LIST_TIMEOUT, LIST_ATTEMPTS)
            .await
    }

    /// Authorization state of a single account.
    pub async fn auth_status(&self, account: &str) -> Result<AuthStatus> {
        self.transport
            .get_json(
                "/api/account-status",
                &[("account", account)],
                LIST_TIMEOUT,
                LIST_ATTEMPTS,
            )
            .await
    }

    /// Recent delivery log rows.
    pub async fn recent_logs(&self, limit: u32) -> Result<Vec<LogEntry>> {
        self.transport
            .get_json(
                "/api/logs",
                &[("limit", &limit.to_string())],
                LIST_TIMEOUT,
                LIST_ATTEMPTS,
            )
            .await
    }

    /// Ask the server to drop its own cached listing for `account`. This is
    /// distinct from the local cache, which is only ever overwritten.
    pub async fn clear_server_cache(&self, account: Option<&str>) -> Result<()> {
        let query: Vec<(&str, &str)> = match account {
            Some(account) => vec![("account", account)],
            None => vec![],
        };
        self.transport
            .get_ok("/api/groups/cache/clear", &query, LIST_TIMEOUT, LIST_ATTEMPTS)
            .await
    }
}
