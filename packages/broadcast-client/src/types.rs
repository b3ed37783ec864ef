//! Wire types for the broadcast backend API.

use serde::{Deserialize, Serialize};

use crate::request_id::RequestId;

/// A group or channel visible to an account, from `GET /api/groups`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupInfo {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub username: Option<String>,
    pub is_megagroup: bool,
    pub is_channel: bool,
    #[serde(default)]
    pub member_count: Option<i64>,
}

impl GroupInfo {
    /// Broadcast channels without a discussion group cannot receive messages.
    pub fn sendable(&self) -> bool {
        !self.is_channel || self.is_megagroup
    }
}

/// Inclusion scope for group listing: plain groups only, or groups plus
/// channels and supergroups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupScope {
    GroupsOnly,
    All,
}

impl GroupScope {
    pub fn only_groups(self) -> bool {
        matches!(self, GroupScope::GroupsOnly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupScope::GroupsOnly => "groups",
            GroupScope::All => "all",
        }
    }
}

/// Cache/request key for a scoped group listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScopedListKey {
    pub account: String,
    pub scope: GroupScope,
}

impl ScopedListKey {
    pub fn new(account: impl Into<String>, scope: GroupScope) -> Self {
        Self {
            account: account.into(),
            scope,
        }
    }

    /// Storage key, one entry per (account, scope) pair.
    pub fn cache_key(&self) -> String {
        format!("groups:{}:{}", self.account, self.scope.as_str())
    }

    pub fn widened(&self) -> Self {
        Self {
            account: self.account.clone(),
            scope: GroupScope::All,
        }
    }
}

/// One logical send job, as the operator described it. The idempotency key is
/// attached at submission time, not here, so the same `JobRequest` value can
/// never accidentally share a key across two submissions.
#[derive(Debug, Clone)]
pub struct JobRequest {
    pub group_ids: Vec<i64>,
    pub message: String,
    pub parse_mode: String,
    pub disable_web_page_preview: bool,
    pub delay_ms: u64,
    pub rounds: u32,
    pub round_interval_s: u64,
    pub account: String,
}

impl JobRequest {
    pub fn new(group_ids: Vec<i64>, message: impl Into<String>, account: impl Into<String>) -> Self {
        Self {
            group_ids,
            message: message.into(),
            parse_mode: "plain".into(),
            disable_web_page_preview: true,
            delay_ms: 1500,
            rounds: 1,
            round_interval_s: 1200,
            account: account.into(),
        }
    }
}

/// Request body for `POST /api/send-async` and `POST /api/test-send`.
#[derive(Debug, Clone, Serialize)]
pub struct SendRequest {
    pub group_ids: Vec<i64>,
    pub message: String,
    pub parse_mode: String,
    pub disable_web_page_preview: bool,
    pub delay_ms: u64,
    pub rounds: u32,
    pub round_interval_s: u64,
    pub account: String,
    pub request_id: RequestId,
}

impl SendRequest {
    /// Attach an idempotency key to a job request. The key must be generated
    /// once per logical submission and reused verbatim across retries.
    pub fn from_job(job: &JobRequest, request_id: RequestId) -> Self {
        Self {
            group_ids: job.group_ids.clone(),
            message: job.message.clone(),
            parse_mode: job.parse_mode.clone(),
            disable_web_page_preview: job.disable_web_page_preview,
            delay_ms: job.delay_ms,
            rounds: job.rounds.max(1),
            round_interval_s: job.round_interval_s,
            account: job.account.clone(),
            request_id,
        }
    }
}

/// Response to an accepted asynchronous submission.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskCreated {
    pub task_id: String,
}

/// Terminal state marker in [`TaskStatus`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Done,
}

/// One poll snapshot from `GET /api/task-status`. Replaced wholesale on every
/// tick, never mutated in place.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskStatus {
    pub status: JobState,
    pub total: u64,
    pub success: u64,
    pub failed: u64,
    #[serde(default)]
    pub rounds: Option<u32>,
    #[serde(default)]
    pub current_round: Option<u32>,
}

impl TaskStatus {
    pub fn is_done(&self) -> bool {
        self.status == JobState::Done
    }

    /// `current/total` round label, when the server reports repeat progress.
    pub fn round_label(&self) -> Option<String> {
        match (self.current_round, self.rounds) {
            (Some(current), Some(total)) => Some(format!("{}/{}", current, total)),
            _ => None,
        }
    }
}

/// Final counts from the synchronous `POST /api/test-send` variant.
#[derive(Debug, Clone, Deserialize)]
pub struct SendOutcome {
    pub total: u64,
    pub success: u64,
    pub failed: u64,
}

/// One row of `GET /api/accounts/status`.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountStatus {
    pub account: String,
    pub authorized: bool,
}

/// Response to `GET /api/account-status?account=...`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthStatus {
    pub authorized: bool,
}

/// One delivery log row from `GET /api/logs`.
#[derive(Debug, Clone, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub group_id: i64,
    pub group_title: String,
    pub message_preview: String,
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message_id: Option<i64>,
    #[serde(default)]
    pub parse_mode: Option<String>,
    pub created_at: String,
}
