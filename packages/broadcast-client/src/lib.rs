//! Resilient client core for the group-broadcast backend.
//!
//! Drives the backend's bulk-send API over an unreliable link: an idempotent
//! retrying transport, a scoped group-list cache with automatic scope
//! widening, and a submit-then-poll job state machine with time budgets
//! proportional to job size. The client never knowingly double-submits a job
//! it believes is still pending.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use broadcast_client::{
//!     GroupCache, GroupDirectory, JobDispatcher, JobRequest, MemoryStore, SessionContext,
//!     Transport,
//! };
//!
//! let store = Arc::new(MemoryStore::new());
//! let transport = Arc::new(Transport::new("http://127.0.0.1:8000", "secret")?);
//!
//! let mut session = SessionContext::load(store.clone());
//! session.set_account("main");
//!
//! let directory = GroupDirectory::new(transport.clone(), GroupCache::new(store));
//! let groups = directory.fetch(&mut session, false).await?;
//! session.select_many(groups.iter().filter(|g| g.sendable()).map(|g| g.id));
//!
//! let dispatcher = JobDispatcher::new(transport);
//! let job = JobRequest::new(session.selection(), "hello everyone", session.account());
//! let outcome = dispatcher
//!     .run(&job, |status| println!("{}/{} sent", status.success, status.total))
//!     .await?;
//! println!("done: {} ok, {} failed", outcome.success, outcome.failed);
//! ```

pub mod cache;
pub mod dispatch;
pub mod error;
pub mod groups;
pub mod request_id;
pub mod session;
pub mod storage;
pub mod transport;
pub mod types;

pub use cache::GroupCache;
pub use dispatch::{poll_budget, JobDispatcher, JobHandle, POLL_INTERVAL};
pub use error::{ClientError, Result};
pub use groups::GroupDirectory;
pub use request_id::RequestId;
pub use session::SessionContext;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use transport::Transport;
pub use types::{
    AccountStatus, AuthStatus, GroupInfo, GroupScope, JobRequest, JobState, LogEntry,
    ScopedListKey, SendOutcome, SendRequest, TaskCreated, TaskStatus,
};
