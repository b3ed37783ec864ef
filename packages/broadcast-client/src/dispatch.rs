//! Job dispatch and poll-until-done state machine.
//!
//! One submission moves `Idle -> Submitting -> Polling -> Done`, with failed
//! exits from the two middle states. A single in-flight token serializes
//! submissions: while one job is submitting or polling, further submissions
//! are rejected rather than queued (duplicate operator clicks must not fan
//! out into duplicate jobs).
//!
//! Two variants share the machine:
//!
//! - [`JobDispatcher::submit`] posts to `/api/send-async` with a short fixed
//!   timeout and a larger retry budget — resubmitting before the server has
//!   accepted the job is cheap, and the idempotency key deduplicates it.
//! - [`JobDispatcher::submit_blocking`] posts to `/api/test-send`, which
//!   blocks for the whole batch; it gets the full computed time budget and
//!   few retries, because replaying a long batch that may have succeeded
//!   late risks duplicate sends.
//!
//! The same size-proportional budget bounds the polling loop of the async
//! variant: the work happens server-side and its duration is unknown in
//! advance, so the ceiling scales with the number of targets.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, MissedTickBehavior};

use crate::error::{ClientError, Result};
use crate::request_id::RequestId;
use crate::transport::Transport;
use crate::types::{JobRequest, SendOutcome, SendRequest, TaskCreated, TaskStatus};

pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// The async submission itself only needs to outlive server acceptance.
const SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);
const ASYNC_SUBMIT_ATTEMPTS: u32 = 3;
const SYNC_SUBMIT_ATTEMPTS: u32 = 2;
const STATUS_TIMEOUT: Duration = Duration::from_secs(5);

const FIXED_OVERHEAD_MS: u64 = 15_000;
const BUDGET_FLOOR_MS: u64 = 20_000;
const BUDGET_CEILING_MS: u64 = 900_000;

/// Time budget proportional to expected work:
/// `clamp(delay_ms * targets + overhead, floor, ceiling)`.
pub fn poll_budget(delay_ms: u64, target_count: usize) -> Duration {
    let expected = delay_ms
        .saturating_mul(target_count.max(1) as u64)
        .saturating_add(FIXED_OVERHEAD_MS);
    Duration::from_millis(expected.clamp(BUDGET_FLOOR_MS, BUDGET_CEILING_MS))
}

/// Server-assigned handle for one accepted submission. Holds the in-flight
/// token for its whole lifetime; dropping it (or finishing the poll) returns
/// the dispatcher to idle.
#[derive(Debug)]
pub struct JobHandle<'d> {
    task_id: String,
    budget: Duration,
    _token: InFlightToken<'d>,
}

impl JobHandle<'_> {
    pub fn task_id(&self) -> &str {
        &self.task_id
    }

    /// Hard ceiling for polling this job to completion.
    pub fn poll_budget(&self) -> Duration {
        self.budget
    }

    /// Replace the polling ceiling, for callers that want a tighter bound
    /// than the size-derived default.
    pub fn with_poll_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }
}

#[derive(Debug)]
struct InFlightToken<'d>(&'d AtomicBool);

impl Drop for InFlightToken<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub struct JobDispatcher {
    transport: Arc<Transport>,
    in_flight: AtomicBool,
}

impl JobDispatcher {
    pub fn new(transport: Arc<Transport>) -> Self {
        Self {
            transport,
            in_flight: AtomicBool::new(false),
        }
    }

    fn acquire(&self) -> Result<InFlightToken<'_>> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            Ok(InFlightToken(&self.in_flight))
        } else {
            Err(ClientError::Validation("a send is already in flight"))
        }
    }

    /// Preconditions checked before any network call.
    fn validate(&self, job: &JobRequest) -> Result<()> {
        if job.group_ids.is_empty() {
            return Err(ClientError::Validation("no target groups selected"));
        }
        if job.message.trim().is_empty() {
            return Err(ClientError::Validation("message must not be empty"));
        }
        if !self.transport.has_token() {
            return Err(ClientError::Auth);
        }
        Ok(())
    }

    /// Submit a job asynchronously. Returns as soon as the server accepts it.
    ///
    /// A fresh idempotency key is generated here, once, and rides along on
    /// every retry of the submission, so the server never runs the same
    /// logical job twice.
    pub async fn submit(&self, job: &JobRequest) -> Result<JobHandle<'_>> {
        let token = self.acquire()?;
        self.validate(job)?;

        let request_id = RequestId::generate();
        let budget = poll_budget(job.delay_ms, job.group_ids.len());
        let body = SendRequest::from_job(job, request_id.clone());

        tracing::info!(
            %request_id,
            targets = job.group_ids.len(),
            rounds = body.rounds,
            account = %job.account,
            "submitting broadcast job"
        );
        let created: TaskCreated = self
            .transport
            .post_json("/api/send-async", &body, SUBMIT_TIMEOUT, ASYNC_SUBMIT_ATTEMPTS)
            .await?;
        tracing::info!(task_id = %created.task_id, budget_ms = budget.as_millis() as u64, "broadcast task created");

        Ok(JobHandle {
            task_id: created.task_id,
            budget,
            _token: token,
        })
    }

    /// Drive a submitted job to its terminal state.
    ///
    /// One status request per tick; a failed tick is skipped, not escalated —
    /// the next tick simply retries. Ticks never overlap because each request
    /// is awaited before the next interval fires. Stops exactly once the
    /// status reports done, or with [`ClientError::Timeout`] when the
    /// handle's budget is exhausted (the server may still finish the job).
    ///
    /// `on_snapshot` sees every successfully fetched status, the terminal one
    /// included.
    pub async fn poll_until_done<F>(&self, handle: JobHandle<'_>, mut on_snapshot: F) -> Result<TaskStatus>
    where
        F: FnMut(&TaskStatus),
    {
        let started = Instant::now();
        let mut interval = tokio::time::interval(POLL_INTERVAL);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first interval tick is immediate; skip it so the first status
        // request lands one interval after submission.
        interval.tick().await;

        loop {
            interval.tick().await;
            if started.elapsed() > handle.budget {
                tracing::warn!(task_id = %handle.task_id, "poll budget exhausted");
                return Err(ClientError::Timeout {
                    waited: handle.budget,
                });
            }
            match self.poll_once(handle.task_id()).await {
                Ok(status) => {
                    on_snapshot(&status);
                    if status.is_done() {
                        tracing::info!(
                            task_id = %handle.task_id,
                            total = status.total,
                            success = status.success,
                            failed = status.failed,
                            "broadcast task finished"
                        );
                        return Ok(status);
                    }
                }
                Err(err) => {
                    tracing::debug!(task_id = %handle.task_id, error = %err, "status poll failed, retrying next tick");
                }
            }
        }
    }

    /// Submit and poll in one call, holding the in-flight token throughout.
    pub async fn run<F>(&self, job: &JobRequest, on_snapshot: F) -> Result<TaskStatus>
    where
        F: FnMut(&TaskStatus),
    {
        let handle = self.submit(job).await?;
        self.poll_until_done(handle, on_snapshot).await
    }

    /// Synchronous variant: the server sends the whole batch before replying.
    /// Bounded by the computed budget; kept to few attempts because a replay
    /// after a late success would double-send.
    pub async fn submit_blocking(&self, job: &JobRequest) -> Result<SendOutcome> {
        let _token = self.acquire()?;
        self.validate(job)?;

        let request_id = RequestId::generate();
        let timeout = poll_budget(job.delay_ms, job.group_ids.len());
        let body = SendRequest::from_job(job, request_id.clone());

        tracing::info!(%request_id, targets = job.group_ids.len(), "submitting blocking test send");
        self.transport
            .post_json("/api/test-send", &body, timeout, SYNC_SUBMIT_ATTEMPTS)
            .await
    }

    async fn poll_once(&self, task_id: &str) -> Result<TaskStatus> {
        self.transport
            .get_json("/api/task-status", &[("task_id", task_id)], STATUS_TIMEOUT, 1)
            .await
    }
}
