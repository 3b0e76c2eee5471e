//! Batch resolution runtime.
//!
//! `apply` is cheap and pure, but a grading cycle resolves every group of
//! every gradable event. This module provides a small, bounded, thread-based
//! pool that resolves submissions against a shared policy in parallel.

use std::fmt;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chrono::{DateTime, Utc};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TrySendError};
use serde::{Deserialize, Serialize};

use crate::engine::apply;
use crate::error::{ExecutionError, GradetimeError, GradetimeResult};
use crate::extension::Extension;
use crate::policy::PolicyDefinition;
use crate::resolution::Resolution;

/// Identifier of a submitting group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupId(uuid::Uuid);

impl GroupId {
    /// Creates a new random group ID.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<uuid::Uuid> for GroupId {
    fn from(id: uuid::Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One group's input to a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupSubmission {
    /// The submitting group.
    pub group: GroupId,

    /// When the group submitted; `None` if it has not.
    pub occurrence: Option<DateTime<Utc>>,

    /// The group's extension, if it was granted one.
    #[serde(default)]
    pub extension: Option<Extension>,
}

impl GroupSubmission {
    /// A submission without an extension.
    #[must_use]
    pub const fn new(group: GroupId, occurrence: Option<DateTime<Utc>>) -> Self {
        Self {
            group,
            occurrence,
            extension: None,
        }
    }

    /// Attaches an extension.
    #[must_use]
    pub const fn with_extension(mut self, extension: Extension) -> Self {
        self.extension = Some(extension);
        self
    }
}

/// A group paired with its resolution.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GroupResolution {
    /// The group the resolution belongs to.
    pub group: GroupId,
    /// The group's timeliness and point effect.
    pub resolution: Resolution,
}

/// Resolver pool configuration.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Number of worker threads.
    pub workers: usize,
    /// Maximum queued submissions.
    pub queue_capacity: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            workers: 2,
            queue_capacity: 1024,
        }
    }
}

enum Job {
    Resolve {
        policy: Arc<PolicyDefinition>,
        submission: GroupSubmission,
        reply: Sender<GroupResolution>,
    },

    #[cfg(test)]
    Sleep {
        duration: Duration,
        reply: Sender<()>,
    },
}

/// Handle returned by `ResolverPool::submit`.
pub struct ResolutionHandle {
    group: GroupId,
    rx: Receiver<GroupResolution>,
}

impl ResolutionHandle {
    #[must_use]
    pub const fn group(&self) -> GroupId {
        self.group
    }

    /// Waits for the resolution.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Disconnected` if the worker went away.
    pub fn join(self) -> GradetimeResult<GroupResolution> {
        self.rx
            .recv()
            .map_err(|_| GradetimeError::Execution(ExecutionError::Disconnected))
    }

    /// Waits for the resolution with a timeout.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Timeout` on expiry, or `Disconnected` if the
    /// worker went away.
    pub fn join_timeout(self, timeout: Duration) -> GradetimeResult<GroupResolution> {
        self.rx.recv_timeout(timeout).map_err(|err| match err {
            RecvTimeoutError::Timeout => GradetimeError::Execution(ExecutionError::Timeout {
                duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            }),
            RecvTimeoutError::Disconnected => {
                GradetimeError::Execution(ExecutionError::Disconnected)
            }
        })
    }
}

/// A bounded pool of resolver threads.
///
/// Policies are shared through `Arc`; they are immutable, so workers need no
/// locking.
///
/// # Example
/// ```rust,ignore
/// let pool = ResolverPool::new(ResolverConfig::default());
/// let results = pool.resolve_all(Arc::new(policy), submissions)?;
/// ```
pub struct ResolverPool {
    tx: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    queue_capacity: usize,
}

impl ResolverPool {
    /// Starts the pool. Zero workers or capacity are clamped to one.
    ///
    /// # Panics
    ///
    /// Panics if the operating system refuses to spawn a worker thread.
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        let workers = config.workers.max(1);
        let queue_capacity = config.queue_capacity.max(1);
        let (tx, rx) = bounded::<Job>(queue_capacity);

        let mut handles = Vec::with_capacity(workers);
        for idx in 0..workers {
            let rx: Receiver<Job> = rx.clone();
            let handle = thread::Builder::new()
                .name(format!("gradetime-resolver-{idx}"))
                .spawn(move || loop {
                    match rx.recv() {
                        Ok(Job::Resolve {
                            policy,
                            submission,
                            reply,
                        }) => {
                            let resolution = apply(
                                &policy,
                                submission.occurrence,
                                submission.extension.as_ref(),
                            );
                            let _ = reply.send(GroupResolution {
                                group: submission.group,
                                resolution,
                            });
                        }
                        Err(_) => break,

                        #[cfg(test)]
                        Ok(Job::Sleep { duration, reply }) => {
                            thread::sleep(duration);
                            let _ = reply.send(());
                        }
                    }
                })
                .expect("failed to spawn gradetime resolver worker");
            handles.push(handle);
        }

        tracing::debug!(workers, queue_capacity, "resolver pool started");

        Self {
            tx: Some(tx),
            workers: handles,
            queue_capacity,
        }
    }

    fn try_submit(&self, job: Job) -> Result<(), ExecutionError> {
        let tx = self.tx.as_ref().ok_or(ExecutionError::Disconnected)?;
        match tx.try_send(job) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(_)) => {
                tracing::warn!(capacity = self.queue_capacity, "resolver queue full");
                Err(ExecutionError::QueueFull {
                    capacity: self.queue_capacity,
                })
            }
            Err(TrySendError::Disconnected(_)) => Err(ExecutionError::Disconnected),
        }
    }

    /// Queues one submission without blocking.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::QueueFull` when the queue is at capacity.
    pub fn submit(
        &self,
        policy: Arc<PolicyDefinition>,
        submission: GroupSubmission,
    ) -> GradetimeResult<ResolutionHandle> {
        let (reply, rx) = bounded::<GroupResolution>(1);
        self.try_submit(Job::Resolve {
            policy,
            submission,
            reply,
        })?;
        Ok(ResolutionHandle {
            group: submission.group,
            rx,
        })
    }

    /// Resolves a batch against one policy, preserving submission order.
    ///
    /// Batches larger than the queue are fed in waves so the queue never
    /// overflows.
    ///
    /// # Errors
    ///
    /// Returns `ExecutionError::Disconnected` if a worker went away, or
    /// `QueueFull` if other callers saturate the shared queue.
    pub fn resolve_all(
        &self,
        policy: Arc<PolicyDefinition>,
        submissions: impl IntoIterator<Item = GroupSubmission>,
    ) -> GradetimeResult<Vec<GroupResolution>> {
        let submissions: Vec<GroupSubmission> = submissions.into_iter().collect();
        let mut results = Vec::with_capacity(submissions.len());

        for wave in submissions.chunks(self.queue_capacity) {
            let handles = wave
                .iter()
                .map(|submission| self.submit(Arc::clone(&policy), *submission))
                .collect::<GradetimeResult<Vec<_>>>()?;
            for handle in handles {
                results.push(handle.join()?);
            }
        }

        Ok(results)
    }

    #[must_use]
    pub const fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    #[cfg(test)]
    fn submit_sleep(&self, duration: Duration) -> Result<Receiver<()>, ExecutionError> {
        let (tx, rx) = bounded::<()>(1);
        self.try_submit(Job::Sleep { duration, reply: tx })?;
        Ok(rx)
    }
}

impl Default for ResolverPool {
    fn default() -> Self {
        Self::new(ResolverConfig::default())
    }
}

impl Drop for ResolverPool {
    fn drop(&mut self) {
        // Closing the channel lets workers drain queued jobs, then exit.
        drop(self.tx.take());
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
        tracing::debug!("resolver pool stopped");
    }
}
