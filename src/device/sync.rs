// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Fences, semaphores and submission tracking.

use crate::bindings::resources::ResourceId;
use crate::command::execution_tracking::ExecutionTracker;
use crate::command::{RecordingState, UsageError};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};

#[derive(Debug, thiserror::Error, Clone, Copy, PartialEq, Eq)]
pub enum FenceError {
    #[error("fence {0} is not signaled and cannot be reset")]
    NotSignaled(ResourceId),
}

#[derive(Debug)]
struct FenceShared {
    id: ResourceId,
    signaled: AtomicBool,
}

/// A binary CPU-GPU synchronization primitive.
///
/// Signaled by the device once the submission it was attached to completes; polled and
/// reset by the application.
#[derive(Debug, Clone)]
pub struct Fence(Arc<FenceShared>);

impl PartialEq for Fence {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for Fence {}

impl Fence {
    pub(crate) fn new(signaled: bool) -> Self {
        Fence(Arc::new(FenceShared {
            id: ResourceId::next(),
            signaled: AtomicBool::new(signaled),
        }))
    }
    pub fn id(&self) -> ResourceId {
        self.0.id
    }
    pub fn is_signaled(&self) -> bool {
        self.0.signaled.load(Ordering::Acquire)
    }
    pub(crate) fn signal(&self) {
        self.0.signaled.store(true, Ordering::Release);
    }
    /// Returns the fence to the unsignaled state.
    ///
    /// Resetting a fence that is not signaled is an error.
    pub fn reset(&self) -> Result<(), FenceError> {
        self.0
            .signaled
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ())
            .map_err(|_| FenceError::NotSignaled(self.0.id))
    }
}

/// A GPU-GPU synchronization primitive ordering submissions.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Semaphore(ResourceId);

impl Semaphore {
    pub(crate) fn new() -> Self {
        Semaphore(ResourceId::next())
    }
    pub fn id(&self) -> ResourceId {
        self.0
    }
}

/// Checks that every semaphore wait has a pending signal, and no semaphore is signaled twice.
///
/// Shared by every submission of a device; each operation holds the lock for its duration.
#[derive(Debug)]
pub struct SemaphoreUsageValidator {
    pending_signals: wasm_safe_mutex::Mutex<HashSet<ResourceId>>,
}

impl Default for SemaphoreUsageValidator {
    fn default() -> Self {
        SemaphoreUsageValidator {
            pending_signals: wasm_safe_mutex::Mutex::new(HashSet::new()),
        }
    }
}

impl SemaphoreUsageValidator {
    pub fn signal(&self, semaphore: &Semaphore) -> Result<(), UsageError> {
        let mut pending = self.pending_signals.lock_sync();
        if !pending.insert(semaphore.id()) {
            return Err(UsageError::SemaphoreMisuse {
                semaphore: semaphore.id(),
                problem: "is signaled again before any wait consumed the previous signal",
            });
        }
        Ok(())
    }

    pub fn wait(&self, semaphore: &Semaphore) -> Result<(), UsageError> {
        let mut pending = self.pending_signals.lock_sync();
        if !pending.remove(&semaphore.id()) {
            return Err(UsageError::SemaphoreMisuse {
                semaphore: semaphore.id(),
                problem: "is waited on without a pending signal",
            });
        }
        Ok(())
    }
}

/// Counts submissions that have not completed yet.
#[derive(Debug, Default)]
pub(crate) struct SubmissionTracker {
    pending: Mutex<u64>,
    idle: Condvar,
}

impl SubmissionTracker {
    pub(crate) fn submitted(&self) {
        *self.pending.lock().unwrap_or_else(|e| e.into_inner()) += 1;
    }

    fn completed(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        *pending = pending.saturating_sub(1);
        if *pending == 0 {
            self.idle.notify_all();
        }
    }

    pub(crate) fn pending(&self) -> u64 {
        *self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Blocks until no submission is pending.
    pub(crate) fn wait_for_idle(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        while *pending > 0 {
            pending = self.idle.wait(pending).unwrap_or_else(|e| e.into_inner());
        }
    }
}

/// Completion handle of one submission.
///
/// The backend signals it once the submitted work has finished executing. Signaling
/// marks the command list completed, signals the attached fence, and releases waiters
/// of [`Device::wait_for_idle`](crate::device::Device::wait_for_idle). Dropping an
/// unsignaled handle signals it.
#[derive(Debug)]
pub struct Completion {
    execution: Arc<ExecutionTracker>,
    submissions: Arc<SubmissionTracker>,
    fence: Option<Fence>,
}

impl Completion {
    pub(crate) fn new(
        execution: Arc<ExecutionTracker>,
        submissions: Arc<SubmissionTracker>,
        fence: Option<Fence>,
    ) -> Self {
        submissions.submitted();
        Completion {
            execution,
            submissions,
            fence,
        }
    }

    pub fn signal(self) {}
}

impl Drop for Completion {
    fn drop(&mut self) {
        //a list disposed mid-flight stays disposed
        let _ = self
            .execution
            .transition(RecordingState::Executing, RecordingState::Completed);
        if let Some(fence) = &self.fence {
            fence.signal();
        }
        self.submissions.completed();
    }
}
