//! One-shot cancelable timers for Attune.
//!
//! The session layer schedules two kinds of deferred work: the ready
//! countdown before a game starts, and the grace-period deletion of an
//! emptied room. Both need the same shape: run a future once after a
//! delay, unless someone cancels first, and make cancellation safe to
//! call at any time from either side of the race.
//!
//! [`ScheduledTask`] wraps a spawned Tokio task and a three-state flag.
//! The deadline and a `cancel` call race through one mutex, so exactly
//! one of them wins: a task that reached [`TaskState::Fired`] runs its
//! future to completion even if `cancel` arrives a moment later, and a
//! task that reached [`TaskState::Canceled`] never runs it at all.
//!
//! # Usage
//!
//! ```ignore
//! let task = ScheduledTask::spawn(Duration::from_secs(3), async move {
//!     sessions.lock().await.countdown_elapsed(code, generation);
//! });
//! // A player backed out; the start never happens.
//! task.cancel();
//! ```
//!
//! Dropping a [`ScheduledTask`] detaches it: the timer keeps running
//! and fires normally. Callers that keep tasks in a map therefore pair
//! each one with a generation counter and re-validate at fire time, so
//! a fire from an entry that was dropped and replaced lands as a no-op.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::trace;

// ---------------------------------------------------------------------------
// TaskState
// ---------------------------------------------------------------------------

/// Where a scheduled task is in its life.
///
/// Transitions are one-way: `Pending` moves to exactly one of `Fired`
/// or `Canceled`, and neither of those ever changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// The delay has not elapsed and nobody has canceled.
    Pending,
    /// The deadline won; the future has run or is running.
    Fired,
    /// A cancel won; the future will never run.
    Canceled,
}

// ---------------------------------------------------------------------------
// ScheduledTask
// ---------------------------------------------------------------------------

/// A future scheduled to run once after a delay, with idempotent
/// cancellation.
#[derive(Debug)]
pub struct ScheduledTask {
    state: Arc<Mutex<TaskState>>,
    abort: AbortHandle,
}

impl ScheduledTask {
    /// Arms a timer: after `delay`, `task` runs unless [`cancel`] won
    /// the race first.
    ///
    /// [`cancel`]: Self::cancel
    pub fn spawn<F>(delay: Duration, task: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let state = Arc::new(Mutex::new(TaskState::Pending));
        let flag = Arc::clone(&state);

        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            // Claim the fire under the lock, then run outside it.
            {
                let mut state = lock(&flag);
                if *state != TaskState::Pending {
                    return;
                }
                *state = TaskState::Fired;
            }
            trace!(delay_ms = delay.as_millis() as u64, "scheduled task fired");
            task.await;
        });

        Self {
            state,
            abort: handle.abort_handle(),
        }
    }

    /// Cancels the task if it is still pending. Calling this on a task
    /// that already fired or was already canceled does nothing, so
    /// callers never need to check first.
    pub fn cancel(&self) {
        let mut state = lock(&self.state);
        if *state == TaskState::Pending {
            *state = TaskState::Canceled;
            self.abort.abort();
            trace!("scheduled task canceled");
        }
    }

    /// Current state of the task.
    pub fn state(&self) -> TaskState {
        *lock(&self.state)
    }

    /// `true` while the delay is still running and nobody canceled.
    pub fn is_pending(&self) -> bool {
        self.state() == TaskState::Pending
    }
}

/// The flag mutex is only ever held for a state check, so a poisoned
/// lock still carries a usable value.
fn lock(state: &Mutex<TaskState>) -> std::sync::MutexGuard<'_, TaskState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
