use alloc::collections::VecDeque;

use crate::{IdleDeadline, IdleHandle, IdleScheduler};

/// Deferred per-item work, run when the platform reports idle time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IdleTask<K> {
    /// Measure the item's real height and report it.
    MeasureHeight(K),
    /// Unrender the item if it is still not intersecting.
    HideIfNotIntersecting(K),
}

impl<K> IdleTask<K> {
    pub fn id(&self) -> &K {
        match self {
            Self::MeasureHeight(id) | Self::HideIfNotIntersecting(id) => id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Wakeup {
    Idle,
    Requested(IdleHandle),
    /// No idle callbacks on this platform; flush from `tick` once `due_ms` passes.
    Fallback { due_ms: u64 },
}

/// A FIFO of idle tasks sharing a single outstanding idle-callback request.
///
/// Tasks are drained while the deadline has time left; whatever remains asks for another idle
/// callback. Draining is split into `begin_run` / `next_task` / `end_run` so the owner can run
/// each task against its own state without holding a borrow of the queue.
#[derive(Clone, Debug)]
pub struct IdleTaskQueue<T> {
    tasks: VecDeque<T>,
    wakeup: Wakeup,
    fallback_delay_ms: u64,
}

impl<T> IdleTaskQueue<T> {
    pub fn new(fallback_delay_ms: u64) -> Self {
        Self {
            tasks: VecDeque::new(),
            wakeup: Wakeup::Idle,
            fallback_delay_ms,
        }
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.tasks.iter()
    }

    /// Whether a wakeup (idle callback or fallback) is outstanding.
    pub fn is_scheduled(&self) -> bool {
        self.wakeup != Wakeup::Idle
    }

    pub fn set_fallback_delay_ms(&mut self, delay_ms: u64) {
        self.fallback_delay_ms = delay_ms;
    }

    pub fn push(&mut self, task: T, scheduler: &mut impl IdleScheduler, now_ms: u64) {
        self.tasks.push_back(task);
        self.schedule(scheduler, now_ms);
    }

    /// Like `push`, but skips tasks that are already queued.
    pub fn push_unique(&mut self, task: T, scheduler: &mut impl IdleScheduler, now_ms: u64)
    where
        T: PartialEq,
    {
        if self.tasks.contains(&task) {
            return;
        }
        self.push(task, scheduler, now_ms);
    }

    fn schedule(&mut self, scheduler: &mut impl IdleScheduler, now_ms: u64) {
        if self.wakeup != Wakeup::Idle {
            return;
        }
        self.wakeup = match scheduler.request_idle() {
            Some(handle) => Wakeup::Requested(handle),
            None => {
                vtrace!(now_ms, "idle callbacks unavailable, using fallback");
                Wakeup::Fallback {
                    due_ms: now_ms.saturating_add(self.fallback_delay_ms),
                }
            }
        };
    }

    /// Marks the outstanding wakeup as consumed. Call when the idle callback fires.
    pub fn begin_run(&mut self) {
        self.wakeup = Wakeup::Idle;
    }

    pub fn next_task(&mut self, deadline: &impl IdleDeadline) -> Option<T> {
        if deadline.time_remaining_ms() <= 0.0 {
            return None;
        }
        self.tasks.pop_front()
    }

    /// Requests another wakeup if tasks are left over.
    pub fn end_run(&mut self, scheduler: &mut impl IdleScheduler, now_ms: u64) {
        if !self.tasks.is_empty() {
            self.schedule(scheduler, now_ms);
        }
    }

    /// Whether the fallback wakeup is due at `now_ms`.
    pub fn fallback_due(&self, now_ms: u64) -> bool {
        matches!(self.wakeup, Wakeup::Fallback { due_ms } if now_ms >= due_ms)
    }

    pub fn retain(&mut self, f: impl FnMut(&T) -> bool) {
        self.tasks.retain(f);
    }

    /// Drops all tasks and cancels the outstanding idle callback, if any.
    pub fn cancel(&mut self, scheduler: &mut impl IdleScheduler) {
        if let Wakeup::Requested(handle) = self.wakeup {
            scheduler.cancel_idle(handle);
        }
        self.wakeup = Wakeup::Idle;
        self.tasks.clear();
    }
}
