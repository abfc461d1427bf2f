#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Cooperative, tick-driven task scheduler.
//!
//! A [`Scheduler`] is owned by the game loop and advanced explicitly with
//! [`Scheduler::update`]. Tasks registered at any time, including from inside
//! a running callback, are staged and only become eligible on the following
//! update, so an update never fires a task registered during itself.

use std::{fmt, time::Duration};

use log::{debug, warn};
use subjunctive_core::ConfigError;

mod clock;
mod timespec;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use timespec::Timespec;

/// Callback invoked with the game context and the scheduler that fired it.
pub type Callback<T> = Box<dyn FnMut(&mut T, &mut Scheduler<T>)>;

/// Handle returned on registration, used to cancel a task.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Numeric value of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "task {}", self.0)
    }
}

/// When a task fires.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Timing {
    /// Once, this long after the update preceding registration.
    After(Duration),
    /// On the promoting update and then every period.
    Every(Duration),
}

impl Timing {
    /// One-shot timing.
    #[must_use]
    pub const fn after(delay: Duration) -> Self {
        Self::After(delay)
    }

    /// Periodic timing.
    #[must_use]
    pub const fn every(period: Duration) -> Self {
        Self::Every(period)
    }

    /// Builds a timing from optional timespec strings.
    ///
    /// Exactly one of `after` and `every` must be given.
    pub fn parse(after: Option<&str>, every: Option<&str>) -> Result<Self, ConfigError> {
        match (after, every) {
            (None, None) => Err(ConfigError::MissingTiming),
            (Some(_), Some(_)) => Err(ConfigError::ConflictingTiming),
            (Some(after), None) => Ok(Self::After(after.parse::<Timespec>()?.duration())),
            (None, Some(every)) => Ok(Self::Every(every.parse::<Timespec>()?.duration())),
        }
    }

    fn first_trigger(self, registered_at: Duration) -> Duration {
        match self {
            Self::After(delay) => registered_at.saturating_add(delay),
            Self::Every(_) => registered_at,
        }
    }
}

struct StagedTask<T> {
    id: TaskId,
    timing: Timing,
    registered_at: Duration,
    callback: Callback<T>,
}

struct ActiveTask<T> {
    id: TaskId,
    timing: Timing,
    trigger: Duration,
    callback: Option<Callback<T>>,
    retired: bool,
}

/// Runs callbacks after a delay or periodically.
pub struct Scheduler<T> {
    staged: Vec<StagedTask<T>>,
    active: Vec<ActiveTask<T>>,
    next_task_id: u64,
    last_update: Duration,
    updating: bool,
}

impl<T> Scheduler<T> {
    /// Creates a scheduler with no tasks.
    #[must_use]
    pub fn new() -> Self {
        Self {
            staged: Vec::new(),
            active: Vec::new(),
            next_task_id: 0,
            last_update: Duration::ZERO,
            updating: false,
        }
    }

    /// Registers `callback` to run according to `timing`.
    ///
    /// The task is staged until the next [`Scheduler::update`]. Its delay
    /// counts from the time of the most recent update, or zero before the
    /// first one.
    pub fn call<F>(&mut self, callback: F, timing: Timing) -> TaskId
    where
        F: FnMut(&mut T, &mut Scheduler<T>) + 'static,
    {
        let id = TaskId(self.next_task_id);
        self.next_task_id = self.next_task_id.wrapping_add(1);
        debug!("staging {id} with {timing:?}");
        self.staged.push(StagedTask {
            id,
            timing,
            registered_at: self.last_update,
            callback: Box::new(callback),
        });
        id
    }

    /// Registers `callback` with timing given as timespec strings.
    ///
    /// Invalid timing is reported here, not when the task would fire.
    pub fn call_with<F>(
        &mut self,
        callback: F,
        after: Option<&str>,
        every: Option<&str>,
    ) -> Result<TaskId, ConfigError>
    where
        F: FnMut(&mut T, &mut Scheduler<T>) + 'static,
    {
        let timing = Timing::parse(after, every)?;
        Ok(self.call(callback, timing))
    }

    /// Withdraws a staged or active task. Returns `false` when the task has
    /// already finished or was never registered.
    pub fn cancel(&mut self, id: TaskId) -> bool {
        if let Some(index) = self.staged.iter().position(|task| task.id == id) {
            let _ = self.staged.remove(index);
            debug!("cancelled staged {id}");
            return true;
        }
        match self
            .active
            .iter_mut()
            .find(|task| task.id == id && !task.retired)
        {
            Some(task) => {
                task.retired = true;
                debug!("cancelled {id}");
                true
            }
            None => false,
        }
    }

    /// Number of staged and active tasks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.staged.len() + self.active.iter().filter(|task| !task.retired).count()
    }

    /// Reports whether no task is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Promotes staged tasks, then fires every due task once in registration
    /// order. Returns the number of callbacks run.
    ///
    /// Calling this from inside a callback does nothing.
    pub fn update(&mut self, now: Duration, context: &mut T) -> usize {
        if self.updating {
            warn!("ignoring nested scheduler update");
            return 0;
        }
        self.updating = true;
        self.last_update = now;
        self.promote();

        let mut fired = 0;
        for index in 0..self.active.len() {
            let Some(task) = self.active.get_mut(index) else {
                break;
            };
            if task.retired || task.trigger > now {
                continue;
            }
            let Some(mut callback) = task.callback.take() else {
                continue;
            };
            let id = task.id;
            debug!("firing {id}");
            callback(context, self);
            fired += 1;

            if let Some(task) = self.active.get_mut(index) {
                match task.timing {
                    Timing::Every(period) => {
                        task.trigger = now.saturating_add(period);
                        task.callback = Some(callback);
                    }
                    Timing::After(_) => task.retired = true,
                }
            }
        }

        self.active
            .retain(|task| !task.retired && task.callback.is_some());
        self.updating = false;
        fired
    }

    /// Runs [`Scheduler::update`] with the time read from `clock`.
    pub fn update_with_clock<C: Clock + ?Sized>(&mut self, clock: &C, context: &mut T) -> usize {
        self.update(clock.now(), context)
    }

    fn promote(&mut self) {
        for staged in self.staged.drain(..) {
            let trigger = staged.timing.first_trigger(staged.registered_at);
            debug!("scheduling {} for {trigger:?}", staged.id);
            self.active.push(ActiveTask {
                id: staged.id,
                timing: staged.timing,
                trigger,
                callback: Some(staged.callback),
                retired: false,
            });
        }
    }
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Scheduler<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler")
            .field("staged", &self.staged.len())
            .field("active", &self.active.len())
            .field("last_update", &self.last_update)
            .field("updating", &self.updating)
            .finish()
    }
}
