//! Cancellable deferred tasks, fired by the frame loop once their deadline has passed.
//!
//! Nothing here waits: a task is only data until [`Scheduler::pop_due`] hands it back to the [`super::Game`] that
//! scheduled it.

use std::time::Duration;

/// The deferred steps of the serve sequence.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub enum Deferred {
    /// Show the first number of a countdown.
    CountdownBegin,
    /// Count down once, serving when reaching zero.
    CountdownTick { remaining: u32 },
    /// Put everything back in place after a goal.
    GoalRecenter,
    /// Put everything back in place after a restart request.
    RestartRecenter,
    /// Announce the winner of a completed match.
    EndMessage,
}

/// A task popped from the [`Scheduler`], with the generation of the match it was scheduled for.
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct Fired {
    pub task: Deferred,
    pub due: Duration,
    pub generation: u64,
}

#[derive(Clone, Debug)]
struct Entry {
    due: Duration,
    generation: u64,
    task: Deferred,
}

/// The set of pending deferred tasks of a game.
#[derive(Clone, Debug, Default)]
pub struct Scheduler {
    /// In scheduling order.
    pending: Vec<Entry>,
}

impl Scheduler {
    pub fn new() -> Scheduler {
        Scheduler::default()
    }

    /// Schedule `task` to fire once `due` is reached.
    pub fn schedule(&mut self, due: Duration, generation: u64, task: Deferred) {
        self.pending.push(Entry {
            due,
            generation,
            task,
        });
    }

    /// Cancel every pending task, returning how many there were.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return the earliest task due at `now`. Tasks due at the same time come out in scheduling order.
    pub fn pop_due(&mut self, now: Duration) -> Option<Fired> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.due <= now)
            .min_by_key(|(_, entry)| entry.due)?;
        let entry = self.pending.remove(index);
        Some(Fired {
            task: entry.task,
            due: entry.due,
            generation: entry.generation,
        })
    }
}
