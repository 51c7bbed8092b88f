//! Tick-driven task scheduler
//!
//! Delayed and recurring work (particle expiry, spawn delay, the connectivity
//! scan, evacuation pacing) lives here as plain entries. The engine polls it
//! once per `step()` after both sweeps; each due task runs synchronously.

use crate::spatial::ElementKey;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskHandle(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TaskKind {
    ConnectivityScan,
    SpawnDue,
    ExpireElement(ElementKey),
    Evacuation,
}

#[derive(Clone, Debug)]
struct Task {
    handle: TaskHandle,
    kind: TaskKind,
    due: u64,
    period: Option<u64>,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    tasks: Vec<Task>,
    next_handle: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: TaskKind, due: u64, period: Option<u64>) -> TaskHandle {
        self.next_handle += 1;
        let handle = TaskHandle(self.next_handle);
        self.tasks.push(Task { handle, kind, due, period });
        handle
    }

    /// Run `kind` once, `delay` ticks after `now`.
    pub fn schedule_once(&mut self, now: u64, delay: u64, kind: TaskKind) -> TaskHandle {
        self.push(kind, now.saturating_add(delay), None)
    }

    /// Run `kind` every `interval` ticks, first at `now + interval`.
    pub fn schedule_periodic(&mut self, now: u64, interval: u64, kind: TaskKind) -> TaskHandle {
        let interval = interval.max(1);
        self.push(kind, now.saturating_add(interval), Some(interval))
    }

    /// Periodic task that is never started twice: an existing periodic task of
    /// the same kind is returned untouched, keeping its phase.
    pub fn ensure_periodic(&mut self, now: u64, interval: u64, kind: TaskKind) -> TaskHandle {
        match self.tasks.iter().find(|t| t.kind == kind && t.period.is_some()) {
            Some(task) => task.handle,
            None => self.schedule_periodic(now, interval, kind),
        }
    }

    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.handle != handle);
        self.tasks.len() != before
    }

    pub fn is_scheduled(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|t| t.handle == handle)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn clear(&mut self) {
        self.tasks.clear();
    }

    /// Take every task due at `now`, ordered by due tick then creation.
    /// One-shot tasks are dropped, periodic ones re-armed.
    pub fn poll(&mut self, now: u64) -> Vec<(TaskHandle, TaskKind)> {
        let mut due: Vec<(u64, TaskHandle, TaskKind)> = self
            .tasks
            .iter()
            .filter(|t| t.due <= now)
            .map(|t| (t.due, t.handle, t.kind))
            .collect();
        due.sort_by_key(|&(tick, handle, _)| (tick, handle));

        self.tasks.retain(|t| t.due > now || t.period.is_some());
        for task in self.tasks.iter_mut() {
            if let Some(period) = task.period {
                while task.due <= now {
                    task.due += period;
                }
            }
        }

        due.into_iter().map(|(_, handle, kind)| (handle, kind)).collect()
    }
}
