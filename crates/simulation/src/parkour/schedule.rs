// Copyright © 2026
// Author: Antonio Caggiano <info@antoniocaggiano.eu>
// SPDX-License-Identifier: MIT

//! Deferred tasks owned by a parkour controller.
//!
//! Each [`Task`] has at most one pending instance: scheduling it again replaces the previous
//! one. Callbacks never run here, [`Scheduler::advance`] only reports which tasks are due and
//! the controller re-validates its state before acting on them.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum Task {
    /// Poll the gates at a fixed rate.
    Poll,
    OpenWallRunGate,
    EnableWallRunGravity,
    OpenVerticalWallRunGate,
    /// End a vertical wall run that lasted too long.
    EndVerticalWallRun,
    OpenMantleCheckGate,
    OpenSprintGate,
    /// Start a queued slide or sprint.
    CheckQueues,
}

#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
struct Pending {
    task: Task,
    remaining: f32,
    interval: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Reflect)]
pub struct Scheduler {
    pending: Vec<Pending>,
}

impl Scheduler {
    /// Maximum number of times a repeating task can fire within a single advance.
    const MAX_CATCH_UP: usize = 8;

    /// Schedules `task` once after `delay` seconds, replacing any pending instance.
    ///
    /// Non-positive delays clear the task instead of scheduling it.
    pub fn schedule_once(&mut self, task: Task, delay: f32) {
        self.cancel(task);
        if delay > 0.0 {
            self.pending.push(Pending {
                task,
                remaining: delay,
                interval: None,
            });
        }
    }

    /// Schedules `task` every `interval` seconds, replacing any pending instance.
    pub fn schedule_repeating(&mut self, task: Task, interval: f32) {
        self.cancel(task);
        if interval > 0.0 {
            self.pending.push(Pending {
                task,
                remaining: interval,
                interval: Some(interval),
            });
        }
    }

    /// Returns whether a pending instance was removed.
    pub fn cancel(&mut self, task: Task) -> bool {
        let before = self.pending.len();
        self.pending.retain(|pending| pending.task != task);
        before != self.pending.len()
    }

    pub fn is_pending(&self, task: Task) -> bool {
        self.pending.iter().any(|pending| pending.task == task)
    }

    /// Seconds left before `task` fires.
    pub fn remaining(&self, task: Task) -> Option<f32> {
        self.pending
            .iter()
            .find(|pending| pending.task == task)
            .map(|pending| pending.remaining)
    }

    /// Moves time forward and returns the tasks that became due, earliest first.
    pub fn advance(&mut self, delta: f32) -> Vec<Task> {
        let mut due: Vec<(f32, Task)> = Vec::new();
        for pending in &mut self.pending {
            pending.remaining -= delta;
            let mut fired = 0;
            while pending.remaining <= 0.0 && fired < Self::MAX_CATCH_UP {
                due.push((pending.remaining, pending.task));
                fired += 1;
                match pending.interval {
                    Some(interval) => pending.remaining += interval,
                    None => break,
                }
            }
            if pending.interval.is_some() && pending.remaining <= 0.0 {
                // Too far behind, drop the backlog.
                pending.remaining = pending.interval.unwrap_or_default();
            }
        }
        self.pending
            .retain(|pending| pending.interval.is_some() || pending.remaining > 0.0);

        due.sort_by(|a, b| a.0.total_cmp(&b.0));
        due.into_iter().map(|(_, task)| task).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_shot_fires_once() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_once(Task::CheckQueues, 0.02);
        assert!(scheduler.advance(0.01).is_empty());
        assert_eq!(scheduler.advance(0.01), vec![Task::CheckQueues]);
        assert!(scheduler.advance(1.0).is_empty());
        assert!(!scheduler.is_pending(Task::CheckQueues));
    }

    #[test]
    fn rescheduling_replaces_the_pending_instance() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_once(Task::OpenWallRunGate, 0.5);
        scheduler.schedule_once(Task::OpenWallRunGate, 1.0);
        assert!(scheduler.advance(0.6).is_empty());
        assert_eq!(scheduler.advance(0.5), vec![Task::OpenWallRunGate]);
    }

    #[test]
    fn non_positive_delay_clears_the_task() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_once(Task::OpenWallRunGate, 0.5);
        scheduler.schedule_once(Task::OpenWallRunGate, 0.0);
        assert!(!scheduler.is_pending(Task::OpenWallRunGate));
        assert!(scheduler.advance(1.0).is_empty());
    }

    #[test]
    fn due_tasks_come_out_earliest_first() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_once(Task::OpenVerticalWallRunGate, 0.35);
        scheduler.schedule_once(Task::CheckQueues, 0.02);
        assert_eq!(
            scheduler.advance(0.5),
            vec![Task::CheckQueues, Task::OpenVerticalWallRunGate]
        );
    }

    #[test]
    fn repeating_task_catches_up() {
        let mut scheduler = Scheduler::default();
        scheduler.schedule_repeating(Task::Poll, 0.25);
        assert_eq!(scheduler.advance(0.6), vec![Task::Poll, Task::Poll]);
        assert!(scheduler.is_pending(Task::Poll));
        assert!(scheduler.cancel(Task::Poll));
        assert!(scheduler.advance(1.0).is_empty());
    }
}
